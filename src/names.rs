use std::fmt;

/// Condition-code suffixes indexed by bits [31:28]. AL (14) and the
/// unconditional space (15) print nothing.
pub const CONDITION_CODES: [&str; 16] = [
    "eq", "ne", "cs", "cc", "mi", "pl", "vs", "vc", "hi", "ls", "ge", "lt", "gt", "le", "", "",
];

pub const REGISTERS: [&str; 17] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "sb", "sl", "fp", "ip", "sp", "lr", "pc",
    "r16",
];

pub const COND_AL: u32 = 14;
pub const COND_UNCONDITIONAL: u32 = 15;

/// Condition suffix of a decoded condition field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cond(pub u32);

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(CONDITION_CODES[(self.0 & 0xF) as usize])
    }
}

/// Symbolic register name. Operand bytes are sometimes used as register
/// indices; anything past the table prints as `rN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(pub u32);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match REGISTERS.get(self.0 as usize) {
            Some(name) => f.write_str(name),
            None => write!(f, "r{}", self.0),
        }
    }
}
