//! Per-family field extraction.
//!
//! Every record is a pure function of the raw word; nothing here checks
//! whether the fields make sense together.

use serde::Serialize;

use crate::bits::{extract_bits, sign_extend};

pub trait Decode: Sized {
    fn decode(raw: u32) -> Self;
}

#[inline]
fn cond(raw: u32) -> u32 {
    extract_bits(raw, 28, 31)
}

#[inline]
fn bit(raw: u32, n: u32) -> bool {
    extract_bits(raw, n, n) != 0
}

/// MUL / MLA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MulInstr {
    pub rd: u32,
    pub rm: u32,
    pub rs: u32,
    pub cond: u32,
    pub accumulate: bool,
}

impl Decode for MulInstr {
    fn decode(raw: u32) -> Self {
        Self {
            rd: extract_bits(raw, 16, 19),
            rm: extract_bits(raw, 0, 3),
            rs: extract_bits(raw, 8, 11),
            cond: cond(raw),
            accumulate: bit(raw, 21),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataInstr {
    pub rn: u32,
    pub rd: u32,
    pub rotate: u32,
    /// Bits [27:24]; 0..=3 select the textual form.
    pub kind: u32,
    pub cond: u32,
    pub operand: u32,
}

impl Decode for DataInstr {
    fn decode(raw: u32) -> Self {
        Self {
            rn: extract_bits(raw, 16, 19),
            rd: extract_bits(raw, 12, 15),
            rotate: extract_bits(raw, 8, 11),
            kind: extract_bits(raw, 24, 27),
            cond: cond(raw),
            operand: extract_bits(raw, 0, 7),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LdrStrInstr {
    pub rn: u32,
    pub rd: u32,
    pub cond: u32,
    /// L, bit 20.
    pub load: bool,
    /// B, bit 22.
    pub byte: bool,
    /// U, bit 23.
    pub up: bool,
    /// I, bit 25: offset comes from a register.
    pub register_offset: bool,
    pub offset: u32,
    pub operand: u32,
}

impl Decode for LdrStrInstr {
    fn decode(raw: u32) -> Self {
        Self {
            rn: extract_bits(raw, 16, 19),
            rd: extract_bits(raw, 12, 15),
            cond: cond(raw),
            load: bit(raw, 20),
            byte: bit(raw, 22),
            up: bit(raw, 23),
            register_offset: bit(raw, 25),
            offset: extract_bits(raw, 0, 11),
            operand: extract_bits(raw, 0, 7),
        }
    }
}

pub const BRANCH_KIND_B: u32 = 0b1010;
pub const BRANCH_KIND_BL: u32 = 0b1011;
pub const BRANCH_OP_BX_REG: u32 = 1;
pub const BRANCH_OP_BLX_REG: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BranchInstr {
    pub cond: u32,
    pub kind: u32,
    /// Bits [7:4]; picks the register forms of `bx` / `blx`.
    pub opcode: u32,
    pub rm: u32,
    /// Byte displacement: the 24-bit word offset, sign-extended and scaled by 4.
    pub offset: i32,
}

impl Decode for BranchInstr {
    fn decode(raw: u32) -> Self {
        Self {
            cond: cond(raw),
            kind: extract_bits(raw, 24, 27),
            opcode: extract_bits(raw, 4, 7),
            rm: extract_bits(raw, 0, 3),
            offset: sign_extend(extract_bits(raw, 0, 23), 24).wrapping_shl(2),
        }
    }
}

impl BranchInstr {
    /// Displayed target for a given pipeline bias.
    pub fn target(&self, bias: u32) -> u32 {
        (self.offset as u32).wrapping_add(bias)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MiscInstr {
    pub rn: u32,
    pub rd: u32,
    pub cond: u32,
    pub kind: u32,
    /// Bits [23:21].
    pub group: u32,
    /// Bits [7:4].
    pub sub_op: u32,
    pub imm8: u32,
    pub rm: u32,
}

impl Decode for MiscInstr {
    fn decode(raw: u32) -> Self {
        Self {
            rn: extract_bits(raw, 16, 19),
            rd: extract_bits(raw, 12, 15),
            cond: cond(raw),
            kind: extract_bits(raw, 24, 27),
            group: extract_bits(raw, 21, 23),
            sub_op: extract_bits(raw, 4, 7),
            imm8: extract_bits(raw, 0, 7),
            rm: extract_bits(raw, 0, 3),
        }
    }
}
