use tracing::trace;

use crate::bits::rotate_immediate;
use crate::decoder::{
    BranchInstr, DataInstr, Decode, LdrStrInstr, MiscInstr, MulInstr, BRANCH_KIND_B, BRANCH_KIND_BL,
    BRANCH_OP_BLX_REG, BRANCH_OP_BX_REG,
};
use crate::instructions::{classify, opcodes, Family, OpcodeEntry};
use crate::names::{Cond, Reg, COND_AL, COND_UNCONDITIONAL};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unrecognized encoding {raw:#010x}")]
    Unclassified { raw: u32 },
    #[error("no {family:?} template for {raw:#010x} (sub-type {kind})")]
    NoTemplate { raw: u32, family: Family, kind: u32 },
}

/// Disassembles one instruction word into its text line.
pub fn format_instr(raw: u32) -> Result<String, DecodeError> {
    let entry = classify(raw);
    if let Some(text) = format_misc(raw, entry) {
        return Ok(text);
    }
    let entry = entry.ok_or(DecodeError::Unclassified { raw })?;
    trace!(raw, mnemonic = entry.mnemonic, family = ?entry.family, "generic path");
    match entry.family {
        Family::LoadStore => Ok(format_ldrstr(raw, entry)),
        Family::Branching => format_branch(raw, entry),
        Family::DataProcessing => format_data(raw, entry),
        Family::Miscellaneous => Err(DecodeError::NoTemplate {
            raw,
            family: Family::Miscellaneous,
            kind: entry.opcode as u32,
        }),
    }
}

/// A miscellaneous-space rule. Rules are tried in order; the first whose
/// predicate holds renders the word.
pub struct MiscRule {
    pub name: &'static str,
    pub matches: fn(&MiscInstr, Option<&OpcodeEntry>) -> bool,
    pub render: fn(u32, &MiscInstr, Option<&OpcodeEntry>) -> String,
}

const MISC_GROUP1: u32 = 0b0000;
const MISC_GROUP2: u32 = 0b0010;
const MISC_GROUP3: u32 = 0b0001;
const MISC_GROUP4: u32 = 0b0111;

const OP_HVC: u32 = 0b10;
const OP_BXJ: u32 = 0b01;
const OP_CLZ: u32 = 0b11;
const OP_BKPT: u32 = 0b01;

fn has_opcode(e: Option<&OpcodeEntry>, op: u8) -> bool {
    e.is_some_and(|e| e.opcode == op)
}

fn mnemonic(e: Option<&OpcodeEntry>) -> &'static str {
    e.map_or("", |e| e.mnemonic)
}

pub const MISC_RULES: &[MiscRule] = &[
    MiscRule {
        name: "hvc",
        matches: |m, _| m.sub_op == MISC_GROUP1 && m.group == OP_HVC,
        render: |_, m, _| format!("hvc{}\t#{:#x}", Cond(m.cond), m.rm),
    },
    MiscRule {
        name: "bxj",
        matches: |m, _| m.sub_op == MISC_GROUP2 && m.group == OP_BXJ,
        render: |_, m, _| format!("bxj{}\t{}", Cond(m.cond), Reg(m.rm)),
    },
    MiscRule {
        name: "clz",
        matches: |m, e| e.is_some() && m.sub_op == MISC_GROUP3 && m.group == OP_CLZ,
        render: |_, m, e| format!("{}{}\t{}, {}", mnemonic(e), Cond(m.cond), Reg(m.rd), Reg(m.rm)),
    },
    MiscRule {
        name: "bkpt",
        matches: |m, _| m.sub_op == MISC_GROUP4 && m.group == OP_BKPT,
        render: |_, m, _| format!("bkpt{}\t#{:#x}", Cond(m.cond), m.rm),
    },
    MiscRule {
        name: "svc",
        matches: |_, e| has_opcode(e, opcodes::SVC),
        render: |_, m, e| format!("{}{}\t#{:#x}", mnemonic(e), Cond(m.cond), m.imm8),
    },
    MiscRule {
        name: "nop",
        matches: |_, e| has_opcode(e, opcodes::NOP),
        render: |_, m, e| format!("{}{}", mnemonic(e), Cond(m.cond)),
    },
    MiscRule {
        name: "rfe",
        matches: |_, e| has_opcode(e, opcodes::RFE) || has_opcode(e, opcodes::RFEDB),
        render: |_, m, e| format!("{}\t{}", mnemonic(e), Reg(m.rn)),
    },
    MiscRule {
        name: "cps",
        matches: |_, e| has_opcode(e, opcodes::CPS),
        render: |_, m, e| format!("{}\t#{:#x}", mnemonic(e), m.imm8),
    },
    MiscRule {
        name: "pli",
        matches: |_, e| has_opcode(e, opcodes::PLI),
        render: |_, m, e| format!("{}\t[{}, #{:#x}]", mnemonic(e), Reg(m.rn), m.imm8),
    },
    // Anything classified with bits [27:24] clear is multiply-shaped.
    MiscRule {
        name: "mul",
        matches: |m, e| e.is_some() && m.kind == 0,
        render: |raw, _, _| format_mul(raw),
    },
];

/// Tries the miscellaneous rules. These run before family dispatch since
/// their encodings alias data-processing and branch patterns.
pub fn format_misc(raw: u32, entry: Option<&OpcodeEntry>) -> Option<String> {
    let m = MiscInstr::decode(raw);
    let rule = MISC_RULES.iter().find(|r| (r.matches)(&m, entry))?;
    trace!(raw, rule = rule.name, "misc rule");
    Some((rule.render)(raw, &m, entry))
}

pub fn format_mul(raw: u32) -> String {
    let m = MulInstr::decode(raw);
    let mn = if m.accumulate { "mla" } else { "mul" };
    format!("{mn}{}\tr{}, r{}, r{}", Cond(m.cond), m.rd, m.rm, m.rs)
}

pub fn format_data(raw: u32, entry: &OpcodeEntry) -> Result<String, DecodeError> {
    let d = DataInstr::decode(raw);
    let mn = entry.mnemonic;
    let cc = Cond(d.cond);
    let text = match d.kind {
        0 => format!("{mn}{cc}\t{}, {}, {}", Reg(d.rd), Reg(d.rn), Reg(d.operand)),
        1 if entry.is_compare() => format!("{mn}{cc}\t{}, {}", Reg(d.rn), Reg(d.operand)),
        1 => format!("{mn}{cc}\t{}, {}", Reg(d.rd), Reg(d.operand)),
        2 => format!("{mn}{cc}\t{}, {}, #{:#x}", Reg(d.rd), Reg(d.rn), d.operand),
        // The rotated form prints the raw destination index and no condition.
        3 if d.rotate != 0 => format!("{mn}\tr{}, #{:#x}", d.rd, rotate_immediate(d.operand, d.rotate)),
        3 if entry.is_compare() => format!("{mn}{cc}\t{}, #{:#x}", Reg(d.rn), d.operand),
        3 => format!("{mn}{cc}\t{}, #{:#x}", Reg(d.rd), d.operand),
        kind => {
            return Err(DecodeError::NoTemplate { raw, family: Family::DataProcessing, kind })
        }
    };
    Ok(text)
}

/// Pipeline biases added to branch displacements.
pub const BIAS_NEAR: u32 = 8;
pub const BIAS_COND: u32 = 12;
pub const BIAS_LINK: u32 = 16;

pub fn format_branch(raw: u32, entry: &OpcodeEntry) -> Result<String, DecodeError> {
    let b = BranchInstr::decode(raw);
    let cc = Cond(b.cond);
    match b.opcode {
        BRANCH_OP_BX_REG => return Ok(format!("bx{cc}\tr{}", b.rm)),
        BRANCH_OP_BLX_REG => return Ok(format!("blx{cc}\tr{}", b.rm)),
        _ => {}
    }
    let text = match b.kind {
        BRANCH_KIND_B if b.cond == COND_UNCONDITIONAL => {
            format!("blx{cc}\t#{:#x}", b.target(BIAS_LINK))
        }
        BRANCH_KIND_B if entry.opcode == opcodes::B_NEAR && b.cond == COND_AL => {
            format!("b\t#{:#x}", b.target(BIAS_NEAR))
        }
        BRANCH_KIND_B => format!("b{cc}\t#{:#x}", b.target(BIAS_COND)),
        BRANCH_KIND_BL if b.cond == COND_AL => format!("bl\t#{:#x}", b.target(BIAS_LINK)),
        BRANCH_KIND_BL => format!("bl{cc}\t#{:#x}", b.target(BIAS_NEAR)),
        kind => return Err(DecodeError::NoTemplate { raw, family: Family::Branching, kind }),
    };
    Ok(text)
}

pub fn format_ldrstr(raw: u32, entry: &OpcodeEntry) -> String {
    let l = LdrStrInstr::decode(raw);
    let mn = entry.mnemonic;
    if l.register_offset {
        return format!("{mn}\t{}, [{}, {}]", Reg(l.rd), Reg(l.rn), Reg(l.operand));
    }
    if l.offset == 0 && l.up {
        // byte rows already spell out the access size (ldrb, strbt, ...)
        let suffix = if l.byte && !mn.contains('b') { "b" } else { "" };
        return format!("{mn}{suffix}\t{}, [{}]", Reg(l.rd), Reg(l.rn));
    }
    format!("{mn}\t{}, [{}, #{:#x}]", Reg(l.rd), Reg(l.rn), l.operand)
}
