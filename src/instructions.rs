use serde::Serialize;

use crate::bits::extract_bits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Family {
    Branching,
    LoadStore,
    Miscellaneous,
    DataProcessing,
}

/// One row of the classification table, keyed by bits [27:20].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpcodeEntry {
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub family: Family,
}

use Family::*;

const fn row(mnemonic: &'static str, opcode: u8, family: Family) -> OpcodeEntry {
    OpcodeEntry { mnemonic, opcode, family }
}

pub static TABLE: [OpcodeEntry; 56] = [
    row("adc", 0x0a, DataProcessing),
    row("adc", 0x2a, DataProcessing),
    row("and", 0x00, DataProcessing),
    row("and", 0x20, DataProcessing),
    row("add", 0x28, DataProcessing),
    row("add", 0x08, DataProcessing),
    row("bic", 0x3c, DataProcessing),
    row("bic", 0x1c, DataProcessing),
    row("mov", 0x3a, DataProcessing),
    row("mov", 0x1a, DataProcessing),
    row("mvn", 0x3e, DataProcessing),
    row("mvn", 0x1e, DataProcessing),
    row("orr", 0x38, DataProcessing),
    row("orr", 0x18, DataProcessing),
    row("sub", 0x24, DataProcessing),
    row("sub", 0x04, DataProcessing),
    row("cmp", 0x35, DataProcessing),
    row("cmp", 0x15, DataProcessing),
    row("cmn", 0x37, DataProcessing),
    row("cmn", 0x17, DataProcessing),
    row("rsb", 0x26, DataProcessing),
    row("rsb", 0x06, DataProcessing),
    row("eor", 0x22, DataProcessing),
    row("eor", 0x02, DataProcessing),
    row("teq", 0x33, DataProcessing),
    row("teq", 0x13, DataProcessing),
    row("tst", 0x31, DataProcessing),
    row("tst", 0x11, DataProcessing),
    row("rsc", 0x2e, DataProcessing),
    row("rsc", 0x0e, DataProcessing),
    row("sbc", 0x2c, DataProcessing),
    row("sbc", 0x0c, DataProcessing),
    row("ldr", 0x59, LoadStore),
    row("ldr", 0x79, LoadStore),
    row("ldrt", 0x4b, LoadStore),
    row("ldrb", 0x5d, LoadStore),
    row("ldrb", 0x7d, LoadStore),
    row("ldrbt", 0x4e, LoadStore),
    row("str", 0x52, LoadStore),
    row("str", 0x58, LoadStore),
    row("str", 0x78, LoadStore),
    row("strt", 0x4a, LoadStore),
    row("strb", 0x5c, LoadStore),
    row("strb", 0x7c, LoadStore),
    row("strbt", 0x4f, LoadStore),
    row("b", 0xa4, Branching),
    row("b", 0xa0, Branching),
    row("bl", 0xb0, Branching),
    row("bx", 0x12, Branching),
    row("svc", 0xf0, Miscellaneous),
    row("clz", 0x16, Miscellaneous),
    row("nop", 0x32, Miscellaneous),
    row("rfe", 0x89, Miscellaneous),
    row("rfedb", 0x91, Miscellaneous),
    row("cps", 0x10, Miscellaneous),
    row("pli", 0x4d, Miscellaneous),
];

/// Fixed opcodes that get their own templates.
pub mod opcodes {
    pub const SVC: u8 = 0xf0;
    pub const NOP: u8 = 0x32;
    pub const RFE: u8 = 0x89;
    pub const RFEDB: u8 = 0x91;
    pub const CPS: u8 = 0x10;
    pub const PLI: u8 = 0x4d;
    /// `b` row that renders with the +8 bias under AL.
    pub const B_NEAR: u8 = 0xa4;

    pub const CMP: [u8; 2] = [0x15, 0x35];
    pub const CMN: [u8; 2] = [0x17, 0x37];
    pub const TST: [u8; 2] = [0x11, 0x31];
    pub const TEQ: [u8; 2] = [0x13, 0x33];
}

/// Bits [27:20] of an instruction word.
#[inline]
pub fn encoding_type(raw: u32) -> u8 {
    extract_bits(raw, 20, 27) as u8
}

/// First table row whose opcode equals the word's encoding type.
pub fn classify(raw: u32) -> Option<&'static OpcodeEntry> {
    let op = encoding_type(raw);
    TABLE.iter().find(|e| e.opcode == op)
}

impl OpcodeEntry {
    /// `cmp`, `cmn`, `tst` and `teq` set flags only and have no destination.
    pub fn is_compare(&self) -> bool {
        [opcodes::CMP, opcodes::CMN, opcodes::TST, opcodes::TEQ]
            .iter()
            .any(|pair| pair.contains(&self.opcode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_shape() {
        assert_eq!(TABLE.len(), 56);
        let count = |f: Family| TABLE.iter().filter(|e| e.family == f).count();
        assert_eq!(count(DataProcessing), 32);
        assert_eq!(count(LoadStore), 13);
        assert_eq!(count(Branching), 4);
        assert_eq!(count(Miscellaneous), 7);
    }

    #[test]
    fn classify_first_match() {
        let e = classify(0xE3A0_1001).unwrap();
        assert_eq!(e.mnemonic, "mov");
        assert_eq!(e.opcode, 0x3a);
        assert_eq!(e.family, DataProcessing);
        let pos = TABLE.iter().position(|r| r.opcode == 0x3a).unwrap();
        assert!(std::ptr::eq(e, &TABLE[pos]));
    }

    #[test]
    fn duplicate_mnemonics_resolve_to_their_own_rows() {
        let imm = classify(0xE200_0000).unwrap();
        let reg = classify(0xE000_0000).unwrap();
        assert_eq!(imm.mnemonic, "and");
        assert_eq!(reg.mnemonic, "and");
        assert_eq!(imm.opcode, 0x20);
        assert_eq!(reg.opcode, 0x00);
        // same word, same row
        assert!(std::ptr::eq(classify(0xE200_0000).unwrap(), imm));
    }

    #[test]
    fn classify_miss() {
        assert!(classify(0xE600_0010).is_none());
        assert!(classify(0xFFFF_FFFF).is_none());
    }

    #[test]
    fn compares() {
        for m in ["cmp", "cmn", "tst", "teq"] {
            assert!(TABLE.iter().filter(|e| e.mnemonic == m).all(OpcodeEntry::is_compare));
        }
        assert!(!classify(0xE3A0_1001).unwrap().is_compare());
    }
}
