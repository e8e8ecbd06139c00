use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::disasm::format_instr;

/// Size of one A32 instruction slot in bytes.
pub const INSTR_SIZE: usize = 4;

/// Text buffer size of a disassembled line, terminator included.
pub const TEXT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisasmConfig {
    /// Byte order of instruction words in the input buffer.
    pub little_endian: bool,
    /// Line buffer size; text is cut to `text_capacity - 1` bytes.
    pub text_capacity: usize,
}

impl Default for DisasmConfig {
    fn default() -> Self {
        Self {
            little_endian: true,
            text_capacity: TEXT_CAPACITY,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DisasmError {
    #[error("cannot allocate {count} instruction records: {source}")]
    Alloc {
        count: usize,
        #[source]
        source: TryReserveError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub raw: u32,
    /// Rendered line, cut to the configured capacity; empty on failure.
    pub text: String,
    /// Set when the word decoded, even if its text was cut to nothing.
    pub decoded: bool,
}

impl Instruction {
    pub fn decode(raw: u32, cfg: &DisasmConfig) -> Self {
        match format_instr(raw) {
            Ok(mut text) => {
                truncate_text(&mut text, cfg.text_capacity);
                Self { raw, text, decoded: true }
            }
            Err(err) => {
                debug!(%err, "decode failed");
                Self { raw, text: String::new(), decoded: false }
            }
        }
    }

    pub fn is_decoded(&self) -> bool {
        self.decoded
    }
}

/// Cuts `text` so it fits a `capacity`-byte buffer with a terminator.
pub fn truncate_text(text: &mut String, capacity: usize) {
    let max = capacity.saturating_sub(1);
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Disassembly {
    pub instructions: Vec<Instruction>,
}

impl Disassembly {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    pub fn decoded_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_decoded()).count()
    }

    /// Indices of words that failed to decode.
    pub fn failures(&self) -> Vec<usize> {
        self.instructions
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.is_decoded())
            .map(|(n, _)| n)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Disassembly {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Words of `bytes` in address order; a trailing partial word is dropped.
pub fn words<'a>(bytes: &'a [u8], cfg: &DisasmConfig) -> impl Iterator<Item = u32> + 'a {
    let le = cfg.little_endian;
    bytes.chunks_exact(INSTR_SIZE).map(move |c| {
        let b = [c[0], c[1], c[2], c[3]];
        if le { u32::from_le_bytes(b) } else { u32::from_be_bytes(b) }
    })
}

pub fn disassemble(bytes: &[u8]) -> Result<Disassembly, DisasmError> {
    disassemble_with(bytes, &DisasmConfig::default())
}

pub fn disassemble_with(bytes: &[u8], cfg: &DisasmConfig) -> Result<Disassembly, DisasmError> {
    let count = bytes.len() / INSTR_SIZE;
    let mut instructions = Vec::new();
    instructions
        .try_reserve_exact(count)
        .map_err(|source| DisasmError::Alloc { count, source })?;

    for (i, raw) in words(bytes, cfg).enumerate() {
        let insn = Instruction::decode(raw, cfg);
        debug!(
            offset = i * INSTR_SIZE,
            raw = format_args!("{raw:#010x}"),
            ok = insn.is_decoded(),
            "word"
        );
        instructions.push(insn);
    }

    let out = Disassembly { instructions };
    debug!(words = out.len(), decoded = out.decoded_count(), "disassembled buffer");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_bounded() {
        let mut s = "x".repeat(40);
        truncate_text(&mut s, TEXT_CAPACITY);
        assert_eq!(s.len(), TEXT_CAPACITY - 1);

        let mut short = String::from("mov\tr1, #0x1");
        truncate_text(&mut short, TEXT_CAPACITY);
        assert_eq!(short, "mov\tr1, #0x1");

        let mut zero = String::from("nop");
        truncate_text(&mut zero, 0);
        assert!(zero.is_empty());
    }

    #[test]
    fn small_capacity_cuts_lines() {
        let cfg = DisasmConfig { text_capacity: 4, ..DisasmConfig::default() };
        assert_eq!(Instruction::decode(0xE3A0_1001, &cfg).text, "mov");
    }

    #[test]
    fn decoded_flag_survives_empty_text() {
        for capacity in [0, 1] {
            let cfg = DisasmConfig { text_capacity: capacity, ..DisasmConfig::default() };
            let insn = Instruction::decode(0xE320_F000, &cfg);
            assert_eq!(insn.text, "");
            assert!(insn.is_decoded());
            assert!(!Instruction::decode(0xFFFF_FFFF, &cfg).is_decoded());
        }
    }

    #[test]
    fn word_order_follows_config() {
        let bytes = [0x01, 0x10, 0xA0, 0xE3, 0xFF];
        let le: Vec<_> = words(&bytes, &DisasmConfig::default()).collect();
        assert_eq!(le, [0xE3A0_1001]);
        let be_cfg = DisasmConfig { little_endian: false, ..DisasmConfig::default() };
        let be: Vec<_> = words(&bytes, &be_cfg).collect();
        assert_eq!(be, [0x0110_A0E3]);
    }

    #[test]
    fn empty_and_short_buffers() {
        assert!(disassemble(&[]).unwrap().is_empty());
        assert!(disassemble(&[1, 2, 3]).unwrap().is_empty());
    }

    #[test]
    fn config_default_round_trips_json() {
        let cfg = DisasmConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(json, r#"{"little_endian":true,"text_capacity":32}"#);
        let back: DisasmConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
