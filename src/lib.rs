pub mod bits;
pub mod decoder;
pub mod disasm;
pub mod instructions;
pub mod listing;
pub mod names;

pub use disasm::{format_instr, DecodeError};
pub use instructions::{classify, Family, OpcodeEntry};
pub use listing::{disassemble, disassemble_with, DisasmConfig, DisasmError, Disassembly, Instruction};
