use a32dis::listing::TEXT_CAPACITY;
use a32dis::{disassemble, disassemble_with, DisasmConfig};
use pretty_assertions::assert_eq;

fn le_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

#[test]
fn buffer_decodes_in_address_order() {
    let bytes = le_bytes(&[0xE3A0_1001, 0xE591_0000, 0xEB00_0000]);
    let dis = disassemble(&bytes).unwrap();
    let text: Vec<_> = dis.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(text, ["mov\tr1, #0x1", "ldr\tr0, [r1]", "bl\t#0x10"]);
    assert_eq!(dis.instructions[1].raw, 0xE591_0000);
}

#[test]
fn bad_word_does_not_stop_the_buffer() {
    let bytes = le_bytes(&[0xE3A0_1001, 0xE600_0010, 0xE000_0291]);
    let dis = disassemble(&bytes).unwrap();
    assert_eq!(dis.len(), 3);
    assert_eq!(dis.failures(), vec![1]);
    assert_eq!(dis.decoded_count(), 2);
    assert_eq!(dis.instructions[1].text, "");
    assert!(!dis.instructions[1].is_decoded());
    assert_eq!(dis.instructions[2].text, "mul\tr0, r1, r2");
}

#[test]
fn trailing_bytes_are_ignored() {
    let mut bytes = le_bytes(&[0xE320_F000]);
    bytes.extend_from_slice(&[0xAA, 0xBB]);
    let dis = disassemble(&bytes).unwrap();
    assert_eq!(dis.len(), 1);
    assert_eq!(dis.instructions[0].text, "nop");
}

#[test]
fn big_endian_buffers() {
    let bytes = 0xE3A0_1001u32.to_be_bytes();
    let cfg = DisasmConfig { little_endian: false, ..DisasmConfig::default() };
    let dis = disassemble_with(&bytes, &cfg).unwrap();
    assert_eq!(dis.instructions[0].text, "mov\tr1, #0x1");
}

#[test]
fn text_fits_line_buffer() {
    let words: Vec<u32> = (0..4096u32).map(|i| i.wrapping_mul(0x9E37_79B9)).collect();
    let dis = disassemble(&le_bytes(&words)).unwrap();
    assert_eq!(dis.len(), words.len());
    for insn in &dis {
        assert!(insn.text.len() < TEXT_CAPACITY, "{:#010x}: {:?}", insn.raw, insn.text);
    }
}

#[test]
fn listing_serializes() {
    let dis = disassemble(&le_bytes(&[0xE320_F000])).unwrap();
    let json = serde_json::to_string(&dis).unwrap();
    assert_eq!(json, r#"{"instructions":[{"raw":3810586624,"text":"nop","decoded":true}]}"#);
}

#[test]
fn tiny_line_buffer_keeps_decode_status() {
    let bytes = le_bytes(&[0xE3A0_1001, 0xE600_0010, 0xE320_F000]);
    let cfg = DisasmConfig { text_capacity: 1, ..DisasmConfig::default() };
    let dis = disassemble_with(&bytes, &cfg).unwrap();
    assert!(dis.iter().all(|i| i.text.is_empty()));
    assert_eq!(dis.failures(), vec![1]);
    assert_eq!(dis.decoded_count(), 2);
}
