//! Bit-level helpers shared by the family decoders and the formatter.

/// Returns the inclusive bit range `[low, high]` of `word`, right-justified.
#[inline]
pub fn extract_bits(word: u32, low: u32, high: u32) -> u32 {
    assert!(low <= high && high <= 31, "bit range [{low}, {high}] outside a 32-bit word");
    (word << (31 - high)) >> (low + 31 - high)
}

/// Sign-extends the low `used_bits` bits of `value` to a full `i32`.
#[inline]
pub fn sign_extend(value: u32, used_bits: u32) -> i32 {
    assert!((1..=32).contains(&used_bits), "cannot sign-extend a {used_bits}-bit field");
    let s = 32 - used_bits;
    ((value << s) as i32) >> s
}

/// Rotates a data-processing immediate right by `rotate * 2` bits.
///
/// A rotate of zero is the identity here; deciding whether a zero rotate
/// gets its own textual form is up to the formatter.
#[inline]
pub fn rotate_immediate(operand: u32, rotate: u32) -> u32 {
    operand.rotate_right(rotate * 2)
}
