//! Bit-order reflection.
//!
//! "Reflected" means bit-reversed. A reflected CRC shifts data LSB-first, so
//! both engines reflect input bytes, polynomials and final registers through
//! the helpers here.

/// Reverse the order of the `bits` least-significant bits of `value`.
///
/// Bit 0 swaps with bit `bits - 1`, bit 1 with bit `bits - 2`, and so on.
/// Bits at or above position `bits` are ignored on input and are always
/// clear in the result. `bits == 0` yields 0; `bits >= 64` reverses the whole
/// word.
///
/// Applying the reflection twice with the same `bits` returns the original
/// value for every `value` representable in `bits` bits.
///
/// # Examples
///
/// ```
/// use crcmodel::reflect::reverse_bits;
///
/// assert_eq!(reverse_bits(0b1011, 4), 0b1101);
/// assert_eq!(reverse_bits(0x04C1_1DB7, 32), 0xEDB8_8320);
/// // High garbage above `bits` is dropped.
/// assert_eq!(reverse_bits(0xF0_01, 8), 0x80);
/// ```
#[inline]
#[must_use]
pub const fn reverse_bits(value: u64, bits: u32) -> u64 {
  if bits == 0 {
    return 0;
  }
  if bits >= u64::BITS {
    return value.reverse_bits();
  }
  value.reverse_bits() >> (u64::BITS - bits)
}

/// Reverse the bit order of a single byte.
#[inline]
#[must_use]
pub const fn reverse_byte(byte: u8) -> u8 {
  byte.reverse_bits()
}

/// Mask selecting the low `width` bits (`width >= 64` selects all of them).
#[inline]
#[must_use]
pub const fn width_mask(width: u32) -> u64 {
  if width >= u64::BITS {
    u64::MAX
  } else {
    (1u64 << width) - 1
  }
}
