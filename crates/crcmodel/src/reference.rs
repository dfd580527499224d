//! Bitwise reference engine: the source of truth.
//!
//! Every checksum in this crate is defined by this module. The register is
//! kept MSB-first, left-aligned to `width` bits, and each input byte is folded
//! in with eight shift/test/XOR steps, directly mirroring the shift-register
//! definition of a CRC:
//!
//! 1. reflect the byte if `refin`;
//! 2. `crc ^= byte << (width - 8)`;
//! 3. eight times: shift left, XOR `poly` if the bit shifted out was set;
//! 4. after the last byte, reflect the register if `refout`, then XOR `xorout`.
//!
//! The engine is deliberately slow (eight steps per byte). The table engine in
//! [`crate::engine`] must reproduce it bit for bit.

// SAFETY: All array indexing uses bounded loop indices (0..data.len()).
// Clippy cannot prove this in const fn contexts, but bounds are statically guaranteed.
#![allow(clippy::indexing_slicing)]

use crate::{
  params::{CHECK_INPUT, CrcParams, is_supported_width},
  reflect::{reverse_bits, width_mask},
};

// ─────────────────────────────────────────────────────────────────────────────
// Raw Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Fold one byte into an MSB-first register.
///
/// `poly` must already be masked to `width` bits and `width` must be a
/// supported width.
#[inline]
#[must_use]
pub const fn step_byte(crc: u64, byte: u8, width: u32, poly: u64, refin: bool) -> u64 {
  let mask = width_mask(width);
  let top = 1u64 << (width - 1);
  let byte = if refin { byte.reverse_bits() } else { byte };

  let mut crc = crc ^ ((byte as u64) << (width - 8));
  let mut bit = 0;
  while bit < 8 {
    crc = if crc & top != 0 { (crc << 1) ^ poly } else { crc << 1 };
    crc &= mask;
    bit += 1;
  }
  crc
}

/// Bit-at-a-time CRC from raw parameters.
///
/// Values are masked to `width` bits before use, so callers may pass
/// over-wide `poly`/`init`/`xorout`. Empty `data` yields
/// `(refout ? reflect(init) : init) ^ xorout`.
///
/// # Panics
///
/// Panics if `width` is not a multiple of 8 in `8..=64`. Use
/// [`CrcParams::new`] to validate untrusted parameters first.
///
/// # Examples
///
/// ```
/// use crcmodel::reference::calculate_crc;
///
/// let crc = calculate_crc(b"123456789", 32, 0x04C1_1DB7, 0xFFFF_FFFF, true, true, 0xFFFF_FFFF);
/// assert_eq!(crc, 0xCBF4_3926);
/// ```
#[must_use]
pub const fn calculate_crc(
  data: &[u8],
  width: u32,
  poly: u64,
  init: u64,
  refin: bool,
  refout: bool,
  xorout: u64,
) -> u64 {
  assert!(is_supported_width(width), "unsupported CRC width");
  let mask = width_mask(width);
  let poly = poly & mask;

  let mut crc = init & mask;
  let mut i = 0;
  while i < data.len() {
    crc = step_byte(crc, data[i], width, poly, refin);
    i += 1;
  }

  if refout {
    crc = reverse_bits(crc, width);
  }
  (crc ^ xorout) & mask
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameter-Set API
// ─────────────────────────────────────────────────────────────────────────────

/// Register value before any data: `init`.
#[inline]
#[must_use]
pub const fn start(params: &CrcParams) -> u64 {
  params.init()
}

/// Fold `data` into a register produced by [`start`] or a previous `update`.
///
/// Splitting a message across several `update` calls yields the same
/// register as one call over the whole message.
#[must_use]
pub const fn update(mut crc: u64, data: &[u8], params: &CrcParams) -> u64 {
  let mut i = 0;
  while i < data.len() {
    crc = step_byte(crc, data[i], params.width(), params.poly(), params.refin());
    i += 1;
  }
  crc
}

/// Turn a register into the reported checksum (`refout`, then `xorout`).
#[inline]
#[must_use]
pub const fn finalize(crc: u64, params: &CrcParams) -> u64 {
  let crc = if params.refout() {
    reverse_bits(crc, params.width())
  } else {
    crc
  };
  (crc ^ params.xorout()) & params.mask()
}

/// One-shot reference checksum.
///
/// ```
/// use crcmodel::{CrcParams, reference};
///
/// assert_eq!(reference::checksum(b"123456789", &CrcParams::CRC_8_SMBUS), 0xF4);
/// ```
#[inline]
#[must_use]
pub const fn checksum(data: &[u8], params: &CrcParams) -> u64 {
  finalize(update(start(params), data, params), params)
}

// ─────────────────────────────────────────────────────────────────────────────
// Compile-Time Verification
// ─────────────────────────────────────────────────────────────────────────────

// Every catalogue entry's published check value is verified against the
// reference engine at compile time. If one fails, the build fails.
const _: () = {
  let entries = crate::catalog::ENTRIES;
  let mut i = 0;
  while i < entries.len() {
    let entry = &entries[i];
    assert!(checksum(CHECK_INPUT, &entry.params) == entry.check);
    i += 1;
  }
};

// The raw entry point agrees with the parameter-set path.
const _: () = {
  let raw = calculate_crc(CHECK_INPUT, 16, 0x1021, 0xFFFF, false, false, 0);
  assert!(raw == 0x29B1);
};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  const CRC8_FIXTURE: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];

  // ─────────────────────────────────────────────────────────────────────────
  // Known Vectors
  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn crc8_check_value() {
    assert_eq!(calculate_crc(CHECK_INPUT, 8, 0x07, 0x00, false, false, 0x00), 0xF4);
  }

  #[test]
  fn crc16_ccitt_false_check_value() {
    assert_eq!(calculate_crc(CHECK_INPUT, 16, 0x1021, 0xFFFF, false, false, 0x0000), 0x29B1);
  }

  #[test]
  fn crc32_check_value() {
    assert_eq!(
      calculate_crc(CHECK_INPUT, 32, 0x04C1_1DB7, 0xFFFF_FFFF, true, true, 0xFFFF_FFFF),
      0xCBF4_3926
    );
  }

  #[test]
  fn crc8_mixed_fixture_all_modes() {
    // poly=0x07 init=0xFF xorout=0 over bytes 1..=9
    let cases = [
      (false, false, 0x8A),
      (true, false, 0xD5),
      (false, true, 0x51),
      (true, true, 0xAB),
    ];
    for (refin, refout, expected) in cases {
      let crc = calculate_crc(&CRC8_FIXTURE, 8, 0x07, 0xFF, refin, refout, 0x00);
      assert_eq!(crc, expected, "refin={refin} refout={refout}");
    }
  }

  #[test]
  fn crc16_ccitt_params_in_every_mode() {
    let cases = [
      (false, false, 0x29B1),
      (true, false, 0x89F6),
      (false, true, 0x8D94),
      (true, true, 0x6F91),
    ];
    for (refin, refout, expected) in cases {
      let crc = calculate_crc(CHECK_INPUT, 16, 0x1021, 0xFFFF, refin, refout, 0);
      assert_eq!(crc, expected, "refin={refin} refout={refout}");
    }
  }

  // ─────────────────────────────────────────────────────────────────────────
  // Edge Cases
  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn empty_input_is_init_then_finalize() {
    assert_eq!(calculate_crc(&[], 16, 0x1021, 0x1234, false, false, 0x00FF), 0x12CB);
    // refout reflects init before the XOR.
    assert_eq!(calculate_crc(&[], 16, 0x1021, 0x1234, false, true, 0x00FF), 0x2CB7);
    assert_eq!(
      calculate_crc(&[], 32, 0x04C1_1DB7, 0x1234_5678, false, true, 0xFF),
      0x1E6A_2CB7
    );
    for entry in crate::catalog::ENTRIES {
      let p = &entry.params;
      let init = if p.refout() {
        reverse_bits(p.init(), p.width())
      } else {
        p.init()
      };
      assert_eq!(checksum(&[], p), (init ^ p.xorout()) & p.mask(), "{}", entry.name);
    }
  }

  #[test]
  fn over_wide_raw_values_are_masked() {
    let wide = calculate_crc(CHECK_INPUT, 8, 0xFF07, 0xAB00, false, false, 0x1_00);
    assert_eq!(wide, 0xF4);
  }

  #[test]
  #[should_panic(expected = "unsupported CRC width")]
  fn raw_engine_rejects_narrow_width() {
    let _ = calculate_crc(CHECK_INPUT, 4, 0x3, 0, false, false, 0);
  }

  #[test]
  fn result_never_exceeds_width() {
    let data: [u8; 256] = core::array::from_fn(|i| (i as u8).wrapping_mul(31));
    for width in (8..=64).step_by(8) {
      let p = CrcParams::new(width, u64::MAX, u64::MAX, true, false, u64::MAX).unwrap();
      assert_eq!(checksum(&data, &p) & !p.mask(), 0, "width {width}");
    }
  }

  // ─────────────────────────────────────────────────────────────────────────
  // Incremental API
  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn incremental_matches_oneshot() {
    let data = b"The quick brown fox jumps over the lazy dog";
    for entry in crate::catalog::ENTRIES {
      let p = &entry.params;
      let oneshot = checksum(data, p);
      for split in 0..=data.len() {
        let (a, b) = data.split_at(split);
        let crc = update(update(start(p), a, p), b, p);
        assert_eq!(finalize(crc, p), oneshot, "{} split {split}", entry.name);
      }
    }
  }

  #[test]
  fn parameter_path_matches_raw_path() {
    let data: [u8; 64] = core::array::from_fn(|i| (i as u8) ^ 0xA5);
    for entry in crate::catalog::ENTRIES {
      let p = &entry.params;
      let raw = calculate_crc(&data, p.width(), p.poly(), p.init(), p.refin(), p.refout(), p.xorout());
      assert_eq!(checksum(&data, p), raw, "{}", entry.name);
    }
  }
}
