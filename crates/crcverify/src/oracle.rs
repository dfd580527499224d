//! Independent CRC computation via the `crc` crate.
//!
//! Batch validation checks each case three ways: the reference engine, the
//! table engine, and this oracle, which shares no code with `crcmodel`.
//!
//! `crc` only accepts `'static` algorithms. Each distinct parameter set is
//! built once, leaked, and interned for the life of the process; a batch
//! touches a handful of configurations, so the leak is bounded by the number
//! of configurations ever validated.

use std::{
  collections::HashMap,
  sync::{Mutex, OnceLock, PoisonError},
};

use crc::{Algorithm, Crc};
use crcmodel::CrcParams;

type Interned = HashMap<CrcParams, &'static Crc<u64>>;

fn interned() -> &'static Mutex<Interned> {
  static ORACLES: OnceLock<Mutex<Interned>> = OnceLock::new();
  ORACLES.get_or_init(Mutex::default)
}

/// The `crc` instance for `params`, built on first use.
#[must_use]
pub fn oracle(params: &CrcParams) -> &'static Crc<u64> {
  let mut oracles = interned().lock().unwrap_or_else(PoisonError::into_inner);
  *oracles.entry(*params).or_insert_with(|| {
    let algorithm: &'static Algorithm<u64> = Box::leak(Box::new(Algorithm {
      // Widths are 8..=64, validated by `CrcParams`.
      width: params.width() as u8,
      poly: params.poly(),
      init: params.init(),
      refin: params.refin(),
      refout: params.refout(),
      xorout: params.xorout(),
      check: 0,
      residue: 0,
    }));
    Box::leak(Box::new(Crc::<u64>::new(algorithm)))
  })
}

/// Checksum of `data` as computed by the `crc` crate.
///
/// ```
/// use crcmodel::CrcParams;
/// use crcverify::oracle::oracle_checksum;
///
/// assert_eq!(oracle_checksum(b"123456789", &CrcParams::CRC_32_ISO_HDLC), 0xCBF4_3926);
/// ```
#[must_use]
pub fn oracle_checksum(data: &[u8], params: &CrcParams) -> u64 {
  oracle(params).checksum(data)
}

#[cfg(test)]
mod tests {
  use crcmodel::{CHECK_INPUT, ReflectionMode, catalog, reference_checksum};

  use super::*;

  #[test]
  fn catalogue_check_values() {
    for entry in catalog::ENTRIES {
      assert_eq!(
        oracle_checksum(CHECK_INPUT, &entry.params),
        entry.check,
        "{}",
        entry.name
      );
    }
  }

  #[test]
  fn every_reflection_mode() {
    let expected = [0x29B1, 0x89F6, 0x8D94, 0x6F91];
    for (mode, want) in ReflectionMode::ALL.into_iter().zip(expected) {
      let p = CrcParams::builder(16).poly(0x1021).init(0xFFFF).mode(mode).build().unwrap();
      assert_eq!(oracle_checksum(CHECK_INPUT, &p), want, "{mode}");
    }
  }

  #[test]
  fn agrees_with_reference_on_every_width() {
    let data: Vec<u8> = (0..200u32).map(|i| (i * 31 + 7) as u8).collect();
    for width in (8..=64).step_by(8) {
      for mode in ReflectionMode::ALL {
        let p = CrcParams::builder(width)
          .poly(0x1DB7_1021_A5A5_C96B)
          .init(0x0123_4567_89AB_CDEF)
          .mode(mode)
          .xorout(0xF0F0_0F0F_F0F0_0F0F)
          .build()
          .unwrap();
        for len in [0, 1, 7, 200] {
          assert_eq!(
            oracle_checksum(&data[..len], &p),
            reference_checksum(&data[..len], &p),
            "{p} len {len}"
          );
        }
      }
    }
  }

  #[test]
  fn instances_are_interned() {
    let p = CrcParams::CRC_16_KERMIT;
    assert!(std::ptr::eq(oracle(&p), oracle(&p)));
    assert!(!std::ptr::eq(oracle(&p), oracle(&CrcParams::CRC_16_XMODEM)));
  }
}
