//! Table-driven engine: one lookup per input byte.
//!
//! The register is carried in the same orientation as the table it walks:
//!
//! - `refin = false`: MSB-first, exactly the reference register. The top byte
//!   of the register is XORed with the input byte to pick an entry, and the
//!   register shifts left by 8.
//! - `refin = true`: LSB-first, the `width`-bit reflection of the reference
//!   register. The low byte plays the role of the top byte, so the index is
//!   the 8-bit reflection of `register ^ byte` and the register shifts right
//!   by 8.
//!
//! On entry a reflected walk reflects `init`; on exit the register is
//! reflected back exactly when `refin != refout`. The result is bit-identical
//! to [`crate::reference`] for every parameter set and every input.

// SAFETY: Table indices are `u8` values into a 256-entry array.
#![allow(clippy::indexing_slicing)]

use crate::{
  error::CrcError,
  params::CrcParams,
  reflect::{reverse_bits, width_mask},
  table::{LookupTable, TABLE_LEN},
};

// ─────────────────────────────────────────────────────────────────────────────
// Raw Walk
// ─────────────────────────────────────────────────────────────────────────────

/// Fold `data` into a register that is already in table orientation.
#[inline]
fn walk(mut crc: u64, data: &[u8], table: &[u64; TABLE_LEN], width: u32, refin: bool) -> u64 {
  if refin {
    for &byte in data {
      let index = ((crc ^ u64::from(byte)) as u8).reverse_bits();
      crc = (crc >> 8) ^ table[index as usize];
    }
  } else {
    let mask = width_mask(width);
    let shift = width - 8;
    for &byte in data {
      let index = ((crc >> shift) as u8) ^ byte;
      crc = ((crc << 8) & mask) ^ table[index as usize];
    }
  }
  crc
}

/// Table-driven CRC from raw parameters.
///
/// `table` must come from [`build_table`](crate::table::build_table) with the
/// same `width`, the polynomial of the CRC being computed, and the same
/// `refin`. The raw form cannot check that; [`TableEngine`] can.
///
/// # Panics
///
/// Panics if `width` is below 8.
///
/// # Examples
///
/// ```
/// use crcmodel::{engine::table_crc, table::build_table};
///
/// let table = build_table(32, 0x04C1_1DB7, true);
/// let crc = table_crc(b"123456789", &table, 32, 0xFFFF_FFFF, 0xFFFF_FFFF, true, true);
/// assert_eq!(crc, 0xCBF4_3926);
/// ```
#[must_use]
pub fn table_crc(
  data: &[u8],
  table: &[u64; TABLE_LEN],
  width: u32,
  init: u64,
  xorout: u64,
  refin: bool,
  refout: bool,
) -> u64 {
  let mask = width_mask(width);
  let seed = if refin {
    reverse_bits(init & mask, width)
  } else {
    init & mask
  };
  let crc = walk(seed, data, table, width, refin);
  let crc = if refin != refout { reverse_bits(crc, width) } else { crc };
  (crc ^ xorout) & mask
}

// ─────────────────────────────────────────────────────────────────────────────
// TableEngine
// ─────────────────────────────────────────────────────────────────────────────

/// A parameter set bound to a lookup table that was verified to match it.
///
/// The engine borrows the table, so one table (for example out of a
/// [`TableCache`](crate::TableCache)) can back many engines that differ only
/// in `init`, `refout` or `xorout`.
///
/// # Examples
///
/// ```
/// use crcmodel::{CrcParams, LookupTable, TableEngine};
///
/// let params = CrcParams::CRC_16_KERMIT;
/// let table = LookupTable::build(&params);
/// let engine = TableEngine::new(params, &table)?;
///
/// let mut crc = engine.start();
/// crc = engine.update(crc, b"1234");
/// crc = engine.update(crc, b"56789");
/// assert_eq!(engine.finalize(crc), 0x2189);
/// # Ok::<(), crcmodel::CrcError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TableEngine<'t> {
  params: CrcParams,
  table: &'t LookupTable,
}

impl<'t> TableEngine<'t> {
  /// Bind `params` to `table`.
  ///
  /// # Errors
  ///
  /// Returns [`CrcError::TableMismatch`] if `table` was built for a different
  /// `(width, poly, refin)`.
  pub fn new(params: CrcParams, table: &'t LookupTable) -> Result<Self, CrcError> {
    if !table.serves(&params) {
      return Err(CrcError::TableMismatch {
        expected: params.table_key(),
        found: table.key(),
      });
    }
    Ok(Self { params, table })
  }

  /// Parameters this engine was built for.
  #[inline]
  #[must_use]
  pub const fn params(&self) -> &CrcParams {
    &self.params
  }

  /// The borrowed lookup table, shareable with any parameter set of the same key.
  #[inline]
  #[must_use]
  pub const fn table(&self) -> &'t LookupTable {
    self.table
  }

  /// Register before any data, in table orientation.
  #[inline]
  #[must_use]
  pub const fn start(&self) -> u64 {
    let p = &self.params;
    if p.refin() {
      reverse_bits(p.init(), p.width())
    } else {
      p.init()
    }
  }

  /// Fold `data` into a register returned by [`start`](Self::start) or a
  /// previous `update`.
  #[inline]
  #[must_use]
  pub fn update(&self, crc: u64, data: &[u8]) -> u64 {
    walk(crc, data, self.table.entries(), self.params.width(), self.params.refin())
  }

  /// Turn a register into the reported checksum.
  #[inline]
  #[must_use]
  pub const fn finalize(&self, crc: u64) -> u64 {
    let p = &self.params;
    let crc = if p.refin() != p.refout() {
      reverse_bits(crc, p.width())
    } else {
      crc
    };
    (crc ^ p.xorout()) & p.mask()
  }

  /// One-shot checksum of `data`.
  #[inline]
  #[must_use]
  pub fn checksum(&self, data: &[u8]) -> u64 {
    self.finalize(self.update(self.start(), data))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{CHECK_INPUT, ReflectionMode, catalog, reference, table::build_table};

  fn engine_checksum(data: &[u8], params: &CrcParams) -> u64 {
    let table = LookupTable::build(params);
    TableEngine::new(*params, &table).unwrap().checksum(data)
  }

  // ─────────────────────────────────────────────────────────────────────────
  // Known Vectors
  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn catalogue_check_values() {
    for entry in catalog::ENTRIES {
      assert_eq!(engine_checksum(CHECK_INPUT, &entry.params), entry.check, "{}", entry.name);
    }
  }

  #[test]
  fn raw_walk_crc32() {
    let table = build_table(32, 0x04C1_1DB7, true);
    assert_eq!(
      table_crc(b"hello", &table, 32, 0xFFFF_FFFF, 0xFFFF_FFFF, true, true),
      0x3610_A686
    );
  }

  #[test]
  fn mixed_reflection_crc8_fixture() {
    // Reflected input with unreflected output: the register must be turned back
    // to MSB-first before the XOR-out.
    let data = [1u8, 2, 3, 4, 5, 6, 7, 8, 9];
    let cases = [
      (false, false, 0x8A),
      (true, false, 0xD5),
      (false, true, 0x51),
      (true, true, 0xAB),
    ];
    for (refin, refout, expected) in cases {
      let table = build_table(8, 0x07, refin);
      assert_eq!(
        table_crc(&data, &table, 8, 0xFF, 0x00, refin, refout),
        expected,
        "refin={refin} refout={refout}"
      );
    }
  }

  #[test]
  fn crc32_params_in_every_mode() {
    let cases = [
      (false, false, 0xFC89_1918),
      (true, false, 0x649C_2FD3),
      (false, true, 0x1898_913F),
      (true, true, 0xCBF4_3926),
    ];
    for (refin, refout, expected) in cases {
      let p = CrcParams::new(32, 0x04C1_1DB7, 0xFFFF_FFFF, refin, refout, 0xFFFF_FFFF).unwrap();
      assert_eq!(engine_checksum(CHECK_INPUT, &p), expected, "{}", p.reflection_mode());
    }
  }

  // ─────────────────────────────────────────────────────────────────────────
  // Agreement With The Reference
  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn matches_reference_across_widths_and_modes() {
    let data: [u8; 97] = core::array::from_fn(|i| (i as u8).wrapping_mul(0x9D).wrapping_add(0x3B));
    let polys = [0x07u64, 0x1021, 0x8005, 0x04C1_1DB7, 0x42F0_E1EB_A9EA_3693];
    for width in (8..=64).step_by(8) {
      for poly in polys {
        for mode in ReflectionMode::ALL {
          let (refin, refout) = mode.flags();
          let p = CrcParams::new(width, poly, 0x5A5A_5A5A_5A5A_5A5A, refin, refout, 0x0F0F).unwrap();
          for len in [0, 1, 2, 7, 8, 9, 63, 97] {
            let msg = &data[..len];
            assert_eq!(
              engine_checksum(msg, &p),
              reference::checksum(msg, &p),
              "{p} len {len}"
            );
          }
        }
      }
    }
  }

  #[test]
  fn empty_input_matches_reference() {
    let p = CrcParams::new(32, 0x04C1_1DB7, 0x1234_5678, false, true, 0xFF).unwrap();
    assert_eq!(engine_checksum(&[], &p), 0x1E6A_2CB7);
    for entry in catalog::ENTRIES {
      assert_eq!(
        engine_checksum(&[], &entry.params),
        reference::checksum(&[], &entry.params),
        "{}",
        entry.name
      );
    }
  }

  #[test]
  fn incremental_matches_oneshot() {
    let data = b"incremental updates must not depend on where the message is split";
    for entry in catalog::ENTRIES {
      let table = LookupTable::build(&entry.params);
      let engine = TableEngine::new(entry.params, &table).unwrap();
      let oneshot = engine.checksum(data);
      for split in [0, 1, 5, 16, 31, data.len()] {
        let (a, b) = data.split_at(split);
        let crc = engine.update(engine.update(engine.start(), a), b);
        assert_eq!(engine.finalize(crc), oneshot, "{} split {split}", entry.name);
      }
    }
  }

  // ─────────────────────────────────────────────────────────────────────────
  // Table Binding
  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn rejects_mismatched_table() {
    let table = LookupTable::build(&CrcParams::CRC_16_KERMIT);
    let err = TableEngine::new(CrcParams::CRC_16_IBM_3740, &table).unwrap_err();
    assert_eq!(
      err,
      CrcError::TableMismatch {
        expected: CrcParams::CRC_16_IBM_3740.table_key(),
        found: CrcParams::CRC_16_KERMIT.table_key(),
      }
    );
  }

  #[test]
  fn one_table_serves_many_parameter_sets() {
    // ARC and MODBUS-style init share (width, poly, refin).
    let arc = CrcParams::CRC_16_ARC;
    let modbus = CrcParams::new(16, 0x8005, 0xFFFF, true, true, 0).unwrap();
    let table = LookupTable::build(&arc);
    assert_eq!(TableEngine::new(arc, &table).unwrap().checksum(CHECK_INPUT), 0xBB3D);
    assert_eq!(TableEngine::new(modbus, &table).unwrap().checksum(CHECK_INPUT), 0x4B37);

    let engine = TableEngine::new(modbus, &table).unwrap();
    assert_eq!(*engine.params(), modbus);
    assert!(core::ptr::eq(engine.table(), &table));
    assert_eq!(engine.table().key(), modbus.table_key());
  }
}
