//! Sarwate lookup table generation.
//!
//! A table holds one byte-wide step of the shift-register recurrence,
//! pre-computed for each of the 256 possible byte values. It is a pure
//! function of `(width, poly, refin)`:
//!
//! | `refin` | Seed for byte `n` | Round | Polynomial |
//! |---------|-------------------|-------|------------|
//! | `false` | `n << (width - 8)` | shift left, test top bit | `poly` |
//! | `true`  | `reverse(n, 8)` | shift right, test low bit | `reverse(poly, width)` |
//!
//! The two branches are mirror images: entry `n` of a reflected table is the
//! `width`-bit reflection of entry `n` of the normal table.

// SAFETY: All array indexing in this module uses bounded loop indices (0..256)
// or a `u8` index into a 256-entry array.
// Clippy cannot prove this in const fn contexts, but bounds are statically guaranteed.
#![allow(clippy::indexing_slicing)]

use core::{fmt, ops::Index};

use crate::{
  params::{CrcParams, TableKey},
  reflect::{reverse_bits, width_mask},
};

/// Entries per lookup table.
pub const TABLE_LEN: usize = 256;

// ─────────────────────────────────────────────────────────────────────────────
// Entry Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Table entry for byte `index`, register left-aligned (MSB-first).
#[must_use]
pub const fn table_entry_normal(width: u32, poly: u64, index: u8) -> u64 {
  let mask = width_mask(width);
  let top = 1u64 << (width - 1);
  let poly = poly & mask;

  let mut remain = (index as u64) << (width - 8);
  let mut i = 0;
  while i < 8 {
    remain = if remain & top != 0 {
      (remain << 1) ^ poly
    } else {
      remain << 1
    };
    remain &= mask;
    i += 1;
  }
  remain
}

/// Table entry for byte `index`, register reflected (LSB-first).
///
/// `poly` is the normal (MSB-first) polynomial; it is reflected here.
#[must_use]
pub const fn table_entry_reflected(width: u32, poly: u64, index: u8) -> u64 {
  let mask = width_mask(width);
  let poly = reverse_bits(poly, width);

  let mut remain = index.reverse_bits() as u64;
  let mut i = 0;
  while i < 8 {
    remain = if remain & 1 != 0 { (remain >> 1) ^ poly } else { remain >> 1 };
    remain &= mask;
    i += 1;
  }
  remain
}

/// Build a full 256-entry table from raw parameters.
///
/// # Panics
///
/// Panics (at compile time in const contexts) if `width` is below 8. Widths are
/// validated by [`CrcParams::new`]; prefer [`LookupTable::build`].
#[must_use]
pub const fn build_table(width: u32, poly: u64, refin: bool) -> [u64; TABLE_LEN] {
  let mut table = [0u64; TABLE_LEN];
  let mut n = 0usize;
  while n < TABLE_LEN {
    table[n] = if refin {
      table_entry_reflected(width, poly, n as u8)
    } else {
      table_entry_normal(width, poly, n as u8)
    };
    n += 1;
  }
  table
}

// ─────────────────────────────────────────────────────────────────────────────
// LookupTable
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable lookup table tagged with the parameters it was built from.
///
/// The tag lets [`TableEngine`](crate::TableEngine) refuse a table built for a
/// different `(width, poly, refin)` instead of silently computing garbage.
///
/// # Examples
///
/// ```
/// use crcmodel::{CrcParams, LookupTable};
///
/// let table = LookupTable::build(&CrcParams::CRC_32_ISO_HDLC);
/// assert_eq!(table[1], 0xEDB8_8320);
/// assert_eq!(table.entries().len(), 256);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LookupTable {
  key: TableKey,
  entries: [u64; TABLE_LEN],
}

impl LookupTable {
  /// Build the table for `params`.
  ///
  /// Only `width`, `poly` and `refin` are consulted.
  #[must_use]
  pub const fn build(params: &CrcParams) -> Self {
    Self {
      key: params.table_key(),
      entries: build_table(params.width(), params.poly(), params.refin()),
    }
  }

  /// The `(width, poly, refin)` this table was built from.
  #[inline]
  #[must_use]
  pub const fn key(&self) -> TableKey {
    self.key
  }

  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.key.width()
  }

  /// All 256 entries, indexed by byte value.
  #[inline]
  #[must_use]
  pub const fn entries(&self) -> &[u64; TABLE_LEN] {
    &self.entries
  }

  /// Entry for `byte`.
  #[inline]
  #[must_use]
  pub const fn entry(&self, byte: u8) -> u64 {
    self.entries[byte as usize]
  }

  /// Iterate over the entries in byte order.
  #[inline]
  pub fn iter(&self) -> core::slice::Iter<'_, u64> {
    self.entries.iter()
  }

  /// Whether this table can serve `params`.
  #[inline]
  #[must_use]
  pub fn serves(&self, params: &CrcParams) -> bool {
    self.key == params.table_key()
  }
}

impl Index<u8> for LookupTable {
  type Output = u64;

  #[inline]
  fn index(&self, byte: u8) -> &u64 {
    &self.entries[byte as usize]
  }
}

impl<'a> IntoIterator for &'a LookupTable {
  type Item = &'a u64;
  type IntoIter = core::slice::Iter<'a, u64>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl fmt::Debug for LookupTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LookupTable")
      .field("key", &self.key)
      .field("entries", &TABLE_LEN)
      .finish()
  }
}
