//! Parameterised CRC model with a cross-checked table engine.
//!
//! Any CRC from the Rocksoft family with a register width that is a multiple
//! of 8 in `8..=64` is described by one [`CrcParams`]. Two engines compute it:
//!
//! | Engine | Module | Work per byte | Role |
//! |--------|--------|---------------|------|
//! | Reference | [`reference`] | 8 shift/test/XOR steps | Ground truth |
//! | Table | [`engine`] | 1 lookup in a [`LookupTable`] | Accelerated path |
//!
//! Both engines agree bit for bit for every parameter set and every input,
//! including all four `refin`/`refout` combinations.
//!
//! # Example
//!
//! ```rust
//! use crcmodel::{CrcParams, build_table, reference_checksum, table_checksum};
//!
//! let params = CrcParams::new(16, 0x1021, 0xFFFF, false, false, 0x0000)?;
//! let table = build_table(&params);
//!
//! let slow = reference_checksum(b"123456789", &params);
//! let fast = table_checksum(b"123456789", &params, &table)?;
//! assert_eq!(slow, 0x29B1);
//! assert_eq!(slow, fast);
//! assert_eq!(params.format_checksum(fast).to_string(), "29B1");
//! # Ok::<(), crcmodel::CrcError>(())
//! ```
//!
//! # Sharing Tables
//!
//! A table depends only on `(width, poly, refin)`. With the `std` feature,
//! [`TableCache`] builds each table at most once and hands out shared,
//! immutable copies to any number of threads.
//!
//! # no_std Support
//!
//! Everything except [`TableCache`] works without `std`:
//!
//! ```toml
//! [dependencies]
//! crcmodel = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]

#[cfg(feature = "std")]
pub mod cache;
pub mod catalog;
pub mod engine;
mod error;
pub mod params;
mod proptests;
pub mod reference;
pub mod reflect;
pub mod table;

#[cfg(feature = "std")]
pub use cache::TableCache;
pub use engine::TableEngine;
pub use error::CrcError;
pub use params::{CHECK_INPUT, CrcParams, CrcParamsBuilder, FormattedChecksum, ReflectionMode, TableKey};
pub use table::LookupTable;

/// A `width`-bit checksum, right-aligned in a `u64`.
pub type Checksum = u64;

/// Bitwise reference checksum of `data`.
///
/// This is the definition every other path is checked against.
#[inline]
#[must_use]
pub const fn reference_checksum(data: &[u8], params: &CrcParams) -> Checksum {
  reference::checksum(data, params)
}

/// Table-driven checksum of `data`.
///
/// # Errors
///
/// Returns [`CrcError::TableMismatch`] if `table` was not built from the same
/// `(width, poly, refin)` as `params`.
#[inline]
pub fn table_checksum(data: &[u8], params: &CrcParams, table: &LookupTable) -> Result<Checksum, CrcError> {
  Ok(TableEngine::new(*params, table)?.checksum(data))
}

/// Build the lookup table for `params`.
#[inline]
#[must_use]
pub const fn build_table(params: &CrcParams) -> LookupTable {
  LookupTable::build(params)
}
