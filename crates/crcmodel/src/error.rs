//! Error types for CRC model construction.
//!
//! The engines themselves never fail: every check happens once, when a
//! [`CrcParams`](crate::CrcParams) is built or when a lookup table is bound to
//! a parameter set.

use core::fmt;

use crate::params::{MAX_WIDTH, MIN_WIDTH, TableKey};

/// Rejected CRC configuration.
///
/// # Examples
///
/// ```
/// use crcmodel::{CrcError, CrcParams};
///
/// let err = CrcParams::new(12, 0x80F, 0, false, false, 0).unwrap_err();
/// assert_eq!(err, CrcError::InvalidWidth { width: 12 });
/// assert_eq!(err.field(), "width");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CrcError {
  /// The register width is not a multiple of 8 in `8..=64`.
  InvalidWidth {
    /// The rejected width.
    width: u32,
  },
  /// A lookup table was paired with parameters it was not built from.
  TableMismatch {
    /// Key derived from the parameter set.
    expected: TableKey,
    /// Key the table was built with.
    found: TableKey,
  },
}

impl CrcError {
  /// Name of the configuration field that was rejected.
  #[inline]
  #[must_use]
  pub const fn field(&self) -> &'static str {
    match self {
      Self::InvalidWidth { .. } => "width",
      Self::TableMismatch { .. } => "table",
    }
  }
}

impl fmt::Display for CrcError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::InvalidWidth { width } => write!(
        f,
        "invalid CRC width {width}: expected a multiple of 8 in {MIN_WIDTH}..={MAX_WIDTH}"
      ),
      Self::TableMismatch { expected, found } => {
        write!(f, "lookup table built for {found} cannot serve {expected}")
      }
    }
  }
}

impl core::error::Error for CrcError {}
