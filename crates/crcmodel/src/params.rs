//! CRC algorithm parameters.
//!
//! This module defines the validated parameter set that drives both engines,
//! following the conventions of the
//! [CRC Catalogue](https://reveng.sourceforge.io/crc-catalogue/) (Rocksoft model).
//!
//! | Parameter | Description |
//! |-----------|-------------|
//! | `width`   | Register width in bits (multiple of 8, `8..=64`) |
//! | `poly`    | Generator polynomial, MSB-first, implicit top bit |
//! | `init`    | Initial register value |
//! | `refin`   | Reflect each input byte before shifting it in |
//! | `refout`  | Reflect the final register before the XOR-out |
//! | `xorout`  | Final XOR value |
//!
//! `poly`, `init` and `xorout` are masked to `width` bits on construction, so no
//! value held by a [`CrcParams`] carries bits above position `width - 1`.

use core::fmt;

use crate::{
  error::CrcError,
  reflect::{reverse_bits, width_mask},
};

/// Smallest supported register width.
pub const MIN_WIDTH: u32 = 8;

/// Largest supported register width (one `u64` register).
pub const MAX_WIDTH: u32 = 64;

/// Standard check input from the CRC catalogue.
pub const CHECK_INPUT: &[u8] = b"123456789";

/// Returns `true` when `width` can be held by the model.
#[inline]
#[must_use]
pub const fn is_supported_width(width: u32) -> bool {
  width >= MIN_WIDTH && width <= MAX_WIDTH && width % 8 == 0
}

/// Validated, normalised description of one CRC variant.
///
/// Construct with [`CrcParams::new`] or [`CrcParams::builder`]; both reject
/// unsupported widths and mask every value to the register width.
///
/// # Examples
///
/// ```
/// use crcmodel::CrcParams;
///
/// // The implicit top bit (and anything above it) is dropped.
/// let p = CrcParams::new(16, 0x1_1021, 0xFFFF, false, false, 0).unwrap();
/// assert_eq!(p.poly(), 0x1021);
/// assert_eq!(p.check(), 0x29B1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CrcParams {
  width: u32,
  poly: u64,
  init: u64,
  refin: bool,
  refout: bool,
  xorout: u64,
}

impl CrcParams {
  /// Validate and normalise a parameter set.
  ///
  /// # Errors
  ///
  /// Returns [`CrcError::InvalidWidth`] when `width` is not a multiple of 8 in
  /// `8..=64`. Over-wide `poly`/`init`/`xorout` values are not an error; their
  /// high bits are discarded.
  pub const fn new(width: u32, poly: u64, init: u64, refin: bool, refout: bool, xorout: u64) -> Result<Self, CrcError> {
    if !is_supported_width(width) {
      return Err(CrcError::InvalidWidth { width });
    }
    let mask = width_mask(width);
    Ok(Self {
      width,
      poly: poly & mask,
      init: init & mask,
      refin,
      refout,
      xorout: xorout & mask,
    })
  }

  /// Compile-time constructor for the catalogue constants.
  pub(crate) const fn known(width: u32, poly: u64, init: u64, refin: bool, refout: bool, xorout: u64) -> Self {
    match Self::new(width, poly, init, refin, refout, xorout) {
      Ok(params) => params,
      Err(_) => panic!("catalogue entry has an unsupported width"),
    }
  }

  /// Start a builder for a `width`-bit CRC (all other fields zero/false).
  #[inline]
  #[must_use]
  pub const fn builder(width: u32) -> CrcParamsBuilder {
    CrcParamsBuilder {
      width,
      poly: 0,
      init: 0,
      refin: false,
      refout: false,
      xorout: 0,
    }
  }

  /// Register width in bits.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// Generator polynomial (MSB-first, without the implicit top bit).
  #[inline]
  #[must_use]
  pub const fn poly(&self) -> u64 {
    self.poly
  }

  /// Initial register value.
  #[inline]
  #[must_use]
  pub const fn init(&self) -> u64 {
    self.init
  }

  /// Whether input bytes are reflected.
  #[inline]
  #[must_use]
  pub const fn refin(&self) -> bool {
    self.refin
  }

  /// Whether the final register is reflected before the XOR-out.
  #[inline]
  #[must_use]
  pub const fn refout(&self) -> bool {
    self.refout
  }

  /// Final XOR value.
  #[inline]
  #[must_use]
  pub const fn xorout(&self) -> u64 {
    self.xorout
  }

  /// Mask covering the register width.
  #[inline]
  #[must_use]
  pub const fn mask(&self) -> u64 {
    width_mask(self.width)
  }

  /// The register's most significant bit.
  #[inline]
  #[must_use]
  pub const fn top_bit(&self) -> u64 {
    1u64 << (self.width - 1)
  }

  /// Polynomial with its `width` bits reversed (LSB-first form).
  #[inline]
  #[must_use]
  pub const fn poly_reflected(&self) -> u64 {
    reverse_bits(self.poly, self.width)
  }

  /// The fields a lookup table depends on.
  #[inline]
  #[must_use]
  pub const fn table_key(&self) -> TableKey {
    TableKey {
      width: self.width,
      poly: self.poly,
      refin: self.refin,
    }
  }

  /// Named combination of `refin`/`refout`.
  #[inline]
  #[must_use]
  pub const fn reflection_mode(&self) -> ReflectionMode {
    ReflectionMode::from_flags(self.refin, self.refout)
  }

  /// Reference checksum of the catalogue check input `"123456789"`.
  #[inline]
  #[must_use]
  pub const fn check(&self) -> u64 {
    crate::reference::checksum(CHECK_INPUT, self)
  }

  /// Number of hex digits needed for a checksum: `ceil(width / 4)`.
  #[inline]
  #[must_use]
  pub const fn hex_digits(&self) -> usize {
    self.width.div_ceil(4) as usize
  }

  /// Render `value` as uppercase hex, zero-padded to [`hex_digits`](Self::hex_digits).
  ///
  /// ```
  /// use crcmodel::CrcParams;
  ///
  /// let p = CrcParams::CRC_16_IBM_3740;
  /// assert_eq!(p.format_checksum(0x0A).to_string(), "000A");
  /// ```
  #[inline]
  #[must_use]
  pub const fn format_checksum(&self, value: u64) -> FormattedChecksum {
    FormattedChecksum {
      value: value & self.mask(),
      digits: self.hex_digits(),
    }
  }
}

impl fmt::Display for CrcParams {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let digits = self.hex_digits();
    write!(
      f,
      "width={} poly=0x{:0digits$X} init=0x{:0digits$X} refin={} refout={} xorout=0x{:0digits$X}",
      self.width, self.poly, self.init, self.refin, self.refout, self.xorout
    )
  }
}

/// Builder for [`CrcParams`] with named setters.
///
/// ```
/// use crcmodel::{CrcParams, ReflectionMode};
///
/// let p = CrcParams::builder(32)
///   .poly(0x04C1_1DB7)
///   .init(0xFFFF_FFFF)
///   .mode(ReflectionMode::Reflect)
///   .xorout(0xFFFF_FFFF)
///   .build()
///   .unwrap();
/// assert_eq!(p, CrcParams::CRC_32_ISO_HDLC);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct CrcParamsBuilder {
  width: u32,
  poly: u64,
  init: u64,
  refin: bool,
  refout: bool,
  xorout: u64,
}

impl CrcParamsBuilder {
  /// Set the generator polynomial.
  pub const fn poly(mut self, poly: u64) -> Self {
    self.poly = poly;
    self
  }

  /// Set the initial register value.
  pub const fn init(mut self, init: u64) -> Self {
    self.init = init;
    self
  }

  /// Set input reflection.
  pub const fn refin(mut self, refin: bool) -> Self {
    self.refin = refin;
    self
  }

  /// Set output reflection.
  pub const fn refout(mut self, refout: bool) -> Self {
    self.refout = refout;
    self
  }

  /// Set both reflections at once (the single `rev` flag of software configs).
  pub const fn reflect(mut self, rev: bool) -> Self {
    self.refin = rev;
    self.refout = rev;
    self
  }

  /// Set both reflections from a named mode.
  pub const fn mode(mut self, mode: ReflectionMode) -> Self {
    let (refin, refout) = mode.flags();
    self.refin = refin;
    self.refout = refout;
    self
  }

  /// Set the final XOR value.
  pub const fn xorout(mut self, xorout: u64) -> Self {
    self.xorout = xorout;
    self
  }

  /// Validate and normalise.
  ///
  /// # Errors
  ///
  /// Same as [`CrcParams::new`].
  pub const fn build(self) -> Result<CrcParams, CrcError> {
    CrcParams::new(self.width, self.poly, self.init, self.refin, self.refout, self.xorout)
  }
}

/// Identity of a lookup table: the only parameters a table depends on.
///
/// Two tables with equal keys are identical, so a key is what a
/// [`TableCache`](crate::cache::TableCache) indexes by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey {
  width: u32,
  poly: u64,
  refin: bool,
}

impl TableKey {
  /// Register width in bits.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// Generator polynomial (MSB-first, masked).
  #[inline]
  #[must_use]
  pub const fn poly(&self) -> u64 {
    self.poly
  }

  /// Whether the table walks the register LSB-first.
  #[inline]
  #[must_use]
  pub const fn refin(&self) -> bool {
    self.refin
  }
}

impl fmt::Display for TableKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let digits = self.width.div_ceil(4) as usize;
    write!(f, "width={} poly=0x{:0digits$X} refin={}", self.width, self.poly, self.refin)
  }
}

/// The four `refin`/`refout` combinations, as named by hardware test plans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReflectionMode {
  /// `refin = false`, `refout = false`.
  Standard,
  /// `refin = true`, `refout = false`.
  MixedOne,
  /// `refin = false`, `refout = true`.
  MixedTwo,
  /// `refin = true`, `refout = true`.
  Reflect,
}

impl ReflectionMode {
  /// All modes, in test-plan order.
  pub const ALL: [Self; 4] = [Self::Standard, Self::MixedOne, Self::MixedTwo, Self::Reflect];

  /// Mode for a `(refin, refout)` pair.
  #[inline]
  #[must_use]
  pub const fn from_flags(refin: bool, refout: bool) -> Self {
    match (refin, refout) {
      (false, false) => Self::Standard,
      (true, false) => Self::MixedOne,
      (false, true) => Self::MixedTwo,
      (true, true) => Self::Reflect,
    }
  }

  /// `(refin, refout)` for this mode.
  #[inline]
  #[must_use]
  pub const fn flags(self) -> (bool, bool) {
    match self {
      Self::Standard => (false, false),
      Self::MixedOne => (true, false),
      Self::MixedTwo => (false, true),
      Self::Reflect => (true, true),
    }
  }

  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Standard => "standard",
      Self::MixedOne => "mixed_one",
      Self::MixedTwo => "mixed_two",
      Self::Reflect => "reflect",
    }
  }

  #[must_use]
  pub fn parse(s: &str) -> Option<Self> {
    let s = s.trim();
    Self::ALL.into_iter().find(|mode| {
      let name = mode.as_str();
      s.len() == name.len()
        && s
          .bytes()
          .zip(name.bytes())
          .all(|(a, b)| a.to_ascii_lowercase() == b || (a == b'-' && b == b'_'))
    })
  }
}

impl fmt::Display for ReflectionMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A checksum rendered as zero-padded uppercase hex.
///
/// Returned by [`CrcParams::format_checksum`]; implements [`fmt::Display`]
/// so formatting needs no allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormattedChecksum {
  value: u64,
  digits: usize,
}

impl fmt::Display for FormattedChecksum {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:0width$X}", self.value, width = self.digits)
  }
}
