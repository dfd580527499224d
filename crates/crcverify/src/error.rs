//! Error types for loading, generating and comparing test material.
//!
//! [`ConfigError`] and [`DataError`] describe what is wrong with one piece of
//! text; [`Error`] adds the file it came from and covers I/O.

use std::{fmt, io, path::PathBuf};

use crcmodel::CrcError;

/// A CRC configuration (JSON or Verilog header) was rejected.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigError {
  /// The document is not valid JSON for a configuration.
  Json(serde_json::Error),
  /// A required field is absent.
  MissingField {
    /// Canonical field name (`width`, `poly`, `init`, `refin`, `refout`, `xorout`, `rev`).
    field: &'static str,
  },
  /// A field is present but its value cannot be used.
  InvalidValue {
    field: &'static str,
    value: String,
  },
  /// `rev` disagrees with an explicit `refin`/`refout`.
  ConflictingReflection,
  /// The values parsed but do not form a valid parameter set.
  Rejected(CrcError),
}

impl ConfigError {
  /// Name of the offending field, if one can be named.
  #[must_use]
  pub fn field(&self) -> Option<&'static str> {
    match self {
      Self::Json(_) => None,
      Self::MissingField { field } | Self::InvalidValue { field, .. } => Some(*field),
      Self::ConflictingReflection => Some("rev"),
      Self::Rejected(err) => Some(err.field()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Json(err) => write!(f, "malformed configuration: {err}"),
      Self::MissingField { field } => write!(f, "missing field `{field}`"),
      Self::InvalidValue { field, value } => write!(f, "invalid value {value:?} for field `{field}`"),
      Self::ConflictingReflection => f.write_str("field `rev` conflicts with `refin`/`refout`"),
      Self::Rejected(err) => write!(f, "configuration rejected: {err}"),
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Json(err) => Some(err),
      Self::Rejected(err) => Some(err),
      _ => None,
    }
  }
}

impl From<CrcError> for ConfigError {
  fn from(err: CrcError) -> Self {
    Self::Rejected(err)
  }
}

/// A hex data file could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataError {
  /// A token is not one or two hex digits.
  InvalidToken {
    /// Zero-based position of the token in the byte stream.
    index: usize,
    token: String,
  },
  /// A length-prefixed file has no length line.
  MissingLength,
  /// The length line is not a decimal number.
  InvalidLength { line: String },
  /// A result file does not hold a hex checksum.
  InvalidChecksum { text: String },
}

impl fmt::Display for DataError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::InvalidToken { index, token } => {
        write!(f, "byte {index}: {token:?} is not a hex byte (00..FF)")
      }
      Self::MissingLength => f.write_str("missing length line"),
      Self::InvalidLength { line } => write!(f, "invalid length line {line:?}"),
      Self::InvalidChecksum { text } => write!(f, "invalid checksum {text:?}"),
    }
  }
}

impl std::error::Error for DataError {}

/// Any failure of a `crcverify` operation.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
  /// Reading or writing a file failed.
  Io {
    path: Option<PathBuf>,
    source: io::Error,
  },
  /// A configuration file was rejected.
  Config { path: PathBuf, source: ConfigError },
  /// A data file was rejected.
  Data { path: PathBuf, source: DataError },
  /// Serialising a manifest or report failed.
  Json(serde_json::Error),
  /// A CRC parameter set or table was rejected.
  Crc(CrcError),
  /// The worker pool could not be built.
  ThreadPool(rayon::ThreadPoolBuildError),
  /// Generator options are inconsistent.
  InvalidOptions(String),
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io {
      path: Some(path.into()),
      source,
    }
  }

  pub(crate) fn config(path: impl Into<PathBuf>, source: ConfigError) -> Self {
    Self::Config {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn data(path: impl Into<PathBuf>, source: DataError) -> Self {
    Self::Data {
      path: path.into(),
      source,
    }
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Io { path: Some(path), source } => write!(f, "{}: {source}", path.display()),
      Self::Io { path: None, source } => write!(f, "I/O error: {source}"),
      Self::Config { path, source } => write!(f, "{}: {source}", path.display()),
      Self::Data { path, source } => write!(f, "{}: {source}", path.display()),
      Self::Json(err) => write!(f, "JSON error: {err}"),
      Self::Crc(err) => write!(f, "{err}"),
      Self::ThreadPool(err) => write!(f, "cannot start worker pool: {err}"),
      Self::InvalidOptions(msg) => f.write_str(msg),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Config { source, .. } => Some(source),
      Self::Data { source, .. } => Some(source),
      Self::Json(err) => Some(err),
      Self::Crc(err) => Some(err),
      Self::ThreadPool(err) => Some(err),
      Self::InvalidOptions(_) => None,
    }
  }
}

impl From<io::Error> for Error {
  fn from(source: io::Error) -> Self {
    Self::Io { path: None, source }
  }
}

impl From<serde_json::Error> for Error {
  fn from(err: serde_json::Error) -> Self {
    Self::Json(err)
  }
}

impl From<CrcError> for Error {
  fn from(err: CrcError) -> Self {
    Self::Crc(err)
  }
}

impl From<rayon::ThreadPoolBuildError> for Error {
  fn from(err: rayon::ThreadPoolBuildError) -> Self {
    Self::ThreadPool(err)
  }
}
