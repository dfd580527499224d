//! Hex test-vector files and their names.
//!
//! Three text formats live on disk:
//!
//! - software vectors: `test_data_c<config>_t<test>.dat`, one line of
//!   space-separated hex bytes (`"01 A2 FF"`)
//! - RTL inputs: `test_data_c<config>_t<test>_input.dat`, a decimal length line
//!   followed by the hex bytes
//! - RTL outputs: `test_data_c<config>_t<test>_output.dat`, one hex checksum
//!   without prefix, as simulators print it

use std::{collections::BTreeMap, fmt, fs, path::Path};

use log::{debug, warn};
use serde::Serialize;

use crate::error::{DataError, Error};

// ─────────────────────────────────────────────────────────────────────────────
// Hex Bytes
// ─────────────────────────────────────────────────────────────────────────────

/// Decode whitespace-separated hex tokens of one or two digits each.
///
/// # Errors
///
/// [`DataError::InvalidToken`] for the first token that is not a byte.
///
/// ```
/// use crcverify::data::parse_hex_bytes;
///
/// assert_eq!(parse_hex_bytes("01 a2\nFF 7").unwrap(), [0x01, 0xA2, 0xFF, 0x07]);
/// assert!(parse_hex_bytes("01 100").is_err());
/// ```
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, DataError> {
  text
    .split_whitespace()
    .enumerate()
    .map(|(index, token)| {
      let valid = (1..=2).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_hexdigit());
      let byte = if valid { u8::from_str_radix(token, 16).ok() } else { None };
      byte.ok_or_else(|| DataError::InvalidToken {
        index,
        token: token.to_string(),
      })
    })
    .collect()
}

/// Encode bytes as uppercase two-digit tokens separated by single spaces.
#[must_use]
pub fn encode_hex_bytes(data: &[u8]) -> String {
  use fmt::Write as _;

  let mut out = String::with_capacity(data.len() * 3);
  for (i, b) in data.iter().enumerate() {
    if i > 0 {
      out.push(' ');
    }
    let _ = write!(out, "{b:02X}");
  }
  out
}

// ─────────────────────────────────────────────────────────────────────────────
// RTL Files
// ─────────────────────────────────────────────────────────────────────────────

/// A length-prefixed RTL input vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtlInput {
  /// Length from the first line. Testbenches size their buffers from it.
  pub declared_len: usize,
  pub data: Vec<u8>,
}

impl RtlInput {
  #[must_use]
  pub fn new(data: Vec<u8>) -> Self {
    Self {
      declared_len: data.len(),
      data,
    }
  }

  /// Parse `"<len>\n<hex bytes>"`.
  ///
  /// The hex bytes may span several lines. A declared length that differs
  /// from the number of decoded bytes is accepted; see
  /// [`length_matches`](Self::length_matches).
  ///
  /// # Errors
  ///
  /// A missing or non-decimal length line, or an invalid hex token.
  pub fn parse(text: &str) -> Result<Self, DataError> {
    let text = text.trim_start();
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    let first = first.trim();
    if first.is_empty() {
      return Err(DataError::MissingLength);
    }
    let declared_len = first.parse().map_err(|_| DataError::InvalidLength {
      line: first.to_string(),
    })?;
    Ok(Self {
      declared_len,
      data: parse_hex_bytes(rest)?,
    })
  }

  #[must_use]
  pub fn length_matches(&self) -> bool {
    self.declared_len == self.data.len()
  }

  #[must_use]
  pub fn encode(&self) -> String {
    format!("{}\n{}", self.declared_len, encode_hex_bytes(&self.data))
  }
}

/// Parse an RTL checksum output: hex digits, optional `0x` prefix, surrounding
/// whitespace ignored.
///
/// # Errors
///
/// [`DataError::InvalidChecksum`] if the text is not a 64-bit hex value.
pub fn parse_rtl_output(text: &str) -> Result<u64, DataError> {
  let trimmed = text.trim();
  let digits = trimmed
    .strip_prefix("0x")
    .or_else(|| trimmed.strip_prefix("0X"))
    .unwrap_or(trimmed);
  let valid = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit());
  let crc = if valid { u64::from_str_radix(digits, 16).ok() } else { None };
  crc.ok_or_else(|| DataError::InvalidChecksum {
    text: trimmed.to_string(),
  })
}

// ─────────────────────────────────────────────────────────────────────────────
// Case Names
// ─────────────────────────────────────────────────────────────────────────────

/// A `(config, test)` pair, ordered by config id then test id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CaseId {
  pub config: u32,
  pub test: u32,
}

impl CaseId {
  #[must_use]
  pub const fn new(config: u32, test: u32) -> Self {
    Self { config, test }
  }

  /// Parse `c<config>_t<test>`.
  #[must_use]
  pub fn parse(text: &str) -> Option<Self> {
    let (config, test) = text.strip_prefix('c')?.split_once("_t")?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(config) || !digits(test) {
      return None;
    }
    Some(Self::new(config.parse().ok()?, test.parse().ok()?))
  }
}

impl fmt::Display for CaseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "c{}_t{}", self.config, self.test)
  }
}

/// The kinds of per-case file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
  /// `test_data_c<i>_t<n>.dat`
  Software,
  /// `test_data_c<i>_t<n>_input.dat`
  RtlInput,
  /// `test_data_c<i>_t<n>_output.dat`
  RtlOutput,
  /// `result_c<i>_t<n>.dat`
  Result,
}

impl FileKind {
  const fn affixes(self) -> (&'static str, &'static str) {
    match self {
      Self::Software => ("test_data_", ".dat"),
      Self::RtlInput => ("test_data_", "_input.dat"),
      Self::RtlOutput => ("test_data_", "_output.dat"),
      Self::Result => ("result_", ".dat"),
    }
  }

  #[must_use]
  pub fn file_name(self, id: CaseId) -> String {
    let (prefix, suffix) = self.affixes();
    format!("{prefix}{id}{suffix}")
  }

  /// Case id of `name` if it is a file of this kind.
  #[must_use]
  pub fn parse_file_name(self, name: &str) -> Option<CaseId> {
    let (prefix, suffix) = self.affixes();
    CaseId::parse(name.strip_prefix(prefix)?.strip_suffix(suffix)?)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Directory Loaders
// ─────────────────────────────────────────────────────────────────────────────

/// Visit every file in `dir` whose name parses as `kind`, in file-name order
/// of the resulting ids.
fn scan(dir: &Path, kind: FileKind) -> Result<BTreeMap<CaseId, std::path::PathBuf>, Error> {
  let mut found = BTreeMap::new();
  for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
    let path = entry.map_err(|e| Error::io(dir, e))?.path();
    let id = path
      .file_name()
      .and_then(|n| n.to_str())
      .and_then(|n| kind.parse_file_name(n));
    if let Some(id) = id {
      found.insert(id, path);
    }
  }
  Ok(found)
}

/// Load every software vector in `dir`.
///
/// # Errors
///
/// The first unreadable or undecodable file.
pub fn load_software_vectors(dir: &Path) -> Result<BTreeMap<CaseId, Vec<u8>>, Error> {
  let mut vectors = BTreeMap::new();
  for (id, path) in scan(dir, FileKind::Software)? {
    let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let data = parse_hex_bytes(&text).map_err(|e| Error::data(&path, e))?;
    debug!("loaded {}: {} bytes", path.display(), data.len());
    vectors.insert(id, data);
  }
  Ok(vectors)
}

/// Load every RTL input vector in `dir`, warning on length mismatches.
///
/// # Errors
///
/// The first unreadable or undecodable file.
pub fn load_rtl_inputs(dir: &Path) -> Result<BTreeMap<CaseId, RtlInput>, Error> {
  let mut inputs = BTreeMap::new();
  for (id, path) in scan(dir, FileKind::RtlInput)? {
    let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let input = RtlInput::parse(&text).map_err(|e| Error::data(&path, e))?;
    if !input.length_matches() {
      warn!(
        "{}: declared length {} but {} bytes decoded",
        path.display(),
        input.declared_len,
        input.data.len()
      );
    }
    debug!("loaded {}: {} bytes", path.display(), input.data.len());
    inputs.insert(id, input);
  }
  Ok(inputs)
}

/// Load every RTL output checksum in `dir`.
///
/// # Errors
///
/// The first unreadable or unparseable file.
pub fn load_rtl_outputs(dir: &Path) -> Result<BTreeMap<CaseId, u64>, Error> {
  let mut outputs = BTreeMap::new();
  for (id, path) in scan(dir, FileKind::RtlOutput)? {
    let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let crc = parse_rtl_output(&text).map_err(|e| Error::data(&path, e))?;
    outputs.insert(id, crc);
  }
  debug!("loaded {} RTL outputs from {}", outputs.len(), dir.display());
  Ok(outputs)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hex_bytes_accept_one_or_two_digits() {
    assert_eq!(parse_hex_bytes("").unwrap(), Vec::<u8>::new());
    assert_eq!(parse_hex_bytes("  0 f 0F ff\t10 \r\n").unwrap(), [0x00, 0x0F, 0x0F, 0xFF, 0x10]);
  }

  #[test]
  fn hex_bytes_name_bad_token() {
    assert_eq!(
      parse_hex_bytes("00 11 1FF 22"),
      Err(DataError::InvalidToken {
        index: 2,
        token: "1FF".into()
      })
    );
    assert_eq!(
      parse_hex_bytes("zz"),
      Err(DataError::InvalidToken {
        index: 0,
        token: "zz".into()
      })
    );
    // `from_str_radix` alone would accept a sign.
    assert!(parse_hex_bytes("+1").is_err());
  }

  #[test]
  fn hex_bytes_encode_uppercase() {
    assert_eq!(encode_hex_bytes(&[]), "");
    assert_eq!(encode_hex_bytes(&[0x00, 0xAB, 0x0f]), "00 AB 0F");
  }

  #[test]
  fn rtl_input_with_length_line() {
    let input = RtlInput::parse("4\n01 02 03 04").unwrap();
    assert_eq!(input, RtlInput::new(vec![1, 2, 3, 4]));
    assert!(input.length_matches());
    assert_eq!(input.encode(), "4\n01 02 03 04");
  }

  #[test]
  fn rtl_input_length_mismatch_is_kept() {
    let input = RtlInput::parse("5\r\n01 02\n03").unwrap();
    assert_eq!(input.declared_len, 5);
    assert_eq!(input.data, [1, 2, 3]);
    assert!(!input.length_matches());
  }

  #[test]
  fn rtl_input_errors() {
    assert_eq!(RtlInput::parse(""), Err(DataError::MissingLength));
    assert_eq!(RtlInput::parse("  \n"), Err(DataError::MissingLength));
    assert_eq!(
      RtlInput::parse("four\n01"),
      Err(DataError::InvalidLength { line: "four".into() })
    );
    assert!(matches!(RtlInput::parse("1\nGG"), Err(DataError::InvalidToken { index: 0, .. })));
  }

  #[test]
  fn rtl_output_values() {
    assert_eq!(parse_rtl_output("cbf43926\n"), Ok(0xCBF4_3926));
    assert_eq!(parse_rtl_output("0x29B1"), Ok(0x29B1));
    assert!(parse_rtl_output("").is_err());
    assert!(parse_rtl_output("xx").is_err());
    assert!(parse_rtl_output("1_0").is_err());
  }

  #[test]
  fn case_file_names() {
    let id = CaseId::new(3, 12);
    assert_eq!(id.to_string(), "c3_t12");
    assert_eq!(FileKind::Software.file_name(id), "test_data_c3_t12.dat");
    assert_eq!(FileKind::RtlInput.file_name(id), "test_data_c3_t12_input.dat");
    assert_eq!(FileKind::RtlOutput.file_name(id), "test_data_c3_t12_output.dat");
    assert_eq!(FileKind::Result.file_name(id), "result_c3_t12.dat");

    for kind in [FileKind::Software, FileKind::RtlInput, FileKind::RtlOutput, FileKind::Result] {
      assert_eq!(kind.parse_file_name(&kind.file_name(id)), Some(id));
    }
  }

  #[test]
  fn case_file_kinds_do_not_overlap() {
    assert_eq!(FileKind::Software.parse_file_name("test_data_c1_t1_input.dat"), None);
    assert_eq!(FileKind::RtlInput.parse_file_name("test_data_c1_t1.dat"), None);
    assert_eq!(FileKind::RtlOutput.parse_file_name("test_data_c1_t1_input.dat"), None);
    assert_eq!(FileKind::Software.parse_file_name("generation_summary.json"), None);
    assert_eq!(FileKind::Software.parse_file_name("test_data_cx_t1.dat"), None);
  }

  #[test]
  fn case_ids_sort_numerically() {
    let mut ids = vec![CaseId::new(2, 1), CaseId::new(1, 10), CaseId::new(1, 2)];
    ids.sort();
    assert_eq!(ids, [CaseId::new(1, 2), CaseId::new(1, 10), CaseId::new(2, 1)]);
  }
}
