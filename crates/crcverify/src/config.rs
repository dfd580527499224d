//! CRC configuration files.
//!
//! Two on-disk forms describe a [`CrcParams`]:
//!
//! | Form | Extension | Reflection fields | Numbers |
//! |------|-----------|-------------------|---------|
//! | JSON | `.json` | `rev`, or `refin` + `refout` | integers or strings |
//! | Verilog header | `.vh` | `CRC_REFIN`, `CRC_REFOUT` | Verilog literals |
//!
//! A Verilog header looks like:
//!
//! ```text
//! // generated CRC configuration
//! `define CRC_WIDTH 'd16
//! `define CRC_POLY 'h11021
//! `define CRC_INIT 'hffff
//! `define CRC_REFIN 'd0
//! `define CRC_REFOUT 'd0
//! `define CRC_XOROUT 'h0
//! ```
//!
//! Polynomials may carry the explicit top bit (`'h11021` above); it is
//! discarded when the values are masked to the register width.

use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
};

use crcmodel::{CrcParams, ReflectionMode};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error};

/// File-name prefix shared by every configuration file.
pub const CONFIG_PREFIX: &str = "crc_config_";

// ─────────────────────────────────────────────────────────────────────────────
// Numeric Literals
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a numeric literal.
///
/// Accepted forms, with `_` separators allowed anywhere after the first digit:
///
/// - decimal: `4129`
/// - C-style: `0x1021`, `0b1010`, `0o17`
/// - Verilog: `'h1021`, `'d16`, `'b1010`, `'o17`, optionally sized (`16'h1021`)
///   and signed (`'sh1021`)
///
/// Returns `None` for anything else, including values above `u128::MAX`.
///
/// ```
/// use crcverify::config::parse_literal;
///
/// assert_eq!(parse_literal("'h1_1021"), Some(0x1_1021));
/// assert_eq!(parse_literal("16'd255"), Some(255));
/// assert_eq!(parse_literal("0xFFFF"), Some(0xFFFF));
/// assert_eq!(parse_literal("'q12"), None);
/// ```
#[must_use]
pub fn parse_literal(text: &str) -> Option<u128> {
  let text = text.trim();
  let (radix, digits) = if let Some((size, rest)) = text.split_once('\'') {
    if !size.chars().all(|c| c.is_ascii_digit()) {
      return None;
    }
    let rest = rest.strip_prefix(['s', 'S']).unwrap_or(rest);
    let mut chars = rest.chars();
    let radix = match chars.next()?.to_ascii_lowercase() {
      'h' => 16,
      'd' => 10,
      'b' => 2,
      'o' => 8,
      _ => return None,
    };
    (radix, chars.as_str())
  } else if let Some(rest) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
    (16, rest)
  } else if let Some(rest) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
    (2, rest)
  } else if let Some(rest) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
    (8, rest)
  } else {
    (10, text)
  };

  if digits.is_empty() || digits.starts_with('_') {
    return None;
  }
  let digits: String = digits.chars().filter(|&c| c != '_').collect();
  u128::from_str_radix(&digits, radix).ok()
}

fn literal_to_u64(field: &'static str, text: &str) -> Result<u64, ConfigError> {
  // Keep the low 64 bits: a 64-bit polynomial written with its explicit top
  // bit needs 65. Masking to the width happens in `CrcParams::new`.
  parse_literal(text).map(|v| v as u64).ok_or_else(|| ConfigError::InvalidValue {
    field,
    value: text.to_string(),
  })
}

fn literal_to_width(text: &str) -> Result<u32, ConfigError> {
  parse_literal(text)
    .and_then(|v| u32::try_from(v).ok())
    .ok_or_else(|| ConfigError::InvalidValue {
      field: "width",
      value: text.to_string(),
    })
}

fn literal_to_flag(field: &'static str, text: &str) -> Result<bool, ConfigError> {
  match parse_literal(text) {
    Some(0) => Ok(false),
    Some(1) => Ok(true),
    _ => Err(ConfigError::InvalidValue {
      field,
      value: text.to_string(),
    }),
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON
// ─────────────────────────────────────────────────────────────────────────────

/// A JSON number or a string holding a [`parse_literal`] literal. Anything
/// else (negative, fractional or too large numbers, other types) lands in
/// `Other` so the error can name its field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum Number {
  Int(u64),
  Text(String),
  Other(serde_json::Value),
}

impl Number {
  fn to_u64(&self, field: &'static str) -> Result<u64, ConfigError> {
    match self {
      Self::Int(v) => Ok(*v),
      Self::Text(text) => literal_to_u64(field, text),
      Self::Other(value) => Err(ConfigError::InvalidValue {
        field,
        value: value.to_string(),
      }),
    }
  }

  fn to_width(&self) -> Result<u32, ConfigError> {
    match self {
      Self::Int(v) => u32::try_from(*v).map_err(|_| ConfigError::InvalidValue {
        field: "width",
        value: v.to_string(),
      }),
      Self::Text(text) => literal_to_width(text),
      Self::Other(value) => Err(ConfigError::InvalidValue {
        field: "width",
        value: value.to_string(),
      }),
    }
  }
}

/// Wire form of a JSON configuration. Every field is optional here so that
/// absence is reported by name rather than as a serde error.
#[derive(Debug, Default, Serialize, Deserialize)]
struct JsonConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  width: Option<Number>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  poly: Option<Number>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  init: Option<Number>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  rev: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  refin: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  refout: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  xorout: Option<Number>,
}

fn required<'a, T>(value: &'a Option<T>, field: &'static str) -> Result<&'a T, ConfigError> {
  value.as_ref().ok_or(ConfigError::MissingField { field })
}

/// Resolve the reflection flags from `rev` and/or `refin`/`refout`.
fn reflection(rev: Option<bool>, refin: Option<bool>, refout: Option<bool>) -> Result<(bool, bool), ConfigError> {
  match (rev, refin, refout) {
    (None, None, None) => Err(ConfigError::MissingField { field: "rev" }),
    (Some(rev), None, None) => Ok((rev, rev)),
    (None, Some(_), None) => Err(ConfigError::MissingField { field: "refout" }),
    (None, None, Some(_)) => Err(ConfigError::MissingField { field: "refin" }),
    (None, Some(refin), Some(refout)) => Ok((refin, refout)),
    (Some(rev), refin, refout) => {
      if refin.unwrap_or(rev) == rev && refout.unwrap_or(rev) == rev {
        Ok((rev, rev))
      } else {
        Err(ConfigError::ConflictingReflection)
      }
    }
  }
}

/// Parse a JSON configuration document.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the first missing or invalid field.
///
/// ```
/// use crcverify::config::parse_json;
///
/// let p = parse_json(r#"{"width": 32, "poly": "0x04C11DB7", "init": 4294967295, "rev": true, "xorout": "0xFFFFFFFF"}"#)?;
/// assert_eq!(p.check(), 0xCBF4_3926);
/// # Ok::<(), crcverify::ConfigError>(())
/// ```
pub fn parse_json(text: &str) -> Result<CrcParams, ConfigError> {
  let doc: JsonConfig = serde_json::from_str(text).map_err(ConfigError::Json)?;
  let width = required(&doc.width, "width")?.to_width()?;
  let poly = required(&doc.poly, "poly")?.to_u64("poly")?;
  let init = required(&doc.init, "init")?.to_u64("init")?;
  let xorout = required(&doc.xorout, "xorout")?.to_u64("xorout")?;
  let (refin, refout) = reflection(doc.rev, doc.refin, doc.refout)?;
  Ok(CrcParams::new(width, poly, init, refin, refout, xorout)?)
}

/// Render a JSON configuration that [`parse_json`] reads back.
///
/// Matching reflections are written as a single `rev` flag, mixed ones as
/// explicit `refin`/`refout`. Values are written masked, as integers.
///
/// # Errors
///
/// Only if serialisation itself fails.
pub fn render_json(params: &CrcParams) -> Result<String, serde_json::Error> {
  let (rev, refin, refout) = if params.refin() == params.refout() {
    (Some(params.refin()), None, None)
  } else {
    (None, Some(params.refin()), Some(params.refout()))
  };
  let doc = JsonConfig {
    width: Some(Number::Int(u64::from(params.width()))),
    poly: Some(Number::Int(params.poly())),
    init: Some(Number::Int(params.init())),
    rev,
    refin,
    refout,
    xorout: Some(Number::Int(params.xorout())),
  };
  serde_json::to_string_pretty(&doc)
}

// ─────────────────────────────────────────────────────────────────────────────
// Verilog Header
// ─────────────────────────────────────────────────────────────────────────────

const VERILOG_FIELDS: [(&str, &str); 6] = [
  ("CRC_WIDTH", "width"),
  ("CRC_POLY", "poly"),
  ("CRC_INIT", "init"),
  ("CRC_REFIN", "refin"),
  ("CRC_REFOUT", "refout"),
  ("CRC_XOROUT", "xorout"),
];

/// Parse a Verilog header of `` `define CRC_* `` lines.
///
/// `//` comments and unrelated defines are ignored. When a macro is defined
/// twice the last definition wins, as in a Verilog preprocessor.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the first missing or invalid field.
pub fn parse_verilog(text: &str) -> Result<CrcParams, ConfigError> {
  let mut values: BTreeMap<&'static str, &str> = BTreeMap::new();

  for line in text.lines() {
    let line = line.split("//").next().unwrap_or_default().trim();
    let Some(rest) = line.strip_prefix("`define") else {
      continue;
    };
    let mut parts = rest.split_whitespace();
    let (Some(name), Some(value)) = (parts.next(), parts.next()) else {
      continue;
    };
    let name = name.trim_start_matches('`');
    match VERILOG_FIELDS.iter().find(|(macro_name, _)| *macro_name == name) {
      Some(&(_, field)) => {
        values.insert(field, value);
      }
      None => debug!("ignoring unrelated define `{name}`"),
    }
  }

  let get = |field: &'static str| values.get(field).copied().ok_or(ConfigError::MissingField { field });
  let width = literal_to_width(get("width")?)?;
  let poly = literal_to_u64("poly", get("poly")?)?;
  let init = literal_to_u64("init", get("init")?)?;
  let refin = literal_to_flag("refin", get("refin")?)?;
  let refout = literal_to_flag("refout", get("refout")?)?;
  let xorout = literal_to_u64("xorout", get("xorout")?)?;
  Ok(CrcParams::new(width, poly, init, refin, refout, xorout)?)
}

/// Render a Verilog header that [`parse_verilog`] reads back.
///
/// The polynomial is written with its explicit top bit, as RTL generators
/// expect.
#[must_use]
pub fn render_verilog(params: &CrcParams) -> String {
  let full_poly = (1u128 << params.width()) | u128::from(params.poly());
  let mode = params.reflection_mode();
  format!(
    "// CRC configuration\n\
     // reflection: {mode}\n\
     \n\
     `define CRC_WIDTH 'd{width}\n\
     `define CRC_POLY 'h{full_poly:x}\n\
     `define CRC_INIT 'h{init:x}\n\
     `define CRC_REFIN 'd{refin}\n\
     `define CRC_REFOUT 'd{refout}\n\
     `define CRC_XOROUT 'h{xorout:x}\n",
    width = params.width(),
    init = params.init(),
    refin = u8::from(params.refin()),
    refout = u8::from(params.refout()),
    xorout = params.xorout(),
  )
}

// ─────────────────────────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────────────────────────

/// On-disk configuration format, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
  Json,
  Verilog,
}

impl ConfigFormat {
  /// Format for `path`, if its extension is recognised.
  #[must_use]
  pub fn from_path(path: &Path) -> Option<Self> {
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case("json") {
      Some(Self::Json)
    } else if ["vh", "svh", "v"].iter().any(|e| ext.eq_ignore_ascii_case(e)) {
      Some(Self::Verilog)
    } else {
      None
    }
  }

  #[must_use]
  pub const fn extension(self) -> &'static str {
    match self {
      Self::Json => "json",
      Self::Verilog => "vh",
    }
  }

  /// Parse `text` in this format.
  ///
  /// # Errors
  ///
  /// See [`parse_json`] and [`parse_verilog`].
  pub fn parse(self, text: &str) -> Result<CrcParams, ConfigError> {
    match self {
      Self::Json => parse_json(text),
      Self::Verilog => parse_verilog(text),
    }
  }

  /// Render `params` in this format.
  ///
  /// # Errors
  ///
  /// Only if JSON serialisation fails.
  pub fn render(self, params: &CrcParams) -> Result<String, serde_json::Error> {
    match self {
      Self::Json => render_json(params),
      Self::Verilog => Ok(render_verilog(params)),
    }
  }
}

/// `crc_config_<id>.<ext>`.
#[must_use]
pub fn config_file_name(id: u32, format: ConfigFormat) -> String {
  format!("{CONFIG_PREFIX}{id}.{}", format.extension())
}

/// Extract `<id>` from `crc_config_<id>.<ext>`.
#[must_use]
pub fn parse_config_file_name(name: &str) -> Option<(u32, ConfigFormat)> {
  let format = ConfigFormat::from_path(Path::new(name))?;
  let stem = name.strip_prefix(CONFIG_PREFIX)?.rsplit_once('.')?.0;
  Some((stem.parse().ok()?, format))
}

/// Load one configuration file, choosing the parser by extension.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, [`Error::Config`] if it is
/// rejected or its extension is unknown.
pub fn load_config(path: &Path) -> Result<CrcParams, Error> {
  let format = ConfigFormat::from_path(path).ok_or_else(|| {
    Error::config(
      path,
      ConfigError::InvalidValue {
        field: "format",
        value: path.display().to_string(),
      },
    )
  })?;
  let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
  let params = format.parse(&text).map_err(|e| Error::config(path, e))?;
  debug!("loaded {}: {params}", path.display());
  Ok(params)
}

/// Write `params` to `dir/crc_config_<id>.<ext>` and return the path.
///
/// # Errors
///
/// [`Error::Io`] on write failure.
pub fn write_config(dir: &Path, id: u32, params: &CrcParams, format: ConfigFormat) -> Result<PathBuf, Error> {
  let path = dir.join(config_file_name(id, format));
  let text = format.render(params)?;
  fs::write(&path, text).map_err(|e| Error::io(&path, e))?;
  Ok(path)
}

/// Orders duplicate files for one id: JSON first, then by path.
fn rank((format, path): &(ConfigFormat, PathBuf)) -> (bool, &Path) {
  (*format != ConfigFormat::Json, path.as_path())
}

/// Load every `crc_config_<id>.*` file in `dir`, keyed by id.
///
/// Files with other names are skipped. If one id appears more than once the
/// JSON file wins (otherwise the first path by name), a warning is logged and
/// the other files are never read.
///
/// # Errors
///
/// Fails on the first unreadable directory entry or rejected configuration.
pub fn load_config_dir(dir: &Path) -> Result<BTreeMap<u32, CrcParams>, Error> {
  // Pick one file per id before parsing anything, so a losing file is never read.
  let mut chosen: BTreeMap<u32, (ConfigFormat, PathBuf)> = BTreeMap::new();
  for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
    let path = entry.map_err(|e| Error::io(dir, e))?.path();
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
      continue;
    };
    let Some((id, format)) = parse_config_file_name(name) else {
      debug!("skipping {}", path.display());
      continue;
    };
    let candidate = (format, path);
    match chosen.remove(&id) {
      None => {
        chosen.insert(id, candidate);
      }
      Some(kept) => {
        let (keep, ignored) = if rank(&candidate) < rank(&kept) {
          (candidate, kept)
        } else {
          (kept, candidate)
        };
        warn!("config {id}: keeping {}, ignoring {}", keep.1.display(), ignored.1.display());
        chosen.insert(id, keep);
      }
    }
  }

  chosen
    .into_iter()
    .map(|(id, (_, path))| load_config(&path).map(|params| (id, params)))
    .collect()
}

/// Parameters for a named reflection mode, keeping the rest of `params`.
#[must_use]
pub fn with_mode(params: &CrcParams, mode: ReflectionMode) -> CrcParams {
  let (refin, refout) = mode.flags();
  CrcParams::new(params.width(), params.poly(), params.init(), refin, refout, params.xorout()).unwrap_or(*params)
}
