//! Runtime settings shared by the generator, validator and reports.
//!
//! Each setting has three sources, highest precedence first:
//!
//! 1. an explicit value (a CLI flag), applied with [`Settings::with_threads`] and friends
//! 2. an environment variable, read once per process by [`Settings::from_env`]
//! 3. the built-in default
//!
//! # Environment Variables
//!
//! - `CRCVERIFY_THREADS`: worker threads for batch validation (`0` = one per core)
//! - `CRCVERIFY_SEED`: default seed for test-plan generation
//! - `CRCVERIFY_FORMAT`: default report format (`summary`, `json`, `tsv`)
//!
//! Empty or unparseable values are ignored.

use crate::report::OutputFormat;

pub const THREADS_VAR: &str = "CRCVERIFY_THREADS";
pub const SEED_VAR: &str = "CRCVERIFY_SEED";
pub const FORMAT_VAR: &str = "CRCVERIFY_FORMAT";

/// Seed used when neither a flag nor `CRCVERIFY_SEED` provides one.
pub const DEFAULT_SEED: u64 = 0x00C0_FFEE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
  /// Worker threads; `None` uses rayon's global pool.
  pub threads: Option<usize>,
  pub seed: u64,
  pub format: OutputFormat,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      threads: None,
      seed: DEFAULT_SEED,
      format: OutputFormat::default(),
    }
  }
}

impl Settings {
  /// Settings from the process environment, read once and cached.
  #[must_use]
  pub fn from_env() -> Self {
    use std::sync::OnceLock;
    static SETTINGS: OnceLock<Settings> = OnceLock::new();
    *SETTINGS.get_or_init(|| Self::from_lookup(|name| std::env::var(name).ok()))
  }

  /// Settings from an arbitrary variable lookup.
  #[must_use]
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let var = |name: &str| {
      let value = lookup(name)?;
      let value = value.trim();
      if value.is_empty() { None } else { Some(value.to_owned()) }
    };

    let defaults = Self::default();
    Self {
      // 0 means "one per core", which is what the global pool already does.
      threads: var(THREADS_VAR)
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0),
      seed: var(SEED_VAR)
        .and_then(|v| crate::config::parse_literal(&v))
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or(defaults.seed),
      format: var(FORMAT_VAR)
        .and_then(|v| OutputFormat::parse(&v))
        .unwrap_or(defaults.format),
    }
  }

  #[must_use]
  pub fn with_threads(mut self, threads: Option<usize>) -> Self {
    if let Some(n) = threads {
      self.threads = (n > 0).then_some(n);
    }
    self
  }

  #[must_use]
  pub fn with_seed(mut self, seed: Option<u64>) -> Self {
    if let Some(seed) = seed {
      self.seed = seed;
    }
    self
  }

  #[must_use]
  pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
    if let Some(format) = format {
      self.format = format;
    }
    self
  }
}
