//! Seeded test-plan generation.
//!
//! A [`TestPlan`] is a set of random CRC configurations plus random byte
//! vectors for each. Two flavours exist:
//!
//! - **software**: `configs` configurations with a single `rev` flag, written
//!   as JSON, with plain hex vectors
//! - **hardware**: `configs` configurations *per reflection mode*, in the order
//!   standard, mixed_one, mixed_two, reflect, written as Verilog headers, with
//!   length-prefixed vectors
//!
//! Generation is fully determined by [`PlanOptions::seed`].

use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
};

use crcmodel::{CrcParams, ReflectionMode};
use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::Serialize;

use crate::{
  config::{ConfigFormat, config_file_name, write_config},
  data::{CaseId, FileKind, RtlInput, encode_hex_bytes},
  error::Error,
};

/// Widths drawn by the generator.
pub const PLAN_WIDTHS: [u32; 3] = [8, 16, 32];

pub const SOFTWARE_MANIFEST: &str = "generation_summary.json";
pub const HARDWARE_MANIFEST: &str = "rtl_generation_summary.json";

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanKind {
  Software,
  Hardware,
}

impl PlanKind {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Software => "software",
      Self::Hardware => "hardware",
    }
  }

  #[must_use]
  pub const fn config_format(self) -> ConfigFormat {
    match self {
      Self::Software => ConfigFormat::Json,
      Self::Hardware => ConfigFormat::Verilog,
    }
  }

  #[must_use]
  pub const fn data_file(self) -> FileKind {
    match self {
      Self::Software => FileKind::Software,
      Self::Hardware => FileKind::RtlInput,
    }
  }

  #[must_use]
  pub const fn manifest_name(self) -> &'static str {
    match self {
      Self::Software => SOFTWARE_MANIFEST,
      Self::Hardware => HARDWARE_MANIFEST,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanOptions {
  pub kind: PlanKind,
  /// Configurations in total (software) or per reflection mode (hardware).
  pub configs: usize,
  /// Vectors per configuration.
  pub tests: usize,
  /// Shortest vector, in bytes.
  pub min_len: usize,
  /// Longest vector, in bytes, inclusive.
  pub max_len: usize,
  pub seed: u64,
}

impl PlanOptions {
  /// Software defaults: 4 configurations, 5 vectors of 3..=100 bytes.
  #[must_use]
  pub const fn software(seed: u64) -> Self {
    Self {
      kind: PlanKind::Software,
      configs: 4,
      tests: 5,
      min_len: 3,
      max_len: 100,
      seed,
    }
  }

  /// Hardware defaults: 1 configuration per mode, 4 vectors of 3..=20 bytes.
  #[must_use]
  pub const fn hardware(seed: u64) -> Self {
    Self {
      kind: PlanKind::Hardware,
      configs: 1,
      tests: 4,
      min_len: 3,
      max_len: 20,
      seed,
    }
  }

  /// # Errors
  ///
  /// [`Error::InvalidOptions`] if `min_len > max_len` or a count is zero.
  pub fn validate(&self) -> Result<(), Error> {
    if self.min_len > self.max_len {
      return Err(Error::InvalidOptions(format!(
        "minimum length {} exceeds maximum length {}",
        self.min_len, self.max_len
      )));
    }
    if self.configs == 0 || self.tests == 0 {
      return Err(Error::InvalidOptions("configuration and test counts must be at least 1".into()));
    }
    if u32::try_from(self.config_count()).is_err() || u32::try_from(self.tests).is_err() {
      return Err(Error::InvalidOptions("too many configurations or tests".into()));
    }
    Ok(())
  }

  /// Total number of configurations the plan will contain.
  #[must_use]
  pub const fn config_count(&self) -> usize {
    match self.kind {
      PlanKind::Software => self.configs,
      PlanKind::Hardware => self.configs.saturating_mul(ReflectionMode::ALL.len()),
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plan
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedConfig {
  /// 1-based configuration id.
  pub id: u32,
  pub params: CrcParams,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedCase {
  pub id: CaseId,
  pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestPlan {
  pub kind: PlanKind,
  pub configs: Vec<PlannedConfig>,
  /// Cases grouped by configuration, test ids 1-based within each.
  pub cases: Vec<PlannedCase>,
}

/// Random generator polynomial for `width`, top bit implicit.
///
/// Bit 0 is always set; bits `1..width` are each set with probability 1/2.
pub fn random_poly<R: Rng + ?Sized>(rng: &mut R, width: u32) -> u64 {
  (1..width).fold(1u64, |poly, bit| if rng.gen_bool(0.5) { poly | (1 << bit) } else { poly })
}

fn random_params<R: Rng + ?Sized>(rng: &mut R, mode: ReflectionMode) -> Result<CrcParams, Error> {
  let width = PLAN_WIDTHS.choose(rng).copied().unwrap_or(8);
  let poly = random_poly(rng, width);
  Ok(
    CrcParams::builder(width)
      .poly(poly)
      .init(u64::MAX)
      .mode(mode)
      .xorout(0)
      .build()?,
  )
}

/// Generate a plan from `options`.
///
/// # Errors
///
/// [`Error::InvalidOptions`] if the options do not validate.
pub fn generate(options: &PlanOptions) -> Result<TestPlan, Error> {
  options.validate()?;
  let mut rng = StdRng::seed_from_u64(options.seed);

  let modes: Vec<Option<ReflectionMode>> = match options.kind {
    PlanKind::Software => vec![None; options.configs],
    PlanKind::Hardware => ReflectionMode::ALL
      .into_iter()
      .flat_map(|mode| std::iter::repeat_n(Some(mode), options.configs))
      .collect(),
  };

  let mut configs = Vec::with_capacity(modes.len());
  let mut cases = Vec::with_capacity(modes.len() * options.tests);
  for (id, mode) in (1u32..).zip(modes) {
    // Software configurations reflect both ways or neither.
    let mode = mode.unwrap_or_else(|| {
      if rng.gen_bool(0.5) {
        ReflectionMode::Reflect
      } else {
        ReflectionMode::Standard
      }
    });
    let params = random_params(&mut rng, mode)?;
    debug!("config {id}: {params}");
    configs.push(PlannedConfig { id, params });

    for test in (1u32..).take(options.tests) {
      let len = rng.gen_range(options.min_len..=options.max_len);
      let data = (0..len).map(|_| rng.gen_range(0..=u8::MAX)).collect();
      cases.push(PlannedCase {
        id: CaseId::new(id, test),
        data,
      });
    }
  }

  Ok(TestPlan {
    kind: options.kind,
    configs,
    cases,
  })
}

// ─────────────────────────────────────────────────────────────────────────────
// On-Disk Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Where a plan's files go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanLayout {
  /// Configuration files.
  pub settings: PathBuf,
  /// Vectors and the manifest.
  pub input: PathBuf,
}

impl PlanLayout {
  /// `<root>/settings` and `<root>/input`.
  #[must_use]
  pub fn under(root: &Path) -> Self {
    Self {
      settings: root.join("settings"),
      input: root.join("input"),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManifestConfig {
  pub width: u32,
  /// Polynomial with its explicit top bit, `0x`-prefixed lowercase hex.
  pub poly: String,
  #[serde(rename = "type")]
  pub kind: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reflection_type: Option<&'static str>,
  /// Software configuration file name.
  #[serde(rename = "python_config", skip_serializing_if = "Option::is_none")]
  pub software_config: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rtl_config: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManifestTest {
  pub config_id: u32,
  pub config_type: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reflection_type: Option<&'static str>,
  pub test_id: u32,
  pub length: usize,
  pub file: String,
}

/// Summary written next to the vectors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Manifest {
  pub configs: BTreeMap<u32, ManifestConfig>,
  pub test_data: Vec<ManifestTest>,
  pub total_configs: usize,
  pub total_tests: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub config_types: Option<Vec<&'static str>>,
}

impl TestPlan {
  /// Summary of this plan as written to disk.
  #[must_use]
  pub fn manifest(&self) -> Manifest {
    let hardware = self.kind == PlanKind::Hardware;
    let format = self.kind.config_format();
    let data_file = self.kind.data_file();
    let reflection = |params: &CrcParams| hardware.then(|| params.reflection_mode().as_str());

    let configs = self
      .configs
      .iter()
      .map(|c| {
        let file = config_file_name(c.id, format);
        let entry = ManifestConfig {
          width: c.params.width(),
          poly: format!("0x{:x}", (1u128 << c.params.width()) | u128::from(c.params.poly())),
          kind: self.kind.as_str(),
          reflection_type: reflection(&c.params),
          software_config: (!hardware).then(|| file.clone()),
          rtl_config: hardware.then_some(file),
        };
        (c.id, entry)
      })
      .collect();

    let by_id: BTreeMap<u32, &CrcParams> = self.configs.iter().map(|c| (c.id, &c.params)).collect();
    let test_data = self
      .cases
      .iter()
      .map(|case| ManifestTest {
        config_id: case.id.config,
        config_type: self.kind.as_str(),
        reflection_type: by_id.get(&case.id.config).and_then(|&p| reflection(p)),
        test_id: case.id.test,
        length: case.data.len(),
        file: data_file.file_name(case.id),
      })
      .collect();

    Manifest {
      configs,
      test_data,
      total_configs: self.configs.len(),
      total_tests: self.cases.len(),
      config_types: hardware.then(|| ReflectionMode::ALL.iter().map(|m| m.as_str()).collect()),
    }
  }

  /// Write configurations, vectors and the manifest under `layout`,
  /// creating directories as needed. Returns the manifest path.
  ///
  /// # Errors
  ///
  /// The first failed directory creation or write.
  pub fn write(&self, layout: &PlanLayout) -> Result<PathBuf, Error> {
    for dir in [&layout.settings, &layout.input] {
      fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    let format = self.kind.config_format();
    for config in &self.configs {
      write_config(&layout.settings, config.id, &config.params, format)?;
    }

    let data_file = self.kind.data_file();
    for case in &self.cases {
      let path = layout.input.join(data_file.file_name(case.id));
      let text = match self.kind {
        PlanKind::Software => encode_hex_bytes(&case.data),
        PlanKind::Hardware => RtlInput::new(case.data.clone()).encode(),
      };
      fs::write(&path, text).map_err(|e| Error::io(&path, e))?;
    }

    let manifest_path = layout.input.join(self.kind.manifest_name());
    let json = serde_json::to_string_pretty(&self.manifest())?;
    fs::write(&manifest_path, json).map_err(|e| Error::io(&manifest_path, e))?;

    info!(
      "wrote {} {} configs and {} vectors to {}",
      self.configs.len(),
      self.kind.as_str(),
      self.cases.len(),
      layout.input.display()
    );
    Ok(manifest_path)
  }
}
