//! Comparison of RTL simulation outputs against the model.
//!
//! The model side checksums each length-prefixed input with the reference
//! engine and writes `test_data_c<i>_t<n>_output.dat` files in the same
//! lowercase hex the simulators emit. [`compare`] then pairs model and RTL
//! checksums by case id.

use std::{collections::BTreeMap, fs, path::Path};

use crcmodel::{CrcParams, reference_checksum};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
  config::load_config_dir,
  data::{CaseId, FileKind, RtlInput, load_rtl_inputs, load_rtl_outputs},
  error::Error,
  validate::run_pooled,
};

/// Restrict work to some configuration ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConfigFilter {
  #[default]
  All,
  Only(Vec<u32>),
}

impl ConfigFilter {
  #[must_use]
  pub fn from_ids(ids: Vec<u32>) -> Self {
    if ids.is_empty() { Self::All } else { Self::Only(ids) }
  }

  #[must_use]
  pub fn allows(&self, config: u32) -> bool {
    match self {
      Self::All => true,
      Self::Only(ids) => ids.contains(&config),
    }
  }
}

/// Reference checksums for every input whose configuration is loaded and
/// allowed by `filter`.
///
/// # Errors
///
/// [`Error::ThreadPool`] if a dedicated pool cannot be started.
pub fn model_outputs(
  configs: &BTreeMap<u32, CrcParams>,
  inputs: &BTreeMap<CaseId, RtlInput>,
  filter: &ConfigFilter,
  threads: Option<usize>,
) -> Result<BTreeMap<CaseId, u64>, Error> {
  let mut jobs = Vec::with_capacity(inputs.len());
  for (id, input) in inputs {
    if !filter.allows(id.config) {
      continue;
    }
    match configs.get(&id.config) {
      Some(params) => jobs.push((*id, params, input.data.as_slice())),
      None => warn!("{id}: no configuration {}", id.config),
    }
  }

  run_pooled(threads, || {
    jobs
      .par_iter()
      .map(|&(id, params, data)| (id, reference_checksum(data, params)))
      .collect()
  })
}

/// Write each output as `test_data_c<i>_t<n>_output.dat` in `dir`.
///
/// # Errors
///
/// The first failed directory creation or write.
pub fn write_model_outputs(outputs: &BTreeMap<CaseId, u64>, dir: &Path) -> Result<(), Error> {
  fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
  for (id, crc) in outputs {
    let path = dir.join(FileKind::RtlOutput.file_name(*id));
    fs::write(&path, format!("{crc:x}")).map_err(|e| Error::io(&path, e))?;
  }
  Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Comparison
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Match,
  Mismatch,
  /// Only one side produced a checksum.
  Missing,
}

impl Verdict {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Match => "match",
      Self::Mismatch => "mismatch",
      Self::Missing => "missing",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Comparison {
  pub id: CaseId,
  pub model: Option<u64>,
  pub rtl: Option<u64>,
  pub verdict: Verdict,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonTally {
  pub total: usize,
  pub matches: usize,
  pub mismatches: usize,
  pub missing: usize,
}

impl ComparisonTally {
  #[must_use]
  pub fn of(rows: &[Comparison]) -> Self {
    rows.iter().fold(Self::default(), |mut t, row| {
      t.total += 1;
      match row.verdict {
        Verdict::Match => t.matches += 1,
        Verdict::Mismatch => t.mismatches += 1,
        Verdict::Missing => t.missing += 1,
      }
      t
    })
  }

  #[must_use]
  pub fn success_rate(&self) -> Option<f64> {
    (self.total > 0).then(|| self.matches as f64 * 100.0 / self.total as f64)
  }

  /// At least one case was compared and every case matched.
  #[must_use]
  pub const fn passed(&self) -> bool {
    self.total > 0 && self.mismatches == 0 && self.missing == 0
  }
}

/// Pair model and RTL checksums over the union of their case ids, sorted.
#[must_use]
pub fn compare(model: &BTreeMap<CaseId, u64>, rtl: &BTreeMap<CaseId, u64>) -> Vec<Comparison> {
  let mut ids: Vec<CaseId> = model.keys().chain(rtl.keys()).copied().collect();
  ids.sort_unstable();
  ids.dedup();

  ids
    .into_iter()
    .map(|id| {
      let model = model.get(&id).copied();
      let rtl = rtl.get(&id).copied();
      let verdict = match (model, rtl) {
        (Some(m), Some(r)) if m == r => Verdict::Match,
        (Some(_), Some(_)) => Verdict::Mismatch,
        _ => Verdict::Missing,
      };
      Comparison { id, model, rtl, verdict }
    })
    .collect()
}

/// Directories used by [`compare_dirs`].
#[derive(Clone, Copy, Debug)]
pub struct RtlDirs<'a> {
  /// `crc_config_<i>.vh` files.
  pub settings: &'a Path,
  /// `test_data_c<i>_t<n>_input.dat` files.
  pub input: &'a Path,
  /// Simulator `*_output.dat` files.
  pub rtl_output: &'a Path,
  /// Where model `*_output.dat` files are written.
  pub model_output: &'a Path,
}

/// Load everything, compute and write model outputs, load RTL outputs and
/// compare. `filter` applies to both sides.
///
/// # Errors
///
/// Any load or write failure.
pub fn compare_dirs(dirs: &RtlDirs<'_>, filter: &ConfigFilter, threads: Option<usize>) -> Result<Vec<Comparison>, Error> {
  let configs = load_config_dir(dirs.settings)?;
  let inputs = load_rtl_inputs(dirs.input)?;
  let model = model_outputs(&configs, &inputs, filter, threads)?;
  write_model_outputs(&model, dirs.model_output)?;

  let mut rtl = load_rtl_outputs(dirs.rtl_output)?;
  rtl.retain(|id, _| filter.allows(id.config));

  let rows = compare(&model, &rtl);
  let tally = ComparisonTally::of(&rows);
  info!(
    "compared {} cases: {} match, {} mismatch, {} missing",
    tally.total, tally.matches, tally.mismatches, tally.missing
  );
  Ok(rows)
}
