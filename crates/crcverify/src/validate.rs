//! Batch validation of both engines against each other and the `crc` crate.
//!
//! Every vector is checksummed with the configuration whose id it names, by
//! the reference engine, the table engine and the [`oracle`](crate::oracle).
//! Pairs are independent, so they fan out across a rayon pool; lookup
//! tables come from one shared [`TableCache`], built once per
//! `(width, poly, refin)`.

use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
};

use crcmodel::{CrcError, CrcParams, TableCache, reference_checksum, table_checksum};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
  config::load_config_dir,
  data::{CaseId, FileKind, load_software_vectors},
  error::Error,
  oracle::oracle,
  report::{OutputFormat, Report},
};

/// Name of the summary written by [`write_results`].
pub const SUMMARY_REPORT: &str = "summary_report.txt";

/// Run `job` on a dedicated pool of `threads` workers, or on rayon's global
/// pool when `threads` is `None`.
pub(crate) fn run_pooled<T, F>(threads: Option<usize>, job: F) -> Result<T, Error>
where
  T: Send,
  F: FnOnce() -> T + Send,
{
  match threads {
    Some(n) => {
      let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
      Ok(pool.install(job))
    }
    None => Ok(job()),
  }
}

/// Outcome of one `(config, vector)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CaseResult {
  pub id: CaseId,
  pub width: u32,
  /// Vector length in bytes.
  pub len: usize,
  pub reference: u64,
  pub table: u64,
  /// Independent result from the `crc` crate.
  pub oracle: u64,
}

impl CaseResult {
  /// All three computations agree.
  #[must_use]
  pub const fn matches(&self) -> bool {
    self.reference == self.table && self.reference == self.oracle
  }
}

/// Counts over a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
  pub total: usize,
  pub matches: usize,
  pub mismatches: usize,
}

impl Tally {
  /// Matches as a percentage of the total, `None` for an empty batch.
  #[must_use]
  pub fn success_rate(&self) -> Option<f64> {
    (self.total > 0).then(|| self.matches as f64 * 100.0 / self.total as f64)
  }
}

/// Results of a batch, sorted by case id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
  pub results: Vec<CaseResult>,
  /// Vectors that name a configuration that was not loaded.
  pub orphans: Vec<CaseId>,
}

impl Validation {
  #[must_use]
  pub fn tally(&self) -> Tally {
    let matches = self.results.iter().filter(|r| r.matches()).count();
    Tally {
      total: self.results.len(),
      matches,
      mismatches: self.results.len() - matches,
    }
  }

  #[must_use]
  pub fn all_match(&self) -> bool {
    self.results.iter().all(CaseResult::matches)
  }

  /// At least one case ran, every case matched and no vector was orphaned.
  #[must_use]
  pub fn passed(&self) -> bool {
    !self.results.is_empty() && self.orphans.is_empty() && self.all_match()
  }

  pub fn mismatches(&self) -> impl Iterator<Item = &CaseResult> {
    self.results.iter().filter(|r| !r.matches())
  }
}

/// Checksum every vector with both engines and the oracle.
///
/// # Errors
///
/// [`Error::ThreadPool`] if a dedicated pool cannot be started.
pub fn validate(
  configs: &BTreeMap<u32, CrcParams>,
  vectors: &BTreeMap<CaseId, Vec<u8>>,
  cache: &TableCache,
  threads: Option<usize>,
) -> Result<Validation, Error> {
  let mut orphans = Vec::new();
  let mut jobs = Vec::with_capacity(vectors.len());
  for (id, data) in vectors {
    match configs.get(&id.config) {
      Some(params) => jobs.push((*id, params, oracle(params), data.as_slice())),
      None => {
        warn!("{id}: no configuration {}", id.config);
        orphans.push(*id);
      }
    }
  }
  for id in configs.keys() {
    if !vectors.keys().any(|case| case.config == *id) {
      warn!("configuration {id} has no vectors");
    }
  }

  let results = run_pooled(threads, || {
    jobs
      .par_iter()
      .map(|&(id, params, oracle, data)| {
        let table = cache.get_or_build(params);
        Ok(CaseResult {
          id,
          width: params.width(),
          len: data.len(),
          reference: reference_checksum(data, params),
          table: table_checksum(data, params, &table)?,
          oracle: oracle.checksum(data),
        })
      })
      .collect::<Result<Vec<_>, CrcError>>()
  })?;
  let mut results = results?;
  results.sort_unstable_by_key(|r| r.id);

  let validation = Validation { results, orphans };
  let tally = validation.tally();
  info!(
    "validated {} cases: {} match, {} mismatch ({} tables built)",
    tally.total,
    tally.matches,
    tally.mismatches,
    cache.builds()
  );
  if validation.results.is_empty() {
    warn!("no case was validated");
  }
  Ok(validation)
}

/// Load `crc_config_*` files from `settings` and software vectors from
/// `input`, then [`validate`].
///
/// # Errors
///
/// Any load failure, or see [`validate`].
pub fn validate_dirs(settings: &Path, input: &Path, threads: Option<usize>) -> Result<Validation, Error> {
  let configs = load_config_dir(settings)?;
  let vectors = load_software_vectors(input)?;
  info!("loaded {} configs and {} vectors", configs.len(), vectors.len());
  validate(&configs, &vectors, &TableCache::new(), threads)
}

/// Write one `result_c<i>_t<n>.dat` per case plus [`SUMMARY_REPORT`] into
/// `dir`, creating it if needed. Returns the summary path.
///
/// # Errors
///
/// The first failed directory creation or write.
pub fn write_results(validation: &Validation, dir: &Path) -> Result<PathBuf, Error> {
  fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

  for r in &validation.results {
    let path = dir.join(FileKind::Result.file_name(r.id));
    let text = format!(
      "Reference CRC: 0x{:X}\nTable CRC: 0x{:X}\nOracle CRC: 0x{:X}\nMatch: {}\n",
      r.reference,
      r.table,
      r.oracle,
      r.matches()
    );
    fs::write(&path, text).map_err(|e| Error::io(&path, e))?;
  }

  let path = dir.join(SUMMARY_REPORT);
  let mut text = Vec::new();
  Report::new(&mut text, OutputFormat::Summary)
    .write_validation(validation)
    .map_err(|e| Error::io(&path, e))?;
  fs::write(&path, text).map_err(|e| Error::io(&path, e))?;
  Ok(path)
}
