//! Command-line front end for the CRC model and its verification tools.
//!
//! ```text
//! crc-verify check --algorithm CRC-32/ISO-HDLC 123456789
//! crc-verify check --width 16 --poly 0x1021 --init 0xFFFF --hex "31 32 33"
//! crc-verify table --config settings/crc_config_1.vh
//! crc-verify catalog --format tsv
//! crc-verify generate hardware --out dataset --seed 7
//! crc-verify validate --settings dataset/settings --input dataset/input --output dataset/output
//! crc-verify compare-rtl --settings rtl/settings --input dataset/input --rtl-output dataset/rtl_data
//! ```
//!
//! Exit status is 0 when everything matched, 1 on any mismatch or missing
//! result, and 2 on errors.

use std::{
  fs,
  io::{self, Write},
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use crcmodel::{CHECK_INPUT, CrcParams, LookupTable, ReflectionMode, catalog, reference_checksum, table_checksum};
use crcverify::{
  OutputFormat, Report, Settings,
  config::{load_config, parse_literal, with_mode},
  data::parse_hex_bytes,
  generate::{PlanKind, PlanLayout, PlanOptions, generate},
  oracle::oracle_checksum,
  rtl::{ComparisonTally, ConfigFilter, RtlDirs, compare_dirs},
  validate::{validate_dirs, write_results},
};
use log::info;
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "crc-verify", version)]
#[command(about = "Parameterised CRC model, test-plan generator and RTL comparator", long_about = None)]
struct Cli {
  /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  /// Report format: summary, json or tsv [env: CRCVERIFY_FORMAT]
  #[arg(long, global = true, value_parser = parse_format)]
  format: Option<OutputFormat>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
  /// Checksum one input with both engines and the `crc` crate.
  Check {
    #[command(flatten)]
    params: ParamArgs,

    /// Input as whitespace-separated hex bytes.
    #[arg(long, conflicts_with_all = ["file", "text"])]
    hex: Option<String>,

    /// Input read from a file.
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Input as text. Defaults to the check string "123456789".
    text: Option<String>,
  },

  /// Print the 256-entry lookup table.
  Table {
    #[command(flatten)]
    params: ParamArgs,

    /// Entries per line.
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..=256))]
    columns: u16,
  },

  /// List catalogue algorithms and verify their check values.
  Catalog,

  /// Generate configurations and test vectors.
  Generate {
    #[arg(value_enum)]
    kind: KindArg,

    /// Root directory; files go to <OUT>/settings and <OUT>/input.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Configurations (software) or configurations per reflection mode (hardware).
    #[arg(long)]
    configs: Option<usize>,

    /// Vectors per configuration.
    #[arg(long)]
    tests: Option<usize>,

    #[arg(long)]
    min_len: Option<usize>,

    #[arg(long)]
    max_len: Option<usize>,

    /// Random seed [env: CRCVERIFY_SEED]
    #[arg(long, value_parser = parse_number)]
    seed: Option<u64>,
  },

  /// Check the table engine against the reference engine for every vector.
  Validate {
    #[arg(long, default_value = "settings")]
    settings: PathBuf,

    #[arg(long, default_value = "input")]
    input: PathBuf,

    /// Where result files and summary_report.txt are written.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Worker threads [env: CRCVERIFY_THREADS]
    #[arg(long)]
    threads: Option<usize>,
  },

  /// Compare RTL simulation outputs with the model.
  CompareRtl {
    #[arg(long, default_value = "settings")]
    settings: PathBuf,

    #[arg(long, default_value = "input")]
    input: PathBuf,

    #[arg(long, default_value = "rtl_data")]
    rtl_output: PathBuf,

    #[arg(long, default_value = "model_data")]
    model_output: PathBuf,

    /// Only compare these configuration ids. Repeatable.
    #[arg(long = "config")]
    configs: Vec<u32>,

    /// Worker threads [env: CRCVERIFY_THREADS]
    #[arg(long)]
    threads: Option<usize>,
  },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum KindArg {
  Software,
  Hardware,
}

/// One way of naming a parameter set.
#[derive(Debug, Args)]
struct ParamArgs {
  /// Catalogue name, e.g. CRC-32/ISO-HDLC or CRC-16/CCITT-FALSE.
  #[arg(long, conflicts_with_all = ["config", "width"])]
  algorithm: Option<String>,

  /// Configuration file (.json or .vh).
  #[arg(long, conflicts_with = "width")]
  config: Option<PathBuf>,

  /// Register width in bits: 8, 16, ..., 64.
  #[arg(long, requires = "poly")]
  width: Option<u32>,

  /// Polynomial, top bit optional (0x1021, 'h11021, 4129).
  #[arg(long, value_parser = parse_number, conflicts_with_all = ["algorithm", "config"])]
  poly: Option<u64>,

  #[arg(long, value_parser = parse_number, default_value = "0", conflicts_with_all = ["algorithm", "config"])]
  init: u64,

  #[arg(long, value_parser = parse_number, default_value = "0", conflicts_with_all = ["algorithm", "config"])]
  xorout: u64,

  /// Reflect input bytes.
  #[arg(long, conflicts_with_all = ["mode", "algorithm", "config"])]
  refin: bool,

  /// Reflect the final register.
  #[arg(long, conflicts_with_all = ["mode", "algorithm", "config"])]
  refout: bool,

  /// Reflection mode: standard, mixed_one, mixed_two or reflect. Overrides a named algorithm or config file.
  #[arg(long, value_parser = parse_mode)]
  mode: Option<ReflectionMode>,
}

impl ParamArgs {
  fn resolve(&self) -> Result<CrcParams> {
    let named = if let Some(name) = &self.algorithm {
      let entry = catalog::find(name).with_context(|| format!("unknown algorithm {name:?}; see `crc-verify catalog`"))?;
      Some(entry.params)
    } else if let Some(path) = &self.config {
      Some(load_config(path)?)
    } else {
      None
    };
    if let Some(params) = named {
      return Ok(self.mode.map_or(params, |mode| with_mode(&params, mode)));
    }
    let Some(width) = self.width else {
      bail!("no parameters: pass --algorithm, --config or --width/--poly");
    };
    let (refin, refout) = self.mode.map_or((self.refin, self.refout), ReflectionMode::flags);
    let poly = self.poly.unwrap_or_default();
    Ok(CrcParams::new(width, poly, self.init, refin, refout, self.xorout)?)
  }
}

fn parse_number(s: &str) -> Result<u64, String> {
  parse_literal(s)
    .map(|v| v as u64)
    .ok_or_else(|| format!("{s:?} is not a number"))
}

fn parse_mode(s: &str) -> Result<ReflectionMode, String> {
  ReflectionMode::parse(s).ok_or_else(|| format!("{s:?} is not one of standard, mixed_one, mixed_two, reflect"))
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
  OutputFormat::parse(s).ok_or_else(|| format!("{s:?} is not one of summary, json, tsv"))
}

fn init_logging(verbose: u8) {
  let level = match verbose {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
    .format_timestamp(None)
    .init();
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_check(params: &CrcParams, data: &[u8], format: OutputFormat) -> Result<bool> {
  let table = LookupTable::build(params);
  let reference = reference_checksum(data, params);
  let fast = table_checksum(data, params, &table)?;
  let oracle = oracle_checksum(data, params);
  let ok = reference == fast && reference == oracle;

  let mut out = io::stdout().lock();
  match format {
    OutputFormat::Json => {
      let doc = json!({
        "params": {
          "width": params.width(),
          "poly": params.poly(),
          "init": params.init(),
          "refin": params.refin(),
          "refout": params.refout(),
          "xorout": params.xorout(),
        },
        "length": data.len(),
        "reference": reference,
        "table": fast,
        "oracle": oracle,
        "match": ok,
      });
      serde_json::to_writer_pretty(&mut out, &doc)?;
      writeln!(out)?;
    }
    OutputFormat::Tsv => {
      writeln!(out, "length\treference\ttable\toracle\tmatch")?;
      writeln!(
        out,
        "{}\t0x{}\t0x{}\t0x{}\t{ok}",
        data.len(),
        params.format_checksum(reference),
        params.format_checksum(fast),
        params.format_checksum(oracle)
      )?;
    }
    OutputFormat::Summary => {
      writeln!(out, "params:    {params}")?;
      writeln!(out, "mode:      {}", params.reflection_mode())?;
      writeln!(out, "length:    {} bytes", data.len())?;
      writeln!(out, "reference: 0x{}", params.format_checksum(reference))?;
      writeln!(out, "table:     0x{}", params.format_checksum(fast))?;
      writeln!(out, "oracle:    0x{}", params.format_checksum(oracle))?;
      if !ok {
        writeln!(out, "MISMATCH")?;
      }
    }
  }
  Ok(ok)
}

fn cmd_table(params: &CrcParams, columns: usize) -> Result<()> {
  let table = LookupTable::build(params);
  let mut out = io::stdout().lock();
  writeln!(out, "// {params}")?;
  let entries: Vec<String> = table.iter().map(|&e| format!("0x{}", params.format_checksum(e))).collect();
  for row in entries.chunks(columns) {
    writeln!(out, "{},", row.join(", "))?;
  }
  Ok(())
}

fn cmd_generate(kind: KindArg, out: &Path, overrides: [Option<usize>; 4], seed: u64) -> Result<()> {
  let mut options = match kind {
    KindArg::Software => PlanOptions::software(seed),
    KindArg::Hardware => PlanOptions::hardware(seed),
  };
  let [configs, tests, min_len, max_len] = overrides;
  options.configs = configs.unwrap_or(options.configs);
  options.tests = tests.unwrap_or(options.tests);
  options.min_len = min_len.unwrap_or(options.min_len);
  options.max_len = max_len.unwrap_or(options.max_len);

  let plan = generate(&options)?;
  let manifest = plan
    .write(&PlanLayout::under(out))
    .with_context(|| format!("writing plan under {}", out.display()))?;
  let kind = match plan.kind {
    PlanKind::Software => "software",
    PlanKind::Hardware => "hardware",
  };
  println!(
    "{kind} plan: {} configs, {} vectors, seed {seed}; manifest {}",
    plan.configs.len(),
    plan.cases.len(),
    manifest.display()
  );
  Ok(())
}

fn run(cli: Cli) -> Result<bool> {
  let settings = Settings::from_env().with_format(cli.format);
  let format = settings.format;

  match cli.command {
    Commands::Check {
      params,
      hex,
      file,
      text,
    } => {
      let params = params.resolve()?;
      let data = match (hex, file, text) {
        (Some(hex), _, _) => parse_hex_bytes(&hex).context("parsing --hex")?,
        (_, Some(path), _) => fs::read(&path).with_context(|| format!("reading {}", path.display()))?,
        (_, _, Some(text)) => text.into_bytes(),
        _ => CHECK_INPUT.to_vec(),
      };
      cmd_check(&params, &data, format)
    }

    Commands::Table { params, columns } => {
      cmd_table(&params.resolve()?, usize::from(columns))?;
      Ok(true)
    }

    Commands::Catalog => {
      Report::new(io::stdout().lock(), format).write_catalog(catalog::ENTRIES)?;
      Ok(true)
    }

    Commands::Generate {
      kind,
      out,
      configs,
      tests,
      min_len,
      max_len,
      seed,
    } => {
      let seed = settings.with_seed(seed).seed;
      cmd_generate(kind, &out, [configs, tests, min_len, max_len], seed)?;
      Ok(true)
    }

    Commands::Validate {
      settings: settings_dir,
      input,
      output,
      threads,
    } => {
      let threads = settings.with_threads(threads).threads;
      let validation = validate_dirs(&settings_dir, &input, threads)
        .with_context(|| format!("validating {} against {}", input.display(), settings_dir.display()))?;
      if let Some(dir) = output {
        let summary = write_results(&validation, &dir)?;
        info!("wrote {}", summary.display());
      }
      Report::new(io::stdout().lock(), format).write_validation(&validation)?;
      Ok(validation.passed())
    }

    Commands::CompareRtl {
      settings: settings_dir,
      input,
      rtl_output,
      model_output,
      configs,
      threads,
    } => {
      let threads = settings.with_threads(threads).threads;
      let dirs = RtlDirs {
        settings: &settings_dir,
        input: &input,
        rtl_output: &rtl_output,
        model_output: &model_output,
      };
      let rows = compare_dirs(&dirs, &ConfigFilter::from_ids(configs), threads).context("comparing RTL outputs")?;
      Report::new(io::stdout().lock(), format).write_comparison(&rows)?;
      Ok(ComparisonTally::of(&rows).passed())
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match run(cli) {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::from(2)
    }
  }
}

#[cfg(test)]
mod tests {
  use clap::{CommandFactory, error::ErrorKind};

  use super::*;

  fn params_of(args: &[&str]) -> Result<CrcParams> {
    let cli = Cli::try_parse_from(["crc-verify", "check"].iter().chain(args))?;
    match cli.command {
      Commands::Check { params, .. } => params.resolve(),
      other => bail!("parsed {other:?}"),
    }
  }

  fn conflict(args: &[&str]) -> bool {
    let argv = ["crc-verify", "check"].iter().chain(args);
    matches!(Cli::try_parse_from(argv), Err(e) if e.kind() == ErrorKind::ArgumentConflict)
  }

  #[test]
  fn command_definition_is_consistent() {
    Cli::command().debug_assert();
  }

  #[test]
  fn explicit_parameters() {
    let p = params_of(&["--width", "16", "--poly", "'h11021", "--init", "0xFFFF"]).unwrap();
    assert_eq!(p, CrcParams::CRC_16_IBM_3740);

    let p = params_of(&["--width", "8", "--poly", "7", "--refin", "--refout"]).unwrap();
    assert_eq!(p.reflection_mode(), ReflectionMode::Reflect);
    assert_eq!(p.width(), 8);
  }

  #[test]
  fn mode_overrides_a_named_algorithm() {
    let p = params_of(&["--algorithm", "CRC-16/CCITT-FALSE", "--mode", "mixed_two"]).unwrap();
    assert_eq!(p.check(), 0x8D94);
    assert!(params_of(&["--algorithm", "no-such-crc"]).is_err());
  }

  #[test]
  fn field_flags_conflict_with_named_parameters() {
    let flags: [&[&str]; 5] = [
      &["--poly", "0x7"],
      &["--init", "1"],
      &["--xorout", "1"],
      &["--refin"],
      &["--refout"],
    ];
    for source in [["--algorithm", "CRC-32/ISO-HDLC"], ["--config", "crc_config_1.json"]] {
      for flag in flags {
        let args: Vec<&str> = source.iter().chain(flag).copied().collect();
        assert!(conflict(&args), "{args:?}");
      }
    }
    assert!(conflict(&["--width", "8", "--poly", "7", "--refin", "--mode", "reflect"]));
  }
}
