//! End-to-end runs over real directories: generate, validate, compare.

use std::{
  fs,
  path::{Path, PathBuf},
};

use crcmodel::{CrcParams, ReflectionMode, reference_checksum};
use crcverify::{
  config::{ConfigFormat, load_config_dir, write_config},
  data::{CaseId, FileKind, load_rtl_inputs, load_rtl_outputs, load_software_vectors},
  generate::{HARDWARE_MANIFEST, PlanLayout, PlanOptions, SOFTWARE_MANIFEST, generate},
  rtl::{ComparisonTally, ConfigFilter, RtlDirs, Verdict, compare_dirs},
  validate::{SUMMARY_REPORT, validate_dirs, write_results},
};

/// A fresh directory under the system temp dir, unique per test and process.
fn scratch(name: &str) -> PathBuf {
  let dir = std::env::temp_dir().join(format!("crcverify-{name}-{}", std::process::id()));
  let _ = fs::remove_dir_all(&dir);
  fs::create_dir_all(&dir).unwrap();
  dir
}

fn count_files(dir: &Path, suffix: &str) -> usize {
  fs::read_dir(dir)
    .unwrap()
    .filter_map(Result::ok)
    .filter(|e| e.file_name().to_string_lossy().ends_with(suffix))
    .count()
}

#[test]
fn software_plan_validates_cleanly() {
  let root = scratch("software");
  let layout = PlanLayout::under(&root);
  let plan = generate(&PlanOptions::software(2024)).unwrap();
  let manifest_path = plan.write(&layout).unwrap();

  assert_eq!(manifest_path, layout.input.join(SOFTWARE_MANIFEST));
  assert_eq!(count_files(&layout.settings, ".json"), 4);
  assert_eq!(count_files(&layout.input, ".dat"), 20);

  // The loaders read back exactly what was generated.
  let configs = load_config_dir(&layout.settings).unwrap();
  let expected: Vec<_> = plan.configs.iter().map(|c| (c.id, c.params)).collect();
  assert_eq!(configs.into_iter().collect::<Vec<_>>(), expected);
  let vectors = load_software_vectors(&layout.input).unwrap();
  assert_eq!(vectors.len(), plan.cases.len());
  for case in &plan.cases {
    assert_eq!(vectors[&case.id], case.data, "{}", case.id);
  }

  let validation = validate_dirs(&layout.settings, &layout.input, Some(2)).unwrap();
  assert_eq!(validation.results.len(), 20);
  assert!(validation.passed());
  assert!(validation.orphans.is_empty());

  let out = root.join("output");
  let summary = write_results(&validation, &out).unwrap();
  assert_eq!(summary, out.join(SUMMARY_REPORT));
  let text = fs::read_to_string(&summary).unwrap();
  assert!(text.contains("Total Tests: 20\nMatches: 20\nMismatches: 0\nSuccess Rate: 100.00%\n"), "{text}");

  let first = fs::read_to_string(out.join(FileKind::Result.file_name(CaseId::new(1, 1)))).unwrap();
  assert!(first.contains("\nOracle CRC: 0x"), "{first}");
  assert!(first.ends_with("Match: true\n"), "{first}");

  let manifest: serde_json::Value = serde_json::from_str(&fs::read_to_string(manifest_path).unwrap()).unwrap();
  assert_eq!(manifest["total_configs"], 4);
  assert_eq!(manifest["total_tests"], 20);

  fs::remove_dir_all(&root).unwrap();
}

#[test]
fn hardware_plan_compares_against_rtl_outputs() {
  let root = scratch("hardware");
  let layout = PlanLayout::under(&root);
  let plan = generate(&PlanOptions::hardware(7)).unwrap();
  plan.write(&layout).unwrap();
  assert!(layout.input.join(HARDWARE_MANIFEST).is_file());
  assert_eq!(count_files(&layout.settings, ".vh"), 4);

  let inputs = load_rtl_inputs(&layout.input).unwrap();
  assert_eq!(inputs.len(), 16);
  assert!(inputs.values().all(|i| i.length_matches()));

  // Stand in for a simulator: correct outputs for every case but two.
  let configs = load_config_dir(&layout.settings).unwrap();
  let rtl_dir = root.join("rtl_data");
  fs::create_dir_all(&rtl_dir).unwrap();
  let wrong = CaseId::new(2, 1);
  let absent = CaseId::new(4, 4);
  for (id, input) in &inputs {
    if *id == absent {
      continue;
    }
    let mut crc = reference_checksum(&input.data, &configs[&id.config]);
    if *id == wrong {
      crc ^= 1;
    }
    fs::write(rtl_dir.join(FileKind::RtlOutput.file_name(*id)), format!("{crc:x}\n")).unwrap();
  }

  let model_dir = root.join("model_data");
  let dirs = RtlDirs {
    settings: &layout.settings,
    input: &layout.input,
    rtl_output: &rtl_dir,
    model_output: &model_dir,
  };
  let rows = compare_dirs(&dirs, &ConfigFilter::All, None).unwrap();
  let tally = ComparisonTally::of(&rows);
  assert_eq!((tally.total, tally.matches, tally.mismatches, tally.missing), (16, 14, 1, 1));
  assert!(!tally.passed());
  assert_eq!(rows.iter().find(|r| r.id == wrong).unwrap().verdict, Verdict::Mismatch);
  let missing = rows.iter().find(|r| r.id == absent).unwrap();
  assert_eq!((missing.verdict, missing.rtl), (Verdict::Missing, None));

  // Model outputs are written in the simulator's own format.
  let model = load_rtl_outputs(&model_dir).unwrap();
  assert_eq!(model.len(), 16);
  let text = fs::read_to_string(model_dir.join(FileKind::RtlOutput.file_name(CaseId::new(1, 1)))).unwrap();
  assert_eq!(text, text.to_lowercase());

  // Restricting to the standard-mode configuration leaves only matches.
  let only = compare_dirs(&dirs, &ConfigFilter::from_ids(vec![1]), Some(1)).unwrap();
  assert_eq!(only.len(), 4);
  assert!(ComparisonTally::of(&only).passed());

  fs::remove_dir_all(&root).unwrap();
}

#[test]
fn hardware_configs_cover_every_mode() {
  let root = scratch("modes");
  let settings = root.join("settings");
  fs::create_dir_all(&settings).unwrap();
  for (id, mode) in (1u32..).zip(ReflectionMode::ALL) {
    let p = CrcParams::builder(16).poly(0x1021).init(0xFFFF).mode(mode).build().unwrap();
    write_config(&settings, id, &p, ConfigFormat::Verilog).unwrap();
  }
  let configs = load_config_dir(&settings).unwrap();
  let checks: Vec<u64> = configs.values().map(CrcParams::check).collect();
  assert_eq!(checks, [0x29B1, 0x89F6, 0x8D94, 0x6F91]);
  fs::remove_dir_all(&root).unwrap();
}

#[test]
fn rejected_config_names_file_and_field() {
  let root = scratch("rejected");
  fs::write(
    root.join("crc_config_1.json"),
    r#"{"width": 12, "poly": 7, "init": 0, "rev": false, "xorout": 0}"#,
  )
  .unwrap();
  let err = load_config_dir(&root).unwrap_err();
  let msg = err.to_string();
  assert!(msg.contains("crc_config_1.json"), "{msg}");
  assert!(msg.contains("width"), "{msg}");
  fs::remove_dir_all(&root).unwrap();
}

#[test]
fn bad_vector_names_token() {
  let root = scratch("badvector");
  fs::write(root.join("test_data_c1_t1.dat"), "00 11 XY").unwrap();
  let msg = load_software_vectors(&root).unwrap_err().to_string();
  assert!(msg.contains("test_data_c1_t1.dat"), "{msg}");
  assert!(msg.contains("byte 2"), "{msg}");
  assert!(msg.contains("XY"), "{msg}");
  fs::remove_dir_all(&root).unwrap();
}

#[test]
fn empty_directories_do_not_pass() {
  let root = scratch("empty");
  let settings = root.join("settings");
  let input = root.join("input");
  fs::create_dir_all(&settings).unwrap();
  fs::create_dir_all(&input).unwrap();

  let nothing = validate_dirs(&settings, &input, None).unwrap();
  assert!(nothing.results.is_empty());
  assert!(!nothing.passed());

  // Vectors whose configuration is absent are orphans, not passes.
  fs::write(input.join("test_data_c9_t1.dat"), "01 02 03").unwrap();
  let orphaned = validate_dirs(&settings, &input, None).unwrap();
  assert_eq!(orphaned.orphans, [CaseId::new(9, 1)]);
  assert!(!orphaned.passed());

  let out = root.join("output");
  let text = fs::read_to_string(write_results(&orphaned, &out).unwrap()).unwrap();
  assert!(text.contains("Success Rate: n/a\n"), "{text}");
  assert!(text.contains("  c9_t1\n"), "{text}");
  fs::remove_dir_all(&root).unwrap();
}

#[test]
fn json_config_shadows_a_broken_header() {
  let root = scratch("shadow");
  write_config(&root, 1, &CrcParams::CRC_32_ISO_HDLC, ConfigFormat::Json).unwrap();
  fs::write(
    root.join("crc_config_1.vh"),
    "`define CRC_WIDTH 'd32\n`define CRC_POLY garbage\n",
  )
  .unwrap();
  write_config(&root, 2, &CrcParams::CRC_16_XMODEM, ConfigFormat::Verilog).unwrap();

  // The header for id 1 is never parsed, whatever order the directory lists.
  for _ in 0..8 {
    let configs = load_config_dir(&root).unwrap();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[&1], CrcParams::CRC_32_ISO_HDLC);
    assert_eq!(configs[&2], CrcParams::CRC_16_XMODEM);
  }

  // A broken winner is still reported.
  fs::write(root.join("crc_config_1.json"), "{}").unwrap();
  let msg = load_config_dir(&root).unwrap_err().to_string();
  assert!(msg.contains("crc_config_1.json"), "{msg}");
  fs::remove_dir_all(&root).unwrap();
}
