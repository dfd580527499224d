//! Test-plan generation, batch validation and RTL comparison for `crcmodel`.
//!
//! Validation cross-checks the two `crcmodel` engines and an independent
//! computation from the `crc` crate.
//!
//! The tools work on a directory layout shared with RTL testbenches:
//!
//! ```text
//! settings/crc_config_<i>.json           software configuration (JSON)
//! settings/crc_config_<i>.vh             hardware configuration (Verilog header)
//! input/test_data_c<i>_t<n>.dat          software vector, hex bytes
//! input/test_data_c<i>_t<n>_input.dat    hardware vector, length line + hex bytes
//! input/generation_summary.json          software plan manifest
//! input/rtl_generation_summary.json      hardware plan manifest
//! rtl_data/test_data_c<i>_t<n>_output.dat    simulator checksum, lowercase hex
//! model_data/test_data_c<i>_t<n>_output.dat  model checksum, lowercase hex
//! output/result_c<i>_t<n>.dat            per-case validation result
//! output/summary_report.txt              validation summary
//! ```
//!
//! | Step | Module | Entry point |
//! |------|--------|-------------|
//! | Generate a plan | [`generate`] | [`generate::generate`], [`generate::TestPlan::write`] |
//! | Validate engines | [`validate`], [`oracle`] | [`validate::validate_dirs`], [`validate::write_results`] |
//! | Compare with RTL | [`rtl`] | [`rtl::compare_dirs`] |
//! | Print results | [`report`] | [`report::Report`] |
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use crcmodel::{CrcParams, TableCache};
//! use crcverify::{config::parse_verilog, data::CaseId, validate::validate};
//!
//! let params = parse_verilog("`define CRC_WIDTH 'd32\n`define CRC_POLY 'h104c11db7\n\
//!   `define CRC_INIT 'hffffffff\n`define CRC_REFIN 'd1\n`define CRC_REFOUT 'd1\n\
//!   `define CRC_XOROUT 'hffffffff\n")?;
//! assert_eq!(params, CrcParams::CRC_32_ISO_HDLC);
//!
//! let configs = BTreeMap::from([(1, params)]);
//! let vectors = BTreeMap::from([(CaseId::new(1, 1), b"123456789".to_vec())]);
//! let validation = validate(&configs, &vectors, &TableCache::new(), None)?;
//! assert!(validation.passed());
//! assert_eq!(validation.results[0].oracle, 0xCBF4_3926);
//! assert_eq!(validation.results[0].reference, 0xCBF4_3926);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]

pub mod config;
pub mod data;
mod error;
pub mod generate;
pub mod oracle;
pub mod report;
pub mod rtl;
pub mod settings;
pub mod validate;

pub use error::{ConfigError, DataError, Error};
pub use report::{OutputFormat, Report};
pub use settings::Settings;
