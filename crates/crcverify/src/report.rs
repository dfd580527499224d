//! Output formatters for validation and comparison results.
//!
//! - [`OutputFormat::Summary`]: human-readable summary (default)
//! - [`OutputFormat::Json`]: JSON for programmatic use
//! - [`OutputFormat::Tsv`]: tab-separated values for spreadsheets
//!
//! The summary form of a validation is also what
//! [`write_results`](crate::validate::write_results) stores as
//! `summary_report.txt`.

use std::io::{self, Write};

use crcmodel::{CHECK_INPUT, LookupTable, catalog::CatalogEntry, reference_checksum, table_checksum};
use serde_json::json;

use crate::{
  oracle::oracle_checksum,
  rtl::{Comparison, ComparisonTally, Verdict},
  validate::Validation,
};

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
  /// Human-readable summary (default).
  #[default]
  Summary,

  /// JSON format for programmatic use.
  Json,

  /// Tab-separated values.
  Tsv,
}

impl OutputFormat {
  /// Parse format from string.
  #[must_use]
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "summary" | "text" | "human" => Some(Self::Summary),
      "json" => Some(Self::Json),
      "tsv" | "tab" => Some(Self::Tsv),
      _ => None,
    }
  }
}

fn rate(rate: Option<f64>) -> String {
  rate.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}%"))
}

fn hex(value: Option<u64>) -> String {
  value.map_or_else(|| "-".to_string(), |v| format!("0x{v:X}"))
}

/// Report generator over any writer.
#[derive(Debug)]
pub struct Report<W: Write> {
  writer: W,
  format: OutputFormat,
}

impl<W: Write> Report<W> {
  /// Create a new report generator.
  pub fn new(writer: W, format: OutputFormat) -> Self {
    Self { writer, format }
  }

  // ───────────────────────────────────────────────────────────────────────────
  // Validation
  // ───────────────────────────────────────────────────────────────────────────

  /// Write a batch validation.
  pub fn write_validation(&mut self, validation: &Validation) -> io::Result<()> {
    match self.format {
      OutputFormat::Summary => self.write_validation_summary(validation),
      OutputFormat::Json => {
        let doc = json!({
          "tally": validation.tally(),
          "success_rate": validation.tally().success_rate(),
          "results": validation.results.iter().map(|r| json!({
            "id": r.id.to_string(),
            "config_id": r.id.config,
            "test_id": r.id.test,
            "width": r.width,
            "length": r.len,
            "reference": r.reference,
            "table": r.table,
            "oracle": r.oracle,
            "match": r.matches(),
          })).collect::<Vec<_>>(),
          "orphans": validation.orphans.iter().map(ToString::to_string).collect::<Vec<_>>(),
          "passed": validation.passed(),
        });
        self.write_json(&doc)
      }
      OutputFormat::Tsv => {
        writeln!(self.writer, "case\twidth\tlength\treference\ttable\toracle\tmatch")?;
        for r in &validation.results {
          writeln!(
            self.writer,
            "{}\t{}\t{}\t0x{:X}\t0x{:X}\t0x{:X}\t{}",
            r.id,
            r.width,
            r.len,
            r.reference,
            r.table,
            r.oracle,
            r.matches()
          )?;
        }
        Ok(())
      }
    }
  }

  fn write_validation_summary(&mut self, validation: &Validation) -> io::Result<()> {
    let tally = validation.tally();
    writeln!(self.writer, "CRC Validation Summary")?;
    writeln!(self.writer, "======================")?;
    writeln!(self.writer, "Total Tests: {}", tally.total)?;
    writeln!(self.writer, "Matches: {}", tally.matches)?;
    writeln!(self.writer, "Mismatches: {}", tally.mismatches)?;
    writeln!(self.writer, "Success Rate: {}", rate(tally.success_rate()))?;

    if tally.mismatches > 0 {
      writeln!(self.writer)?;
      writeln!(self.writer, "Mismatch Details:")?;
      for r in validation.mismatches() {
        writeln!(self.writer, "Config {} Test {}:", r.id.config, r.id.test)?;
        writeln!(self.writer, "  Reference: 0x{:X}", r.reference)?;
        writeln!(self.writer, "  Table: 0x{:X}", r.table)?;
        writeln!(self.writer, "  Oracle: 0x{:X}", r.oracle)?;
        writeln!(self.writer)?;
      }
    }

    if !validation.orphans.is_empty() {
      writeln!(self.writer)?;
      writeln!(self.writer, "Vectors without a configuration:")?;
      for id in &validation.orphans {
        writeln!(self.writer, "  {id}")?;
      }
    }

    if tally.total == 0 {
      writeln!(self.writer)?;
      writeln!(self.writer, "No test cases were validated.")?;
    }
    Ok(())
  }

  // ───────────────────────────────────────────────────────────────────────────
  // RTL Comparison
  // ───────────────────────────────────────────────────────────────────────────

  /// Write an RTL comparison.
  pub fn write_comparison(&mut self, rows: &[Comparison]) -> io::Result<()> {
    let tally = ComparisonTally::of(rows);
    match self.format {
      OutputFormat::Summary => {
        writeln!(self.writer, "CRC RTL Comparison Summary")?;
        writeln!(self.writer, "==========================")?;
        writeln!(self.writer, "Total Tests: {}", tally.total)?;
        writeln!(self.writer, "Matches: {}", tally.matches)?;
        writeln!(self.writer, "Mismatches: {}", tally.mismatches)?;
        writeln!(self.writer, "Missing: {}", tally.missing)?;
        writeln!(self.writer, "Success Rate: {}", rate(tally.success_rate()))?;

        let failed: Vec<&Comparison> = rows.iter().filter(|r| r.verdict != Verdict::Match).collect();
        if !failed.is_empty() {
          writeln!(self.writer)?;
          writeln!(self.writer, "Failures:")?;
          for row in failed {
            writeln!(self.writer, "{} [{}]:", row.id, row.verdict.as_str())?;
            writeln!(self.writer, "  Model: {}", hex(row.model))?;
            writeln!(self.writer, "  RTL: {}", hex(row.rtl))?;
          }
        }
        Ok(())
      }
      OutputFormat::Json => {
        let doc = json!({
          "tally": tally,
          "success_rate": tally.success_rate(),
          "results": rows,
        });
        self.write_json(&doc)
      }
      OutputFormat::Tsv => {
        writeln!(self.writer, "case\tmodel\trtl\tverdict")?;
        for row in rows {
          writeln!(
            self.writer,
            "{}\t{}\t{}\t{}",
            row.id,
            hex(row.model),
            hex(row.rtl),
            row.verdict.as_str()
          )?;
        }
        Ok(())
      }
    }
  }

  // ───────────────────────────────────────────────────────────────────────────
  // Catalogue
  // ───────────────────────────────────────────────────────────────────────────

  /// Write catalogue entries with the check results of both engines and the oracle.
  pub fn write_catalog(&mut self, entries: &[CatalogEntry]) -> io::Result<()> {
    let rows: Vec<CatalogRow<'_>> = entries.iter().map(CatalogRow::new).collect();
    match self.format {
      OutputFormat::Summary => {
        for row in &rows {
          let p = &row.entry.params;
          let status = if row.ok() { "ok" } else { "FAIL" };
          writeln!(
            self.writer,
            "{:<18} check=0x{} [{status}]  {p}",
            row.entry.name,
            p.format_checksum(row.entry.check)
          )?;
        }
        Ok(())
      }
      OutputFormat::Json => {
        let doc: Vec<_> = rows
          .iter()
          .map(|row| {
            let p = &row.entry.params;
            json!({
              "name": row.entry.name,
              "aliases": row.entry.aliases,
              "width": p.width(),
              "poly": p.poly(),
              "init": p.init(),
              "refin": p.refin(),
              "refout": p.refout(),
              "xorout": p.xorout(),
              "check": row.entry.check,
              "reference": row.reference,
              "table": row.table,
              "oracle": row.oracle,
              "ok": row.ok(),
            })
          })
          .collect();
        self.write_json(&serde_json::Value::Array(doc))
      }
      OutputFormat::Tsv => {
        writeln!(self.writer, "name\twidth\tpoly\tinit\trefin\trefout\txorout\tcheck\tok")?;
        for row in &rows {
          let p = &row.entry.params;
          writeln!(
            self.writer,
            "{}\t{}\t0x{}\t0x{}\t{}\t{}\t0x{}\t0x{}\t{}",
            row.entry.name,
            p.width(),
            p.format_checksum(p.poly()),
            p.format_checksum(p.init()),
            p.refin(),
            p.refout(),
            p.format_checksum(p.xorout()),
            p.format_checksum(row.entry.check),
            row.ok()
          )?;
        }
        Ok(())
      }
    }
  }

  fn write_json(&mut self, doc: &serde_json::Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut self.writer, doc)?;
    writeln!(self.writer)
  }
}

struct CatalogRow<'a> {
  entry: &'a CatalogEntry,
  reference: u64,
  table: Option<u64>,
  oracle: u64,
}

impl<'a> CatalogRow<'a> {
  fn new(entry: &'a CatalogEntry) -> Self {
    let table = LookupTable::build(&entry.params);
    Self {
      entry,
      reference: reference_checksum(CHECK_INPUT, &entry.params),
      table: table_checksum(CHECK_INPUT, &entry.params, &table).ok(),
      oracle: oracle_checksum(CHECK_INPUT, &entry.params),
    }
  }

  fn ok(&self) -> bool {
    self.reference == self.entry.check && self.table == Some(self.entry.check) && self.oracle == self.entry.check
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use crcmodel::catalog;

  use super::*;
  use crate::{data::CaseId, rtl::compare, validate::CaseResult};

  fn render(format: OutputFormat, f: impl FnOnce(&mut Report<&mut Vec<u8>>) -> io::Result<()>) -> String {
    let mut out = Vec::new();
    f(&mut Report::new(&mut out, format)).unwrap();
    String::from_utf8(out).unwrap()
  }

  fn sample_validation() -> Validation {
    let good = CaseResult {
      id: CaseId::new(1, 1),
      width: 16,
      len: 9,
      reference: 0x29B1,
      table: 0x29B1,
      oracle: 0x29B1,
    };
    let bad = CaseResult {
      id: CaseId::new(2, 3),
      table: 0x1234,
      ..good
    };
    Validation {
      results: vec![good, bad],
      orphans: vec![CaseId::new(7, 1)],
    }
  }

  #[test]
  fn parse_formats() {
    assert_eq!(OutputFormat::parse("Summary"), Some(OutputFormat::Summary));
    assert_eq!(OutputFormat::parse(" json "), Some(OutputFormat::Json));
    assert_eq!(OutputFormat::parse("tab"), Some(OutputFormat::Tsv));
    assert_eq!(OutputFormat::parse("xml"), None);
  }

  #[test]
  fn validation_summary() {
    let text = render(OutputFormat::Summary, |r| r.write_validation(&sample_validation()));
    assert!(text.starts_with("CRC Validation Summary\n======================\nTotal Tests: 2\n"), "{text}");
    assert!(text.contains("Matches: 1\nMismatches: 1\nSuccess Rate: 50.00%\n"), "{text}");
    assert!(text.contains("Config 2 Test 3:\n  Reference: 0x29B1\n  Table: 0x1234\n  Oracle: 0x29B1\n"), "{text}");
    assert!(text.contains("  c7_t1\n"), "{text}");
  }

  #[test]
  fn empty_validation_summary() {
    let text = render(OutputFormat::Summary, |r| r.write_validation(&Validation::default()));
    assert!(text.contains("Success Rate: n/a\n"), "{text}");
    assert!(!text.contains("Mismatch Details"), "{text}");
    assert!(text.ends_with("No test cases were validated.\n"), "{text}");
  }

  #[test]
  fn validation_json_and_tsv() {
    let text = render(OutputFormat::Json, |r| r.write_validation(&sample_validation()));
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["tally"]["mismatches"], 1);
    assert_eq!(doc["results"][1]["id"], "c2_t3");
    assert_eq!(doc["results"][1]["match"], false);
    assert_eq!(doc["results"][0]["oracle"], 0x29B1);
    assert_eq!(doc["orphans"][0], "c7_t1");
    assert_eq!(doc["passed"], false);

    let tsv = render(OutputFormat::Tsv, |r| r.write_validation(&sample_validation()));
    let lines: Vec<_> = tsv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "case\twidth\tlength\treference\ttable\toracle\tmatch");
    assert_eq!(lines[1], "c1_t1\t16\t9\t0x29B1\t0x29B1\t0x29B1\ttrue");
  }

  #[test]
  fn comparison_formats() {
    let model = BTreeMap::from([(CaseId::new(1, 1), 0xAB), (CaseId::new(1, 2), 5)]);
    let rtl = BTreeMap::from([(CaseId::new(1, 1), 0xAB)]);
    let rows = compare(&model, &rtl);

    let text = render(OutputFormat::Summary, |r| r.write_comparison(&rows));
    assert!(text.contains("Missing: 1\n"), "{text}");
    assert!(text.contains("c1_t2 [missing]:\n  Model: 0x5\n  RTL: -\n"), "{text}");

    let doc: serde_json::Value =
      serde_json::from_str(&render(OutputFormat::Json, |r| r.write_comparison(&rows))).unwrap();
    assert_eq!(doc["results"][0]["verdict"], "match");
    assert_eq!(doc["results"][1]["rtl"], serde_json::Value::Null);

    let tsv = render(OutputFormat::Tsv, |r| r.write_comparison(&rows));
    assert!(tsv.contains("c1_t1\t0xAB\t0xAB\tmatch\n"), "{tsv}");
  }

  #[test]
  fn catalog_reports_every_entry_ok() {
    let text = render(OutputFormat::Summary, |r| r.write_catalog(catalog::ENTRIES));
    assert_eq!(text.lines().count(), catalog::ENTRIES.len());
    assert!(!text.contains("FAIL"), "{text}");
    assert!(text.contains("check=0xCBF43926 [ok]"), "{text}");

    let doc: serde_json::Value =
      serde_json::from_str(&render(OutputFormat::Json, |r| r.write_catalog(catalog::ENTRIES))).unwrap();
    assert!(doc.as_array().unwrap().iter().all(|e| e["ok"] == true));
  }
}
