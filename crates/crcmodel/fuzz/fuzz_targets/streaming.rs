//! Fuzz target: arbitrary chunking through both incremental APIs.

#![no_main]

use arbitrary::Arbitrary;
use crcmodel::{CrcParams, LookupTable, TableEngine, catalog, reference};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  algorithm: u8,
  data: Vec<u8>,
  splits: Vec<usize>,
}

fuzz_target!(|input: Input| {
  let entry = &catalog::ENTRIES[usize::from(input.algorithm) % catalog::ENTRIES.len()];
  let params: CrcParams = entry.params;
  let data = &input.data;

  let max_split = data.len() + 1;
  let mut splits: Vec<usize> = input.splits.iter().map(|s| s % max_split).collect();
  splits.sort();
  splits.dedup();

  let table = LookupTable::build(&params);
  let engine = TableEngine::new(params, &table).expect("table built from the same params");

  let mut fast = engine.start();
  let mut slow = reference::start(&params);
  let mut prev = 0;
  for split in splits.into_iter().chain(core::iter::once(data.len())) {
    fast = engine.update(fast, &data[prev..split]);
    slow = reference::update(slow, &data[prev..split], &params);
    prev = split;
  }

  let expected = reference::checksum(data, &params);
  assert_eq!(engine.finalize(fast), expected, "{} table chunking mismatch", entry.name);
  assert_eq!(reference::finalize(slow, &params), expected, "{} reference chunking mismatch", entry.name);
});
