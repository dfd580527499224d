//! Fuzz target: table engine vs reference engine over arbitrary parameters.

#![no_main]

use arbitrary::Arbitrary;
use crcmodel::{CrcParams, build_table, reference_checksum, table_checksum};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
  width_bytes: u8,
  poly: u64,
  init: u64,
  refin: bool,
  refout: bool,
  xorout: u64,
  data: Vec<u8>,
}

fuzz_target!(|input: Input| {
  let width = u32::from(input.width_bytes % 8 + 1) * 8;
  let Ok(params) = CrcParams::new(width, input.poly, input.init, input.refin, input.refout, input.xorout) else {
    return;
  };

  let table = build_table(&params);
  let fast = table_checksum(&input.data, &params, &table).expect("table built from the same params");
  let slow = reference_checksum(&input.data, &params);
  assert_eq!(fast, slow, "engines disagree for {params}");
  assert_eq!(slow & !params.mask(), 0, "checksum wider than {width} bits");
});
