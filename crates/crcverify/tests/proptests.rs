//! Property tests for the text formats.

use crcmodel::{CrcParams, ReflectionMode};
use crcverify::{
  config::{parse_json, parse_literal, parse_verilog, render_json, render_verilog},
  data::{RtlInput, encode_hex_bytes, parse_hex_bytes, parse_rtl_output},
};
use proptest::prelude::*;

fn arb_params() -> impl Strategy<Value = CrcParams> {
  (
    prop::sample::select(vec![8u32, 16, 24, 32, 40, 48, 56, 64]),
    any::<u64>(),
    any::<u64>(),
    prop::sample::select(ReflectionMode::ALL.to_vec()),
    any::<u64>(),
  )
    .prop_map(|(width, poly, init, mode, xorout)| {
      CrcParams::builder(width)
        .poly(poly | 1)
        .init(init)
        .mode(mode)
        .xorout(xorout)
        .build()
        .unwrap()
    })
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(256))]

  #[test]
  fn hex_bytes_decode_what_they_encode(data in prop::collection::vec(any::<u8>(), 0..256)) {
    prop_assert_eq!(parse_hex_bytes(&encode_hex_bytes(&data)).unwrap(), data);
  }

  #[test]
  fn rtl_inputs_decode_what_they_encode(data in prop::collection::vec(any::<u8>(), 0..64)) {
    let input = RtlInput::new(data);
    prop_assert_eq!(RtlInput::parse(&input.encode()).unwrap(), input);
  }

  #[test]
  fn rtl_outputs_accept_any_case(value in any::<u64>()) {
    prop_assert_eq!(parse_rtl_output(&format!("{value:x}")), Ok(value));
    prop_assert_eq!(parse_rtl_output(&format!("{value:X}\n")), Ok(value));
  }

  #[test]
  fn literals_in_every_radix(value in any::<u64>(), size in 1u32..=64) {
    let v = u128::from(value);
    prop_assert_eq!(parse_literal(&value.to_string()), Some(v));
    prop_assert_eq!(parse_literal(&format!("0x{value:X}")), Some(v));
    prop_assert_eq!(parse_literal(&format!("'h{value:x}")), Some(v));
    prop_assert_eq!(parse_literal(&format!("{size}'d{value}")), Some(v));
    prop_assert_eq!(parse_literal(&format!("'b{value:b}")), Some(v));
    prop_assert_eq!(parse_literal(&format!("'o{value:o}")), Some(v));
  }

  #[test]
  fn configs_survive_both_formats(params in arb_params()) {
    prop_assert_eq!(parse_json(&render_json(&params).unwrap()).unwrap(), params);
    prop_assert_eq!(parse_verilog(&render_verilog(&params)).unwrap(), params);
  }

  #[test]
  fn random_tokens_never_panic(text in "[0-9a-fA-FxX _\\n]{0,40}") {
    let _ = parse_hex_bytes(&text);
    let _ = RtlInput::parse(&text);
    let _ = parse_rtl_output(&text);
    let _ = parse_literal(&text);
  }
}
