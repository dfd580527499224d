//! Property tests over arbitrary parameter sets.
//!
//! Three invariants are checked against random widths, polynomials, seeds,
//! reflection modes and messages:
//!
//! 1. **Engine equivalence**: the table engine equals the bitwise reference.
//! 2. **Empty-input identity**: no data yields `init` (reflected if `refout`)
//!    XOR `xorout`.
//! 3. **Reflection involution**: reflecting twice over the same width is the
//!    identity.

#![cfg(all(test, not(miri)))]

use proptest::prelude::*;

use crate::{
  CrcParams, LookupTable, ReflectionMode, TableEngine, build_table, reference, reference_checksum,
  reflect::{reverse_bits, width_mask},
  table_checksum,
};

// ─────────────────────────────────────────────────────────────────────────────
// Strategies
// ─────────────────────────────────────────────────────────────────────────────

fn arb_mode() -> impl Strategy<Value = ReflectionMode> {
  prop::sample::select(ReflectionMode::ALL.to_vec())
}

fn arb_params_in(widths: &'static [u32]) -> impl Strategy<Value = CrcParams> {
  (
    prop::sample::select(widths),
    any::<u64>(),
    any::<u64>(),
    arb_mode(),
    any::<u64>(),
  )
    .prop_map(|(width, poly, init, mode, xorout)| {
      // The low bit of a real generator is always set.
      CrcParams::builder(width)
        .poly(poly | 1)
        .init(init)
        .mode(mode)
        .xorout(xorout)
        .build()
        .unwrap()
    })
}

fn arb_data(max: usize) -> impl Strategy<Value = Vec<u8>> {
  prop::collection::vec(any::<u8>(), 0..max)
}

const COMMON_WIDTHS: &[u32] = &[8, 16, 32];
const ALL_WIDTHS: &[u32] = &[8, 16, 24, 32, 40, 48, 56, 64];

proptest! {
  #![proptest_config(ProptestConfig::with_cases(512))]

  // ─────────────────────────────────────────────────────────────────────────
  // Engine Equivalence
  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn table_engine_equals_reference(params in arb_params_in(COMMON_WIDTHS), data in arb_data(100)) {
    let table = build_table(&params);
    prop_assert_eq!(
      table_checksum(&data, &params, &table).unwrap(),
      reference_checksum(&data, &params),
      "{} len {}", params, data.len()
    );
  }

  #[test]
  fn table_engine_equals_reference_all_widths(params in arb_params_in(ALL_WIDTHS), data in arb_data(300)) {
    let table = build_table(&params);
    prop_assert_eq!(
      table_checksum(&data, &params, &table).unwrap(),
      reference_checksum(&data, &params),
      "{}", params
    );
  }

  #[test]
  fn chunked_updates_equal_oneshot(
    params in arb_params_in(ALL_WIDTHS),
    data in arb_data(512),
    splits in prop::collection::vec(any::<usize>(), 0..6)
  ) {
    let mut cuts: Vec<usize> = splits.into_iter().map(|s| s % (data.len() + 1)).collect();
    cuts.sort_unstable();

    let table = LookupTable::build(&params);
    let engine = TableEngine::new(params, &table).unwrap();
    let mut fast = engine.start();
    let mut slow = reference::start(&params);
    let mut prev = 0;
    for cut in cuts.into_iter().chain(core::iter::once(data.len())) {
      fast = engine.update(fast, &data[prev..cut]);
      slow = reference::update(slow, &data[prev..cut], &params);
      prev = cut;
    }

    let expected = reference_checksum(&data, &params);
    prop_assert_eq!(engine.finalize(fast), expected);
    prop_assert_eq!(reference::finalize(slow, &params), expected);
  }

  #[test]
  fn checksum_fits_width(params in arb_params_in(ALL_WIDTHS), data in arb_data(64)) {
    prop_assert_eq!(reference_checksum(&data, &params) & !params.mask(), 0);
  }

  // ─────────────────────────────────────────────────────────────────────────
  // Empty-Input Identity
  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn empty_input_identity(params in arb_params_in(ALL_WIDTHS)) {
    let init = if params.refout() { reverse_bits(params.init(), params.width()) } else { params.init() };
    let expected = (init ^ params.xorout()) & params.mask();
    prop_assert_eq!(reference_checksum(&[], &params), expected);
    prop_assert_eq!(table_checksum(&[], &params, &build_table(&params)).unwrap(), expected);
  }

  // ─────────────────────────────────────────────────────────────────────────
  // Reflection Involution
  // ─────────────────────────────────────────────────────────────────────────

  #[test]
  fn reflection_is_an_involution(value in any::<u64>(), bits in 1u32..=64) {
    let v = value & width_mask(bits);
    prop_assert_eq!(reverse_bits(reverse_bits(v, bits), bits), v);
  }

  #[test]
  fn reflected_table_is_mirror_of_normal(params in arb_params_in(ALL_WIDTHS), byte in any::<u8>()) {
    let normal = crate::table::table_entry_normal(params.width(), params.poly(), byte);
    let reflected = crate::table::table_entry_reflected(params.width(), params.poly(), byte);
    prop_assert_eq!(reflected, reverse_bits(normal, params.width()));
  }
}
