//! Property-based tests for the core pool types
//!
//! These tests verify counter and target invariants using proptest

use super::*;
use crate::utils::{is_hex_string, read_var_int, var_int};
use proptest::prelude::*;

proptest! {
    #[test]
    fn job_ids_skip_wrap_multiples(steps in 1usize..5_000) {
        let mut counter = JobCounter::new();
        let mut last = 0u32;
        for _ in 0..steps {
            let id = u32::from_str_radix(&counter.next(), 16).unwrap();
            prop_assert!(id != 0);
            prop_assert!(id % 0xffff != 0);
            prop_assert!(id == last + 1 || id == 1);
            last = id;
        }
    }

    #[test]
    fn extranonce_is_eight_hex_chars(instance_id in any::<u32>(), draws in 1usize..64) {
        let counter = ExtraNonceCounter::with_instance_id(instance_id);
        for _ in 0..draws {
            let value = counter.next();
            prop_assert_eq!(value.len(), ExtraNonceCounter::SIZE * 2);
            prop_assert!(is_hex_string(&value));
            prop_assert_eq!(value.to_lowercase(), value.clone());
        }
    }

    #[test]
    fn extranonces_distinct_within_instance(instance_id in 1u32..16, draws in 2usize..512) {
        let counter = ExtraNonceCounter::with_instance_id(instance_id);
        let values: std::collections::HashSet<String> =
            (0..draws).map(|_| counter.next()).collect();
        prop_assert_eq!(values.len(), draws);
    }

    #[test]
    fn target_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let target = Target::from_be_bytes(&bytes);
        prop_assert_eq!(target.to_be_bytes(), bytes);
        prop_assert_eq!(Target::from_hex(&target.to_hex()).unwrap(), target);
    }

    #[test]
    fn target_difficulty_positive(bytes in prop::array::uniform32(1u8..=255u8)) {
        let target = Target::from_be_bytes(&bytes);
        prop_assert!(target.difficulty() >= 0.0);
        prop_assert!(target.is_met_by(&bytes));
    }

    #[test]
    fn hash_difficulty_scales_with_multiplier(
        bytes in prop::array::uniform32(1u8..=255u8),
        multiplier in 1u32..4096,
    ) {
        let base = hash_difficulty(&bytes, 1.0);
        let scaled = hash_difficulty(&bytes, multiplier as f64);
        prop_assert!((scaled - base * multiplier as f64).abs() <= scaled.abs() * 1e-12);
    }

    #[test]
    fn var_int_roundtrip(n in any::<u64>()) {
        let encoded = var_int(n);
        prop_assert_eq!(read_var_int(&encoded), Some((n, encoded.len())));
    }
}
