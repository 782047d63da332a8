use bitfloat::{Category, FloatValue, Semantics, FP64};
use proptest::prelude::*;

fn sem(exponent: u32, mantissa: u32) -> Semantics {
    Semantics::new(exponent, mantissa).unwrap()
}

proptest! {
    #[test]
    fn round_trip(mantissa in 1u64..(1 << 40), exp in -200i32..200) {
        // Every value with at most 40 significant bits is exact.
        let s = sem(11, 40);
        let d = mantissa as f64 * 2f64.powi(exp);
        prop_assert_eq!(FloatValue::from_f64(s, d).as_f64(), d);
        prop_assert_eq!(FloatValue::from_f64(s, -d).as_f64(), -d);
    }

    #[test]
    fn sign_symmetry(
        e in 1u32..=16,
        m in 1u32..=62,
        d in proptest::num::f64::NORMAL | proptest::num::f64::SUBNORMAL,
    ) {
        let s = sem(e, m);
        let pos = FloatValue::from_f64(s, d);
        let neg = FloatValue::from_f64(s, -d);
        prop_assert_eq!(neg, pos.neg());
    }

    #[test]
    fn fp64_matches_native_for_normals(d in proptest::num::f64::NORMAL) {
        prop_assert_eq!(FloatValue::from_f64(FP64, d).as_f64(), d);
    }

    #[test]
    fn category_matches_predicates(
        e in 2u32..=10,
        m in 1u32..=20,
        d in any::<f64>(),
    ) {
        let v = FloatValue::from_f64(sem(e, m), d);
        let category = v.get_category();
        prop_assert_eq!(category == Category::Zero, v.is_zero());
        prop_assert_eq!(category == Category::Infinity, v.is_inf());
        prop_assert_eq!(category == Category::NaN, v.is_nan());
        prop_assert_eq!(category == Category::Normal, v.is_normal());
        let back = FloatValue::from_parts(
            v.get_semantics(),
            v.get_sign(),
            v.get_exponent(),
            v.get_mantissa(),
        );
        prop_assert_eq!(back, Ok(v));
    }
}

#[test]
fn small_mantissa_scenarios() {
    let s = sem(8, 3);
    let one = FloatValue::from_f64(s, 1.0);
    assert_eq!((one + one).as_f64(), 2.0);
    assert!((one - one).is_zero());
    let res = FloatValue::inf(s, false) + FloatValue::from_f64(s, 5.0);
    assert!(res.is_inf() && !res.is_negative());
    assert!((FloatValue::inf(s, true) + FloatValue::inf(s, false)).is_nan());
}
