use super::error::Error;
use super::float::{Category, FloatValue, Semantics, Unpacked};
use core::cmp::Ordering;
use core::ops;

/// Align two canonical finite numbers on the same exponent. The operand with
/// the larger exponent is shifted left (its exponent decremented) until the
/// exponents match, so no bits are lost here; rounding happens when the
/// combined result is normalized.
///
/// When the exponents are more than `M + 2` apart the smaller operand can't
/// affect the rounded sum or difference, and it is replaced by a single unit
/// bit at that distance. This keeps the shifted mantissa within 128 bits.
pub fn denormalize(
    sem: Semantics,
    a: Unpacked,
    b: Unpacked,
) -> (Unpacked, Unpacked) {
    match a.exponent.cmp(&b.exponent) {
        Ordering::Equal => (a, b),
        Ordering::Greater => align(sem, a, b),
        Ordering::Less => {
            let (b, a) = align(sem, b, a);
            (a, b)
        }
    }
}

/// Shift `hi` down to the exponent of `lo`. Requires hi.exponent > lo.exponent.
fn align(
    sem: Semantics,
    mut hi: Unpacked,
    mut lo: Unpacked,
) -> (Unpacked, Unpacked) {
    let window = sem.get_mantissa_len() as i64 + 2;
    let mut bits = hi.exponent.saturating_sub(lo.exponent);
    debug_assert!(bits > 0);

    if bits > window {
        let unit = (lo.mantissa != 0) as u128;
        lo = Unpacked::new(lo.sign, hi.exponent - window, unit);
        bits = window;
    }

    hi.mantissa <<= bits;
    hi.exponent -= bits;
    debug_assert_eq!(hi.exponent, lo.exponent);
    (hi, lo)
}

impl FloatValue {
    /// Adds two magnitudes. The signs of the operands are ignored and the
    /// result is non-negative; the caller applies the sign.
    fn add_magnitudes(a: Self, b: Self) -> Self {
        let sem = a.get_semantics();
        match (a.get_category(), b.get_category()) {
            (Category::NaN, _) | (_, Category::NaN) => Self::nan(sem),
            (Category::Infinity, _) | (_, Category::Infinity) => {
                Self::inf(sem, false)
            }
            (Category::Zero, _) => b.abs(),
            (_, Category::Zero) => a.abs(),
            (Category::Normal, Category::Normal) => {
                let (a, b) = denormalize(sem, a.unpack(), b.unpack());
                let sum = a.mantissa + b.mantissa;
                // Results past the largest exponent saturate to Inf here.
                Self::normalize(sem, Unpacked::new(false, a.exponent, sum))
            }
        }
    }

    /// Computes |a| - |b|.
    fn sub_magnitudes(a: Self, b: Self) -> Self {
        let sem = a.get_semantics();
        match (a.get_category(), b.get_category()) {
            (Category::NaN, _)
            | (_, Category::NaN)
            | (Category::Infinity, Category::Infinity) => Self::nan(sem),
            (Category::Infinity, _) => a.abs(),
            (_, Category::Infinity) => b.abs().neg(),
            (_, Category::Zero) => a.abs(),
            (Category::Zero, _) => b.abs().neg(),
            (Category::Normal, Category::Normal) => {
                // Subtract the smaller magnitude from the larger one, and
                // take the sign from the larger one.
                let (hi, lo, sign) = match a.cmp_abs(&b) {
                    Ordering::Equal => return Self::zero(sem),
                    Ordering::Greater => (a, b, false),
                    Ordering::Less => (b, a, true),
                };
                let (hi, lo) = denormalize(sem, hi.unpack(), lo.unpack());
                let diff = hi.mantissa - lo.mantissa;
                Self::normalize(sem, Unpacked::new(sign, hi.exponent, diff))
            }
        }
    }

    fn add_same_semantics(&self, rhs: &Self) -> Self {
        debug_assert_eq!(self.get_semantics(), rhs.get_semantics());
        if self.is_nan() || rhs.is_nan() {
            return Self::nan(self.get_semantics());
        }

        let res = match (self.get_sign(), rhs.get_sign()) {
            (false, false) => Self::add_magnitudes(*self, *rhs),
            (true, true) => Self::add_magnitudes(*self, *rhs).neg(),
            (false, true) => Self::sub_magnitudes(*self, *rhs),
            (true, false) => Self::sub_magnitudes(*rhs, *self),
        };
        res.check_canonical();
        res
    }

    fn check_semantics(&self, rhs: &Self) -> Result<(), Error> {
        if self.get_semantics() != rhs.get_semantics() {
            return Err(Error::SemanticsMismatch {
                left: self.get_semantics(),
                right: rhs.get_semantics(),
            });
        }
        Ok(())
    }

    /// Computes self + rhs.
    ///
    /// # Panics
    ///
    /// Panics if the operands have different semantics. See `try_add`.
    pub fn add(&self, rhs: &Self) -> Self {
        assert_eq!(
            self.get_semantics(),
            rhs.get_semantics(),
            "can't add numbers with different semantics"
        );
        self.add_same_semantics(rhs)
    }

    /// Computes self - rhs.
    ///
    /// # Panics
    ///
    /// Panics if the operands have different semantics. See `try_sub`.
    pub fn sub(&self, rhs: &Self) -> Self {
        self.add(&rhs.neg())
    }

    /// Computes self + rhs, or returns an error if the operands have
    /// different semantics.
    pub fn try_add(&self, rhs: &Self) -> Result<Self, Error> {
        self.check_semantics(rhs)?;
        Ok(self.add_same_semantics(rhs))
    }

    /// Computes self - rhs, or returns an error if the operands have
    /// different semantics.
    pub fn try_sub(&self, rhs: &Self) -> Result<Self, Error> {
        self.check_semantics(rhs)?;
        Ok(self.add_same_semantics(&rhs.neg()))
    }
}

impl ops::Add for FloatValue {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        FloatValue::add(&self, &rhs)
    }
}

impl ops::Sub for FloatValue {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        FloatValue::sub(&self, &rhs)
    }
}

impl ops::Add for &FloatValue {
    type Output = FloatValue;
    fn add(self, rhs: Self) -> FloatValue {
        FloatValue::add(self, rhs)
    }
}

impl ops::Sub for &FloatValue {
    type Output = FloatValue;
    fn sub(self, rhs: Self) -> FloatValue {
        FloatValue::sub(self, rhs)
    }
}

impl ops::Neg for FloatValue {
    type Output = Self;
    fn neg(self) -> Self {
        FloatValue::neg(&self)
    }
}

#[cfg(test)]
fn sem(exponent: u32, mantissa: u32) -> Semantics {
    Semantics::new(exponent, mantissa).unwrap()
}

#[cfg(test)]
fn add_helper(s: Semantics, a: f64, b: f64) -> f64 {
    let a = FloatValue::from_f64(s, a);
    let b = FloatValue::from_f64(s, b);
    a.add(&b).as_f64()
}

#[cfg(test)]
fn sub_helper(s: Semantics, a: f64, b: f64) -> f64 {
    let a = FloatValue::from_f64(s, a);
    let b = FloatValue::from_f64(s, b);
    a.sub(&b).as_f64()
}

#[test]
fn test_denormalize() {
    let s = sem(8, 3);
    let a = Unpacked::new(false, 10, 0b101);
    let b = Unpacked::new(true, 8, 0b110);
    let (a2, b2) = denormalize(s, a, b);
    assert_eq!(a2, Unpacked::new(false, 8, 0b10100));
    assert_eq!(b2, b);

    // The order of the operands is kept.
    let (b3, a3) = denormalize(s, b, a);
    assert_eq!((a3, b3), (a2, b2));

    // Equal exponents are a no-op.
    let c = Unpacked::new(false, 10, 0b111);
    assert_eq!(denormalize(s, a, c), (a, c));
}

#[test]
fn test_denormalize_distant_operands() {
    let s = sem(8, 3);
    let a = Unpacked::new(false, 100, 0b101);
    let b = Unpacked::new(true, 10, 0b110);
    let (a2, b2) = denormalize(s, a, b);
    assert_eq!(a2, Unpacked::new(false, 95, 0b10100000));
    assert_eq!(b2, Unpacked::new(true, 95, 1));
}

#[test]
fn test_denormalize_extreme_exponents() {
    let s = sem(8, 3);
    let a = Unpacked::new(false, i64::MAX, 0b101);
    let b = Unpacked::new(true, i64::MIN, 0b110);
    let (a2, b2) = denormalize(s, a, b);
    assert_eq!(a2, Unpacked::new(false, i64::MAX - 5, 0b10100000));
    assert_eq!(b2, Unpacked::new(true, i64::MAX - 5, 1));

    let (b3, a3) = denormalize(s, b, a);
    assert_eq!((a3, b3), (a2, b2));
}

#[test]
fn test_distant_operands_round_like_exact_alignment() {
    use super::utils::TestRng;

    // Align with an exact shift and compare against the collapsed operand.
    fn exact(s: Semantics, a: Unpacked, b: Unpacked, sub: bool) -> FloatValue {
        let bits = a.exponent - b.exponent;
        let hi = a.mantissa << bits;
        let m = if sub { hi - b.mantissa } else { hi + b.mantissa };
        FloatValue::normalize(s, Unpacked::new(false, b.exponent, m))
    }

    let mut rng = TestRng::new();
    for m in 1..=12 {
        let s = sem(10, m);
        let lead = 1u128 << (m - 1);
        for _ in 0..200 {
            let am = lead | (rng.next_u64() as u128 & (lead - 1));
            let bm = lead | (rng.next_u64() as u128 & (lead - 1));
            let dist = rng.get_in_range(1, 80);
            let a = Unpacked::new(false, 400, am);
            let b = Unpacked::new(false, 400 - dist, bm);

            let (a2, b2) = denormalize(s, a, b);
            let sum = FloatValue::normalize(
                s,
                Unpacked::new(false, a2.exponent, a2.mantissa + b2.mantissa),
            );
            assert_eq!(sum, exact(s, a, b, false), "m={m} dist={dist}");

            let diff = FloatValue::normalize(
                s,
                Unpacked::new(false, a2.exponent, a2.mantissa - b2.mantissa),
            );
            assert_eq!(diff, exact(s, a, b, true), "m={m} dist={dist}");
        }
    }
}

#[test]
fn test_scenarios() {
    let s = sem(8, 3);
    let one = FloatValue::from_f64(s, 1.0);

    assert_eq!(one.add(&one).as_f64(), 2.0);
    assert!(one.sub(&one).is_zero());

    let five = FloatValue::from_f64(s, 5.0);
    let res = FloatValue::inf(s, false).add(&five);
    assert!(res.is_inf() && !res.is_negative());

    let res = FloatValue::inf(s, true).add(&FloatValue::inf(s, false));
    assert!(res.is_nan());

    let a = FloatValue::from_f64(s, 4.0);
    let b = FloatValue::from_f64(s, -4.0);
    assert_eq!(a.cmp_abs(&b), Ordering::Equal);
}

#[test]
fn test_addition() {
    let s = sem(11, 53);
    assert_eq!(add_helper(s, 0., -4.), -4.);
    assert_eq!(add_helper(s, -4., 0.), -4.);
    assert_eq!(add_helper(s, 1., 1.), 2.);
    assert_eq!(add_helper(s, 8., 4.), 12.);
    assert_eq!(add_helper(s, 128., 2.), 130.);
    assert_eq!(add_helper(s, 128., -8.), 120.);
    assert_eq!(add_helper(s, 64., -60.), 4.);
    assert_eq!(add_helper(s, 69., -65.), 4.);
    assert_eq!(add_helper(s, 69., 69.), 138.);
    assert_eq!(add_helper(s, -128., -8.), -136.);
    assert_eq!(add_helper(s, 64., -65.), -1.);
    assert_eq!(add_helper(s, -64., 65.), 1.);
    assert_eq!(add_helper(s, -64., -65.), -129.);
    assert_eq!(add_helper(s, -15., 15.), 0.);
    assert_eq!(add_helper(s, 0.5, 0.25), 0.75);
    assert_eq!(add_helper(s, 0.1, -0.1), 0.);

    for i in -4..15 {
        for j in i..15 {
            assert_eq!(
                add_helper(s, f64::from(j), f64::from(i)),
                f64::from(i) + f64::from(j)
            );
            assert_eq!(
                sub_helper(s, f64::from(j), f64::from(i)),
                f64::from(j) - f64::from(i)
            );
        }
    }
}

#[test]
fn test_rounding_half_up() {
    let s = sem(8, 3);
    // 1.00 + 0.001 = 1.001, the guard bit is set.
    assert_eq!(add_helper(s, 1., 0.125), 1.25);
    // 1.00 + 0.0001 = 1.0001, the guard bit is clear.
    assert_eq!(add_helper(s, 1., 0.0625), 1.);
    // 1.11 + 0.001 carries into a new bit.
    assert_eq!(add_helper(s, 1.75, 0.125), 2.);
    // 1.00 - 0.0001 = 0.1111, rounds back up to one.
    assert_eq!(sub_helper(s, 1., 0.0625), 1.);
    // 1.00 - 0.111 = 0.001.
    assert_eq!(sub_helper(s, 1., 0.875), 0.125);
    assert_eq!(sub_helper(s, 0.875, 1.), -0.125);
}

#[test]
fn test_distant_operands() {
    let s = sem(8, 3);
    let tiny = 2f64.powi(-20);
    assert_eq!(add_helper(s, 1., tiny), 1.);
    assert_eq!(sub_helper(s, 1., tiny), 1.);
    assert_eq!(sub_helper(s, tiny, 1.), -1.);
    assert_eq!(add_helper(s, -tiny, -1.), -1.);
    assert_eq!(sub_helper(s, 1.5, tiny), 1.5);
}

#[test]
fn test_signs() {
    let s = sem(8, 8);
    assert_eq!(add_helper(s, -3., 5.), 2.);
    assert_eq!(add_helper(s, -5., 3.), -2.);
    assert_eq!(add_helper(s, 5., -3.), 2.);
    assert_eq!(add_helper(s, 3., -5.), -2.);
    assert_eq!(add_helper(s, -3., -5.), -8.);
    assert_eq!(sub_helper(s, -3., -5.), 2.);
    assert_eq!(sub_helper(s, -3., 5.), -8.);
    assert_eq!(sub_helper(s, 3., 5.), -2.);
}

#[test]
fn test_special_values() {
    let s = sem(8, 5);
    let inf = FloatValue::inf(s, false);
    let ninf = FloatValue::inf(s, true);
    let nan = FloatValue::nan(s);
    let zero = FloatValue::zero(s);
    let two = FloatValue::from_f64(s, 2.);
    let ntwo = FloatValue::from_f64(s, -2.);

    assert_eq!(inf.add(&inf), inf);
    assert_eq!(ninf.add(&ninf), ninf);
    assert!(inf.sub(&inf).is_nan());
    assert!(ninf.add(&inf).is_nan());
    assert_eq!(inf.sub(&ninf), inf);
    assert_eq!(ninf.sub(&inf), ninf);

    assert_eq!(two.add(&ninf), ninf);
    assert_eq!(ntwo.add(&inf), inf);
    assert_eq!(two.sub(&inf), ninf);
    assert_eq!(ninf.sub(&two), ninf);
    assert_eq!(zero.sub(&ninf), inf);

    for v in [inf, ninf, zero, two, ntwo, nan] {
        assert!(v.add(&nan).is_nan());
        assert!(nan.sub(&v).is_nan());
    }

    assert_eq!(zero.add(&zero), zero);
    assert_eq!(zero.sub(&zero), zero);
    assert_eq!(zero.sub(&two), ntwo);
    assert_eq!(ntwo.sub(&zero), ntwo);
    assert_eq!(zero.add(&ntwo), ntwo);
}

#[test]
fn test_add_special_values_against_native() {
    use super::utils;

    // FP64 has the same range and precision as f64 for normal numbers. Check
    // the category of the result of every pair of special values.
    let s = super::float::FP64;
    for &v0 in utils::special_doubles() {
        for &v1 in utils::special_doubles() {
            let r0 = add_helper(s, v0, v1);
            let r1 = v0 + v1;
            assert_eq!(r0.is_nan(), r1.is_nan(), "{v0} + {v1}");
            assert_eq!(r0.is_infinite(), r1.is_infinite(), "{v0} + {v1}");
            if r1 == 0. {
                assert_eq!(r0, 0., "{v0} + {v1}");
            }
        }
    }
}

#[test]
fn test_overflow_saturates_at_max_exponent() {
    // The sum saturates as soon as the exponent reaches max_exponent, not at
    // 2^max_exponent - 1.
    let s = sem(3, 3);
    let max = FloatValue::from_f64(s, 14.);
    assert!(max.is_normal());
    assert_eq!(max.get_exponent(), 6);
    let res = max.add(&max);
    assert_eq!(res, FloatValue::inf(s, false));
    assert_eq!(max.neg().sub(&max), FloatValue::inf(s, true));

    // 14 + 1 = 15 rounds up to 16.
    let one = FloatValue::from_f64(s, 1.);
    assert!(max.add(&one).is_inf());
    assert_eq!(max.add(&FloatValue::from_f64(s, 0.5)), max);
}

#[test]
fn test_semantics_mismatch() {
    let a = FloatValue::from_f64(sem(8, 3), 1.);
    let b = FloatValue::from_f64(sem(8, 4), 1.);
    assert_eq!(
        a.try_add(&b),
        Err(Error::SemanticsMismatch {
            left: sem(8, 3),
            right: sem(8, 4),
        })
    );
    assert!(a.try_sub(&b).is_err());
    assert_eq!(a.try_add(&a).unwrap().as_f64(), 2.);
    assert_eq!(b.try_sub(&b).unwrap(), FloatValue::zero(sem(8, 4)));
}

#[test]
#[should_panic(expected = "different semantics")]
fn test_mixed_semantics_panics() {
    let a = FloatValue::from_f64(sem(8, 3), 1.);
    let b = FloatValue::from_f64(sem(9, 3), 1.);
    let _ = a + b;
}

#[test]
fn test_operators() {
    let s = sem(8, 10);
    let a = FloatValue::from_f64(s, 3.5);
    let b = FloatValue::from_f64(s, -1.25);
    assert_eq!((a + b).as_f64(), 2.25);
    assert_eq!((a - b).as_f64(), 4.75);
    assert_eq!((&a + &b).as_f64(), 2.25);
    assert_eq!((&b - &a).as_f64(), -4.75);
    assert_eq!((-a).as_f64(), -3.5);
}

#[test]
fn test_add_random_vals() {
    use super::utils::TestRng;

    // Small integers are exact with 20 mantissa bits.
    let s = sem(8, 20);
    let mut rng = TestRng::new();
    for _ in 0..5000 {
        let a = rng.get_in_range(-50000, 50000) as f64;
        let b = rng.get_in_range(-50000, 50000) as f64;
        assert_eq!(add_helper(s, a, b), a + b, "{a} + {b}");
        assert_eq!(sub_helper(s, a, b), a - b, "{a} - {b}");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn finite() -> impl Strategy<Value = f64> {
        prop_oneof![
            -1e6f64..1e6,
            -1e-3f64..1e-3,
            proptest::num::f64::NORMAL,
            Just(0.),
        ]
    }

    fn semantics() -> impl Strategy<Value = Semantics> {
        (2u32..=11, 1u32..=40).prop_map(|(e, m)| sem(e, m))
    }

    fn check_canonical(v: &FloatValue) {
        if v.is_normal() {
            let m = v.get_mantissa() as u128;
            let s = v.get_semantics();
            assert!(m & s.leading_bit() != 0);
            assert!(m < s.mantissa_limit());
        }
    }

    proptest! {
        #[test]
        fn additive_identity(s in semantics(), d in finite()) {
            let x = FloatValue::from_f64(s, d);
            let zero = FloatValue::zero(s);
            prop_assert_eq!(x.add(&zero), x);
            prop_assert_eq!(zero.add(&x), x);
            prop_assert_eq!(x.sub(&zero), x);
        }

        #[test]
        fn commutative(s in semantics(), a in finite(), b in finite()) {
            let a = FloatValue::from_f64(s, a);
            let b = FloatValue::from_f64(s, b);
            prop_assert_eq!(a.add(&b), b.add(&a));
            prop_assert_eq!(a.sub(&b), b.sub(&a).neg());
        }

        #[test]
        fn self_subtraction(s in semantics(), d in finite()) {
            let x = FloatValue::from_f64(s, d);
            if x.is_inf() {
                prop_assert!(x.sub(&x).is_nan());
            } else {
                prop_assert!(x.sub(&x).is_zero());
            }
        }

        #[test]
        fn results_are_canonical(s in semantics(), a in finite(), b in finite()) {
            let a = FloatValue::from_f64(s, a);
            let b = FloatValue::from_f64(s, b);
            check_canonical(&a.add(&b));
            check_canonical(&a.sub(&b));
        }

        #[test]
        fn exact_sums_match_native(a in -(1i64 << 24)..(1i64 << 24), b in -(1i64 << 24)..(1i64 << 24)) {
            let s = sem(11, 30);
            let (a, b) = (a as f64, b as f64);
            prop_assert_eq!(add_helper(s, a, b), a + b);
            prop_assert_eq!(sub_helper(s, a, b), a - b);
        }
    }
}
