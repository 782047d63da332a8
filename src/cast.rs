use super::float::{Category, FloatValue, Semantics, Unpacked};

impl FloatValue {
    /// Load the double `val` into a number with the semantics `sem`. The
    /// value is rounded to the mantissa width, and may overflow to Inf or
    /// flush to zero when the exponent does not fit.
    pub fn from_f64(sem: Semantics, val: f64) -> Self {
        if val == 0. {
            return Self::zero(sem);
        }
        if val.is_infinite() {
            return Self::inf(sem, val < 0.);
        }
        if val.is_nan() {
            return Self::nan(sem);
        }

        let sign = val < 0.;
        let mut val = val.abs();

        // Scale the value into [1, 2) and count the steps. This is done by
        // repeated halving and doubling, which is exact for binary doubles.
        let mut exp: i64 = 0;
        while val >= 2. {
            val /= 2.;
            exp += 1;
        }
        while val < 1. {
            val *= 2.;
            exp -= 1;
        }

        // Extract one bit more than the mantissa holds. normalize() uses it to
        // round the result.
        let mut rest = val;
        let mut mantissa: u128 = 0;
        for _ in 0..=sem.get_mantissa_len() {
            mantissa <<= 1;
            if rest >= 1. {
                rest -= 1.;
                mantissa |= 1;
            }
            rest *= 2.;
        }

        // The extra bit moves the binary point one place to the right.
        let exponent = exp + sem.get_bias() as i64 - 1;
        Self::normalize(sem, Unpacked::new(sign, exponent, mantissa))
    }

    /// Convert the number to a double. Values that are out of the range of
    /// f64 become Inf or zero, and mantissas wider than 53 bits are rounded
    /// by the hardware.
    pub fn as_f64(&self) -> f64 {
        match self.get_category() {
            Category::NaN => f64::NAN,
            Category::Infinity => {
                if self.get_sign() {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }
            Category::Zero => 0.,
            Category::Normal => {
                let sem = self.get_semantics();
                let mut val = self.get_mantissa() as f64;
                if self.get_sign() {
                    val = -val;
                }
                let exp = self.get_exponent() as i64
                    - sem.get_bias() as i64
                    - (sem.get_mantissa_len() as i64 - 1);
                scale_by_pow2(val, exp)
            }
        }
    }
}

/// Returns `val * 2^exp`. The power of two is applied in steps so that the
/// intermediate factor stays representable.
fn scale_by_pow2(mut val: f64, mut exp: i64) -> f64 {
    const STEP: i64 = 512;
    while exp != 0 && val != 0. && val.is_finite() {
        let amt = exp.clamp(-STEP, STEP);
        val *= 2f64.powi(amt as i32);
        exp -= amt;
    }
    val
}

impl From<f64> for FloatValue {
    /// Convert using the process-wide semantics. The first conversion locks
    /// the default widths if none were configured.
    fn from(val: f64) -> Self {
        Self::from_f64(Semantics::global(), val)
    }
}

impl From<FloatValue> for f64 {
    fn from(val: FloatValue) -> Self {
        val.as_f64()
    }
}

#[cfg(test)]
use super::float::{DEFAULT, FP64};

#[test]
fn test_scale_by_pow2() {
    assert_eq!(scale_by_pow2(3., 0), 3.);
    assert_eq!(scale_by_pow2(3., 2), 12.);
    assert_eq!(scale_by_pow2(3., -1), 1.5);
    assert_eq!(scale_by_pow2(1., 1023), 2f64.powi(1023));
    assert_eq!(scale_by_pow2(1., 2000), f64::INFINITY);
    assert_eq!(scale_by_pow2(-1., 2000), f64::NEG_INFINITY);
    assert_eq!(scale_by_pow2(1., -3000), 0.);
    // 2^-1074 is the smallest subnormal.
    assert_eq!(scale_by_pow2(1., -1074), f64::from_bits(1));
    assert_eq!(
        scale_by_pow2((1u64 << 60) as f64, -1100),
        f64::from_bits(1 << 34)
    );
}

#[test]
fn test_from_f64_scenarios() {
    let sem = Semantics::new(8, 3).unwrap();

    let one = FloatValue::from_f64(sem, 1.0);
    assert_eq!(one.get_mantissa(), 0b100);
    assert_eq!(one.get_exponent(), 127);
    assert_eq!(one.as_f64(), 1.0);

    // 0.75 is 0.11 in binary.
    let x = FloatValue::from_f64(sem, 0.75);
    assert_eq!(x.get_mantissa(), 0b110);
    assert_eq!(x.get_exponent(), sem.get_bias() - 1);
    assert_eq!(x.as_f64(), 0.75);

    let x = FloatValue::from_f64(sem, -6.0);
    assert!(x.is_negative());
    assert_eq!(x.get_mantissa(), 0b110);
    assert_eq!(x.get_exponent(), 129);
    assert_eq!(x.as_f64(), -6.0);
}

#[test]
fn test_from_f64_rounding() {
    let sem = Semantics::new(8, 3).unwrap();
    // 1.001 has a set guard bit and rounds up to 1.01.
    assert_eq!(FloatValue::from_f64(sem, 1.125).as_f64(), 1.25);
    // 1.0001 has a clear guard bit and rounds down.
    assert_eq!(FloatValue::from_f64(sem, 1.0625).as_f64(), 1.0);
    // 1.111 rounds up to 10.0.
    let x = FloatValue::from_f64(sem, 1.875);
    assert_eq!(x.get_mantissa(), 0b100);
    assert_eq!(x.get_exponent(), 128);
    assert_eq!(x.as_f64(), 2.0);
    assert_eq!(FloatValue::from_f64(sem, -1.875).as_f64(), -2.0);
}

#[test]
fn test_from_f64_special() {
    let sem = DEFAULT;
    assert!(FloatValue::from_f64(sem, 0.).is_zero());
    assert!(FloatValue::from_f64(sem, -0.).is_zero());
    assert!(FloatValue::from_f64(sem, f64::NAN).is_nan());
    let inf = FloatValue::from_f64(sem, f64::NEG_INFINITY);
    assert!(inf.is_inf() && inf.is_negative());
    let inf = FloatValue::from_f64(sem, f64::INFINITY);
    assert!(inf.is_inf() && !inf.is_negative());

    assert!(FloatValue::from_f64(sem, f64::NAN).as_f64().is_nan());
    assert_eq!(FloatValue::zero(sem).as_f64(), 0.);
    assert_eq!(FloatValue::inf(sem, true).as_f64(), f64::NEG_INFINITY);
    assert_eq!(FloatValue::inf(sem, false).as_f64(), f64::INFINITY);
}

#[test]
fn test_from_f64_out_of_range() {
    // Exponents 0..=6 are finite, with a bias of 3.
    let sem = Semantics::new(3, 3).unwrap();
    assert_eq!(FloatValue::from_f64(sem, 14.).as_f64(), 14.);
    assert_eq!(FloatValue::from_f64(sem, 0.125).as_f64(), 0.125);
    assert!(FloatValue::from_f64(sem, 16.).is_inf());
    assert!(FloatValue::from_f64(sem, -1e300).is_inf());
    assert!(FloatValue::from_f64(sem, 0.0625).is_zero());
    assert!(FloatValue::from_f64(sem, -f64::MIN_POSITIVE).is_zero());
    // 15 rounds up into the reserved exponent.
    assert!(FloatValue::from_f64(sem, 15.).is_inf());
}

#[test]
fn test_fp64_round_trip() {
    use super::utils;

    for &val in utils::special_doubles() {
        let res = FloatValue::from_f64(FP64, val).as_f64();
        if val.is_nan() {
            assert!(res.is_nan());
            continue;
        }
        // FP64 holds every normal double exactly.
        assert_eq!(res, val, "{val}");
    }
}

#[test]
fn test_extreme_doubles() {
    let sem = Semantics::new(16, 53).unwrap();
    for val in [f64::MAX, f64::MIN, f64::MIN_POSITIVE, -f64::MIN_POSITIVE] {
        assert_eq!(FloatValue::from_f64(sem, val).as_f64(), val);
    }
    // Subnormal doubles have fewer significant bits and round trip too.
    let tiny = f64::from_bits(0x0000_0000_0010_0010);
    assert_eq!(FloatValue::from_f64(sem, tiny).as_f64(), tiny);
    let min = f64::from_bits(1);
    assert_eq!(FloatValue::from_f64(sem, min).as_f64(), min);
}
