//! This file contains simple helper functions and test helpers.

/// Returns a mask full of 1s, of `b` bits.
pub fn mask(b: u32) -> u64 {
    if b >= u64::BITS {
        return u64::MAX;
    }
    (1 << b) - 1
}

#[test]
fn test_masking() {
    assert_eq!(mask(0), 0x0);
    assert_eq!(mask(1), 0x1);
    assert_eq!(mask(8), 255);
    assert_eq!(mask(32), u32::MAX as u64);
    assert_eq!(mask(64), u64::MAX);
}

/// Doubles that hit the category and range edges of the conversions and of
/// the adder. All finite entries are normal doubles.
#[cfg(test)]
pub fn special_doubles() -> &'static [f64] {
    &[
        f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
        0.0,
        -0.0,
        1.0,
        -1.0,
        0.75,
        -2.5,
        f64::MAX,
        f64::MIN,
        f64::MIN_POSITIVE,
        -f64::MIN_POSITIVE,
        f64::EPSILON,
        1e-39,
        std::f64::consts::PI,
        -1e300,
    ]
}

/// Xorshift generator with a fixed seed, so that randomized tests are
/// reproducible.
#[cfg(test)]
pub struct TestRng {
    state: u64,
}

#[cfg(test)]
impl TestRng {
    pub fn new() -> Self {
        TestRng {
            state: 0x9e37_79b9_7f4a_7c15,
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Returns a value in the range [lo, hi).
    pub fn get_in_range(&mut self, lo: i64, hi: i64) -> i64 {
        debug_assert!(lo < hi);
        lo + (self.next_u64() % (hi - lo) as u64) as i64
    }
}

#[test]
fn test_rng_range() {
    let mut rng = TestRng::new();
    let mut seen_lo = false;
    let mut seen_hi = false;
    for _ in 0..1000 {
        let v = rng.get_in_range(-3, 4);
        assert!((-3..4).contains(&v));
        seen_lo |= v == -3;
        seen_hi |= v == 3;
    }
    assert!(seen_lo && seen_hi);
}

#[test]
fn test_special_doubles_are_normal() {
    for &val in special_doubles() {
        assert!(!val.is_subnormal(), "{val}");
    }
}
