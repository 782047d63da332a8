use super::error::Error;
use super::utils::mask;
use core::cmp::Ordering;

/// The widest supported exponent field, in bits.
pub const MAX_EXPONENT_LEN: u32 = 32;
/// The widest supported mantissa field, in bits. Conversion from f64 needs one
/// extra guard bit, and both must fit in a u64.
pub const MAX_MANTISSA_LEN: u32 = 62;

/// Describes the layout of a number: the width of the exponent field and the
/// width of the mantissa field. The mantissa stores the leading bit
/// explicitly, so `mantissa` is also the precision of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Semantics {
    /// The number of bits in the exponent field.
    exponent: u32,
    /// The number of bits in the mantissa field (including the leading bit).
    mantissa: u32,
}

impl Semantics {
    /// Create new semantics with `exponent` exponent bits and `mantissa`
    /// mantissa bits.
    pub const fn new(exponent: u32, mantissa: u32) -> Result<Self, Error> {
        if exponent == 0 || exponent > MAX_EXPONENT_LEN {
            return Err(Error::InvalidExponentLen {
                got: exponent,
                max: MAX_EXPONENT_LEN,
            });
        }
        if mantissa == 0 || mantissa > MAX_MANTISSA_LEN {
            return Err(Error::InvalidMantissaLen {
                got: mantissa,
                max: MAX_MANTISSA_LEN,
            });
        }
        Ok(Semantics { exponent, mantissa })
    }

    /// Build semantics from widths that are already known to be in range.
    pub(crate) const fn new_unchecked(exponent: u32, mantissa: u32) -> Self {
        Semantics { exponent, mantissa }
    }

    /// Returns the length of the exponent field in bits.
    pub fn get_exponent_len(&self) -> u32 {
        self.exponent
    }

    /// Returns the length of the mantissa field in bits.
    pub fn get_mantissa_len(&self) -> u32 {
        self.mantissa
    }

    /// Returns the exponent value that is reserved for Inf and NaN (2^E - 1).
    pub fn get_max_exponent(&self) -> u32 {
        mask(self.exponent) as u32
    }

    /// Returns the exponent bias (2^(E-1) - 1).
    pub fn get_bias(&self) -> u32 {
        mask(self.exponent - 1) as u32
    }

    /// Returns the smallest mantissa that no longer fits the field (2^M).
    pub(crate) fn mantissa_limit(&self) -> u128 {
        1u128 << self.mantissa
    }

    /// Returns the leading bit of a canonical mantissa (2^(M-1)).
    pub(crate) fn leading_bit(&self) -> u128 {
        1u128 << (self.mantissa - 1)
    }
}

/// The semantics used when nothing else is configured: 8 exponent bits and 15
/// mantissa bits.
pub const DEFAULT: Semantics = Semantics::new_unchecked(8, 15);
/// Half precision sized format with 5 exponent bits and 11 mantissa bits.
pub const FP16: Semantics = Semantics::new_unchecked(5, 11);
/// Single precision sized format with 8 exponent bits and 24 mantissa bits.
pub const FP32: Semantics = Semantics::new_unchecked(8, 24);
/// Double precision sized format with 11 exponent bits and 53 mantissa bits.
pub const FP64: Semantics = Semantics::new_unchecked(11, 53);

/// Declare the different categories of the floating point number. The
/// category is derived from the exponent and mantissa fields, and can be
/// queried with is_inf, is_zero, is_nan, is_normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Infinity,
    NaN,
    Normal,
    Zero,
}

/// The scratch representation of a number in the middle of a computation.
/// The mantissa may be of any width and the exponent may leave the range of
/// the exponent field. `FloatValue::normalize` turns it into a canonical
/// value. Exponent arithmetic on it saturates at the ends of the i64 range,
/// which is far outside any field width and ends up as Inf or zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unpacked {
    pub sign: bool,
    pub exponent: i64,
    pub mantissa: u128,
}

impl Unpacked {
    pub fn new(sign: bool, exponent: i64, mantissa: u128) -> Self {
        Unpacked {
            sign,
            exponent,
            mantissa,
        }
    }
}

/// This is the main data structure of this library. It represents a binary
/// floating point number with the layout described by its `Semantics`.
///
/// Values are always canonical: zero is positive with all fields clear, Inf
/// and NaN use the maximum exponent, and every other value has the leading
/// mantissa bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatValue {
    // The layout of the number.
    sem: Semantics,
    // The sign bit. True means negative.
    sign: bool,
    // The biased exponent.
    exponent: u32,
    // The significand, with the explicit leading bit at position M-1.
    mantissa: u64,
}

impl FloatValue {
    /// Returns the zero value.
    pub fn zero(sem: Semantics) -> Self {
        FloatValue {
            sem,
            sign: false,
            exponent: 0,
            mantissa: 0,
        }
    }

    /// Returns infinity. `sign` selects -Inf.
    pub fn inf(sem: Semantics, sign: bool) -> Self {
        FloatValue {
            sem,
            sign,
            exponent: sem.get_max_exponent(),
            mantissa: 0,
        }
    }

    /// Returns NaN.
    pub fn nan(sem: Semantics) -> Self {
        FloatValue {
            sem,
            sign: false,
            exponent: sem.get_max_exponent(),
            mantissa: 1,
        }
    }

    /// Returns the value one.
    pub fn one(sem: Semantics, sign: bool) -> Self {
        FloatValue {
            sem,
            sign,
            exponent: sem.get_bias(),
            mantissa: sem.leading_bit() as u64,
        }
    }

    /// Build a value from its raw fields. The fields must describe a
    /// canonical value, otherwise `Error::NonCanonical` is returned.
    pub fn from_parts(
        sem: Semantics,
        sign: bool,
        exponent: u32,
        mantissa: u64,
    ) -> Result<Self, Error> {
        let val = FloatValue {
            sem,
            sign,
            exponent,
            mantissa,
        };
        let max_exponent = sem.get_max_exponent();
        let canonical = match (exponent, mantissa) {
            (0, 0) => !sign,
            (e, 0) => e == max_exponent,
            (e, 1) if e == max_exponent => !sign,
            (e, m) => {
                e < max_exponent
                    && (m as u128) < sem.mantissa_limit()
                    && (m as u128) & sem.leading_bit() != 0
            }
        };
        if !canonical {
            return Err(Error::NonCanonical {
                sem,
                sign,
                exponent,
                mantissa,
            });
        }
        Ok(val)
    }

    /// Returns the category of the float.
    pub fn get_category(&self) -> Category {
        if self.exponent == self.sem.get_max_exponent() {
            if self.mantissa == 0 {
                return Category::Infinity;
            }
            return Category::NaN;
        }
        if self.mantissa == 0 {
            return Category::Zero;
        }
        Category::Normal
    }

    /// Returns true if the number is zero.
    pub fn is_zero(&self) -> bool {
        !self.sign && self.exponent == 0 && self.mantissa == 0
    }

    /// Returns true if the number is +-Inf.
    pub fn is_inf(&self) -> bool {
        self.mantissa == 0 && self.exponent == self.sem.get_max_exponent()
    }

    /// Returns true if the number is NaN.
    pub fn is_nan(&self) -> bool {
        self.mantissa != 0 && self.exponent == self.sem.get_max_exponent()
    }

    /// Returns true if this number is finite and not zero.
    pub fn is_normal(&self) -> bool {
        matches!(self.get_category(), Category::Normal)
    }

    /// Returns true if the sign bit is set.
    pub fn is_negative(&self) -> bool {
        self.sign
    }

    /// Returns the semantics of the number.
    pub fn get_semantics(&self) -> Semantics {
        self.sem
    }

    pub fn get_mantissa_len(&self) -> u32 {
        self.sem.get_mantissa_len()
    }

    pub fn get_exponent_len(&self) -> u32 {
        self.sem.get_exponent_len()
    }

    /// Returns the sign of the float. True means negative.
    pub fn get_sign(&self) -> bool {
        self.sign
    }

    /// Returns the biased exponent field.
    pub fn get_exponent(&self) -> u32 {
        self.exponent
    }

    /// Returns the mantissa field.
    pub fn get_mantissa(&self) -> u64 {
        self.mantissa
    }

    /// Returns the fields in the scratch representation.
    pub fn unpack(&self) -> Unpacked {
        Unpacked::new(self.sign, self.exponent as i64, self.mantissa as u128)
    }

    /// Returns a new float with a flipped sign. Zero and NaN have a single
    /// encoding and are returned unchanged.
    pub fn neg(&self) -> Self {
        match self.get_category() {
            Category::Zero | Category::NaN => *self,
            Category::Infinity | Category::Normal => FloatValue {
                sign: !self.sign,
                ..*self
            },
        }
    }

    /// Returns the absolute value of the float.
    pub fn abs(&self) -> Self {
        match self.get_category() {
            Category::NaN => *self,
            _ => FloatValue {
                sign: false,
                ..*self
            },
        }
    }

    /// Compares the magnitudes of two canonical finite numbers: the exponents
    /// first, then the mantissas.
    pub fn cmp_abs(&self, other: &Self) -> Ordering {
        self.exponent
            .cmp(&other.exponent)
            .then(self.mantissa.cmp(&other.mantissa))
    }

    /// Bring the raw number `raw` into canonical form under `sem`.
    ///
    /// A mantissa that is too wide is shifted right, and the result is
    /// rounded half-up using only the last bit that was shifted out. A
    /// mantissa that is too narrow is shifted left until the leading bit is
    /// set. Exponents that don't fit the field saturate to Inf, or flush to
    /// zero.
    pub fn normalize(sem: Semantics, raw: Unpacked) -> Self {
        let Unpacked {
            sign,
            mut exponent,
            mut mantissa,
        } = raw;

        if mantissa == 0 {
            return Self::zero(sem);
        }

        let limit = sem.mantissa_limit();
        if mantissa >= limit {
            let mut last_bit = 0;
            while mantissa >= limit {
                last_bit = mantissa & 1;
                mantissa >>= 1;
                exponent = exponent.saturating_add(1);
            }
            mantissa += last_bit;

            // Rounding carried into a new bit.
            if mantissa >= limit {
                mantissa >>= 1;
                exponent = exponent.saturating_add(1);
            }
        } else {
            while mantissa & sem.leading_bit() == 0 {
                mantissa <<= 1;
                exponent = exponent.saturating_sub(1);
            }
        }

        if exponent >= sem.get_max_exponent() as i64 {
            tracing::trace!(exponent, "exponent overflow, saturating to Inf");
            return Self::inf(sem, sign);
        }
        if exponent < 0 {
            tracing::trace!(exponent, "exponent underflow, flushing to zero");
            return Self::zero(sem);
        }

        FloatValue {
            sem,
            sign,
            exponent: exponent as u32,
            mantissa: mantissa as u64,
        }
    }

    /// Verify that the number is canonical.
    pub(crate) fn check_canonical(&self) {
        debug_assert!(Self::from_parts(
            self.sem,
            self.sign,
            self.exponent,
            self.mantissa
        )
        .is_ok());
    }
}

#[cfg(test)]
fn sem(exponent: u32, mantissa: u32) -> Semantics {
    Semantics::new(exponent, mantissa).unwrap()
}

#[test]
fn test_semantics_constants() {
    let s = sem(8, 15);
    assert_eq!(s, DEFAULT);
    assert_eq!(s.get_max_exponent(), 255);
    assert_eq!(s.get_bias(), 127);

    let s = sem(32, 3);
    assert_eq!(s.get_max_exponent(), u32::MAX);
    assert_eq!(s.get_bias(), (1 << 31) - 1);

    let s = sem(1, 1);
    assert_eq!(s.get_max_exponent(), 1);
    assert_eq!(s.get_bias(), 0);
}

#[test]
fn test_semantics_validation() {
    assert_eq!(
        Semantics::new(0, 10),
        Err(Error::InvalidExponentLen { got: 0, max: 32 })
    );
    assert_eq!(
        Semantics::new(33, 10),
        Err(Error::InvalidExponentLen { got: 33, max: 32 })
    );
    assert_eq!(
        Semantics::new(8, 0),
        Err(Error::InvalidMantissaLen { got: 0, max: 62 })
    );
    assert_eq!(
        Semantics::new(8, 63),
        Err(Error::InvalidMantissaLen { got: 63, max: 62 })
    );
    assert!(Semantics::new(32, 62).is_ok());
}

#[test]
fn test_special_values() {
    let s = sem(8, 3);
    let zero = FloatValue::zero(s);
    assert!(zero.is_zero());
    assert!(!zero.is_inf() && !zero.is_nan() && !zero.is_normal());
    assert_eq!(zero.get_category(), Category::Zero);

    let inf = FloatValue::inf(s, true);
    assert!(inf.is_inf() && inf.is_negative());
    assert!(!inf.is_nan() && !inf.is_zero());
    assert_eq!(inf.get_exponent(), 255);

    let nan = FloatValue::nan(s);
    assert!(nan.is_nan() && !nan.is_inf());
    assert_eq!(nan.get_category(), Category::NaN);

    let one = FloatValue::one(s, false);
    assert!(one.is_normal());
    assert_eq!(one.get_mantissa(), 0b100);
    assert_eq!(one.get_exponent(), 127);
}

#[test]
fn test_from_parts() {
    let s = sem(4, 3);
    assert!(FloatValue::from_parts(s, false, 0, 0).unwrap().is_zero());
    assert!(FloatValue::from_parts(s, true, 15, 0).unwrap().is_inf());
    assert!(FloatValue::from_parts(s, false, 15, 1).unwrap().is_nan());
    assert!(FloatValue::from_parts(s, true, 0, 0b100).is_ok());
    assert!(FloatValue::from_parts(s, false, 14, 0b111).is_ok());

    // Negative zero, unnormalized, too wide, or a non canonical NaN.
    assert!(FloatValue::from_parts(s, true, 0, 0).is_err());
    assert!(FloatValue::from_parts(s, false, 3, 0b011).is_err());
    assert!(FloatValue::from_parts(s, false, 3, 0b1000).is_err());
    assert!(FloatValue::from_parts(s, false, 15, 0b101).is_err());
    assert!(FloatValue::from_parts(s, false, 3, 0).is_err());
}

#[test]
fn test_neg_keeps_canonical_forms() {
    let s = sem(8, 3);
    assert_eq!(FloatValue::zero(s).neg(), FloatValue::zero(s));
    assert_eq!(FloatValue::nan(s).neg(), FloatValue::nan(s));
    assert_eq!(FloatValue::inf(s, false).neg(), FloatValue::inf(s, true));
    assert_eq!(FloatValue::one(s, true).abs(), FloatValue::one(s, false));
}

#[test]
fn test_normalize_wide_mantissa() {
    let s = sem(8, 3);
    // 10.11 * 2^-1 becomes 1.10 * 2^0 with three mantissa bits.
    let raw = Unpacked::new(false, 127 - 1 - 3, 0b10110);
    let res = FloatValue::normalize(s, raw);
    assert_eq!(res.get_mantissa(), 0b110);
    assert_eq!(res.get_exponent(), 127 - 2);

    // The last bit shifted out rounds up.
    let res = FloatValue::normalize(s, Unpacked::new(false, 10, 0b1011));
    assert_eq!(res.get_mantissa(), 0b110);
    assert_eq!(res.get_exponent(), 11);

    // Only the final bit counts, earlier dropped bits are ignored.
    let res = FloatValue::normalize(s, Unpacked::new(false, 10, 0b100011));
    assert_eq!(res.get_mantissa(), 0b100);
    assert_eq!(res.get_exponent(), 13);

    // Rounding carries out of the field and needs one more shift.
    let res = FloatValue::normalize(s, Unpacked::new(true, 10, 0b1111));
    assert_eq!(res.get_mantissa(), 0b100);
    assert_eq!(res.get_exponent(), 12);
    assert!(res.is_negative());
}

#[test]
fn test_normalize_narrow_mantissa() {
    let s = sem(8, 4);
    let res = FloatValue::normalize(s, Unpacked::new(false, 20, 0b11));
    assert_eq!(res.get_mantissa(), 0b1100);
    assert_eq!(res.get_exponent(), 18);

    // Already canonical.
    let res = FloatValue::normalize(s, Unpacked::new(true, 20, 0b1001));
    assert_eq!(res.get_mantissa(), 0b1001);
    assert_eq!(res.get_exponent(), 20);
}

#[test]
fn test_normalize_range() {
    let s = sem(3, 3);
    // Max exponent is 7, which is reserved.
    let res = FloatValue::normalize(s, Unpacked::new(true, 6, 0b1110));
    assert_eq!(res, FloatValue::inf(s, true));
    let res = FloatValue::normalize(s, Unpacked::new(false, 6, 0b111));
    assert!(res.is_normal());
    assert_eq!(res.get_exponent(), 6);

    let res = FloatValue::normalize(s, Unpacked::new(true, 1, 0b1));
    assert_eq!(res, FloatValue::zero(s));
    let res = FloatValue::normalize(s, Unpacked::new(false, 0, 0));
    assert_eq!(res, FloatValue::zero(s));
}

#[test]
fn test_normalize_extreme_exponents() {
    let s = sem(8, 3);
    let res = FloatValue::normalize(s, Unpacked::new(true, i64::MAX, 0b1111));
    assert_eq!(res, FloatValue::inf(s, true));
    let res = FloatValue::normalize(s, Unpacked::new(false, i64::MAX - 1, 1 << 100));
    assert_eq!(res, FloatValue::inf(s, false));
    let res = FloatValue::normalize(s, Unpacked::new(false, i64::MIN, 0b1));
    assert_eq!(res, FloatValue::zero(s));
}

#[test]
fn test_cmp_abs() {
    let s = sem(8, 3);
    let a = FloatValue::from_parts(s, false, 10, 0b101).unwrap();
    let b = FloatValue::from_parts(s, true, 10, 0b101).unwrap();
    let c = FloatValue::from_parts(s, false, 10, 0b110).unwrap();
    let d = FloatValue::from_parts(s, true, 9, 0b111).unwrap();
    assert_eq!(a.cmp_abs(&b), Ordering::Equal);
    assert_eq!(a.cmp_abs(&c), Ordering::Less);
    assert_eq!(c.cmp_abs(&d), Ordering::Greater);
    assert_eq!(d.cmp_abs(&a), Ordering::Less);
}
