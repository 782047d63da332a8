//! This module contains the textual rendering of numbers.

use super::float::{Category, FloatValue};
use core::fmt::{Display, Formatter, Result};

impl Display for FloatValue {
    /// Prints the number using the internal representation, for example
    /// `-1,01 * 2^(128-127)`. The comma follows the leading mantissa bit.
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let category = self.get_category();
        match category {
            Category::NaN => return write!(f, "NaN"),
            Category::Zero => return write!(f, "0"),
            Category::Infinity | Category::Normal => {}
        }

        if self.get_sign() {
            write!(f, "-")?;
        }
        if category == Category::Infinity {
            return write!(f, "Inf");
        }

        let mantissa = self.get_mantissa();
        let radix_pos = self.get_mantissa_len() as i64 - 2;
        let msb = (u64::BITS - mantissa.leading_zeros()) as i64 - 1;
        for i in (0..=msb).rev() {
            if i == radix_pos {
                write!(f, ",")?;
            }
            write!(f, "{}", (mantissa >> i) & 1)?;
        }
        write!(
            f,
            " * 2^({}-{})",
            self.get_exponent(),
            self.get_semantics().get_bias()
        )
    }
}

#[cfg(test)]
use super::float::Semantics;

#[test]
fn test_display() {
    let sem = Semantics::new(8, 3).unwrap();
    assert_eq!(
        FloatValue::from_f64(sem, 1.0).to_string(),
        "1,00 * 2^(127-127)"
    );
    assert_eq!(
        FloatValue::from_f64(sem, -2.5).to_string(),
        "-1,01 * 2^(128-127)"
    );
    assert_eq!(
        FloatValue::from_f64(sem, 0.75).to_string(),
        "1,10 * 2^(126-127)"
    );
    assert_eq!(FloatValue::zero(sem).to_string(), "0");
    assert_eq!(FloatValue::nan(sem).to_string(), "NaN");
    assert_eq!(FloatValue::inf(sem, false).to_string(), "Inf");
    assert_eq!(FloatValue::inf(sem, true).to_string(), "-Inf");
}

#[test]
fn test_display_narrow_mantissa() {
    let sem = Semantics::new(4, 1).unwrap();
    assert_eq!(FloatValue::from_f64(sem, 4.0).to_string(), "1 * 2^(9-7)");

    let sem = Semantics::new(4, 2).unwrap();
    assert_eq!(
        FloatValue::from_f64(sem, -3.0).to_string(),
        "-1,1 * 2^(8-7)"
    );
}
