//! The global widths are process-wide, so they are exercised from a single
//! test in their own binary.

use bitfloat::config;
use bitfloat::{FloatValue, Semantics};

#[test]
fn global_widths_lock_once() {
    // Out of range requests are rejected without locking anything.
    assert!(!config::set_mantissa_bits(0));
    assert!(!config::set_mantissa_bits(63));
    assert!(!config::set_exponent_bits(0));
    assert!(!config::set_exponent_bits(33));

    // Reading the widths reports the defaults without locking them.
    assert_eq!(config::mantissa_bits(), 15);
    assert_eq!(config::exponent_bits(), 8);

    assert!(config::set_mantissa_bits(3));
    assert!(!config::set_mantissa_bits(10));
    assert_eq!(config::mantissa_bits(), 3);

    // Converting a value locks the default exponent width.
    assert_eq!(config::exponent_bits(), 8);
    let one = FloatValue::from(1.0);
    assert_eq!(config::exponent_bits(), 8);
    assert!(!config::set_exponent_bits(5));

    let sem = Semantics::global();
    assert_eq!(sem, Semantics::new(8, 3).unwrap());
    assert_eq!(one.get_semantics(), sem);

    let two = one + FloatValue::from(1.0);
    assert_eq!(f64::from(two), 2.0);
    assert_eq!(two.to_string(), "1,00 * 2^(128-127)");
}
