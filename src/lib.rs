//! Binary floating point numbers with a configurable number of exponent and
//! mantissa bits.
//!
//! ```
//! use bitfloat::{FloatValue, Semantics};
//!
//! let sem = Semantics::new(8, 3).unwrap();
//! let a = FloatValue::from_f64(sem, 1.0);
//! let b = FloatValue::from_f64(sem, 0.75);
//! assert_eq!((a + b).as_f64(), 1.75);
//! assert_eq!(b.to_string(), "1,10 * 2^(126-127)");
//! ```

mod arithmetic;
mod cast;
pub mod config;
mod error;
mod float;
#[cfg(feature = "python")]
mod py;
mod string;
mod utils;

pub use self::arithmetic::denormalize;
pub use self::error::Error;
pub use self::float::{
    Category, FloatValue, Semantics, Unpacked, DEFAULT, FP16, FP32, FP64,
    MAX_EXPONENT_LEN, MAX_MANTISSA_LEN,
};
