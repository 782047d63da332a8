//! Errors reported when building semantics or values.

use super::float::Semantics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("exponent width must be between 1 and {max} bits, got {got}")]
    InvalidExponentLen { got: u32, max: u32 },

    #[error("mantissa width must be between 1 and {max} bits, got {got}")]
    InvalidMantissaLen { got: u32, max: u32 },

    /// The operands of a binary operation were built under different
    /// semantics.
    #[error("operands use different semantics: {left:?} and {right:?}")]
    SemanticsMismatch { left: Semantics, right: Semantics },

    /// The fields passed to `FloatValue::from_parts` do not encode a
    /// canonical value.
    #[error("sign={sign} exponent={exponent} mantissa={mantissa:#b} is not canonical under {sem:?}")]
    NonCanonical {
        sem: Semantics,
        sign: bool,
        exponent: u32,
        mantissa: u64,
    },
}
