//! Process-wide widths for code that doesn't pass `Semantics` around.
//!
//! Each width can be set exactly once. The first successful setter call, or
//! the first read through `Semantics::global()`, locks it for the lifetime of
//! the process; later requests are ignored and report `false`.

use super::float::{Semantics, DEFAULT, MAX_EXPONENT_LEN, MAX_MANTISSA_LEN};
use core::sync::atomic::{AtomicU32, Ordering};

// Zero means that the width is not locked yet.
static MANTISSA_BITS: AtomicU32 = AtomicU32::new(0);
static EXPONENT_BITS: AtomicU32 = AtomicU32::new(0);

/// Store `bits` in `slot` unless a width was already locked.
fn lock_width(slot: &AtomicU32, bits: u32) -> Result<u32, u32> {
    slot.compare_exchange(0, bits, Ordering::AcqRel, Ordering::Acquire)
        .map(|_| bits)
}

/// Returns the locked width, locking `default` if nothing was set.
fn locked_or(slot: &AtomicU32, default: u32) -> u32 {
    match lock_width(slot, default) {
        Ok(bits) => bits,
        Err(current) => current,
    }
}

/// Set and lock the number of mantissa bits. Returns false, and changes
/// nothing, if the width is already locked or `bits` is not in
/// 1..=MAX_MANTISSA_LEN.
pub fn set_mantissa_bits(bits: u32) -> bool {
    if bits == 0 || bits > MAX_MANTISSA_LEN {
        tracing::debug!(bits, "ignoring invalid mantissa width");
        return false;
    }
    match lock_width(&MANTISSA_BITS, bits) {
        Ok(_) => {
            tracing::debug!(bits, "mantissa width locked");
            true
        }
        Err(current) => {
            tracing::debug!(bits, current, "mantissa width is already locked");
            false
        }
    }
}

/// Set and lock the number of exponent bits. Returns false, and changes
/// nothing, if the width is already locked or `bits` is not in
/// 1..=MAX_EXPONENT_LEN.
pub fn set_exponent_bits(bits: u32) -> bool {
    if bits == 0 || bits > MAX_EXPONENT_LEN {
        tracing::debug!(bits, "ignoring invalid exponent width");
        return false;
    }
    match lock_width(&EXPONENT_BITS, bits) {
        Ok(_) => {
            tracing::debug!(bits, "exponent width locked");
            true
        }
        Err(current) => {
            tracing::debug!(bits, current, "exponent width is already locked");
            false
        }
    }
}

/// Returns the current width in `slot`, or `default` if it is not locked.
fn current_or(slot: &AtomicU32, default: u32) -> u32 {
    match slot.load(Ordering::Acquire) {
        0 => default,
        bits => bits,
    }
}

/// Returns the number of mantissa bits. Reading doesn't lock the width.
pub fn mantissa_bits() -> u32 {
    current_or(&MANTISSA_BITS, DEFAULT.get_mantissa_len())
}

/// Returns the number of exponent bits. Reading doesn't lock the width.
pub fn exponent_bits() -> u32 {
    current_or(&EXPONENT_BITS, DEFAULT.get_exponent_len())
}

impl Semantics {
    /// Returns the process-wide semantics. This locks both widths, using the
    /// defaults for any width that was never set.
    pub fn global() -> Semantics {
        let exponent = locked_or(&EXPONENT_BITS, DEFAULT.get_exponent_len());
        let mantissa = locked_or(&MANTISSA_BITS, DEFAULT.get_mantissa_len());
        Semantics::new_unchecked(exponent, mantissa)
    }
}

#[test]
fn test_lock_width() {
    let slot = AtomicU32::new(0);
    assert_eq!(lock_width(&slot, 5), Ok(5));
    assert_eq!(lock_width(&slot, 7), Err(5));
    assert_eq!(locked_or(&slot, 9), 5);

    let slot = AtomicU32::new(0);
    assert_eq!(locked_or(&slot, 9), 9);
    assert_eq!(lock_width(&slot, 3), Err(9));
}

#[test]
fn test_reading_does_not_lock() {
    let slot = AtomicU32::new(0);
    assert_eq!(current_or(&slot, 9), 9);
    assert_eq!(current_or(&slot, 9), 9);
    assert_eq!(lock_width(&slot, 4), Ok(4));
    assert_eq!(current_or(&slot, 9), 4);
}

#[test]
fn test_first_writer_wins() {
    use std::sync::Arc;
    use std::thread;

    let slot = Arc::new(AtomicU32::new(0));
    let handles: Vec<_> = (1..=8)
        .map(|bits| {
            let slot = slot.clone();
            thread::spawn(move || lock_width(&slot, bits).is_ok())
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
    assert_ne!(slot.load(Ordering::Acquire), 0);
}
