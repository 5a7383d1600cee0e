//! Custom Test Assertions
//!
//! Assertion helpers with messages that name the quantity that failed.

use core_kernel::{Currency, Money};
use rust_decimal::Decimal;

/// Asserts that two scores agree within `tolerance`
pub fn assert_score_approx_eq(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "Scores differ by more than tolerance: actual={}, expected={}, tolerance={}",
        actual,
        expected,
        tolerance
    );
}

/// Asserts that a score lies in [0, 1]
pub fn assert_unit_interval(value: f64) {
    assert!(
        (0.0..=1.0).contains(&value),
        "Expected a value within [0, 1], got {}",
        value
    );
}

/// Asserts an exact amount in `currency`
pub fn assert_money_eq(actual: &Money, amount: Decimal, currency: Currency) {
    assert_eq!(actual.currency(), currency, "Currency mismatch for {}", actual);
    assert_eq!(
        actual.amount(),
        amount,
        "Expected {} {}, got {}",
        currency.symbol(),
        amount,
        actual
    );
}
