//! EUR-Intermediary Exchange Rate Math
//!
//! Every rate handled by this crate is quoted against EUR: `eur_to_x` is how
//! many units of `X` one euro buys. Converting `X -> Y` therefore divides the
//! two quotes, and nothing here ever needs a direct `X/Y` pair.
//!
//! The crate is pure: no I/O, no clocks, no allocation beyond formatted text.
//!
//! # Example
//! ```
//! use exchange_rates::{convert, cross_rate};
//!
//! // 1 EUR = 1.10 USD, 1 EUR = 0.90 GBP
//! let converted = convert(100.0, 1.10, 0.90).unwrap();
//! assert_eq!(converted, 81.82);
//! assert_eq!(cross_rate(1.10, 0.90).unwrap(), 0.818182);
//! ```

pub mod format;
pub mod locale;

pub use format::{LocaleFormat, format_currency};
pub use locale::{DEFAULT_LOCALE, normalize_locale};

/// Decimal places of a converted amount.
pub const AMOUNT_DECIMALS: u32 = 2;

/// Decimal places of a reported cross rate.
pub const RATE_DECIMALS: u32 = 6;

/// Errors raised by the conversion calculator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("Amount must be non-negative and within range")]
    InvalidAmount,

    #[error("Invalid rate(s): EUR→FROM={eur_to_source:.4} EUR→TO={eur_to_target:.4}")]
    InvalidRates {
        eur_to_source: f64,
        eur_to_target: f64,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Rounding
// ─────────────────────────────────────────────────────────────────────────────

/// Rounds `value` to `places` decimals, half away from zero.
///
/// Values too large to scale have no fractional digits left and are
/// returned unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

// ─────────────────────────────────────────────────────────────────────────────
// Calculator
// ─────────────────────────────────────────────────────────────────────────────

/// Converts `amount` from the source currency into the target currency.
///
/// `result = round(amount × (eur_to_target / eur_to_source), 2)`
pub fn convert(amount: f64, eur_to_source: f64, eur_to_target: f64) -> Result<f64, CalcError> {
    // NaN fails both comparisons, so it is rejected here as well.
    if !(amount >= 0.0) || !amount.is_finite() {
        return Err(CalcError::InvalidAmount);
    }
    let ratio = ratio(eur_to_source, eur_to_target)?;
    let converted = amount * ratio;
    // The amount is finite, so only an oversized result can get here.
    if !converted.is_finite() {
        return Err(CalcError::InvalidAmount);
    }
    Ok(round_to(converted, AMOUNT_DECIMALS))
}

/// Source-to-target rate derived from two EUR quotes, rounded to 6 decimals.
pub fn cross_rate(eur_to_source: f64, eur_to_target: f64) -> Result<f64, CalcError> {
    ratio(eur_to_source, eur_to_target).map(|r| round_to(r, RATE_DECIMALS))
}

fn ratio(eur_to_source: f64, eur_to_target: f64) -> Result<f64, CalcError> {
    if !is_valid_rate(eur_to_source) || !is_valid_rate(eur_to_target) {
        return Err(CalcError::InvalidRates {
            eur_to_source,
            eur_to_target,
        });
    }
    Ok(eur_to_target / eur_to_source)
}

/// A usable EUR quote is finite and strictly positive.
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_matches_formula() {
        let cases = [
            (100.0, 1.10, 0.90),
            (5.0, 0.85, 1.00),
            (1234.56, 1.0871, 163.42),
            (0.01, 7.45, 1.0),
        ];
        for (amount, r1, r2) in cases {
            assert_eq!(
                convert(amount, r1, r2).unwrap(),
                round_to(amount * (r2 / r1), 2),
                "amount={amount} r1={r1} r2={r2}"
            );
        }
    }

    #[test]
    fn test_convert_usd_to_gbp() {
        assert_eq!(convert(100.0, 1.10, 0.90).unwrap(), 81.82);
    }

    #[test]
    fn test_convert_gbp_to_eur() {
        assert_eq!(convert(5.0, 0.85, 1.00).unwrap(), 5.88);
    }

    #[test]
    fn test_same_rate_is_identity() {
        assert_eq!(convert(42.125, 1.3, 1.3).unwrap(), round_to(42.125, 2));
        assert_eq!(convert(10.0, 0.5, 0.5).unwrap(), 10.0);
    }

    #[test]
    fn test_zero_amount() {
        assert_eq!(convert(0.0, 1.1, 0.9).unwrap(), 0.0);
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert_eq!(convert(-1.0, 1.0, 1.0), Err(CalcError::InvalidAmount));
    }

    #[test]
    fn test_nan_amount_rejected() {
        assert_eq!(convert(f64::NAN, 1.0, 1.0), Err(CalcError::InvalidAmount));
        assert_eq!(
            convert(f64::INFINITY, 1.0, 1.0),
            Err(CalcError::InvalidAmount)
        );
    }

    #[test]
    fn test_non_positive_rates_rejected() {
        assert!(matches!(
            convert(10.0, 0.0, 1.0),
            Err(CalcError::InvalidRates { .. })
        ));
        assert!(matches!(
            convert(10.0, 1.0, 0.0),
            Err(CalcError::InvalidRates { .. })
        ));
        assert!(matches!(
            convert(10.0, -2.0, 1.0),
            Err(CalcError::InvalidRates { .. })
        ));
    }

    #[test]
    fn test_cross_rate_six_decimals() {
        assert_eq!(cross_rate(1.10, 0.90).unwrap(), 0.818182);
        assert_eq!(cross_rate(1.10, 1.00).unwrap(), 0.909091);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(0.125, 2), 0.13);
    }

    #[test]
    fn test_huge_amount_stays_finite() {
        let converted = convert(1e307, 1.10, 0.90).unwrap();
        assert!(converted.is_finite());
        assert_eq!(converted, 1e307 * (0.90 / 1.10));
        assert_eq!(round_to(1e307, 2), 1e307);
        assert_eq!(round_to(f64::MAX, 6), f64::MAX);
    }

    #[test]
    fn test_overflowing_result_rejected() {
        assert_eq!(convert(f64::MAX, 0.5, 2.0), Err(CalcError::InvalidAmount));
    }

    #[test]
    fn test_invalid_rates_message() {
        let err = convert(1.0, 0.0, 2.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid rate(s): EUR→FROM=0.0000 EUR→TO=2.0000"
        );
    }
}
