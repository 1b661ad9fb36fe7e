//! Amount type
//!
//! Domain primitive for transfer amounts. Amounts are validated at
//! construction time, so a non-positive amount cannot exist in the system.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Amount represents a validated, strictly positive monetary value.
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use core_banking::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(50, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(50, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount.
    ///
    /// # Errors
    /// `AmountError::NotPositive` if `value <= 0`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Parse a decimal literal without rounding.
///
/// Accepts plain (`12.50`) and exponent (`1.5e3`) notation. A literal that
/// has more precision than `Decimal` can hold, or a magnitude outside its
/// range, is an error rather than the nearest representable value.
pub fn parse_exact_decimal(literal: &str) -> Result<Decimal, AmountError> {
    let invalid = || AmountError::ParseError(literal.to_string());

    let (mantissa, exponent) = match literal.find(|c: char| c == 'e' || c == 'E') {
        Some(idx) => {
            let exponent = literal[idx + 1..].parse::<i64>().map_err(|_| invalid())?;
            (&literal[..idx], exponent)
        }
        None => (literal, 0),
    };

    let mantissa = Decimal::from_str_exact(mantissa).map_err(|_| invalid())?;
    let scale = i64::from(mantissa.scale()) - exponent;

    if scale >= 0 {
        let scale = u32::try_from(scale).map_err(|_| invalid())?;
        Decimal::try_from_i128_with_scale(mantissa.mantissa(), scale).map_err(|_| invalid())
    } else {
        let factor = u32::try_from(-scale)
            .ok()
            .and_then(|power| 10i128.checked_pow(power))
            .ok_or_else(invalid)?;
        let digits = mantissa.mantissa().checked_mul(factor).ok_or_else(invalid)?;
        Decimal::try_from_i128_with_scale(digits, 0).map_err(|_| invalid())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::new(parse_exact_decimal(s)?)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
