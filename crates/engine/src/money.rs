use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{Currency, EngineError, ResultEngine};

/// Signed money amount represented as integer **minor units** of a currency.
///
/// The value is signed:
/// - positive = credit / income
/// - negative = debit / expense
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::new(12_34, Currency::Eur);
/// assert_eq!(amount.amount_minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34 €");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more decimals than the currency has):
///
/// ```rust
/// use engine::{Currency, Money};
///
/// assert_eq!(Money::parse("10,5", Currency::Eur).unwrap().amount_minor(), 1050);
/// assert!(Money::parse("12.345", Currency::Eur).is_err());
/// assert!(Money::parse("1.5", Currency::Jpy).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Money {
    amount_minor: i64,
    currency: Currency,
}

impl Money {
    #[must_use]
    pub const fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    #[must_use]
    pub const fn amount_minor(self) -> i64 {
        self.amount_minor
    }

    #[must_use]
    pub const fn currency(self) -> Currency {
        self.currency
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.amount_minor == 0
    }

    /// Value in major units (e.g. `12.34` for `1234` EUR minor units).
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.amount_minor, self.currency.minor_units())
    }

    /// Builds an amount from major units, rounding half away from zero to
    /// the currency's minor units.
    pub fn from_decimal(value: Decimal, currency: Currency) -> ResultEngine<Self> {
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());
        let scale = Decimal::from(10i64.pow(currency.minor_units()));
        let amount_minor = value
            .checked_mul(scale)
            .ok_or_else(overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(overflow)?;
        Ok(Self::new(amount_minor, currency))
    }

    /// Converts the amount with `factor` (units of `target` per unit of this
    /// currency).
    pub fn convert(self, factor: Decimal, target: Currency) -> ResultEngine<Self> {
        let converted = self
            .to_decimal()
            .checked_mul(factor)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        Self::from_decimal(converted, target)
    }

    /// Parses a decimal string into minor units of `currency`.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    pub fn parse(s: &str, currency: Currency) -> ResultEngine<Self> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped.trim())
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped.trim())
        } else {
            (false, trimmed)
        };
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let (major_str, frac_str) = match rest.split_once('.') {
            Some((major, frac)) => (major, frac),
            None => (rest.as_str(), ""),
        };
        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units = currency.minor_units();
        if frac_str.len() > units as usize {
            return Err(EngineError::InvalidAmount("too many decimals".to_string()));
        }

        let major: i64 = major_str.parse().map_err(|_| overflow())?;
        let frac: i64 = if frac_str.is_empty() {
            0
        } else {
            let padded = format!("{frac_str:0<width$}", width = units as usize);
            padded.parse().map_err(|_| invalid())?
        };

        let total = major
            .checked_mul(10i64.pow(units))
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(overflow)?;

        Ok(Self::new(if negative { -total } else { total }, currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.currency.verbose(self.amount_minor))
    }
}
