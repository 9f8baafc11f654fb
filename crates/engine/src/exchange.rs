//! Exchange rate resolution.
//!
//! Rates are never stored: they are derived from currency [`Change`]s. A
//! change of `amount` (in `currency`) into `new_amount` (in `new_currency`)
//! tells that, on that date, one unit of `currency` was worth
//! `|new_amount| / |amount|` units of `new_currency`.
//!
//! [`RateBook::rate`] chains those records transitively, walking backward in
//! time: to price a THB expense in a EUR account it looks for the most recent
//! change that produced THB, then for the change that produced the money
//! spent in it, and so on until it reaches EUR (e.g. EUR > CHF > THB).
//!
//! [`Change`]: crate::TransactionKind::Change

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{Currency, EngineError, Money, ResultEngine};

/// A currency change reduced to what rate resolution needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeRate {
    pub date: NaiveDate,
    pub currency: Currency,
    pub new_currency: Currency,
    amount: Decimal,
    new_amount: Decimal,
}

impl ChangeRate {
    pub fn new(date: NaiveDate, amount: Money, new_amount: Money) -> ResultEngine<Self> {
        if amount.currency() == new_amount.currency() {
            return Err(EngineError::InvalidChange(format!(
                "cannot change {} into itself",
                amount.currency()
            )));
        }
        if amount.is_zero() || new_amount.is_zero() {
            return Err(EngineError::InvalidChange(
                "change amounts must not be zero".to_string(),
            ));
        }
        Ok(Self {
            date,
            currency: amount.currency(),
            new_currency: new_amount.currency(),
            amount: amount.to_decimal().abs(),
            new_amount: new_amount.to_decimal().abs(),
        })
    }

    /// Units of `new_currency` obtained for one unit of `currency`.
    #[must_use]
    pub fn exchange_rate(&self) -> Decimal {
        self.new_amount / self.amount
    }

    /// The other currency of this change, and the factor converting
    /// `currency_side` amounts into it. `None` if the change does not involve
    /// `currency_side`.
    fn edge_from(&self, currency_side: Currency) -> Option<(Currency, Decimal)> {
        if self.new_currency == currency_side {
            self.amount
                .checked_div(self.new_amount)
                .map(|factor| (self.currency, factor))
        } else if self.currency == currency_side {
            self.new_amount
                .checked_div(self.amount)
                .map(|factor| (self.new_currency, factor))
        } else {
            None
        }
    }
}

/// A materialized set of currency changes, queried for historical rates.
#[derive(Clone, Debug, Default)]
pub struct RateBook {
    /// Most recent first.
    changes: Vec<ChangeRate>,
}

impl RateBook {
    #[must_use]
    pub fn from_changes(mut changes: Vec<ChangeRate>) -> Self {
        changes.sort_by(|a, b| b.date.cmp(&a.date));
        Self { changes }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Factor converting amounts in `from` into `to` as of `as_of`:
    /// `amount_to = amount_from * factor`.
    ///
    /// Returns `None` when no chain of changes connects the two currencies.
    #[must_use]
    pub fn rate(&self, from: Currency, to: Currency, as_of: NaiveDate) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        let mut path = vec![from];
        self.walk(from, to, as_of, &mut path)
    }

    /// `amount` expressed in `account_currency` as of `date`.
    ///
    /// Same currency needs no rate. `None` when no rate path exists.
    pub fn reference_amount(
        &self,
        amount: Money,
        account_currency: Currency,
        date: NaiveDate,
    ) -> ResultEngine<Option<Money>> {
        if amount.currency() == account_currency {
            return Ok(Some(Money::new(amount.amount_minor(), account_currency)));
        }
        match self.rate(amount.currency(), account_currency, date) {
            Some(factor) => amount.convert(factor, account_currency).map(Some),
            None => Ok(None),
        }
    }

    fn walk(
        &self,
        current: Currency,
        target: Currency,
        as_of: NaiveDate,
        path: &mut Vec<Currency>,
    ) -> Option<Decimal> {
        // Only the most recent record per neighbouring currency is applicable.
        let mut tried: HashSet<Currency> = HashSet::new();

        for change in self.candidates(current, as_of) {
            let Some((other, factor)) = change.edge_from(current) else {
                continue;
            };
            if !tried.insert(other) {
                continue;
            }
            if other == target {
                return Some(factor);
            }
            if path.contains(&other) {
                continue;
            }

            path.push(other);
            let rest = self.walk(other, target, change.date, path);
            path.pop();

            if let Some(rest) = rest.and_then(|rest| factor.checked_mul(rest)) {
                return Some(rest);
            }
        }

        None
    }

    fn candidates(&self, currency: Currency, as_of: NaiveDate) -> Vec<&ChangeRate> {
        let mut ordered: Vec<&ChangeRate> = self
            .changes
            .iter()
            .filter(|c| c.date <= as_of && (c.new_currency == currency || c.currency == currency))
            .collect();
        // On the same date, a change producing `currency` goes before one consuming it.
        ordered.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| (b.new_currency == currency).cmp(&(a.new_currency == currency)))
        });
        ordered
    }
}
