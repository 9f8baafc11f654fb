//! Reference amounts and the cascade triggered by currency changes.
//!
//! A change dated `D` into currency `N` governs the rates of every
//! debit/credit dated from `D` up to (excluded) the next later change into
//! `N`. Saving or deleting it recomputes the reference amounts in that
//! window.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    Currency, Money, RateBook, ResultEngine, Transaction, TransactionKind, accounts, transactions,
};

use super::{Engine, with_tx};

impl Engine {
    /// Exchange factor from `from` to `to` as of `date`, derived from the
    /// active changes of `user_id`.
    ///
    /// `amount_to = amount_from * factor`; `None` when no chain of changes
    /// connects the two currencies.
    pub async fn exchange_rate(
        &self,
        user_id: &str,
        from: Currency,
        to: Currency,
        date: NaiveDate,
    ) -> ResultEngine<Option<Decimal>> {
        with_tx!(self, |db_tx| {
            let book = self.rate_book(&db_tx, user_id).await?;
            Ok(book.rate(from, to, date))
        })
    }

    /// Recomputes the reference amount of every debit/credit of `user_id`.
    ///
    /// Returns the number of rows whose reference amount changed.
    pub async fn recompute_reference_amounts(&self, user_id: &str) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            self.recompute_window(&db_tx, user_id, None, None).await
        })
    }

    /// Loads the active changes of `user_id`.
    pub(super) async fn rate_book(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<RateBook> {
        let models = transactions::Entity::find()
            .inner_join(accounts::Entity)
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .filter(transactions::Column::Kind.eq(TransactionKind::Change.as_str()))
            .filter(transactions::Column::Active.eq(true))
            .all(db)
            .await?;

        let mut rates = Vec::with_capacity(models.len());
        for model in &models {
            if let Some(rate) = model.change_rate()? {
                rates.push(rate);
            }
        }
        Ok(RateBook::from_changes(rates))
    }

    /// Reference amount (in account minor units) of `amount` booked on `date`.
    ///
    /// The rate book is only loaded for foreign currency amounts.
    pub(super) async fn compute_reference_amount(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        amount: Money,
        account_currency: Currency,
        date: NaiveDate,
    ) -> ResultEngine<Option<Money>> {
        let book = if amount.currency() == account_currency {
            RateBook::default()
        } else {
            self.rate_book(db, user_id).await?
        };
        Ok(resolve(&book, amount, account_currency, date))
    }

    /// Writes the reference amount of a change that is already stored, so
    /// that the rate book it is priced with includes the change itself.
    pub(super) async fn price_change(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        change: &mut Transaction,
        account_currency: Currency,
    ) -> ResultEngine<()> {
        change.reference_amount = self
            .compute_reference_amount(db, user_id, change.amount, account_currency, change.date)
            .await?;
        transactions::ActiveModel {
            id: ActiveValue::Set(change.id.to_string()),
            reference_amount_minor: ActiveValue::Set(
                change.reference_amount.map(Money::amount_minor),
            ),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(())
    }

    /// Recomputes the debits/credits governed by a change dated `date` into
    /// `new_currency`.
    pub(super) async fn cascade_from_change(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        date: NaiveDate,
        new_currency: Currency,
    ) -> ResultEngine<u64> {
        let next = transactions::Entity::find()
            .inner_join(accounts::Entity)
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .filter(transactions::Column::Kind.eq(TransactionKind::Change.as_str()))
            .filter(transactions::Column::Active.eq(true))
            .filter(transactions::Column::NewCurrency.eq(new_currency.code()))
            .filter(transactions::Column::Date.gt(date))
            .order_by_asc(transactions::Column::Date)
            .one(db)
            .await?;

        let until = next.map(|change| change.date);
        let updated = self
            .recompute_window(db, user_id, Some(date), until)
            .await?;
        tracing::debug!(
            %date,
            %new_currency,
            ?until,
            updated,
            "recomputed reference amounts after change"
        );
        Ok(updated)
    }

    /// Recomputes debits/credits of `user_id` dated in `[from, until)`.
    /// Open bounds are unbounded.
    pub(super) async fn recompute_window(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> ResultEngine<u64> {
        let book = self.rate_book(db, user_id).await?;
        let currencies = self.account_currencies(db, user_id).await?;

        let mut query = transactions::Entity::find()
            .inner_join(accounts::Entity)
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .filter(transactions::Column::Kind.eq(TransactionKind::DebitsCredits.as_str()));
        if let Some(from) = from {
            query = query.filter(transactions::Column::Date.gte(from));
        }
        if let Some(until) = until {
            query = query.filter(transactions::Column::Date.lt(until));
        }
        let rows = query.all(db).await?;

        let mut updated = 0;
        for row in rows {
            let Some(account_currency) = currencies.get(&row.account_id).copied() else {
                continue;
            };
            let reference = resolve(&book, row.amount()?, account_currency, row.date)
                .map(Money::amount_minor);
            if reference == row.reference_amount_minor {
                continue;
            }

            let active = transactions::ActiveModel {
                id: ActiveValue::Set(row.id),
                reference_amount_minor: ActiveValue::Set(reference),
                ..Default::default()
            };
            active.update(db).await?;
            updated += 1;
        }

        Ok(updated)
    }
}

/// Reference amount of `amount`, or `None` when no rate is known or the
/// converted amount does not fit in minor units.
fn resolve(
    book: &RateBook,
    amount: Money,
    account_currency: Currency,
    date: NaiveDate,
) -> Option<Money> {
    book.reference_amount(amount, account_currency, date)
        .unwrap_or_else(|err| {
            tracing::warn!(%amount, %account_currency, %date, "reference amount left unresolved: {err}");
            None
        })
}
