use chrono::NaiveDate;
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    ChangeRate, DebitsCreditsCmd, EngineError, Money, ResultEngine, Transaction,
    TransactionKind, UpdateTransactionCmd, accounts, transactions,
};

use super::{Engine, normalize_required_name, with_tx};

/// Filters for [`Engine::list_transactions`].
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub account_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    /// Inclusive.
    pub from: Option<NaiveDate>,
    /// Inclusive.
    pub to: Option<NaiveDate>,
    pub include_inactive: bool,
    pub limit: Option<u64>,
}

impl Engine {
    /// Returns a single transaction of `user_id`.
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let (model, account) = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            Transaction::try_from((model, account.parsed_currency()?))
        })
    }

    /// Lists transactions of `user_id`, most recent first.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .find_also_related(accounts::Entity)
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(transactions::Column::Date)
                .order_by_asc(transactions::Column::Name);

            if let Some(account_id) = filter.account_id {
                query = query.filter(transactions::Column::AccountId.eq(account_id.to_string()));
            }
            if let Some(kind) = filter.kind {
                query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
            }
            if let Some(from) = filter.from {
                query = query.filter(transactions::Column::Date.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(transactions::Column::Date.lte(to));
            }
            if !filter.include_inactive {
                query = query.filter(transactions::Column::Active.eq(true));
            }
            if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }

            let rows = query.all(&db_tx).await?;
            let mut out = Vec::with_capacity(rows.len());
            for (model, account) in rows {
                let Some(account) = account else { continue };
                out.push(Transaction::try_from((model, account.parsed_currency()?))?);
            }
            Ok(out)
        })
    }

    /// Records a debit (negative amount) or credit (positive amount).
    ///
    /// The reference amount is resolved at save time; it stays empty when no
    /// exchange rate is known for the transaction currency.
    pub async fn new_debits_credits(&self, cmd: DebitsCreditsCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "transaction")?;
        with_tx!(self, |db_tx| {
            let account = self
                .require_account(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;
            let account_currency = account.parsed_currency()?;
            self.require_optional_category(&db_tx, cmd.category_id, &cmd.user_id)
                .await?;

            let amount = Money::new(cmd.amount_minor, cmd.currency.unwrap_or(account_currency));
            let mut tx = Transaction::debits_credits(cmd.account_id, name, amount, cmd.date);
            tx.active = cmd.active;
            tx.category_id = cmd.category_id;
            tx.reference_amount = self
                .compute_reference_amount(&db_tx, &cmd.user_id, amount, account_currency, tx.date)
                .await?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            if tx.reference_amount.is_none() {
                tracing::debug!(
                    transaction_id = %tx.id,
                    currency = %amount.currency(),
                    "no exchange rate for transaction"
                );
            }

            Ok(tx.id)
        })
    }

    /// Updates a debit/credit and recomputes its reference amount.
    pub async fn update_debits_credits(
        &self,
        transaction_id: Uuid,
        user_id: &str,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (model, account) = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            if model.parsed_kind()? != TransactionKind::DebitsCredits {
                return Err(EngineError::KeyNotFound(
                    "debits_credits not exists".to_string(),
                ));
            }
            let account_currency = account.parsed_currency()?;

            let mut tx = Transaction::try_from((model, account_currency))?;
            apply_update(&mut tx, &cmd)?;
            if let Some(category_id) = cmd.category_id {
                self.require_optional_category(&db_tx, category_id, user_id)
                    .await?;
            }
            tx.reference_amount = self
                .compute_reference_amount(&db_tx, user_id, tx.amount, account_currency, tx.date)
                .await?;

            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes a transaction. Deleting a change recomputes the debits/credits
    /// it was providing rates for.
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (model, _) = self
                .require_transaction(&db_tx, transaction_id, user_id)
                .await?;
            self.remove_transaction(&db_tx, model, user_id).await
        })
    }

    pub(super) async fn remove_transaction(
        &self,
        db: &DatabaseTransaction,
        model: transactions::Model,
        user_id: &str,
    ) -> ResultEngine<()> {
        let kind = model.parsed_kind()?;
        let date = model.date;
        let new_currency = model.new_amount()?.map(Money::currency);

        transactions::Entity::delete_by_id(model.id).exec(db).await?;

        if let (TransactionKind::Change, Some(new_currency)) = (kind, new_currency) {
            self.cascade_from_change(db, user_id, date, new_currency)
                .await?;
        }
        Ok(())
    }
}

/// Applies a patch to a transaction, validating the result.
pub(super) fn apply_update(tx: &mut Transaction, cmd: &UpdateTransactionCmd) -> ResultEngine<()> {
    if let Some(name) = cmd.name.as_deref() {
        tx.name = normalize_required_name(name, "transaction")?;
    }
    if cmd.amount_minor.is_some() || cmd.currency.is_some() {
        tx.amount = Money::new(
            cmd.amount_minor.unwrap_or(tx.amount.amount_minor()),
            cmd.currency.unwrap_or(tx.amount.currency()),
        );
    }
    if let Some(date) = cmd.date {
        tx.date = date;
    }
    if let Some(active) = cmd.active {
        tx.active = active;
    }
    if let Some(category_id) = cmd.category_id {
        tx.category_id = category_id;
    }

    match (tx.kind, tx.new_amount) {
        (TransactionKind::DebitsCredits, _) => {
            if cmd.touches_change_fields() {
                return Err(EngineError::InvalidChange(
                    "new amount only applies to changes".to_string(),
                ));
            }
        }
        (TransactionKind::Change, current) => {
            let current = current.ok_or_else(|| {
                EngineError::InvalidChange("change without new amount".to_string())
            })?;
            let new_amount = Money::new(
                cmd.new_amount_minor.unwrap_or(current.amount_minor()),
                cmd.new_currency.unwrap_or(current.currency()),
            );
            ChangeRate::new(tx.date, tx.amount, new_amount)?;
            tx.new_amount = Some(new_amount);
        }
    }

    Ok(())
}
