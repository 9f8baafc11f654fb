use chrono::NaiveDate;
use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ChangeCmd, Currency, EngineError, Money, ResultEngine, Transaction, TransactionKind,
    UpdateTransactionCmd, transactions,
};

use super::{Engine, normalize_required_name, transactions::apply_update, with_tx};

impl Engine {
    /// Records a currency change and recomputes the debits/credits it now
    /// provides the rate for.
    pub async fn new_change(&self, cmd: ChangeCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "change")?;
        with_tx!(self, |db_tx| {
            let account = self
                .require_account(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;
            let account_currency = account.parsed_currency()?;
            self.require_optional_category(&db_tx, cmd.category_id, &cmd.user_id)
                .await?;

            let amount = Money::new(cmd.amount_minor, cmd.currency.unwrap_or(account_currency));
            let new_amount = Money::new(cmd.new_amount_minor, cmd.new_currency);
            let mut tx =
                Transaction::change(cmd.account_id, name, amount, new_amount, cmd.date)?;
            tx.active = cmd.active;
            tx.category_id = cmd.category_id;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            self.price_change(&db_tx, &cmd.user_id, &mut tx, account_currency)
                .await?;
            tracing::info!(
                change_id = %tx.id,
                from = %amount.currency(),
                to = %cmd.new_currency,
                date = %tx.date,
                "change recorded"
            );

            self.cascade_from_change(&db_tx, &cmd.user_id, tx.date, cmd.new_currency)
                .await?;
            Ok(tx.id)
        })
    }

    /// Updates a change. Debits/credits governed by the change before and
    /// after the update are recomputed.
    pub async fn update_change(
        &self,
        change_id: Uuid,
        user_id: &str,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<()> {
        self.save_change(change_id, user_id, cmd, true).await
    }

    /// Updates a change without recomputing any other transaction.
    ///
    /// Existing reference amounts keep the old rate until the next
    /// [`Engine::recompute_reference_amounts`].
    pub async fn force_save_change(
        &self,
        change_id: Uuid,
        user_id: &str,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<()> {
        self.save_change(change_id, user_id, cmd, false).await
    }

    /// Deletes a change and recomputes the debits/credits it was providing
    /// the rate for.
    pub async fn delete_change(&self, change_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (model, _) = self.require_transaction(&db_tx, change_id, user_id).await?;
            if model.parsed_kind()? != TransactionKind::Change {
                return Err(EngineError::KeyNotFound("change not exists".to_string()));
            }
            self.remove_transaction(&db_tx, model, user_id).await
        })
    }

    async fn save_change(
        &self,
        change_id: Uuid,
        user_id: &str,
        cmd: UpdateTransactionCmd,
        cascade: bool,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (model, account) = self.require_transaction(&db_tx, change_id, user_id).await?;
            if model.parsed_kind()? != TransactionKind::Change {
                return Err(EngineError::KeyNotFound("change not exists".to_string()));
            }
            let account_currency = account.parsed_currency()?;

            let mut tx = Transaction::try_from((model, account_currency))?;
            let old_date = tx.date;
            let old_new_currency = tx.new_amount.map(Money::currency);

            apply_update(&mut tx, &cmd)?;
            if let Some(category_id) = cmd.category_id {
                self.require_optional_category(&db_tx, category_id, user_id)
                    .await?;
            }
            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            self.price_change(&db_tx, user_id, &mut tx, account_currency)
                .await?;

            if cascade {
                let old = old_new_currency.map(|currency| (old_date, currency));
                let new = tx.new_amount.map(|money| (tx.date, money.currency()));
                for (date, currency) in cascade_windows(old, new) {
                    self.cascade_from_change(&db_tx, user_id, date, currency)
                        .await?;
                }
            } else {
                tracing::warn!(
                    change_id = %tx.id,
                    "change saved without recomputing reference amounts"
                );
            }

            Ok(())
        })
    }
}

/// Windows to recompute after a change moved from `old` to `new`
/// (date, target currency). An unchanged pair is recomputed once.
fn cascade_windows(
    old: Option<(NaiveDate, Currency)>,
    new: Option<(NaiveDate, Currency)>,
) -> Vec<(NaiveDate, Currency)> {
    match (old, new) {
        (Some(old), Some(new)) if old == new => vec![new],
        (old, new) => old.into_iter().chain(new).collect(),
    }
}
