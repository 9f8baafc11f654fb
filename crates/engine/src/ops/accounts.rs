use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{Account, Currency, EngineError, ResultEngine, TransactionKind, accounts, transactions};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a new account owned by `user_id`.
    ///
    /// Account names are unique per user (case-insensitive).
    pub async fn new_account(
        &self,
        name: &str,
        currency: Currency,
        user_id: &str,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            let exists = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let account = Account::new(name, currency, user_id);
            let model: accounts::ActiveModel = (&account).into();
            model.insert(&db_tx).await?;
            tracing::info!(account_id = %account.id, %currency, "account created");

            Ok(account.id)
        })
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id, user_id).await?;
            Account::try_from(model)
        })
    }

    /// Lists the accounts of `user_id`, by name.
    pub async fn list_accounts(
        &self,
        user_id: &str,
        include_archived: bool,
    ) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let mut query = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(accounts::Column::Name);
            if !include_archived {
                query = query.filter(accounts::Column::Archived.eq(false));
            }

            query
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Account::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Renames an existing account.
    pub async fn rename_account(
        &self,
        account_id: Uuid,
        new_name: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let new_name = normalize_required_name(new_name, "account")?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id, user_id).await?;

            let exists = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                .filter(accounts::Column::Id.ne(account_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(new_name));
            }

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Archives (or restores) an account. Archived accounts keep their
    /// transactions and still take part in rate resolution.
    pub async fn set_account_archived(
        &self,
        account_id: Uuid,
        archived: bool,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id, user_id).await?;
            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                archived: ActiveValue::Set(archived),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes an account with all its transactions.
    ///
    /// Changes booked on the account stop providing rates, so the remaining
    /// debits/credits from the earliest of them onward are recomputed.
    pub async fn delete_account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, account_id, user_id).await?;

            let earliest_change = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id.to_string()))
                .filter(transactions::Column::Kind.eq(TransactionKind::Change.as_str()))
                .order_by_asc(transactions::Column::Date)
                .one(&db_tx)
                .await?
                .map(|change| change.date);

            let deleted = transactions::Entity::delete_many()
                .filter(transactions::Column::AccountId.eq(account_id.to_string()))
                .exec(&db_tx)
                .await?;
            accounts::Entity::delete_by_id(account_id.to_string())
                .exec(&db_tx)
                .await?;

            if let Some(from) = earliest_change {
                self.recompute_window(&db_tx, user_id, Some(from), None)
                    .await?;
            }
            tracing::info!(
                %account_id,
                transactions = deleted.rows_affected,
                "account deleted"
            );

            Ok(())
        })
    }
}
