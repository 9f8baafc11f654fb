use std::collections::HashMap;

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine, accounts, categories, transactions};

use super::Engine;

/// Generates a lookup that only succeeds when the row belongs to `user_id`.
///
/// Rows of other users are reported as missing.
macro_rules! impl_require_owned {
    ($require_fn:ident, $entity:path, $model:ty, $user_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id.to_string())
                .filter($user_col.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(
        require_account,
        accounts::Entity,
        accounts::Model,
        accounts::Column::UserId,
        "account not exists"
    );

    impl_require_owned!(
        require_category,
        categories::Entity,
        categories::Model,
        categories::Column::UserId,
        "category not exists"
    );

    /// Returns the transaction row together with its (owned) account.
    pub(super) async fn require_transaction(
        &self,
        db: &DatabaseTransaction,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(transactions::Model, accounts::Model)> {
        let row = transactions::Entity::find_by_id(transaction_id.to_string())
            .find_also_related(accounts::Entity)
            .one(db)
            .await?;
        match row {
            Some((tx, Some(account))) if account.user_id == user_id => Ok((tx, account)),
            _ => Err(EngineError::KeyNotFound(
                "transaction not exists".to_string(),
            )),
        }
    }

    /// Currency of every account of `user_id`, keyed by account id.
    pub(super) async fn account_currencies(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<HashMap<String, Currency>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .all(db)
            .await?;

        let mut out = HashMap::with_capacity(models.len());
        for model in models {
            let currency = model.parsed_currency()?;
            out.insert(model.id, currency);
        }
        Ok(out)
    }

    /// Checks an optional category reference before it is stored on a transaction.
    pub(super) async fn require_optional_category(
        &self,
        db: &DatabaseTransaction,
        category_id: Option<Uuid>,
        user_id: &str,
    ) -> ResultEngine<()> {
        if let Some(category_id) = category_id {
            self.require_category(db, category_id, user_id).await?;
        }
        Ok(())
    }
}
