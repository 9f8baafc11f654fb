use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{Currency, EngineError, Money, ResultEngine, TransactionKind, transactions};

use super::{Engine, with_tx};

/// Balance of an account in its own currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    pub account_id: Uuid,
    pub currency: Currency,
    /// Sum of the resolved reference amounts of active debits/credits.
    pub balance_minor: i64,
    /// Number of active debits/credits.
    pub entries: u64,
    /// Active debits/credits left out of `balance_minor` because no exchange
    /// rate was known for them.
    pub unresolved: u64,
}

impl AccountBalance {
    #[must_use]
    pub fn balance(&self) -> Money {
        Money::new(self.balance_minor, self.currency)
    }
}

impl Engine {
    /// Computes the balance of an account from its active debits/credits.
    pub async fn account_balance(
        &self,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<AccountBalance> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, account_id, user_id).await?;
            let currency = account.parsed_currency()?;

            let rows = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account.id.clone()))
                .filter(transactions::Column::Kind.eq(TransactionKind::DebitsCredits.as_str()))
                .filter(transactions::Column::Active.eq(true))
                .all(&db_tx)
                .await?;

            let mut balance = AccountBalance {
                account_id,
                currency,
                balance_minor: 0,
                entries: 0,
                unresolved: 0,
            };
            for row in rows {
                balance.entries += 1;
                match row.reference_amount_minor {
                    Some(minor) => {
                        balance.balance_minor =
                            balance.balance_minor.checked_add(minor).ok_or_else(|| {
                                EngineError::InvalidAmount("balance too large".to_string())
                            })?;
                    }
                    None => balance.unresolved += 1,
                }
            }

            Ok(balance)
        })
    }
}
