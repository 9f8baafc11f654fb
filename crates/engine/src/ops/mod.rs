use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod access;
mod accounts;
mod balances;
mod categories;
mod changes;
mod reference;
mod transactions;

pub use balances::AccountBalance;
pub use transactions::TransactionListFilter;

/// Runs `$body` inside one DB transaction. The transaction is committed only
/// when the body returns `Ok`; dropping it on `Err` rolls back every write,
/// cascades included.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        match $body {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, "rolling back");
                Err(err)
            }
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Starts building an `Engine` over an already migrated database.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Trims `value`, rejecting names that end up empty.
fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    match value.trim() {
        "" => Err(EngineError::InvalidName(format!("{label} name must not be empty"))),
        trimmed => Ok(trimmed.to_string()),
    }
}

#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Builds the engine once the connection answers.
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
        })
    }
}
