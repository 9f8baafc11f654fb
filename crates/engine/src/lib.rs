//! Bookkeeping engine.
//!
//! Accounts hold money in one currency. Transactions recorded against them
//! (debits/credits and currency changes) carry a reference amount in the
//! account currency, derived from the exchange rates implied by past changes.
//! All persistence goes through `sea-orm`; every [`Engine`] operation runs in
//! a single database transaction.

pub use accounts::Account;
pub use categories::Category;
pub use commands::{CategoryCmd, ChangeCmd, DebitsCreditsCmd, UpdateTransactionCmd};
pub use currency::Currency;
pub use error::EngineError;
pub use exchange::{ChangeRate, RateBook};
pub use money::Money;
pub use ops::{AccountBalance, Engine, EngineBuilder, TransactionListFilter};
pub use transactions::{Transaction, TransactionKind};

mod accounts;
mod categories;
mod commands;
mod currency;
mod error;
mod exchange;
mod money;
mod ops;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
