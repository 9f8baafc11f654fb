use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Chf,
    Gbp,
    Thb,
    Jpy,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        /// Defaults to EUR.
        pub currency: Option<Currency>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub currency: Currency,
        pub archived: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountList {
        pub include_archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }

    /// Rename and/or archive an account.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountBalanceView {
        pub account_id: Uuid,
        pub currency: Currency,
        pub balance_minor: i64,
        /// Balance formatted with the currency symbol.
        pub balance: String,
        pub entries: u64,
        /// Entries without a reference amount, left out of the balance.
        pub unresolved: u64,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        /// `#rrggbb`
        pub color: Option<String>,
        pub parent_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub color: Option<String>,
        pub parent_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        DebitsCredits,
        Change,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebitsCreditsNew {
        pub account_id: Uuid,
        pub name: String,
        /// Negative for debits, positive for credits.
        pub amount_minor: i64,
        /// Defaults to the account currency.
        pub currency: Option<Currency>,
        pub date: NaiveDate,
        pub active: Option<bool>,
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChangeNew {
        pub account_id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        /// Defaults to the account currency.
        pub currency: Option<Currency>,
        pub new_amount_minor: i64,
        pub new_currency: Currency,
        pub date: NaiveDate,
        pub active: Option<bool>,
        pub category_id: Option<Uuid>,
    }

    /// Patch for debits/credits and changes. Absent fields are unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub name: Option<String>,
        pub amount_minor: Option<i64>,
        pub currency: Option<Currency>,
        pub date: Option<NaiveDate>,
        pub active: Option<bool>,
        pub category_id: Option<Uuid>,
        /// Removes the category. Wins over `category_id`.
        #[serde(default)]
        pub clear_category: bool,
        /// Changes only.
        pub new_amount_minor: Option<i64>,
        /// Changes only.
        pub new_currency: Option<Currency>,
        /// Changes only: save without recomputing the other transactions.
        #[serde(default)]
        pub force: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub account_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        /// Inclusive.
        pub from: Option<NaiveDate>,
        /// Inclusive.
        pub to: Option<NaiveDate>,
        pub include_inactive: Option<bool>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub account_id: Uuid,
        pub name: String,
        pub amount_minor: i64,
        pub currency: Currency,
        /// Amount formatted with the currency symbol.
        pub value: String,
        /// Amount in the account currency; `null` when no rate is known.
        pub reference_amount_minor: Option<i64>,
        pub date: NaiveDate,
        pub active: bool,
        pub category_id: Option<Uuid>,
        pub new_amount_minor: Option<i64>,
        pub new_currency: Option<Currency>,
        pub new_value: Option<String>,
        pub exchange_rate: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod exchange {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExchangeRateQuery {
        pub from: Currency,
        pub to: Currency,
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExchangeRateView {
        pub from: Currency,
        pub to: Currency,
        pub date: NaiveDate,
        /// `amount_to = amount_from * rate`; `null` when no chain of changes
        /// connects the two currencies.
        pub rate: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecomputeResponse {
        pub updated: u64,
    }
}
