//! Transaction primitives.
//!
//! A `Transaction` belongs to one account and is expressed in one currency.
//! It comes in two kinds:
//!
//! - [`TransactionKind::DebitsCredits`]: a plain ledger entry (positive
//!   credit, negative debit).
//! - [`TransactionKind::Change`]: money converted from `currency` into
//!   `new_currency`. Changes are the source of every exchange rate.
//!
//! Both kinds live in the same table; `new_amount_minor`/`new_currency` are
//! only set for changes.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ChangeRate, Currency, EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    DebitsCredits,
    Change,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DebitsCredits => "debits_credits",
            Self::Change => "change",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "debits_credits" => Ok(Self::DebitsCredits),
            "change" => Ok(Self::Change),
            other => Err(EngineError::InvalidId(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub account_id: Uuid,
    pub name: String,
    /// Signed amount in the transaction's own currency.
    pub amount: Money,
    /// `amount` in the account's currency; `None` when no exchange rate
    /// could be resolved.
    pub reference_amount: Option<Money>,
    pub date: NaiveDate,
    /// Inactive transactions are drafts: ignored by reports and by rate
    /// resolution.
    pub active: bool,
    pub category_id: Option<Uuid>,
    /// Set for changes only.
    pub new_amount: Option<Money>,
}

impl Transaction {
    pub fn debits_credits(
        account_id: Uuid,
        name: String,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: TransactionKind::DebitsCredits,
            account_id,
            name,
            amount,
            reference_amount: None,
            date,
            active: true,
            category_id: None,
            new_amount: None,
        }
    }

    /// A currency change. Fails when no rate can be derived from the two
    /// amounts.
    pub fn change(
        account_id: Uuid,
        name: String,
        amount: Money,
        new_amount: Money,
        date: NaiveDate,
    ) -> ResultEngine<Self> {
        ChangeRate::new(date, amount, new_amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            kind: TransactionKind::Change,
            account_id,
            name,
            amount,
            reference_amount: None,
            date,
            active: true,
            category_id: None,
            new_amount: Some(new_amount),
        })
    }

    /// Amount formatted with its currency symbol.
    pub fn value(&self) -> String {
        self.amount.to_string()
    }

    /// New amount of a change, formatted with its currency symbol.
    pub fn new_value(&self) -> Option<String> {
        self.new_amount.map(|money| money.to_string())
    }

    pub fn is_foreign_currency(&self, account_currency: Currency) -> bool {
        self.amount.currency() != account_currency
    }

    /// Units of `new_currency` per unit of `currency`, for changes.
    pub fn exchange_rate(&self) -> Option<Decimal> {
        self.change_rate().map(|rate| rate.exchange_rate())
    }

    pub(crate) fn change_rate(&self) -> Option<ChangeRate> {
        let new_amount = self.new_amount?;
        ChangeRate::new(self.date, self.amount, new_amount).ok()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.new_amount {
            Some(new_amount) => write!(f, "{} ({} -> {})", self.name, self.amount, new_amount),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub account_id: String,
    pub name: String,
    pub amount_minor: i64,
    pub currency: String,
    pub reference_amount_minor: Option<i64>,
    pub date: Date,
    pub active: bool,
    pub category_id: Option<String>,
    pub new_amount_minor: Option<i64>,
    pub new_currency: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn parsed_kind(&self) -> ResultEngine<TransactionKind> {
        TransactionKind::try_from(self.kind.as_str())
    }

    pub(crate) fn amount(&self) -> ResultEngine<Money> {
        let currency = Currency::try_from(self.currency.as_str())?;
        Ok(Money::new(self.amount_minor, currency))
    }

    pub(crate) fn new_amount(&self) -> ResultEngine<Option<Money>> {
        match (self.new_amount_minor, self.new_currency.as_deref()) {
            (Some(amount_minor), Some(code)) => {
                Ok(Some(Money::new(amount_minor, Currency::try_from(code)?)))
            }
            _ => Ok(None),
        }
    }

    /// The rate carried by this row, if it is a change.
    pub(crate) fn change_rate(&self) -> ResultEngine<Option<ChangeRate>> {
        if self.parsed_kind()? != TransactionKind::Change {
            return Ok(None);
        }
        let Some(new_amount) = self.new_amount()? else {
            return Ok(None);
        };
        ChangeRate::new(self.date, self.amount()?, new_amount).map(Some)
    }
}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            name: ActiveValue::Set(tx.name.clone()),
            amount_minor: ActiveValue::Set(tx.amount.amount_minor()),
            currency: ActiveValue::Set(tx.amount.currency().code().to_string()),
            reference_amount_minor: ActiveValue::Set(
                tx.reference_amount.map(Money::amount_minor),
            ),
            date: ActiveValue::Set(tx.date),
            active: ActiveValue::Set(tx.active),
            category_id: ActiveValue::Set(tx.category_id.map(|id| id.to_string())),
            new_amount_minor: ActiveValue::Set(tx.new_amount.map(Money::amount_minor)),
            new_currency: ActiveValue::Set(
                tx.new_amount.map(|money| money.currency().code().to_string()),
            ),
        }
    }
}

/// Builds the domain value from a row and the currency of its account.
impl TryFrom<(Model, Currency)> for Transaction {
    type Error = EngineError;

    fn try_from((model, account_currency): (Model, Currency)) -> Result<Self, Self::Error> {
        let kind = model.parsed_kind()?;
        let amount = model.amount()?;
        let new_amount = model.new_amount()?;
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid transaction id".to_string()))?,
            kind,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| EngineError::InvalidId("invalid account id".to_string()))?,
            name: model.name,
            amount,
            reference_amount: model
                .reference_amount_minor
                .map(|minor| Money::new(minor, account_currency)),
            date: model.date,
            active: model.active,
            category_id: model
                .category_id
                .map(|id| Uuid::parse_str(&id))
                .transpose()
                .map_err(|_| EngineError::InvalidId("invalid category id".to_string()))?,
            new_amount,
        })
    }
}
