//! The module contains `Account` struct and its entity.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{Currency, EngineError};

/// An account.
///
/// An account is where money is kept (a bank account, a wallet, ...). It
/// holds a single currency: every transaction recorded against it gets a
/// reference amount expressed in that currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub currency: Currency,
    pub user_id: String,
    pub archived: bool,
}

impl Account {
    pub fn new(name: String, currency: Currency, user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            currency,
            user_id: user_id.to_string(),
            archived: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub currency: String,
    pub user_id: String,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn parsed_currency(&self) -> Result<Currency, EngineError> {
        Currency::try_from(self.currency.as_str())
    }
}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            archived: ActiveValue::Set(value.archived),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let currency = model.parsed_currency()?;
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid account id".to_string()))?,
            name: model.name,
            currency,
            user_id: model.user_id,
            archived: model.archived,
        })
    }
}
