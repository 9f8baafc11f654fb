//! Categories classify transactions. They form a tree through `parent_id`.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// `#rrggbb`
    pub color: Option<String>,
    pub parent_id: Option<Uuid>,
    pub user_id: String,
}

impl Category {
    pub fn new(
        name: String,
        color: Option<String>,
        parent_id: Option<Uuid>,
        user_id: &str,
    ) -> ResultEngine<Self> {
        let color = color.map(|c| normalize_color(&c)).transpose()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            color,
            parent_id,
            user_id: user_id.to_string(),
        })
    }
}

fn normalize_color(raw: &str) -> ResultEngine<String> {
    let trimmed = raw.trim();
    let valid = trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(EngineError::InvalidName(format!(
            "invalid color '{trimmed}': expected #rrggbb"
        )));
    }
    Ok(trimmed.to_ascii_lowercase())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub parent_id: Option<String>,
    pub user_id: String,
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

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            color: ActiveValue::Set(value.color.clone()),
            parent_id: ActiveValue::Set(value.parent_id.map(|id| id.to_string())),
            user_id: ActiveValue::Set(value.user_id.clone()),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let invalid = || EngineError::InvalidId("invalid category id".to_string());
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|_| invalid())?,
            name: model.name,
            color: model.color,
            parent_id: model
                .parent_id
                .map(|id| Uuid::parse_str(&id).map_err(|_| invalid()))
                .transpose()?,
            user_id: model.user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_is_validated_and_lowercased() {
        let category =
            Category::new("Food".to_string(), Some("#FFAA00".to_string()), None, "alice").unwrap();
        assert_eq!(category.color.as_deref(), Some("#ffaa00"));

        assert!(Category::new("Food".to_string(), Some("red".to_string()), None, "alice").is_err());
        assert!(
            Category::new("Food".to_string(), Some("#12345g".to_string()), None, "alice").is_err()
        );
    }
}
