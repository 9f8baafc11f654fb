use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{Category, CategoryCmd, EngineError, ResultEngine, categories, transactions};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Add a new category, optionally nested under `parent_id`.
    pub async fn new_category(&self, cmd: CategoryCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "category")?;
        let category = Category::new(name, cmd.color, cmd.parent_id, &cmd.user_id)?;
        with_tx!(self, |db_tx| {
            if let Some(parent_id) = category.parent_id {
                self.require_category(&db_tx, parent_id, &cmd.user_id)
                    .await?;
            }

            let mut siblings = categories::Entity::find()
                .filter(categories::Column::UserId.eq(cmd.user_id.clone()))
                .filter(Expr::cust("LOWER(name)").eq(category.name.to_lowercase()));
            siblings = match category.parent_id {
                Some(parent_id) => {
                    siblings.filter(categories::Column::ParentId.eq(parent_id.to_string()))
                }
                None => siblings.filter(categories::Column::ParentId.is_null()),
            };
            if siblings.one(&db_tx).await?.is_some() {
                return Err(EngineError::ExistingKey(category.name.clone()));
            }

            let model: categories::ActiveModel = (&category).into();
            model.insert(&db_tx).await?;
            Ok(category.id)
        })
    }

    /// Lists the categories of `user_id`, by name.
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Category::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Deletes a category.
    ///
    /// Its transactions become uncategorized and its children move up to its
    /// parent.
    pub async fn delete_category(&self, category_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id, user_id).await?;

            transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::CategoryId,
                    Expr::value(Option::<String>::None),
                )
                .filter(transactions::Column::CategoryId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;

            categories::Entity::update_many()
                .col_expr(
                    categories::Column::ParentId,
                    Expr::value(model.parent_id.clone()),
                )
                .filter(categories::Column::ParentId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;

            categories::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
