// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::industry::Industry;
use crate::domain::repositories::industry_repository::IndustryRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::industry as industry_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;

/// 行业仓库实现
#[derive(Clone)]
pub struct IndustryRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl IndustryRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<industry_entity::Model> for Industry {
    fn from(model: industry_entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl IndustryRepository for IndustryRepositoryImpl {
    async fn upsert(&self, id: i32, name: &str) -> Result<Industry, RepositoryError> {
        let taken = industry_entity::Entity::find()
            .filter(industry_entity::Column::Name.eq(name))
            .filter(industry_entity::Column::Id.ne(id))
            .one(self.db.as_ref())
            .await?;
        if let Some(other) = taken {
            return Err(RepositoryError::Duplicate(format!(
                "industry name {:?} already belongs to id {}",
                name, other.id
            )));
        }

        let model = industry_entity::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            created_at: Set(Utc::now().into()),
        };

        // INSERT ... ON CONFLICT (id) DO UPDATE SET name, keeping created_at
        industry_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(industry_entity::Column::Id)
                    .update_column(industry_entity::Column::Name)
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        industry_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Industry::from)
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Industry>, RepositoryError> {
        let models = industry_entity::Entity::find()
            .order_by_asc(industry_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Industry::from).collect())
    }

    async fn list_ids(&self) -> Result<Vec<i32>, RepositoryError> {
        let ids = industry_entity::Entity::find()
            .select_only()
            .column(industry_entity::Column::Id)
            .order_by_asc(industry_entity::Column::Id)
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::setup_db;

    #[tokio::test]
    async fn test_upsert_registers_and_renames() {
        let db = setup_db().await;
        let repo = IndustryRepositoryImpl::new(db);

        let first = repo.upsert(2, "fintech").await.unwrap();
        repo.upsert(1, "healthcare").await.unwrap();
        let renamed = repo.upsert(2, "payments").await.unwrap();

        assert_eq!(renamed.name, "payments");
        assert_eq!(renamed.created_at, first.created_at);
        assert_eq!(repo.list_ids().await.unwrap(), vec![1, 2]);
        assert_eq!(
            repo.list()
                .await
                .unwrap()
                .into_iter()
                .map(|i| i.name)
                .collect::<Vec<_>>(),
            vec!["healthcare".to_string(), "payments".to_string()]
        );
    }

    #[tokio::test]
    async fn test_upsert_rejects_name_owned_by_another_id() {
        let db = setup_db().await;
        let repo = IndustryRepositoryImpl::new(db);
        repo.upsert(1, "healthcare").await.unwrap();

        assert!(matches!(
            repo.upsert(3, "healthcare").await,
            Err(RepositoryError::Duplicate(_))
        ));
        // Re-sending the same pair is a no-op
        assert_eq!(repo.upsert(1, "healthcare").await.unwrap().id, 1);
        assert_eq!(repo.list_ids().await.unwrap(), vec![1]);
    }
}
