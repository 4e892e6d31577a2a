// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::lease::{Lease, LeaseKind};
use crate::domain::repositories::lease_repository::LeaseRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::coordinator_lease;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;

/// 租约仓库实现
///
/// 依赖 `coordinator_leases.kind` 主键保证每种租约最多一行
#[derive(Clone)]
pub struct LeaseRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl LeaseRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_lease(kind: LeaseKind, model: coordinator_lease::Model) -> Lease {
    Lease {
        kind,
        token: model.token,
        expires_at: model.expires_at.with_timezone(&Utc),
        acquired_at: model.acquired_at.with_timezone(&Utc),
    }
}

fn fixed(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    at.into()
}

#[async_trait]
impl LeaseRepository for LeaseRepositoryImpl {
    async fn try_insert(&self, lease: &Lease) -> Result<bool, RepositoryError> {
        let model = coordinator_lease::ActiveModel {
            kind: Set(lease.kind.as_str().to_string()),
            token: Set(lease.token.clone()),
            expires_at: Set(fixed(lease.expires_at)),
            acquired_at: Set(fixed(lease.acquired_at)),
        };

        // INSERT ... ON CONFLICT (kind) DO NOTHING
        let inserted = coordinator_lease::Entity::insert(model)
            .on_conflict(
                OnConflict::column(coordinator_lease::Column::Kind)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(inserted == 1)
    }

    async fn find_live(
        &self,
        kind: LeaseKind,
        now: DateTime<Utc>,
    ) -> Result<Option<Lease>, RepositoryError> {
        let model = coordinator_lease::Entity::find()
            .filter(coordinator_lease::Column::Kind.eq(kind.as_str()))
            .filter(coordinator_lease::Column::ExpiresAt.gt(fixed(now)))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(|m| to_lease(kind, m)))
    }

    async fn delete_expired(
        &self,
        kind: LeaseKind,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let result = coordinator_lease::Entity::delete_many()
            .filter(coordinator_lease::Column::Kind.eq(kind.as_str()))
            .filter(coordinator_lease::Column::ExpiresAt.lte(fixed(now)))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn delete(&self, kind: LeaseKind, token: &str) -> Result<u64, RepositoryError> {
        let result = coordinator_lease::Entity::delete_many()
            .filter(coordinator_lease::Column::Kind.eq(kind.as_str()))
            .filter(coordinator_lease::Column::Token.eq(token))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}
