// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::lease::{Lease, LeaseKind};
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 租约仓库特质
#[async_trait]
pub trait LeaseRepository: Send + Sync {
    /// 条件插入租约，该类型已有租约行时不插入并返回 `false`
    async fn try_insert(&self, lease: &Lease) -> Result<bool, RepositoryError>;

    /// 查找该类型仍未过期的租约
    async fn find_live(
        &self,
        kind: LeaseKind,
        now: DateTime<Utc>,
    ) -> Result<Option<Lease>, RepositoryError>;

    /// 删除该类型已过期的租约，返回删除行数
    async fn delete_expired(
        &self,
        kind: LeaseKind,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;

    /// 删除与令牌匹配的租约，返回删除行数
    async fn delete(&self, kind: LeaseKind, token: &str) -> Result<u64, RepositoryError>;
}
