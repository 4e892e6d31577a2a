// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::industry::Industry;
use crate::domain::repositories::task_repository::RepositoryError;
use async_trait::async_trait;

/// 行业仓库特质
#[async_trait]
pub trait IndustryRepository: Send + Sync {
    /// 登记行业，同ID已存在时改名
    ///
    /// 名称已被其他ID占用时返回 `Duplicate`
    async fn upsert(&self, id: i32, name: &str) -> Result<Industry, RepositoryError>;
    /// 所有已知行业，按ID升序
    async fn list(&self) -> Result<Vec<Industry>, RepositoryError>;
    /// 所有已知行业ID，升序
    async fn list_ids(&self) -> Result<Vec<i32>, RepositoryError>;
}
