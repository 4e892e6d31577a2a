// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::task::{DomainError, NewTask, Task, TaskId, TaskStatus};
use crate::domain::repositories::task_repository::{
    CandidateOrder, RepositoryError, TaskRepository,
};
use crate::infrastructure::database::entities::task as task_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, UpdateMany,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// 任务仓库实现
///
/// 基于SeaORM实现的任务数据访问层
#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的任务仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 以 `id + status` 为条件的更新，返回是否恰好命中一行
    async fn apply(&self, update: UpdateMany<task_entity::Entity>) -> Result<bool, RepositoryError> {
        let result = update.exec(self.db.as_ref()).await?;
        Ok(result.rows_affected == 1)
    }

    fn transition(id: TaskId, from: TaskStatus, to: TaskStatus) -> UpdateMany<task_entity::Entity> {
        task_entity::Entity::update_many()
            .col_expr(task_entity::Column::Status, Expr::value(to.to_string()))
            .col_expr(task_entity::Column::UpdatedAt, Expr::value(now()))
            .filter(task_entity::Column::Id.eq(id))
            .filter(task_entity::Column::Status.eq(from.to_string()))
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

fn fixed(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    at.into()
}

impl TryFrom<task_entity::Model> for Task {
    type Error = DomainError;

    fn try_from(model: task_entity::Model) -> Result<Self, Self::Error> {
        let failed_from = model
            .failed_from
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()?;

        Ok(Self {
            id: model.id,
            industry_id: model.industry_id,
            target_date: model.target_date,
            status: model.status.parse()?,
            batch_id: model.batch_id,
            posts_scraped: model.posts_scraped,
            posts_processed: model.posts_processed,
            ideas_generated: model.ideas_generated,
            retry_count: model.retry_count,
            max_retries: model.max_retries,
            error_message: model.error_message,
            failed_from,
            created_at: model.created_at,
            updated_at: model.updated_at,
            started_at: model.started_at,
            completed_at: model.completed_at,
        })
    }
}

fn to_tasks(models: Vec<task_entity::Model>) -> Result<Vec<Task>, RepositoryError> {
    models
        .into_iter()
        .map(|model| Task::try_from(model).map_err(RepositoryError::from))
        .collect()
}

impl From<&NewTask> for task_entity::ActiveModel {
    fn from(task: &NewTask) -> Self {
        let created_at = now();
        Self {
            industry_id: Set(task.industry_id),
            target_date: Set(task.target_date),
            status: Set(TaskStatus::PendingScrape.to_string()),
            batch_id: Set(task.batch_id.clone()),
            posts_scraped: Set(0),
            posts_processed: Set(0),
            ideas_generated: Set(0),
            retry_count: Set(0),
            max_retries: Set(task.max_retries),
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        }
    }
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    async fn insert_batch(&self, tasks: &[NewTask]) -> Result<u64, RepositoryError> {
        if tasks.is_empty() {
            return Ok(0);
        }

        let models: Vec<task_entity::ActiveModel> = tasks.iter().map(Into::into).collect();

        let txn = self.db.begin().await?;
        task_entity::Entity::insert_many(models).exec(&txn).await?;
        txn.commit().await?;

        Ok(tasks.len() as u64)
    }

    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let model = task_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Task::try_from).transpose()?)
    }

    async fn find_by_batch(&self, batch_id: &str) -> Result<Vec<Task>, RepositoryError> {
        let models = task_entity::Entity::find()
            .filter(task_entity::Column::BatchId.eq(batch_id))
            .order_by_asc(task_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        to_tasks(models)
    }

    async fn find_active_industries(
        &self,
        target_date: NaiveDate,
        industry_ids: &[i32],
    ) -> Result<Vec<i32>, RepositoryError> {
        if industry_ids.is_empty() {
            return Ok(Vec::new());
        }

        let active: Vec<String> = TaskStatus::ACTIVE.iter().map(|s| s.to_string()).collect();

        let models = task_entity::Entity::find()
            .filter(task_entity::Column::TargetDate.eq(target_date))
            .filter(task_entity::Column::IndustryId.is_in(industry_ids.iter().copied()))
            .filter(task_entity::Column::Status.is_in(active))
            .all(self.db.as_ref())
            .await?;

        let industries: BTreeSet<i32> = models.into_iter().map(|m| m.industry_id).collect();
        Ok(industries.into_iter().collect())
    }

    async fn count_by_status(&self, status: TaskStatus) -> Result<u64, RepositoryError> {
        let count = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(status.to_string()))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    async fn find_candidates(
        &self,
        status: TaskStatus,
        order: CandidateOrder,
        limit: u64,
    ) -> Result<Vec<Task>, RepositoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(status.to_string()));

        let query = match order {
            CandidateOrder::CreatedAt => query.order_by_asc(task_entity::Column::CreatedAt),
            CandidateOrder::UpdatedAt => query.order_by_asc(task_entity::Column::UpdatedAt),
        };

        let models = query
            .order_by_asc(task_entity::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        to_tasks(models)
    }

    async fn claim(
        &self,
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let update = Self::transition(id, from, to)
            .col_expr(task_entity::Column::StartedAt, Expr::value(Some(fixed(now))));

        self.apply(update).await
    }

    async fn find_stuck(
        &self,
        status: TaskStatus,
        started_before: DateTime<Utc>,
    ) -> Result<Vec<Task>, RepositoryError> {
        let models = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(status.to_string()))
            .filter(task_entity::Column::StartedAt.lt(fixed(started_before)))
            .order_by_asc(task_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        to_tasks(models)
    }

    async fn requeue(
        &self,
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        error_message: &str,
        started_before: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError> {
        let mut update = Self::transition(id, from, to)
            .col_expr(
                task_entity::Column::RetryCount,
                Expr::col(task_entity::Column::RetryCount).add(1),
            )
            .col_expr(
                task_entity::Column::StartedAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .col_expr(
                task_entity::Column::ErrorMessage,
                Expr::value(Some(error_message.to_string())),
            )
            .filter(
                Expr::col(task_entity::Column::RetryCount)
                    .lt(Expr::col(task_entity::Column::MaxRetries)),
            );

        if let Some(threshold) = started_before {
            update = update.filter(task_entity::Column::StartedAt.lt(fixed(threshold)));
        }

        self.apply(update).await
    }

    async fn fail(
        &self,
        id: TaskId,
        from: TaskStatus,
        error_message: &str,
        started_before: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError> {
        let mut update = Self::transition(id, from, TaskStatus::Failed)
            .col_expr(task_entity::Column::CompletedAt, Expr::value(Some(now())))
            .col_expr(
                task_entity::Column::FailedFrom,
                Expr::value(Some(from.to_string())),
            )
            .col_expr(
                task_entity::Column::ErrorMessage,
                Expr::value(Some(error_message.to_string())),
            );

        if let Some(threshold) = started_before {
            update = update.filter(task_entity::Column::StartedAt.lt(fixed(threshold)));
        }

        self.apply(update).await
    }

    async fn find_retryable_failures(
        &self,
        failed_from: TaskStatus,
        completed_before: DateTime<Utc>,
    ) -> Result<Vec<Task>, RepositoryError> {
        let models = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(TaskStatus::Failed.to_string()))
            .filter(task_entity::Column::FailedFrom.eq(failed_from.to_string()))
            .filter(
                Expr::col(task_entity::Column::RetryCount)
                    .lt(Expr::col(task_entity::Column::MaxRetries)),
            )
            .filter(task_entity::Column::CompletedAt.lt(fixed(completed_before)))
            .order_by_asc(task_entity::Column::CompletedAt)
            .order_by_asc(task_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        to_tasks(models)
    }

    async fn reset_failed(&self, id: TaskId, to: TaskStatus) -> Result<bool, RepositoryError> {
        let update = Self::transition(id, TaskStatus::Failed, to)
            .col_expr(
                task_entity::Column::RetryCount,
                Expr::col(task_entity::Column::RetryCount).add(1),
            )
            .col_expr(
                task_entity::Column::ErrorMessage,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                task_entity::Column::FailedFrom,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                task_entity::Column::CompletedAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .col_expr(
                task_entity::Column::StartedAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .filter(
                Expr::col(task_entity::Column::RetryCount)
                    .lt(Expr::col(task_entity::Column::MaxRetries)),
            );

        self.apply(update).await
    }

    async fn complete_scrape(
        &self,
        id: TaskId,
        posts_scraped: i32,
    ) -> Result<bool, RepositoryError> {
        let update = Self::transition(id, TaskStatus::Scraping, TaskStatus::CompleteScrape)
            .col_expr(task_entity::Column::PostsScraped, Expr::value(posts_scraped));

        self.apply(update).await
    }

    async fn complete_analysis(
        &self,
        id: TaskId,
        posts_processed: i32,
        ideas_generated: i32,
    ) -> Result<bool, RepositoryError> {
        let update = Self::transition(id, TaskStatus::Analyzing, TaskStatus::CompleteAnalysis)
            .col_expr(
                task_entity::Column::PostsProcessed,
                Expr::value(posts_processed),
            )
            .col_expr(
                task_entity::Column::IdeasGenerated,
                Expr::value(ideas_generated),
            )
            .col_expr(task_entity::Column::CompletedAt, Expr::value(Some(now())));

        self.apply(update).await
    }
}

#[cfg(test)]
#[path = "task_repo_impl_test.rs"]
mod tests;
