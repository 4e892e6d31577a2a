// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{DomainError, NewTask, Task, TaskId, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 违反唯一约束
    #[error("Duplicate record: {0}")]
    Duplicate(String),
    /// 行内容无法还原为领域对象
    #[error("Invalid task record: {0}")]
    InvalidRecord(#[from] DomainError),
}

/// 候选任务的排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrder {
    /// 按创建时间升序（抓取协调器）
    CreatedAt,
    /// 按最近状态变更时间升序，即抓取完成时间（分析协调器）
    UpdatedAt,
}

/// 任务仓库特质
///
/// 所有状态转换写入都以行的当前状态为条件（乐观并发控制），
/// 返回 `false` 表示该行已被其他写入者改变，本次写入未生效。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 在单个事务中批量插入待抓取任务，返回插入行数
    async fn insert_batch(&self, tasks: &[NewTask]) -> Result<u64, RepositoryError>;

    /// 根据ID查找任务
    async fn find_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError>;

    /// 查找某批次的所有任务，按ID升序
    async fn find_by_batch(&self, batch_id: &str) -> Result<Vec<Task>, RepositoryError>;

    /// 返回在目标日期上仍有非终止任务的行业ID（升序去重）
    async fn find_active_industries(
        &self,
        target_date: NaiveDate,
        industry_ids: &[i32],
    ) -> Result<Vec<i32>, RepositoryError>;

    /// 统计处于某状态的任务数
    async fn count_by_status(&self, status: TaskStatus) -> Result<u64, RepositoryError>;

    /// 选择处于某状态的候选任务
    async fn find_candidates(
        &self,
        status: TaskStatus,
        order: CandidateOrder,
        limit: u64,
    ) -> Result<Vec<Task>, RepositoryError>;

    /// 认领任务：`from → to`，设置 started_at
    async fn claim(
        &self,
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// 查找 started_at 早于阈值的执行中任务
    async fn find_stuck(
        &self,
        status: TaskStatus,
        started_before: DateTime<Utc>,
    ) -> Result<Vec<Task>, RepositoryError>;

    /// 重新排队：`from → to`，retry_count 加一，清空 started_at，记录错误信息
    ///
    /// 仅当 retry_count < max_retries 时生效；
    /// 给定 `started_before` 时还要求 started_at 仍早于该时间
    async fn requeue(
        &self,
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        error_message: &str,
        started_before: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError>;

    /// 标记失败：`from → failed`，设置 completed_at 与 failed_from
    async fn fail(
        &self,
        id: TaskId,
        from: TaskStatus,
        error_message: &str,
        started_before: Option<DateTime<Utc>>,
    ) -> Result<bool, RepositoryError>;

    /// 查找从 `failed_from` 失败、仍有重试预算且 completed_at 早于阈值的任务
    async fn find_retryable_failures(
        &self,
        failed_from: TaskStatus,
        completed_before: DateTime<Utc>,
    ) -> Result<Vec<Task>, RepositoryError>;

    /// 冷却重试：`failed → to`，retry_count 加一，清空错误信息与完成时间
    async fn reset_failed(&self, id: TaskId, to: TaskStatus) -> Result<bool, RepositoryError>;

    /// 抓取完成：`scraping → complete_scrape`
    async fn complete_scrape(&self, id: TaskId, posts_scraped: i32)
        -> Result<bool, RepositoryError>;

    /// 分析完成：`analyzing → complete_analysis`
    async fn complete_analysis(
        &self,
        id: TaskId,
        posts_processed: i32,
        ideas_generated: i32,
    ) -> Result<bool, RepositoryError>;
}
