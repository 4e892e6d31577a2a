// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::settings::TaskSettings;
use crate::domain::models::lease::LeaseKind;
use crate::domain::models::task::NewTask;
use crate::domain::repositories::industry_repository::IndustryRepository;
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::domain::services::lease_manager::{LeaseManager, Leased};

/// 等待其他创建请求释放租约的总时长
const CREATOR_LEASE_WAIT: Duration = Duration::from_secs(5);
/// 租约被占用时的重试间隔
const CREATOR_LEASE_RETRY: Duration = Duration::from_millis(50);

/// 任务创建错误
#[derive(Error, Debug)]
pub enum TaskCreatorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Active tasks already exist for industries {industries:?}")]
    Conflict { industries: Vec<i32> },

    #[error("Another batch creation is in progress")]
    Busy,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 创建批次命令
#[derive(Debug, Clone, Default)]
pub struct CreateBatchCommand {
    /// 目标日期，`YYYY-MM-DD`
    pub target_date: String,
    /// 行业ID，`None` 表示全部已知行业
    pub industry_ids: Option<Vec<i32>>,
    pub force_create: bool,
}

/// 新批次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCreated {
    pub batch_id: String,
    pub tasks_created: u64,
}

// === Section: Use Case Definition ===

pub struct CreateBatchUseCase {
    tasks: Arc<dyn TaskRepository>,
    industries: Arc<dyn IndustryRepository>,
    leases: LeaseManager,
    max_retries: i32,
    min_target_date: NaiveDate,
}

// === Section: Implementation ===

impl CreateBatchUseCase {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        industries: Arc<dyn IndustryRepository>,
        leases: LeaseManager,
        settings: &TaskSettings,
    ) -> Self {
        Self {
            tasks,
            industries,
            leases,
            max_retries: settings.max_retries,
            min_target_date: settings.min_target_date,
        }
    }

    pub async fn execute(&self, command: CreateBatchCommand) -> Result<BatchCreated, TaskCreatorError> {
        self.execute_on(command, Utc::now().date_naive()).await
    }

    /// 以给定的“今天”执行，日期上限检查以此为准
    pub async fn execute_on(
        &self,
        command: CreateBatchCommand,
        today: NaiveDate,
    ) -> Result<BatchCreated, TaskCreatorError> {
        let target_date = self.parse_target_date(&command.target_date, today)?;
        let industry_ids = self.resolve_industries(command.industry_ids).await?;
        let force_create = command.force_create;

        // The conflict check and the insert must not interleave with another request
        let deadline = Instant::now() + CREATOR_LEASE_WAIT;
        loop {
            let attempt = self
                .leases
                .scoped(LeaseKind::TaskCreator, || {
                    self.create(target_date, &industry_ids, force_create)
                })
                .await?;

            match attempt {
                Leased::Ran(created) => return Ok(created),
                Leased::Busy if Instant::now() < deadline => {
                    debug!("Batch creation waiting for task creator lease");
                    sleep(CREATOR_LEASE_RETRY).await;
                }
                Leased::Busy => return Err(TaskCreatorError::Busy),
            }
        }
    }

    async fn create(
        &self,
        target_date: NaiveDate,
        industry_ids: &[i32],
        force_create: bool,
    ) -> Result<BatchCreated, TaskCreatorError> {
        if !force_create {
            let active = self
                .tasks
                .find_active_industries(target_date, industry_ids)
                .await?;
            if !active.is_empty() {
                return Err(TaskCreatorError::Conflict { industries: active });
            }
        }

        let batch_id = Uuid::new_v4().to_string();
        let tasks: Vec<NewTask> = industry_ids
            .iter()
            .map(|&industry_id| {
                NewTask::pending(industry_id, target_date, &batch_id, self.max_retries)
            })
            .collect();

        let tasks_created = self.tasks.insert_batch(&tasks).await?;

        info!(
            batch_id = %batch_id,
            target_date = %target_date,
            tasks_created,
            force_create,
            "Batch created"
        );

        Ok(BatchCreated {
            batch_id,
            tasks_created,
        })
    }

    fn parse_target_date(&self, raw: &str, today: NaiveDate) -> Result<NaiveDate, TaskCreatorError> {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            TaskCreatorError::Validation(format!("targetDate must be YYYY-MM-DD, got {:?}", raw))
        })?;

        if date > today {
            return Err(TaskCreatorError::Validation(format!(
                "targetDate {} is in the future",
                date
            )));
        }

        if date < self.min_target_date {
            return Err(TaskCreatorError::Validation(format!(
                "targetDate {} is earlier than {}",
                date, self.min_target_date
            )));
        }

        Ok(date)
    }

    async fn resolve_industries(
        &self,
        requested: Option<Vec<i32>>,
    ) -> Result<Vec<i32>, TaskCreatorError> {
        let ids = match requested {
            Some(ids) => ids,
            None => self.industries.list_ids().await?,
        };

        if ids.is_empty() {
            return Err(TaskCreatorError::Validation(
                "industryIds cannot be empty".to_string(),
            ));
        }

        if let Some(bad) = ids.iter().find(|&&id| id <= 0) {
            return Err(TaskCreatorError::Validation(format!(
                "industryIds must be positive, got {}",
                bad
            )));
        }

        let mut seen = HashSet::new();
        Ok(ids.into_iter().filter(|id| seen.insert(*id)).collect())
    }
}

#[cfg(test)]
#[path = "create_batch_test.rs"]
mod tests;
