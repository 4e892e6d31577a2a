// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{Task, TaskId, TaskStatus};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 创建批次请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequestDto {
    /// 目标日期，`YYYY-MM-DD`
    #[validate(length(equal = 10))]
    pub target_date: String,

    /// 行业ID列表，缺省表示全部已知行业
    #[validate(length(min = 1, max = 1000))]
    pub industry_ids: Option<Vec<i32>>,

    /// 忽略同日期未完成任务的冲突检查
    #[serde(default)]
    pub force_create: bool,
}

/// 创建批次响应DTO
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchResponseDto {
    pub batch_id: String,
    pub tasks_created: u64,
}

/// 任务信息DTO
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfoDto {
    pub id: TaskId,
    pub industry_id: i32,
    pub target_date: NaiveDate,
    pub status: TaskStatus,
    pub batch_id: String,
    pub posts_scraped: i32,
    pub posts_processed: i32,
    pub ideas_generated: i32,
    pub retry_count: i32,
    pub max_retries: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub completed_at: Option<DateTime<FixedOffset>>,
}

impl From<Task> for TaskInfoDto {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            industry_id: task.industry_id,
            target_date: task.target_date,
            status: task.status,
            batch_id: task.batch_id,
            posts_scraped: task.posts_scraped,
            posts_processed: task.posts_processed,
            ideas_generated: task.ideas_generated,
            retry_count: task.retry_count,
            max_retries: task.max_retries,
            error_message: task.error_message,
            created_at: task.created_at,
            updated_at: task.updated_at,
            started_at: task.started_at,
            completed_at: task.completed_at,
        }
    }
}
