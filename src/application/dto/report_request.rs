// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::completion::{Outcome, Stage, WorkerReport};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 工作器完成回报请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ReportRequestDto {
    pub stage: Stage,
    pub outcome: Outcome,
    #[validate(range(min = 0))]
    pub posts_scraped: Option<i32>,
    #[validate(range(min = 0))]
    pub posts_processed: Option<i32>,
    #[validate(range(min = 0))]
    pub ideas_generated: Option<i32>,
    #[validate(length(max = 4000))]
    pub error_message: Option<String>,
}

impl From<ReportRequestDto> for WorkerReport {
    fn from(dto: ReportRequestDto) -> Self {
        Self {
            stage: dto.stage,
            outcome: dto.outcome,
            posts_scraped: dto.posts_scraped.unwrap_or(0),
            posts_processed: dto.posts_processed.unwrap_or(0),
            ideas_generated: dto.ideas_generated.unwrap_or(0),
            error_message: dto.error_message,
        }
    }
}

/// 完成回报响应DTO
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportResponseDto {
    /// 是否改变了任务状态；重复或过期的回报为 `false`
    pub applied: bool,
}
