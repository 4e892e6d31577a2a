// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 任务标识符，由数据库自增分配
pub type TaskId = i32;

/// 流水线任务实体
///
/// 表示某个批次中一个 (行业, 目标日期) 组合的工作单元。
/// 任务先被抓取协调器派发给抓取工作器，再由分析协调器派发给分析工作器。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// 任务唯一标识符
    pub id: TaskId,
    /// 行业ID，真实任务始终为正整数
    pub industry_id: i32,
    /// 目标日期（无时间部分）
    pub target_date: NaiveDate,
    /// 任务状态
    pub status: TaskStatus,
    /// 批次ID，同一次创建的任务共享
    pub batch_id: String,
    /// 已抓取帖子数
    pub posts_scraped: i32,
    /// 已处理帖子数
    pub posts_processed: i32,
    /// 生成的创意数
    pub ideas_generated: i32,
    /// 已重试次数
    pub retry_count: i32,
    /// 最大重试次数
    pub max_retries: i32,
    /// 错误信息
    pub error_message: Option<String>,
    /// 失败前所处的执行中状态，用于把冷却重试路由到正确的协调器
    pub failed_from: Option<TaskStatus>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 最近一次状态变更时间
    pub updated_at: DateTime<FixedOffset>,
    /// 进入执行中状态的时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 进入终止状态的时间
    pub completed_at: Option<DateTime<FixedOffset>>,
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// PendingScrape → Scraping → CompleteScrape → Analyzing → CompleteAnalysis
/// 执行中的两个状态都可能进入 Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 等待抓取
    #[default]
    PendingScrape,
    /// 抓取中
    Scraping,
    /// 抓取完成，等待分析
    CompleteScrape,
    /// 分析中
    Analyzing,
    /// 分析完成
    CompleteAnalysis,
    /// 已失败
    Failed,
}

impl TaskStatus {
    /// 非终止状态，任务创建器据此检测重复批次
    pub const ACTIVE: [TaskStatus; 4] = [
        TaskStatus::PendingScrape,
        TaskStatus::Scraping,
        TaskStatus::CompleteScrape,
        TaskStatus::Analyzing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::PendingScrape => "pending_scrape",
            TaskStatus::Scraping => "scraping",
            TaskStatus::CompleteScrape => "complete_scrape",
            TaskStatus::Analyzing => "analyzing",
            TaskStatus::CompleteAnalysis => "complete_analysis",
            TaskStatus::Failed => "failed",
        }
    }

    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::CompleteAnalysis | TaskStatus::Failed)
    }

    /// 是否为执行中状态（已派发给工作器）
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TaskStatus::Scraping | TaskStatus::Analyzing)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_scrape" => Ok(TaskStatus::PendingScrape),
            "scraping" => Ok(TaskStatus::Scraping),
            "complete_scrape" => Ok(TaskStatus::CompleteScrape),
            "analyzing" => Ok(TaskStatus::Analyzing),
            "complete_analysis" => Ok(TaskStatus::CompleteAnalysis),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    /// 无法识别的状态字符串
    #[error("Unknown task status: {0}")]
    UnknownStatus(String),
}

/// 待插入的新任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub industry_id: i32,
    pub target_date: NaiveDate,
    pub batch_id: String,
    pub max_retries: i32,
}

impl NewTask {
    /// 创建一个等待抓取的新任务，计数与重试次数均为零
    pub fn pending(industry_id: i32, target_date: NaiveDate, batch_id: &str, max_retries: i32) -> Self {
        Self {
            industry_id,
            target_date,
            batch_id: batch_id.to_string(),
            max_retries,
        }
    }
}

impl Task {
    /// 判断任务是否还有重试预算
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    /// 判断任务是否处于终止状态
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
