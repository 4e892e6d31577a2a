// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::TaskStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 协调器类型
///
/// 两种协调器完全独立，各自持有自己的租约，只通过任务状态列交互
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorKind {
    /// 抓取协调器：pending_scrape → scraping
    Scraper,
    /// 分析协调器：complete_scrape → analyzing
    Analyzer,
}

impl CoordinatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorKind::Scraper => "scraper",
            CoordinatorKind::Analyzer => "analyzer",
        }
    }

    /// 租约表中使用的保留名称
    pub fn lease_name(&self) -> &'static str {
        match self {
            CoordinatorKind::Scraper => "scraper_lock",
            CoordinatorKind::Analyzer => "analyzer_lock",
        }
    }

    /// 派发前状态
    pub fn pre_dispatch_status(&self) -> TaskStatus {
        match self {
            CoordinatorKind::Scraper => TaskStatus::PendingScrape,
            CoordinatorKind::Analyzer => TaskStatus::CompleteScrape,
        }
    }

    /// 执行中状态
    pub fn in_flight_status(&self) -> TaskStatus {
        match self {
            CoordinatorKind::Scraper => TaskStatus::Scraping,
            CoordinatorKind::Analyzer => TaskStatus::Analyzing,
        }
    }

    /// 用于错误信息的阶段名称
    pub fn phase_label(&self) -> &'static str {
        match self {
            CoordinatorKind::Scraper => "Scraping",
            CoordinatorKind::Analyzer => "Analysis",
        }
    }
}

impl fmt::Display for CoordinatorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinatorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scraper" => Ok(CoordinatorKind::Scraper),
            "analyzer" => Ok(CoordinatorKind::Analyzer),
            _ => Err(()),
        }
    }
}

/// 单次协调器调用的结果汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorReport {
    /// 成功派发给工作器的任务数
    pub tasks_processed: u32,
    /// 租约被其他实例持有，本次调用整体跳过
    pub skipped_busy: bool,
    /// 超时扫描处理的任务数（重新排队 + 标记失败）
    pub timeouts_handled: u32,
    /// 冷却期后重新排队的失败任务数
    pub retries_handled: u32,
    /// 超时且重试耗尽而标记失败的任务数
    pub timeouts_failed: u32,
    /// 派发提交失败而回滚的任务数
    pub dispatch_failures: u32,
}

impl CoordinatorReport {
    pub fn busy() -> Self {
        Self {
            skipped_busy: true,
            ..Default::default()
        }
    }
}
