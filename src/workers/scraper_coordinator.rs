// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 抓取协调器
//!
//! 状态转换：`pending_scrape → scraping`、`scraping → pending_scrape`、
//! `scraping → failed`、`failed → pending_scrape`

use crate::config::settings::CoordinatorSettings;
use crate::domain::models::coordinator::CoordinatorKind;
use crate::domain::repositories::task_repository::CandidateOrder;
use crate::domain::services::retry_policy::RetryPolicy;
use crate::workers::coordinator::CoordinatorProfile;
use chrono::Duration;

/// 同时抓取中的任务上限
pub const CONCURRENCY_CAP: u64 = 2;
/// 单次调用最多认领的任务数
pub const BATCH_SIZE: u64 = 2;
/// 抓取超时（5分钟）
pub const TASK_TIMEOUT_SECS: i64 = 300;
/// 失败任务冷却时间（30分钟）
pub const FAILED_COOLDOWN_SECS: i64 = 1800;

/// 按默认常量构建抓取协调器参数
pub fn default_profile() -> CoordinatorProfile {
    build(
        CONCURRENCY_CAP,
        BATCH_SIZE,
        TASK_TIMEOUT_SECS,
        FAILED_COOLDOWN_SECS,
        Vec::new(),
    )
}

/// 按配置构建抓取协调器参数
pub fn profile(settings: &CoordinatorSettings) -> CoordinatorProfile {
    build(
        settings.concurrency_cap,
        settings.batch_size,
        settings.task_timeout_secs,
        settings.failed_cooldown_secs,
        settings.permanent_error_markers.clone(),
    )
}

fn build(
    concurrency_cap: u64,
    batch_size: u64,
    task_timeout_secs: i64,
    failed_cooldown_secs: i64,
    permanent_error_markers: Vec<String>,
) -> CoordinatorProfile {
    CoordinatorProfile {
        kind: CoordinatorKind::Scraper,
        concurrency_cap,
        batch_size,
        order: CandidateOrder::CreatedAt,
        policy: RetryPolicy::new(
            CoordinatorKind::Scraper,
            Duration::seconds(task_timeout_secs),
            Duration::seconds(failed_cooldown_secs),
            permanent_error_markers,
        ),
    }
}

#[cfg(test)]
#[path = "scraper_coordinator_test.rs"]
mod tests;
