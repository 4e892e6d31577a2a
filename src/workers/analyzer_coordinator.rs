// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 分析协调器
//!
//! 与抓取协调器结构相同：执行中状态为 `analyzing`，派发前状态为 `complete_scrape`，
//! 候选任务按抓取完成时间（updated_at）先进先出。

use crate::config::settings::CoordinatorSettings;
use crate::domain::models::coordinator::CoordinatorKind;
use crate::domain::repositories::task_repository::CandidateOrder;
use crate::domain::services::retry_policy::RetryPolicy;
use crate::workers::coordinator::CoordinatorProfile;
use chrono::Duration;

pub const CONCURRENCY_CAP: u64 = 4;
pub const BATCH_SIZE: u64 = 4;
/// 分析超时（10分钟）
pub const TASK_TIMEOUT_SECS: i64 = 600;
/// 失败任务冷却时间（60分钟）
pub const FAILED_COOLDOWN_SECS: i64 = 3600;
/// 这些失败重试也不会成功
pub const PERMANENT_ERROR_MARKERS: [&str; 2] = ["no posts to analyze", "no posts found"];

pub fn default_profile() -> CoordinatorProfile {
    build(
        CONCURRENCY_CAP,
        BATCH_SIZE,
        TASK_TIMEOUT_SECS,
        FAILED_COOLDOWN_SECS,
        PERMANENT_ERROR_MARKERS.iter().map(|m| m.to_string()).collect(),
    )
}

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
        kind: CoordinatorKind::Analyzer,
        concurrency_cap,
        batch_size,
        order: CandidateOrder::UpdatedAt,
        policy: RetryPolicy::new(
            CoordinatorKind::Analyzer,
            Duration::seconds(task_timeout_secs),
            Duration::seconds(failed_cooldown_secs),
            permanent_error_markers,
        ),
    }
}

#[cfg(test)]
#[path = "analyzer_coordinator_test.rs"]
mod tests;
