// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::coordinator::CoordinatorKind;
use crate::domain::models::task::{Task, TaskId};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

/// 超时扫描结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeoutSweep {
    /// 重新排队的任务
    pub retried: Vec<TaskId>,
    /// 重试耗尽而标记失败的任务
    pub failed: Vec<TaskId>,
}

/// 单个任务重新排队的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requeue {
    /// 回到派发前状态
    Retried,
    /// 重试耗尽，进入 failed
    Failed,
    /// 行已被其他写入者改变，未生效
    Skipped,
}

/// 超时与重试策略
///
/// 每个协调器持有一份。超时与冷却时间都是固定配置，不做指数退避。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    kind: CoordinatorKind,
    task_timeout: Duration,
    failed_cooldown: Duration,
    permanent_error_markers: Vec<String>,
}

impl RetryPolicy {
    /// 创建新的重试策略
    ///
    /// # 参数
    ///
    /// * `kind` - 协调器类型，决定执行中状态与派发前状态
    /// * `task_timeout` - 执行中任务被视为卡住的时长
    /// * `failed_cooldown` - 失败任务自动重试前的冷却时长
    /// * `permanent_error_markers` - 错误信息包含这些片段时视为永久失败（不区分大小写）
    pub fn new(
        kind: CoordinatorKind,
        task_timeout: Duration,
        failed_cooldown: Duration,
        permanent_error_markers: Vec<String>,
    ) -> Self {
        Self {
            kind,
            task_timeout,
            failed_cooldown,
            permanent_error_markers: permanent_error_markers
                .into_iter()
                .map(|marker| marker.to_lowercase())
                .collect(),
        }
    }

    pub fn kind(&self) -> CoordinatorKind {
        self.kind
    }

    pub fn task_timeout(&self) -> Duration {
        self.task_timeout
    }

    /// 错误信息是否表示永久失败
    pub fn is_permanent_failure(&self, error_message: Option<&str>) -> bool {
        match error_message {
            Some(message) => {
                let message = message.to_lowercase();
                self.permanent_error_markers
                    .iter()
                    .any(|marker| message.contains(marker.as_str()))
            }
            None => false,
        }
    }

    /// 回收卡在执行中状态的任务
    ///
    /// 有预算的任务回到派发前状态，没有预算的任务标记失败。
    /// 写入以 started_at 仍早于阈值为条件，期间被工作器完成的任务不受影响。
    pub async fn sweep_timeouts(
        &self,
        repository: &dyn TaskRepository,
        now: DateTime<Utc>,
    ) -> Result<TimeoutSweep, RepositoryError> {
        let threshold = now - self.task_timeout;
        let stuck = repository
            .find_stuck(self.kind.in_flight_status(), threshold)
            .await?;

        let mut sweep = TimeoutSweep::default();
        let minutes = self.task_timeout.num_minutes();

        for task in stuck {
            let reason = if task.can_retry() {
                format!(
                    "{} timed out after {} minutes (attempt {} of {})",
                    self.kind.phase_label(),
                    minutes,
                    task.retry_count + 1,
                    task.max_retries
                )
            } else {
                format!(
                    "{} timeout, max retries exceeded ({}/{})",
                    self.kind.phase_label(),
                    task.retry_count,
                    task.max_retries
                )
            };

            match self.requeue_or_fail(repository, &task, &reason, Some(threshold)).await? {
                Requeue::Retried => {
                    warn!(task_id = task.id, kind = %self.kind, "{}", reason);
                    sweep.retried.push(task.id);
                }
                Requeue::Failed => {
                    warn!(task_id = task.id, kind = %self.kind, "{}", reason);
                    sweep.failed.push(task.id);
                }
                Requeue::Skipped => {}
            }
        }

        Ok(sweep)
    }

    /// 重置冷却期已过、仍有预算且非永久失败的失败任务
    pub async fn sweep_retryable_failures(
        &self,
        repository: &dyn TaskRepository,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskId>, RepositoryError> {
        let threshold = now - self.failed_cooldown;
        let candidates = repository
            .find_retryable_failures(self.kind.in_flight_status(), threshold)
            .await?;

        let mut reset = Vec::new();
        for task in candidates {
            if self.is_permanent_failure(task.error_message.as_deref()) {
                continue;
            }

            if repository
                .reset_failed(task.id, self.kind.pre_dispatch_status())
                .await?
            {
                info!(
                    task_id = task.id,
                    kind = %self.kind,
                    attempt = task.retry_count + 1,
                    "Failed task re-queued after cooldown"
                );
                reset.push(task.id);
            }
        }

        Ok(reset)
    }

    /// 把一个执行中任务送回派发前状态，预算耗尽则标记失败
    ///
    /// 超时回收与派发失败回滚共用这一逻辑
    pub async fn requeue_or_fail(
        &self,
        repository: &dyn TaskRepository,
        task: &Task,
        reason: &str,
        started_before: Option<DateTime<Utc>>,
    ) -> Result<Requeue, RepositoryError> {
        let in_flight = self.kind.in_flight_status();

        let applied = if task.can_retry() {
            repository
                .requeue(
                    task.id,
                    in_flight,
                    self.kind.pre_dispatch_status(),
                    reason,
                    started_before,
                )
                .await?
                .then_some(Requeue::Retried)
        } else {
            repository
                .fail(task.id, in_flight, reason, started_before)
                .await?
                .then_some(Requeue::Failed)
        };

        Ok(applied.unwrap_or(Requeue::Skipped))
    }
}
