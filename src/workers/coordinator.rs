// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::coordinator::{CoordinatorKind, CoordinatorReport};
use crate::domain::models::dispatch::group_by_batch;
use crate::domain::models::task::Task;
use crate::domain::repositories::task_repository::{
    CandidateOrder, RepositoryError, TaskRepository,
};
use crate::domain::services::lease_manager::{LeaseManager, Leased};
use crate::domain::services::retry_policy::{Requeue, RetryPolicy};
use crate::domain::services::worker_dispatcher::WorkerDispatcher;
use crate::infrastructure::metrics::{
    DISPATCH_FAILURES, LEASE_BUSY, RETRIES, TASKS_DISPATCHED, TASKS_IN_FLIGHT, TIMEOUTS,
};
use crate::workers::worker::Worker;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// 协调器错误
///
/// 只有任务存储本身失败时才会返回错误，单个任务的问题记录在任务行上
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 协调器运行参数
#[derive(Debug, Clone)]
pub struct CoordinatorProfile {
    pub kind: CoordinatorKind,
    /// 执行中任务上限
    pub concurrency_cap: u64,
    /// 单次调用最多认领的任务数
    pub batch_size: u64,
    /// 候选任务排序
    pub order: CandidateOrder,
    pub policy: RetryPolicy,
}

/// 流水线协调器
///
/// 抓取与分析协调器共用这一驱动，差别全部体现在 `CoordinatorProfile` 中。
/// 每次调用在租约保护下完成一个有界的工作单元后返回。
pub struct Coordinator {
    profile: CoordinatorProfile,
    tasks: Arc<dyn TaskRepository>,
    leases: LeaseManager,
    dispatcher: Arc<dyn WorkerDispatcher>,
}

impl Coordinator {
    /// 创建新的协调器
    ///
    /// # 参数
    ///
    /// * `profile` - 运行参数
    /// * `tasks` - 任务仓库
    /// * `leases` - 租约管理器
    /// * `dispatcher` - 工作器派发服务
    pub fn new(
        profile: CoordinatorProfile,
        tasks: Arc<dyn TaskRepository>,
        leases: LeaseManager,
        dispatcher: Arc<dyn WorkerDispatcher>,
    ) -> Self {
        Self {
            profile,
            tasks,
            leases,
            dispatcher,
        }
    }

    pub fn kind(&self) -> CoordinatorKind {
        self.profile.kind
    }

    pub fn profile(&self) -> &CoordinatorProfile {
        &self.profile
    }

    /// 执行一次协调
    ///
    /// 租约被占用时直接返回 `skipped_busy = true` 的空报告
    pub async fn coordinate(&self) -> Result<CoordinatorReport, CoordinatorError> {
        let kind = self.kind();

        match self.leases.scoped(kind, || self.run_locked()).await {
            Ok(Leased::Ran(report)) => {
                info!(
                    %kind,
                    tasks_processed = report.tasks_processed,
                    timeouts_handled = report.timeouts_handled,
                    timeouts_failed = report.timeouts_failed,
                    retries_handled = report.retries_handled,
                    dispatch_failures = report.dispatch_failures,
                    "Coordinator run finished"
                );
                Ok(report)
            }
            Ok(Leased::Busy) => {
                metrics::counter!(LEASE_BUSY, "kind" => kind.as_str()).increment(1);
                info!(%kind, "Another coordinator holds the lease, skipping");
                Ok(CoordinatorReport::busy())
            }
            Err(e) => {
                error!(%kind, "Coordinator run failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_locked(&self) -> Result<CoordinatorReport, CoordinatorError> {
        let kind = self.kind();
        let policy = &self.profile.policy;
        let tasks = self.tasks.as_ref();
        let mut report = CoordinatorReport::default();

        let now = Utc::now();
        let sweep = policy.sweep_timeouts(tasks, now).await?;
        report.timeouts_handled = (sweep.retried.len() + sweep.failed.len()) as u32;
        report.timeouts_failed = sweep.failed.len() as u32;
        if !sweep.retried.is_empty() {
            metrics::counter!(TIMEOUTS, "kind" => kind.as_str(), "outcome" => "retried")
                .increment(sweep.retried.len() as u64);
        }
        if !sweep.failed.is_empty() {
            metrics::counter!(TIMEOUTS, "kind" => kind.as_str(), "outcome" => "failed")
                .increment(sweep.failed.len() as u64);
        }

        let reset = policy.sweep_retryable_failures(tasks, now).await?;
        report.retries_handled = reset.len() as u32;
        if !reset.is_empty() {
            metrics::counter!(RETRIES, "kind" => kind.as_str()).increment(reset.len() as u64);
        }

        let running = tasks.count_by_status(kind.in_flight_status()).await?;
        if running >= self.profile.concurrency_cap {
            metrics::gauge!(TASKS_IN_FLIGHT, "kind" => kind.as_str()).set(running as f64);
            info!(
                %kind,
                running,
                cap = self.profile.concurrency_cap,
                "Concurrency cap reached, nothing dispatched"
            );
            return Ok(report);
        }

        let limit = self
            .profile
            .batch_size
            .min(self.profile.concurrency_cap - running);
        let claimed = self.claim_batch(limit).await?;

        for (payload, members) in group_by_batch(claimed) {
            match self.dispatcher.dispatch(kind, &payload).await {
                Ok(()) => {
                    debug!(
                        %kind,
                        batch_id = %payload.batch_id,
                        task_ids = ?payload.task_ids,
                        "Dispatched task group"
                    );
                    metrics::counter!(TASKS_DISPATCHED, "kind" => kind.as_str())
                        .increment(members.len() as u64);
                    report.tasks_processed += members.len() as u32;
                }
                Err(e) => {
                    warn!(
                        %kind,
                        batch_id = %payload.batch_id,
                        task_ids = ?payload.task_ids,
                        "Dispatch failed, rolling back claimed tasks: {}",
                        e
                    );
                    metrics::counter!(DISPATCH_FAILURES, "kind" => kind.as_str()).increment(1);

                    let reason = format!("Dispatch to {} worker failed: {}", kind, e);
                    for task in &members {
                        if policy.requeue_or_fail(tasks, task, &reason, None).await?
                            != Requeue::Skipped
                        {
                            report.dispatch_failures += 1;
                        }
                    }
                }
            }
        }

        let in_flight = running + u64::from(report.tasks_processed);
        metrics::gauge!(TASKS_IN_FLIGHT, "kind" => kind.as_str()).set(in_flight as f64);

        Ok(report)
    }

    /// 选择候选任务并逐个条件认领，被其他写入者抢先的任务直接丢弃
    async fn claim_batch(&self, limit: u64) -> Result<Vec<Task>, CoordinatorError> {
        let kind = self.kind();
        let from = kind.pre_dispatch_status();
        let to = kind.in_flight_status();

        let candidates = self
            .tasks
            .find_candidates(from, self.profile.order, limit)
            .await?;

        let now = Utc::now();
        let mut claimed = Vec::with_capacity(candidates.len());
        for mut task in candidates {
            if self.tasks.claim(task.id, from, to, now).await? {
                task.status = to;
                task.started_at = Some(now.into());
                claimed.push(task);
            } else {
                debug!(%kind, task_id = task.id, "Task already claimed elsewhere");
            }
        }

        Ok(claimed)
    }
}

#[async_trait]
impl Worker for Coordinator {
    async fn run(&self) -> Result<CoordinatorReport, CoordinatorError> {
        self.coordinate().await
    }

    fn name(&self) -> &str {
        match self.kind() {
            CoordinatorKind::Scraper => "scraper-coordinator",
            CoordinatorKind::Analyzer => "analyzer-coordinator",
        }
    }
}
