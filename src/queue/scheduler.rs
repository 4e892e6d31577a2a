// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::workers::Worker;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// 协调器调度器
///
/// 每个工作器在独立的定时任务上运行，彼此互不阻塞。
/// 与手动触发重叠是允许的，由租约裁决。
pub struct CoordinatorScheduler {
    /// 被调度的工作器
    workers: Vec<Arc<dyn Worker>>,
    /// 调度间隔
    period: Duration,
}

impl CoordinatorScheduler {
    /// 创建新的调度器实例
    ///
    /// # 参数
    ///
    /// * `workers` - 被调度的工作器
    /// * `period` - 调度间隔
    ///
    /// # 返回值
    ///
    /// 返回新的调度器实例
    pub fn new(workers: Vec<Arc<dyn Worker>>, period: Duration) -> Self {
        Self { workers, period }
    }

    /// 启动调度器后台任务
    ///
    /// # 返回值
    ///
    /// 每个工作器一个后台任务句柄
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.workers
            .iter()
            .cloned()
            .map(|worker| {
                let period = self.period;
                tokio::spawn(async move {
                    info!("Scheduling {} every {:?}", worker.name(), period);

                    let mut ticker = interval(period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                    loop {
                        ticker.tick().await;

                        match worker.run().await {
                            Ok(report) if report.skipped_busy => {
                                debug!("{} skipped: lease busy", worker.name());
                            }
                            Ok(report) => {
                                if report.tasks_processed > 0 || report.timeouts_handled > 0 {
                                    info!(
                                        "{} dispatched {} task(s), handled {} timeout(s)",
                                        worker.name(),
                                        report.tasks_processed,
                                        report.timeouts_handled
                                    );
                                }
                            }
                            Err(e) => {
                                error!("{} run failed: {}", worker.name(), e);
                            }
                        }
                    }
                })
            })
            .collect()
    }
}
