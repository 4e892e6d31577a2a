// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::models::completion::{Outcome, Stage, WorkerReport};
use crate::domain::models::task::TaskId;
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 工作器完成回报用例
///
/// 每次写入都以任务仍处于该阶段的执行中状态为条件，
/// 重复回报或迟到的回报影响零行，返回 `false`。
pub struct ReportCompletionUseCase {
    tasks: Arc<dyn TaskRepository>,
}

impl ReportCompletionUseCase {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    pub async fn execute(&self, id: TaskId, report: WorkerReport) -> Result<bool, ReportError> {
        let kind = report.stage.coordinator();
        let in_flight = kind.in_flight_status();

        let applied = match (report.stage, report.outcome) {
            (Stage::Scrape, Outcome::Succeeded) => {
                self.tasks.complete_scrape(id, report.posts_scraped).await?
            }
            (Stage::Analysis, Outcome::Succeeded) => {
                self.tasks
                    .complete_analysis(id, report.posts_processed, report.ideas_generated)
                    .await?
            }
            (_, Outcome::Failed) => {
                let message = report
                    .error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| format!("{} failed", kind.phase_label()));
                warn!(task_id = id, stage = ?report.stage, error = %message, "Worker reported failure");
                self.tasks.fail(id, in_flight, &message, None).await?
            }
        };

        if applied {
            info!(task_id = id, stage = ?report.stage, outcome = ?report.outcome, "Completion applied");
            return Ok(true);
        }

        if self.tasks.find_by_id(id).await?.is_none() {
            return Err(ReportError::NotFound(id));
        }

        debug!(
            task_id = id,
            expected = %in_flight,
            "Completion ignored, task no longer in flight"
        );
        Ok(false)
    }
}
