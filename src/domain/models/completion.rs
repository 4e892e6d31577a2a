// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::coordinator::CoordinatorKind;
use serde::{Deserialize, Serialize};

/// 工作器所属阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scrape,
    Analysis,
}

impl Stage {
    /// 该阶段由哪种协调器派发
    pub fn coordinator(&self) -> CoordinatorKind {
        match self {
            Stage::Scrape => CoordinatorKind::Scraper,
            Stage::Analysis => CoordinatorKind::Analyzer,
        }
    }
}

/// 工作器执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// 工作器完成回报
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub stage: Stage,
    pub outcome: Outcome,
    pub posts_scraped: i32,
    pub posts_processed: i32,
    pub ideas_generated: i32,
    pub error_message: Option<String>,
}
