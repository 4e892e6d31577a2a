// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{Task, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 协调器发送给工作器的派发负载
///
/// 抓取与分析两种工作器使用相同结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchPayload {
    pub industry_ids: Vec<i32>,
    pub target_date: NaiveDate,
    pub task_ids: Vec<TaskId>,
    pub batch_id: String,
}

/// 将已认领的任务按 (批次ID, 目标日期) 分组
///
/// 分组顺序与任务首次出现的顺序一致
pub fn group_by_batch(tasks: Vec<Task>) -> Vec<(DispatchPayload, Vec<Task>)> {
    let mut groups: Vec<(DispatchPayload, Vec<Task>)> = Vec::new();

    for task in tasks {
        let position = groups.iter().position(|(payload, _)| {
            payload.batch_id == task.batch_id && payload.target_date == task.target_date
        });

        match position {
            Some(index) => {
                let (payload, members) = &mut groups[index];
                payload.industry_ids.push(task.industry_id);
                payload.task_ids.push(task.id);
                members.push(task);
            }
            None => {
                let payload = DispatchPayload {
                    industry_ids: vec![task.industry_id],
                    target_date: task.target_date,
                    task_ids: vec![task.id],
                    batch_id: task.batch_id.clone(),
                };
                groups.push((payload, vec![task]));
            }
        }
    }

    groups
}
