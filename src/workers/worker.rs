// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::coordinator::CoordinatorReport;
use crate::workers::coordinator::CoordinatorError;
use async_trait::async_trait;

/// Worker trait定义
///
/// 调度器周期性触发的后台工作器都必须实现此trait
#[async_trait]
pub trait Worker: Send + Sync {
    /// 运行一次工作器
    async fn run(&self) -> Result<CoordinatorReport, CoordinatorError>;

    /// 获取工作器名称
    fn name(&self) -> &str;
}
