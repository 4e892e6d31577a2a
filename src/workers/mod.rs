// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供抓取与分析两类协调器
/// 包括租约保护、超时回收、失败重试与任务派发
pub mod analyzer_coordinator;
pub mod coordinator;
pub mod scraper_coordinator;
pub mod worker;

pub use coordinator::{Coordinator, CoordinatorError, CoordinatorProfile};
pub use worker::Worker;
