// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含协调器共用的业务规则：
/// - 租约管理（lease_manager）：保证每种协调器同一时刻只有一个实例在派发
/// - 重试策略（retry_policy）：执行超时回收与失败任务冷却重试
/// - 工作器派发（worker_dispatcher）：向外部工作器提交任务组的抽象
pub mod lease_manager;
pub mod retry_policy;
pub mod worker_dispatcher;
