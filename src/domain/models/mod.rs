// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了流水线的核心业务实体，包括：
/// - 任务（task）：一个 (行业, 目标日期) 工作单元及其状态机
/// - 协调器（coordinator）：协调器类型与单次调用报告
/// - 租约（lease）：协调器互斥租约
/// - 派发（dispatch）：发送给工作器的任务组
/// - 完成回报（completion）：工作器回报的阶段结果
/// - 行业（industry）：任务创建时使用的行业目录
pub mod completion;
pub mod coordinator;
pub mod dispatch;
pub mod industry;
pub mod lease;
pub mod task;
