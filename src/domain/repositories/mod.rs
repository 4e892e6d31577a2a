// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 行业仓库（industry_repository）：行业目录
/// - 租约仓库（lease_repository）：协调器租约的条件插入与释放
/// - 任务仓库（task_repository）：任务的批量创建与条件状态转换
pub mod industry_repository;
pub mod lease_repository;
pub mod task_repository;
