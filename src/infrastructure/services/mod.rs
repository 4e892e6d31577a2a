// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施服务模块
///
/// 提供领域服务接口的外部实现
pub mod http_worker_dispatcher;
