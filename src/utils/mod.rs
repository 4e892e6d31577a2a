// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供遥测初始化与测试夹具
pub mod telemetry;

#[cfg(test)]
pub mod testing;
