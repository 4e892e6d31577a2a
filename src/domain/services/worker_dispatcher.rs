// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::coordinator::CoordinatorKind;
use crate::domain::models::dispatch::DispatchPayload;
use async_trait::async_trait;
use thiserror::Error;

/// 派发错误
///
/// 只表示“提交失败”。工作器后续执行中的失败由工作器自己回报。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// 未配置或配置错误的工作器地址
    #[error("Invalid worker endpoint: {0}")]
    InvalidEndpoint(String),
    /// 连接或发送失败
    #[error("Transport error: {0}")]
    Transport(String),
    /// 工作器拒绝了请求
    #[error("Worker rejected dispatch with status {status}")]
    Rejected { status: u16 },
}

/// 工作器派发服务特质
///
/// 派发是“发出即忘”的：成功返回只代表请求已提交，不代表工作已完成。
#[async_trait]
pub trait WorkerDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        kind: CoordinatorKind,
        payload: &DispatchPayload,
    ) -> Result<(), DispatchError>;
}
