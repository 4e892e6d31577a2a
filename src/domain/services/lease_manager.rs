// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::lease::{Lease, LeaseKind};
use crate::domain::repositories::lease_repository::LeaseRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use chrono::{DateTime, Duration, Utc};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

/// 默认租约超时时间（5分钟）
pub const LOCK_TIMEOUT_SECS: i64 = 300;

/// 租约获取结果
#[derive(Debug)]
pub enum LeaseAcquisition {
    /// 获取成功
    Acquired(LeaseHandle),
    /// 其他实例持有未过期的租约
    Busy { expires_at: DateTime<Utc> },
}

/// 受租约保护的工作的执行结果
#[derive(Debug)]
pub enum Leased<T> {
    /// 工作已执行
    Ran(T),
    /// 租约被占用，工作未执行
    Busy,
}

/// 已持有的租约句柄
///
/// 未显式释放就被丢弃时会在后台尽力删除租约行，
/// 保证外层 future 被取消时租约也不会一直占用到过期。
pub struct LeaseHandle {
    lease: Lease,
    repository: Arc<dyn LeaseRepository>,
    released: bool,
}

impl LeaseHandle {
    pub fn kind(&self) -> LeaseKind {
        self.lease.kind
    }

    pub fn token(&self) -> &str {
        &self.lease.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.lease.expires_at
    }
}

impl std::fmt::Debug for LeaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaseHandle")
            .field("lease", &self.lease)
            .field("released", &self.released)
            .finish()
    }
}

impl Drop for LeaseHandle {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let repository = self.repository.clone();
        let kind = self.lease.kind;
        let token = self.lease.token.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(e) = repository.delete(kind, &token).await {
                        warn!(%kind, "Failed to release dropped lease: {}", e);
                    }
                });
            }
            Err(_) => {
                warn!(%kind, "Lease dropped outside a runtime; it will expire on its own");
            }
        }
    }
}

/// 租约管理器
///
/// 基于租约表的条件插入实现“每种租约同一时刻只有一个持有者”。
/// 协调器靠它避免并发派发，批次创建靠它串行化冲突检查与插入。
/// 对协调器而言这是建议性的互斥，真正防止重复派发的是任务行上的条件更新。
#[derive(Clone)]
pub struct LeaseManager {
    repository: Arc<dyn LeaseRepository>,
    lease_timeout: Duration,
}

impl LeaseManager {
    /// 创建新的租约管理器
    ///
    /// # 参数
    ///
    /// * `repository` - 租约仓库
    /// * `lease_timeout` - 租约有效期
    pub fn new(repository: Arc<dyn LeaseRepository>, lease_timeout: Duration) -> Self {
        Self {
            repository,
            lease_timeout,
        }
    }

    /// 尝试获取某种租约
    ///
    /// 插入冲突时：若存在未过期租约则返回 Busy；
    /// 否则清理过期租约并再插入一次，仍冲突说明其他实例抢先一步，同样返回 Busy。
    pub async fn acquire(
        &self,
        kind: impl Into<LeaseKind>,
    ) -> Result<LeaseAcquisition, RepositoryError> {
        let kind = kind.into();
        let now = Utc::now();
        let lease = Lease::issue(kind, now, self.lease_timeout);

        if self.repository.try_insert(&lease).await? {
            debug!(%kind, token = %lease.token, "Lease acquired");
            return Ok(LeaseAcquisition::Acquired(self.handle(lease)));
        }

        if let Some(live) = self.repository.find_live(kind, now).await? {
            debug!(%kind, expires_at = %live.expires_at, "Lease busy");
            return Ok(LeaseAcquisition::Busy {
                expires_at: live.expires_at,
            });
        }

        let swept = self.repository.delete_expired(kind, now).await?;
        if swept > 0 {
            warn!(%kind, "Swept {} expired lease(s)", swept);
        }

        if self.repository.try_insert(&lease).await? {
            debug!(%kind, token = %lease.token, "Lease acquired after sweeping stale lease");
            return Ok(LeaseAcquisition::Acquired(self.handle(lease)));
        }

        // Another instance swept and re-inserted between our two attempts
        let expires_at = self
            .repository
            .find_live(kind, now)
            .await?
            .map(|live| live.expires_at)
            .unwrap_or(lease.expires_at);

        Ok(LeaseAcquisition::Busy { expires_at })
    }

    /// 释放租约，只删除令牌匹配的行
    pub async fn release(&self, mut handle: LeaseHandle) -> Result<(), RepositoryError> {
        handle.released = true;
        let deleted = self
            .repository
            .delete(handle.lease.kind, &handle.lease.token)
            .await?;

        if deleted == 0 {
            warn!(kind = %handle.lease.kind, "Lease was already gone at release time");
        } else {
            debug!(kind = %handle.lease.kind, "Lease released");
        }

        Ok(())
    }

    /// 在租约保护下执行工作
    ///
    /// 无论工作返回成功、错误还是 panic，都会在返回前释放租约。
    /// 工作出错时释放失败只记录日志，不覆盖原始错误。
    pub async fn scoped<F, Fut, T, E>(
        &self,
        kind: impl Into<LeaseKind>,
        work: F,
    ) -> Result<Leased<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<RepositoryError>,
    {
        let kind = kind.into();
        let handle = match self.acquire(kind).await? {
            LeaseAcquisition::Acquired(handle) => handle,
            LeaseAcquisition::Busy { .. } => return Ok(Leased::Busy),
        };

        let outcome = AssertUnwindSafe(work()).catch_unwind().await;
        if !handle.lease.is_live(Utc::now()) {
            // Another holder may have swept the row and run alongside us
            warn!(%kind, expires_at = %handle.lease.expires_at, "Work outlived its lease");
        }
        let released = self.release(handle).await;

        match outcome {
            Ok(Ok(value)) => {
                released?;
                Ok(Leased::Ran(value))
            }
            Ok(Err(e)) => {
                if let Err(release_error) = released {
                    warn!(%kind, "Failed to release lease after error: {}", release_error);
                }
                Err(e)
            }
            Err(panic) => {
                if let Err(release_error) = released {
                    warn!(%kind, "Failed to release lease after panic: {}", release_error);
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    fn handle(&self, lease: Lease) -> LeaseHandle {
        LeaseHandle {
            lease,
            repository: self.repository.clone(),
            released: false,
        }
    }
}

#[cfg(test)]
#[path = "lease_manager_test.rs"]
mod tests;
