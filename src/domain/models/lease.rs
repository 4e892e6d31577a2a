// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::coordinator::CoordinatorKind;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use uuid::Uuid;

/// 租约保护的临界区种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaseKind {
    /// 某类协调器的一次派发
    Coordinator(CoordinatorKind),
    /// 批次创建的冲突检查与插入
    TaskCreator,
}

impl LeaseKind {
    /// 租约表中的主键
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseKind::Coordinator(kind) => kind.lease_name(),
            LeaseKind::TaskCreator => "task_creator_lock",
        }
    }
}

impl fmt::Display for LeaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CoordinatorKind> for LeaseKind {
    fn from(kind: CoordinatorKind) -> Self {
        LeaseKind::Coordinator(kind)
    }
}

/// 租约
///
/// 同一种租约在任意时刻最多只有一份有效
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    pub kind: LeaseKind,
    /// 每次获取时新生成的全局唯一令牌
    pub token: String,
    /// 过期时间
    pub expires_at: DateTime<Utc>,
    /// 获取时间
    pub acquired_at: DateTime<Utc>,
}

impl Lease {
    /// 以新令牌创建一份从 `now` 起持续 `ttl` 的租约
    pub fn issue(kind: LeaseKind, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            kind,
            token: Uuid::new_v4().to_string(),
            expires_at: now + ttl,
            acquired_at: now,
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
