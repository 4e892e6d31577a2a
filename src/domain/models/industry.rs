// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// 行业实体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<FixedOffset>,
}
