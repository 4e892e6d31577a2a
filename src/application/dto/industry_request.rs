// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::industry::Industry;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 登记行业请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpsertIndustryRequestDto {
    #[validate(range(min = 1))]
    pub id: i32,

    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// 行业信息DTO
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryDto {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<Industry> for IndustryDto {
    fn from(industry: Industry) -> Self {
        Self {
            id: industry.id,
            name: industry.name,
            created_at: industry.created_at,
        }
    }
}
