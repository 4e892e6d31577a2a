// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::application::dto::industry_request::{IndustryDto, UpsertIndustryRequestDto};
use crate::domain::repositories::industry_repository::IndustryRepository;
use crate::presentation::errors::AppError;

/// 登记或改名行业
pub async fn upsert_industry(
    Extension(industries): Extension<Arc<dyn IndustryRepository>>,
    Json(payload): Json<UpsertIndustryRequestDto>,
) -> Result<Json<IndustryDto>, AppError> {
    payload.validate()?;

    let industry = industries.upsert(payload.id, &payload.name).await?;
    info!(id = industry.id, name = %industry.name, "Industry registered");

    Ok(Json(industry.into()))
}

/// 列出已知行业
pub async fn list_industries(
    Extension(industries): Extension<Arc<dyn IndustryRepository>>,
) -> Result<Json<Vec<IndustryDto>>, AppError> {
    let rows = industries.list().await?;
    Ok(Json(rows.into_iter().map(IndustryDto::from).collect()))
}
