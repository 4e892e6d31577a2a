// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json, Path};
use std::sync::Arc;
use validator::Validate;

use crate::application::dto::report_request::{ReportRequestDto, ReportResponseDto};
use crate::application::usecases::report_completion::ReportCompletionUseCase;
use crate::domain::models::task::TaskId;
use crate::presentation::errors::AppError;

/// 工作器完成回报处理器
pub async fn report_completion(
    Extension(use_case): Extension<Arc<ReportCompletionUseCase>>,
    Path(id): Path<TaskId>,
    Json(payload): Json<ReportRequestDto>,
) -> Result<Json<ReportResponseDto>, AppError> {
    payload.validate()?;

    let applied = use_case.execute(id, payload.into()).await?;
    Ok(Json(ReportResponseDto { applied }))
}
