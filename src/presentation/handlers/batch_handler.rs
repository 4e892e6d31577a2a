// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;
use validator::Validate;

use crate::application::dto::batch_request::{
    CreateBatchRequestDto, CreateBatchResponseDto, TaskInfoDto,
};
use crate::application::usecases::create_batch::{CreateBatchCommand, CreateBatchUseCase};
use crate::domain::repositories::task_repository::TaskRepository;
use crate::presentation::errors::AppError;

/// 创建批次处理器
pub async fn create_batch(
    Extension(use_case): Extension<Arc<CreateBatchUseCase>>,
    Json(payload): Json<CreateBatchRequestDto>,
) -> Result<(StatusCode, Json<CreateBatchResponseDto>), AppError> {
    payload.validate()?;

    let created = use_case
        .execute(CreateBatchCommand {
            target_date: payload.target_date,
            industry_ids: payload.industry_ids,
            force_create: payload.force_create,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBatchResponseDto {
            batch_id: created.batch_id,
            tasks_created: created.tasks_created,
        }),
    ))
}

/// 查询批次任务
pub async fn get_batch(
    Extension(tasks): Extension<Arc<dyn TaskRepository>>,
    Path(batch_id): Path<String>,
) -> Result<Json<Vec<TaskInfoDto>>, AppError> {
    let rows = tasks.find_by_batch(&batch_id).await?;
    if rows.is_empty() {
        return Err(AppError::not_found(format!("Batch {} not found", batch_id)));
    }

    Ok(Json(rows.into_iter().map(TaskInfoDto::from).collect()))
}
