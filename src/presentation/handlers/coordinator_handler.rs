// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json, Path};
use tracing::info;

use crate::domain::models::coordinator::{CoordinatorKind, CoordinatorReport};
use crate::presentation::errors::AppError;
use crate::presentation::routes::Coordinators;

/// 手动触发一次协调器调用
pub async fn run_coordinator(
    Extension(coordinators): Extension<Coordinators>,
    Path(kind): Path<String>,
) -> Result<Json<CoordinatorReport>, AppError> {
    let kind: CoordinatorKind = kind
        .parse()
        .map_err(|_| AppError::not_found(format!("Unknown coordinator {}", kind)))?;

    info!(kind = %kind, "Manual coordinator run");
    let report = coordinators.get(kind).coordinate().await?;
    Ok(Json(report))
}
