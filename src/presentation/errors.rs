// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::application::usecases::create_batch::TaskCreatorError;
use crate::application::usecases::report_completion::ReportError;
use crate::domain::repositories::task_repository::RepositoryError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    /// 资源不存在
    pub fn not_found(message: impl Into<String>) -> Self {
        Self(anyhow::Error::new(RepositoryError::NotFound).context(message.into()))
    }

    fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<TaskCreatorError>() {
            return match err {
                TaskCreatorError::Validation(_) => StatusCode::BAD_REQUEST,
                TaskCreatorError::Conflict { .. } => StatusCode::CONFLICT,
                TaskCreatorError::Busy => StatusCode::SERVICE_UNAVAILABLE,
                TaskCreatorError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }

        if let Some(err) = self.0.downcast_ref::<ReportError>() {
            return match err {
                ReportError::NotFound(_) => StatusCode::NOT_FOUND,
                ReportError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }

        if self.0.downcast_ref::<validator::ValidationErrors>().is_some() {
            return StatusCode::BAD_REQUEST;
        }

        match self.0.downcast_ref::<RepositoryError>() {
            Some(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Some(RepositoryError::Duplicate(_)) => StatusCode::CONFLICT,
            Some(RepositoryError::Database(_) | RepositoryError::InvalidRecord(_)) | None => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.0.to_string();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %format!("{:#}", self.0), "Request failed");
        }

        let body = match self.0.downcast_ref::<TaskCreatorError>() {
            Some(TaskCreatorError::Conflict { industries }) => json!({
                "error": error_message,
                "conflictingIndustries": industries,
            }),
            _ => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
