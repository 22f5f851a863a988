use crate::error::ReceiptAiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTPエラー
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("リクエスト本文が不正です: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Pipeline(#[from] ReceiptAiError),
}

/// エラーレスポンス `{ "error": string }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Pipeline(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    fn user_message(&self) -> String {
        match self {
            ApiError::Pipeline(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::Pipeline(ReceiptAiError::Network(detail)) => {
                error!(%detail, "抽出サービスへの接続失敗");
            }
            ApiError::Pipeline(e) if e.is_upstream() => {
                warn!(status = status.as_u16(), error = %e, "上流エラー");
            }
            ApiError::Pipeline(e) if status.is_server_error() => {
                error!(error = %e, "内部エラー");
            }
            other => debug!(status = status.as_u16(), error = %other, "リクエスト拒否"),
        }

        let body = ErrorResponse {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}
