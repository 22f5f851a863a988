use super::error::{ApiError, ApiResult};
use super::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use receipt_ai_common::StructuredReceipt;
use serde::Deserialize;
use serde_json::json;

/// `POST /api/extract` のリクエスト
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub text: String,
}

/// OCRテキストを構造化
pub async fn extract(
    State(state): State<ServerState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> ApiResult<Json<StructuredReceipt>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let result = state.pipeline.run(&request.text).await?;
    Ok(Json(result))
}

/// 直前のテキストで再解析
pub async fn reanalyze(State(state): State<ServerState>) -> ApiResult<Json<StructuredReceipt>> {
    let result = state.pipeline.reanalyze().await?;
    Ok(Json(result))
}

/// 最新の結果
pub async fn latest(State(state): State<ServerState>) -> ApiResult<Json<StructuredReceipt>> {
    state
        .pipeline
        .latest()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("まだ抽出結果がありません".into()))
}

/// ヘルスチェック
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "receipt-ai",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}
