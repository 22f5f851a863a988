//! HTTP抽出エンドポイント
//!
//! - POST /api/extract   `{ text }` → StructuredReceipt
//! - POST /api/reanalyze 直前のテキストで再解析
//! - GET  /api/latest    最新の結果
//! - GET  /health

pub mod error;
mod routes;

pub use routes::ExtractRequest;

use crate::pipeline::ReceiptPipeline;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 上流タイムアウトに上乗せする余裕
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 5;

#[derive(Clone)]
pub struct ServerState {
    pub pipeline: ReceiptPipeline,
}

/// ルーター構築
///
/// `upstream_timeout_secs` は生成AI呼び出しのタイムアウト。リクエスト全体には
/// それより少し長い上限をかける。
pub fn build_router(pipeline: ReceiptPipeline, upstream_timeout_secs: u64) -> Router {
    let state = ServerState { pipeline };
    let request_timeout = Duration::from_secs(upstream_timeout_secs + REQUEST_TIMEOUT_MARGIN_SECS);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/extract", post(routes::extract))
        .route("/api/reanalyze", post(routes::reanalyze))
        .route("/api/latest", get(routes::latest))
        .fallback(routes::not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// サーバー起動（Ctrl+C / SIGTERM で停止）
pub async fn serve(router: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "受付開始");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("停止しました");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C を受信"),
        _ = terminate => info!("SIGTERM を受信"),
    }
}
