//! 헬스 체크 endpoint.
//!
//! 배포 환경의 liveness probe를 위한 읽기 전용 endpoint를 제공합니다.
//! 스캔 루프와 가변 상태를 공유하지 않으므로 언제든 안전하게 조회할 수
//! 있습니다.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// 기동 시점에 고정되는 헬스 체크 상태 스냅샷.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// 프로세스 시작 시각
    pub started_at: DateTime<Utc>,
    /// 바이너리 버전
    pub version: String,
    /// 감시 자산 수
    pub asset_count: usize,
}

impl HealthState {
    /// 새 헬스 상태를 생성합니다.
    pub fn new(asset_count: usize) -> Self {
        Self {
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            asset_count,
        }
    }

    /// 업타임(초)을 반환합니다.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 서비스 상태
    pub status: String,
    /// 바이너리 버전
    pub version: String,
    /// 서버 업타임(초)
    pub uptime_secs: i64,
    /// 감시 자산 수
    pub asset_count: usize,
    /// 현재 시간 (ISO 8601)
    pub timestamp: String,
}

/// 간단한 liveness 응답.
/// GET /
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Bot is running")
}

/// 상태 스냅샷 응답.
/// GET /health
pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "running".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        asset_count: state.asset_count,
        timestamp: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state)
}

/// 헬스 체크 서버를 실행합니다.
///
/// 스캔 루프와 독립적으로 동작하며, 바인딩 실패는 호출자가 로그로 처리합니다.
pub async fn serve(port: u16, state: Arc<HealthState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port = port, "헬스 체크 서버 시작");

    axum::serve(listener, health_router(state)).await
}
