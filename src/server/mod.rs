//! HTTPサーバー
//!
//! - `POST /analyze`: 解析
//! - その他の `GET`: 静的ファイル（`/` は index.html）

pub mod error;
pub mod handlers;

use crate::analyzer::VisionModel;
use crate::rate_limit::{Unlimited, UsageLimiter};
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use self::error::ApiError;
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};
use tracing::error;

/// `POST /analyze` のボディ上限の既定値（スクリーンショット複数枚のbase64を想定）
pub const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// ハンドラ間で共有する状態
pub struct AppState<M> {
    pub model: Arc<M>,
    pub limiter: Arc<dyn UsageLimiter>,
    pub body_limit: usize,
}

impl<M> AppState<M> {
    pub fn new(model: M, limiter: Arc<dyn UsageLimiter>) -> Self {
        Self {
            model: Arc::new(model),
            limiter,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// 利用制限なし
    pub fn unlimited(model: M) -> Self {
        Self::new(model, Arc::new(Unlimited))
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }
}

impl<M> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            limiter: Arc::clone(&self.limiter),
            body_limit: self.body_limit,
        }
    }
}

/// ハンドラ内のpanicも `{"error": ...}` の500で返す
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unexpected server error".to_string()
    };
    error!(error = %message, "リクエスト処理中にpanic");
    ApiError::Internal(message).into_response()
}

/// ルーター構築
pub fn build_router<M: VisionModel>(state: AppState<M>, static_dir: &Path) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route("/analyze", post(handlers::analyze::<M>))
        .layer(DefaultBodyLimit::max(body_limit))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
