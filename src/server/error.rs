//! HTTPエラー応答
//!
//! 400/413/429/500 はいずれも `{"error": "<message>"}` を返す

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 必須項目の欠落・不正なモード・不正なJSON (400)
    #[error("{0}")]
    BadRequest(String),

    /// ボディが上限を超えた (413)
    #[error("Request body too large (limit {limit} bytes)")]
    PayloadTooLarge { limit: usize },

    /// ゲストの1日の上限に達した (429)
    #[error("Daily limit reached")]
    RateLimited { remaining: u32 },

    /// 想定外の失敗 (500)
    #[error("{0}")]
    Internal(String),
}

impl From<tastecheck_common::Error> for ApiError {
    fn from(err: tastecheck_common::Error) -> Self {
        match err {
            tastecheck_common::Error::InvalidRequest(msg) => ApiError::BadRequest(msg),
            tastecheck_common::Error::Json(e) => {
                ApiError::BadRequest(format!("Invalid JSON body: {}", e))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::PayloadTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::RateLimited { remaining } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": message, "remaining": remaining })),
            )
                .into_response(),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
