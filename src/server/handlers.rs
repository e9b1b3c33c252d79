use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::analyzer::{self, VisionModel};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::net::SocketAddr;
use tastecheck_common::{AnalysisResult, AnalyzeRequest};
use tracing::{info, warn};

const UNKNOWN_IDENTITY: &str = "unknown";

/// 利用制限の識別子（X-Forwarded-For の先頭 → 接続元IP）
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_IDENTITY.to_string())
}

/// `POST /analyze`
pub async fn analyze<M: VisionModel>(
    State(state): State<AppState<M>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let identity = client_identity(&headers, peer.map(|ConnectInfo(addr)| addr));

    let body = body.map_err(|rejection| {
        warn!(identity = %identity, error = %rejection.body_text(), "ボディ読み込み失敗");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge {
                limit: state.body_limit,
            }
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;

    let task = AnalyzeRequest::from_json(&body)?.into_task().map_err(|e| {
        info!(identity = %identity, error = %e, "リクエスト不正");
        ApiError::from(e)
    })?;

    // 判定とカウントを同時に行う（モデル呼び出し中の同時リクエストも数える）
    let usage = state.limiter.try_acquire(&identity);
    if !usage.allowed {
        warn!(identity = %identity, "利用上限に到達");
        return Err(ApiError::RateLimited {
            remaining: usage.remaining.unwrap_or(0),
        });
    }
    if let Some(remaining) = usage.remaining {
        info!(identity = %identity, remaining, "ゲスト利用");
    }

    Ok(Json(analyzer::analyze(state.model.as_ref(), &task).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_identity_from_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        assert_eq!(client_identity(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn test_identity_from_peer() {
        let peer: SocketAddr = "192.0.2.10:41000".parse().unwrap();
        assert_eq!(client_identity(&HeaderMap::new(), Some(peer)), "192.0.2.10");
    }

    #[test]
    fn test_identity_unknown() {
        assert_eq!(client_identity(&HeaderMap::new(), None), "unknown");
    }
}
