use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::errors::responses::DetailBody;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    #[error("API key missing")]
    MissingKey,

    #[error("Invalid API key")]
    InvalidKey,
}

/// Rejections are always `403 {"detail": "..."}`.
impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(DetailBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Allow-list of API keys.
///
/// Empty strings never count as keys, so a configuration holding only `""`
/// leaves the gate open. Cloning shares the underlying set.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyGate {
    keys: Arc<HashSet<String>>,
}

impl ApiKeyGate {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(Into::into)
            .filter(|key: &String| !key.is_empty())
            .collect();

        Self {
            keys: Arc::new(keys),
        }
    }

    /// Gate that lets every request through
    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Open gate: always `Ok`. Otherwise the key must be an exact member.
    pub fn authorize(&self, provided: Option<&str>) -> Result<(), GateError> {
        if self.is_open() {
            return Ok(());
        }

        match provided {
            None => Err(GateError::MissingKey),
            Some(key) if self.keys.contains(key) => Ok(()),
            Some(_) => Err(GateError::InvalidKey),
        }
    }

    /// Header lookup for [`authorize`](Self::authorize). A header that is not
    /// valid visible ASCII can never match and counts as invalid.
    pub fn authorize_headers(&self, headers: &HeaderMap) -> Result<(), GateError> {
        match headers.get(API_KEY_HEADER) {
            None => self.authorize(None),
            Some(value) => match value.to_str() {
                Ok(key) => self.authorize(Some(key)),
                Err(_) if self.is_open() => Ok(()),
                Err(_) => Err(GateError::InvalidKey),
            },
        }
    }
}

/// Rejects the request with 403 unless the gate admits its `x-api-key`.
///
/// ```ignore
/// let routes = Router::new()
///     .route("/rag/create", post(ingest))
///     .layer(axum::middleware::from_fn_with_state(gate, api_key_middleware));
/// ```
pub async fn api_key_middleware(
    State(gate): State<ApiKeyGate>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(rejection) = gate.authorize_headers(request.headers()) {
        tracing::debug!(
            reason = %rejection,
            path = %request.uri().path(),
            "Request rejected by API key gate"
        );
        return rejection.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::HeaderValue, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn gated_app(gate: ApiKeyGate) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(axum::middleware::from_fn_with_state(gate, api_key_middleware))
    }

    async fn call(app: Router, key: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/ping");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_empty_allow_list_is_open() {
        let gate = ApiKeyGate::open();
        assert!(gate.is_open());
        assert_eq!(gate.authorize(None), Ok(()));
        assert_eq!(gate.authorize(Some("anything")), Ok(()));
    }

    #[test]
    fn test_blank_keys_do_not_close_the_gate() {
        let gate = ApiKeyGate::new([""]);
        assert!(gate.is_open());
        assert_eq!(gate.authorize(None), Ok(()));
    }

    #[test]
    fn test_only_exact_members_pass() {
        let gate = ApiKeyGate::new(["alpha", "beta"]);
        assert_eq!(gate.len(), 2);
        assert_eq!(gate.authorize(Some("alpha")), Ok(()));
        assert_eq!(gate.authorize(Some("beta")), Ok(()));
        assert_eq!(gate.authorize(None), Err(GateError::MissingKey));
        assert_eq!(gate.authorize(Some("ALPHA")), Err(GateError::InvalidKey));
        assert_eq!(gate.authorize(Some("alpha ")), Err(GateError::InvalidKey));
        assert_eq!(gate.authorize(Some("")), Err(GateError::InvalidKey));
    }

    #[test]
    fn test_non_ascii_header_is_invalid() {
        let gate = ApiKeyGate::new(["alpha"]);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_bytes(b"\xffkey").unwrap());
        assert_eq!(gate.authorize_headers(&headers), Err(GateError::InvalidKey));
    }

    #[tokio::test]
    async fn test_middleware_rejects_missing_key() {
        let (status, body) = call(gated_app(ApiKeyGate::new(["secret"])), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, r#"{"detail":"API key missing"}"#);
    }

    #[tokio::test]
    async fn test_middleware_rejects_wrong_key() {
        let (status, body) = call(gated_app(ApiKeyGate::new(["secret"])), Some("nope")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, r#"{"detail":"Invalid API key"}"#);
    }

    #[tokio::test]
    async fn test_middleware_passes_valid_key() {
        let (status, body) = call(gated_app(ApiKeyGate::new(["secret"])), Some("secret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "pong");
    }

    #[tokio::test]
    async fn test_middleware_open_gate_passes_without_key() {
        let (status, _) = call(gated_app(ApiKeyGate::open()), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
