use axum::http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use wte_domain::LocateError;
use wte_provider_core::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultError {
    pub code: i32,
    pub message: String,
}

/// Body of every API response: exactly one of `error` or `result` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResultError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl ResultEnvelope {
    pub fn ok(result: serde_json::Value) -> Self {
        Self {
            error: None,
            result: Some(result),
        }
    }

    pub fn err(code: i32, message: impl Into<String>) -> Self {
        Self {
            error: Some(ResultError {
                code,
                message: message.into(),
            }),
            result: None,
        }
    }
}

/// Clients read success or failure from the envelope, so the status is 200
/// either way.
impl IntoResponse for ResultEnvelope {
    fn into_response(self) -> Response {
        let body = serde_json::to_vec(&self).unwrap_or_else(|_| {
            br#"{"error":{"code":1,"message":"failed to encode response"}}"#.to_vec()
        });
        let mut response = Response::new(axum::body::Body::from(body));
        *response.status_mut() = StatusCode::OK;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("failed to encode response: {0}")]
    Encode(serde_json::Error),
}

impl ApiError {
    pub const CODE_INVALID_REQUEST: i32 = 1;
    pub const CODE_PROVIDER: i32 = 2;
    pub const CODE_UPSTREAM: i32 = 3;
    pub const CODE_NOT_FOUND: i32 = 4;

    pub fn code(&self) -> i32 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::Encode(_) => Self::CODE_INVALID_REQUEST,
            ApiError::Provider(_) => Self::CODE_PROVIDER,
            ApiError::Locate(LocateError::Upstream(_)) => Self::CODE_UPSTREAM,
            ApiError::Locate(_) => Self::CODE_NOT_FOUND,
        }
    }
}

impl From<&ApiError> for ResultEnvelope {
    fn from(err: &ApiError) -> Self {
        ResultEnvelope::err(err.code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ResultEnvelope::from(&self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wte_domain::UpstreamError;

    #[test]
    fn envelope_skips_absent_side() {
        let ok =
            serde_json::to_value(ResultEnvelope::ok(serde_json::json!({ "name": "x" }))).unwrap();
        assert_eq!(ok, serde_json::json!({ "result": { "name": "x" } }));

        let err = serde_json::to_value(ResultEnvelope::err(4, "no suitable place found")).unwrap();
        assert_eq!(
            err,
            serde_json::json!({ "error": { "code": 4, "message": "no suitable place found" } })
        );
    }

    #[test]
    fn error_codes_follow_failure_kind() {
        let invalid = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        assert_eq!(ApiError::from(invalid).code(), 1);
        assert_eq!(
            ApiError::from(ProviderError::NotFound("gateways/google".to_string())).code(),
            2
        );
        assert_eq!(
            ApiError::from(LocateError::Upstream(UpstreamError::Transport("reset".into()))).code(),
            3
        );
        assert_eq!(ApiError::from(LocateError::NoSuitablePlace).code(), 4);
    }

    #[test]
    fn error_response_is_still_ok_status() {
        let response = ApiError::from(LocateError::NoSuitablePlace).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
