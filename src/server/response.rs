// src/server/response.rs
use bytes::Bytes;
use http::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CONTENT_TYPE};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde_json::{json, Value};
use crate::error::Error;

pub type ApiResponse = Response<Full<Bytes>>;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";
const PREFLIGHT_MAX_AGE: &str = "86400";

fn with_body(status: StatusCode, body: Bytes, allow_origin: &HeaderValue) -> ApiResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response.headers_mut().insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin.clone());
    response
}

/// JSON response with CORS headers.
pub fn json_response(status: StatusCode, body: &Value, allow_origin: &HeaderValue) -> ApiResponse {
    // Serializing a Value cannot fail
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    let mut response = with_body(status, Bytes::from(bytes), allow_origin);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

/// `{"error": kind, "detail": message}` with the status for the error kind.
pub fn error_response(err: &Error, allow_origin: &HeaderValue) -> ApiResponse {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(
        status,
        &json!({"error": err.kind(), "detail": err.to_string()}),
        allow_origin,
    )
}

pub fn not_found(method: &str, path: &str, allow_origin: &HeaderValue) -> ApiResponse {
    json_response(
        StatusCode::NOT_FOUND,
        &json!({"error": "not_found", "detail": format!("No route for {} {}", method, path)}),
        allow_origin,
    )
}

pub fn method_not_allowed(method: &str, path: &str, allowed: &'static str, allow_origin: &HeaderValue) -> ApiResponse {
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &json!({
            "error": "method_not_allowed",
            "detail": format!("{} is not supported on {}", method, path),
        }),
        allow_origin,
    );
    response.headers_mut().insert(ALLOW, HeaderValue::from_static(allowed));
    response
}

/// CORS preflight response.
pub fn preflight_response(allow_origin: &HeaderValue) -> ApiResponse {
    let mut response = with_body(StatusCode::NO_CONTENT, Bytes::new(), allow_origin);
    let headers = response.headers_mut();
    headers.insert("Access-Control-Allow-Methods", HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert("Access-Control-Allow-Headers", HeaderValue::from_static(ALLOWED_HEADERS));
    headers.insert("Access-Control-Max-Age", HeaderValue::from_static(PREFLIGHT_MAX_AGE));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let origin = HeaderValue::from_static("*");
        let response = error_response(&Error::missing_column("city"), &origin);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_preflight_has_cors_headers() {
        let origin = HeaderValue::from_static("https://app.example.com");
        let response = preflight_response(&origin);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );
        assert_eq!(response.headers()["Access-Control-Allow-Methods"], ALLOWED_METHODS);
    }
}
