//! CORS preflight and method rejection

use crate::error::ALLOWED_METHODS;
use crate::gate::{header_value, RefererInfo};
use crate::GateError;
use axum::{
    extract::Extension,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// How long browsers may cache a preflight result (seconds)
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// OPTIONS /{key} - CORS preflight for an authorized origin
pub async fn preflight(Extension(referer): Extension<RefererInfo>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        header_value(referer.allow_origin_value()).unwrap_or(HeaderValue::from_static("*")),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Range"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE),
    );

    (StatusCode::NO_CONTENT, headers).into_response()
}

/// Any method other than GET, HEAD or OPTIONS
pub async fn method_not_allowed() -> GateError {
    GateError::MethodNotAllowed
}
