//! Object read handlers (GET / HEAD)

use crate::gate::{extract_key, header_value, range_from_headers, RefererInfo};
use crate::{AppState, GateError};
use axum::{
    body::Body,
    extract::{Extension, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::Response,
};
use mediagate_store::{GetOptions, StoredObject};
use std::sync::Arc;
use tracing::debug;

/// Headers a cross-origin media element may read
pub const EXPOSED_HEADERS: &str = "Content-Length, Content-Range, Accept-Ranges";

/// GET /{key} - Object content, honoring a single byte range
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Extension(referer): Extension<RefererInfo>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, GateError> {
    serve_object(&state, &referer, &uri, &headers, true).await
}

/// HEAD /{key} - Same headers as GET without the body
pub async fn head_object(
    State(state): State<Arc<AppState>>,
    Extension(referer): Extension<RefererInfo>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, GateError> {
    serve_object(&state, &referer, &uri, &headers, false).await
}

async fn serve_object(
    state: &AppState,
    referer: &RefererInfo,
    uri: &Uri,
    headers: &HeaderMap,
    with_body: bool,
) -> Result<Response, GateError> {
    let key = extract_key(uri.path())?;
    let range = range_from_headers(headers);

    let object = state
        .store
        .get(&key, GetOptions::from(range))
        .await?
        .ok_or(GateError::NotFound)?;

    debug!(
        key = %key,
        size = object.size,
        requested = ?range,
        served = ?object.range,
        "Serving object"
    );

    Ok(object_response(state, referer, object, range.is_some(), with_body))
}

/// Store metadata first, then the CORS/CORP headers on top of it
fn object_response(
    state: &AppState,
    referer: &RefererInfo,
    object: StoredObject,
    range_requested: bool,
    with_body: bool,
) -> Response {
    let mut headers = HeaderMap::new();
    for (name, value) in object.http_metadata.header_pairs() {
        if let Some(value) = header_value(value) {
            headers.insert(name, value);
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        header_value(referer.allow_origin_value()).unwrap_or(HeaderValue::from_static("*")),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSED_HEADERS),
    );
    headers.insert(
        "cross-origin-resource-policy",
        HeaderValue::from_static(state.policy.corp.as_str()),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(object.body_len()));

    let status = match object.range {
        Some(served) if range_requested => {
            headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            if let Some(value) = header_value(&served.content_range(object.size)) {
                headers.insert(header::CONTENT_RANGE, value);
            }
            StatusCode::PARTIAL_CONTENT
        }
        _ => StatusCode::OK,
    };

    let body = if with_body {
        Body::from_stream(object.body.into_stream())
    } else {
        Body::empty()
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
