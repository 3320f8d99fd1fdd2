//! Error types and their plain-text responses

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use mediagate_store::StoreError;
use thiserror::Error;

/// Methods the gate serves
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Terminal outcomes of a request that did not produce an object
#[derive(Error, Debug)]
pub enum GateError {
    /// Referer not allowed and no bypass applies
    #[error("blocked")]
    Blocked,

    /// Object key missing or undecodable
    #[error("bad request")]
    BadRequest,

    /// No object under the key
    #[error("404")]
    NotFound,

    /// Method outside GET/HEAD/OPTIONS
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Range starts at or beyond the end of the object
    #[error("range not satisfiable")]
    RangeNotSatisfiable { size: u64 },

    /// Store failed for a reason other than a missing key
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for GateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RangeNotSatisfiable { size, .. } => Self::RangeNotSatisfiable { size },
            StoreError::InvalidKey(_) => Self::BadRequest,
            other => Self::Store(other),
        }
    }
}

impl GateError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Blocked => StatusCode::FORBIDDEN,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Body sent to the client
    pub fn body(&self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::BadRequest => "bad request",
            Self::NotFound => "404",
            Self::MethodNotAllowed => "method not allowed",
            Self::RangeNotSatisfiable { .. } => "range not satisfiable",
            // Store faults stay in the logs
            Self::Store(_) => "bad gateway",
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        if let Self::Store(ref err) = self {
            tracing::error!(error = %err, "Object store failure");
        }

        let mut response = (
            self.status_code(),
            [(header::CONTENT_TYPE, "text/plain;charset=UTF-8")],
            self.body(),
        )
            .into_response();

        let headers = response.headers_mut();
        match self {
            Self::MethodNotAllowed => {
                headers.insert(header::ALLOW, header::HeaderValue::from_static(ALLOWED_METHODS));
            }
            Self::RangeNotSatisfiable { size } => {
                if let Ok(value) = format!("bytes */{}", size).parse() {
                    headers.insert(header::CONTENT_RANGE, value);
                }
            }
            _ => {}
        }

        response
    }
}
