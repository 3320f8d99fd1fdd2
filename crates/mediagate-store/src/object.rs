//! Objects returned by a store

use crate::ServedRange;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP headers recorded with an object at upload time
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    /// Sent as the `Expires` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_expiry: Option<String>,
}

impl HttpMetadata {
    /// Metadata carrying only a content type
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Default::default()
        }
    }

    /// The recorded headers as `(name, value)` pairs, in a fixed order
    pub fn header_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("content-type", &self.content_type),
            ("content-language", &self.content_language),
            ("content-disposition", &self.content_disposition),
            ("content-encoding", &self.content_encoding),
            ("cache-control", &self.cache_control),
            ("expires", &self.cache_expiry),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    /// Fill unset fields from `other`
    pub fn or(self, other: HttpMetadata) -> Self {
        Self {
            content_type: self.content_type.or(other.content_type),
            content_language: self.content_language.or(other.content_language),
            content_disposition: self.content_disposition.or(other.content_disposition),
            content_encoding: self.content_encoding.or(other.content_encoding),
            cache_control: self.cache_control.or(other.cache_control),
            cache_expiry: self.cache_expiry.or(other.cache_expiry),
        }
    }
}

/// Streaming object body
pub struct ObjectBody {
    stream: BoxStream<'static, std::io::Result<Bytes>>,
}

impl ObjectBody {
    /// Wrap an arbitrary byte stream
    pub fn from_stream(stream: BoxStream<'static, std::io::Result<Bytes>>) -> Self {
        Self { stream }
    }

    /// Body backed by bytes already in memory
    pub fn from_bytes(data: Bytes) -> Self {
        Self::from_stream(stream::once(async move { Ok(data) }).boxed())
    }

    /// Body with no content
    pub fn empty() -> Self {
        Self::from_stream(stream::empty().boxed())
    }

    /// Take the underlying stream
    pub fn into_stream(self) -> BoxStream<'static, std::io::Result<Bytes>> {
        self.stream
    }

    /// Read the whole body into memory
    pub async fn collect(mut self) -> std::io::Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody").finish_non_exhaustive()
    }
}

/// An object read from a store
#[derive(Debug)]
pub struct StoredObject {
    /// Key the object was stored under
    pub key: String,
    /// Total size of the object in bytes
    pub size: u64,
    /// Headers recorded with the object
    pub http_metadata: HttpMetadata,
    /// Range actually served, set only when a range was requested and honored
    pub range: Option<ServedRange>,
    /// Object content, sliced to `range` when present
    pub body: ObjectBody,
}

impl StoredObject {
    /// Number of bytes `body` will yield
    pub fn body_len(&self) -> u64 {
        self.range.map_or(self.size, |r| r.length)
    }
}
