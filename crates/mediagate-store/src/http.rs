//! Remote bucket reached over plain HTTP range requests

use crate::{
    GetOptions, HttpMetadata, ObjectBody, ObjectStore, Result, ServedRange, StoreError,
    StoredObject,
};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{header, Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};

/// Configuration for a remote bucket
#[derive(Clone, Debug)]
pub struct HttpStoreConfig {
    /// Base URL of the bucket, objects live at `{base_url}/{key}`
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000/media".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpStoreConfig {
    /// Create with a custom base URL
    pub fn with_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Object store proxying reads to a remote HTTP bucket
#[derive(Clone)]
pub struct HttpObjectStore {
    client: Client,
    config: HttpStoreConfig,
}

impl HttpObjectStore {
    /// Create a new remote bucket client
    pub fn new(mut config: HttpStoreConfig) -> Result<Self> {
        let trimmed = config.base_url.trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(StoreError::Configuration(format!(
                "upstream URL must be http(s): {}",
                config.base_url
            )));
        }
        config.base_url = trimmed;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from URL string
    pub fn from_url(url: &str) -> Result<Self> {
        Self::new(HttpStoreConfig::with_url(url))
    }

    fn object_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.config.base_url, encoded.join("/"))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout {
                seconds: self.config.timeout.as_secs(),
            }
        } else {
            err.into()
        }
    }
}

/// Parse `bytes <start>-<end>/<size>` or `bytes */<size>`
fn parse_content_range(value: &str) -> Option<(Option<ServedRange>, u64)> {
    let rest = value.trim().strip_prefix("bytes ")?;
    let (span, size) = rest.split_once('/')?;
    let size: u64 = size.trim().parse().ok()?;

    if span.trim() == "*" {
        return Some((None, size));
    }

    let (start, end) = span.split_once('-')?;
    let start: u64 = start.trim().parse().ok()?;
    let end: u64 = end.trim().parse().ok()?;
    if end < start {
        return None;
    }

    Some((
        Some(ServedRange {
            offset: start,
            length: end - start + 1,
        }),
        size,
    ))
}

fn header_str(response: &Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn metadata_from(response: &Response) -> HttpMetadata {
    HttpMetadata {
        content_type: header_str(response, header::CONTENT_TYPE),
        content_language: header_str(response, header::CONTENT_LANGUAGE),
        content_disposition: header_str(response, header::CONTENT_DISPOSITION),
        content_encoding: header_str(response, header::CONTENT_ENCODING),
        cache_control: header_str(response, header::CACHE_CONTROL),
        cache_expiry: header_str(response, header::EXPIRES),
    }
}

fn body_from(response: Response) -> ObjectBody {
    let stream = response
        .bytes_stream()
        .map_err(std::io::Error::other)
        .boxed();
    ObjectBody::from_stream(stream)
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    async fn get(&self, key: &str, options: GetOptions) -> Result<Option<StoredObject>> {
        let url = self.object_url(key);
        let mut request = self.client.get(&url);

        if let Some(range) = options.range {
            let value = match range.length {
                Some(len) => format!(
                    "bytes={}-{}",
                    range.offset,
                    range.offset.saturating_add(len.saturating_sub(1))
                ),
                None => format!("bytes={}-", range.offset),
            };
            request = request.header(header::RANGE, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let status = response.status();
        debug!(status = status.as_u16(), "Upstream responded");

        match status {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::RANGE_NOT_SATISFIABLE => {
                let size = header_str(&response, header::CONTENT_RANGE)
                    .and_then(|v| parse_content_range(&v))
                    .map(|(_, size)| size)
                    .unwrap_or(0);
                Err(StoreError::RangeNotSatisfiable {
                    offset: options.range.map_or(0, |r| r.offset),
                    size,
                })
            }
            StatusCode::PARTIAL_CONTENT => {
                let (served, size) = header_str(&response, header::CONTENT_RANGE)
                    .and_then(|v| parse_content_range(&v))
                    .and_then(|(served, size)| served.map(|s| (s, size)))
                    .ok_or_else(|| {
                        StoreError::Metadata("206 response without a usable Content-Range".into())
                    })?;

                Ok(Some(StoredObject {
                    key: key.to_string(),
                    size,
                    http_metadata: metadata_from(&response),
                    range: Some(served),
                    body: body_from(response),
                }))
            }
            StatusCode::OK => {
                let http_metadata = metadata_from(&response);

                // Chunked upstreams don't announce a length; the size has to be counted
                let (size, body) = match response.content_length() {
                    Some(size) => (size, body_from(response)),
                    None => {
                        let data = response
                            .bytes()
                            .await
                            .map_err(|e| self.map_transport_error(e))?;
                        debug!(size = data.len(), "Buffered upstream body without Content-Length");
                        (data.len() as u64, ObjectBody::from_bytes(data))
                    }
                };

                Ok(Some(StoredObject {
                    key: key.to_string(),
                    size,
                    http_metadata,
                    range: None,
                    body,
                }))
            }
            other => Err(StoreError::Upstream {
                status: other.as_u16(),
            }),
        }
    }
}
