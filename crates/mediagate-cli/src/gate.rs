//! Request gate rules: Referer allowlist, object keys and Range headers
//!
//! Everything here is a total function over request parts so the handlers
//! and middleware stay thin.

use crate::config::{CorpPolicy, GatewayConfig};
use crate::GateError;
use axum::http::{header, HeaderMap, HeaderValue};
use mediagate_store::ByteRange;
use std::collections::HashSet;
use url::Url;

/// Hostnames whose pages may embed media
#[derive(Clone, Debug, Default)]
pub struct AllowedOrigins {
    hosts: HashSet<String>,
}

impl AllowedOrigins {
    /// Build from configured hostnames
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { hosts }
    }

    /// Exact membership check
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// What the `Referer` header says about the requesting page
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefererInfo {
    /// A non-empty Referer header was sent
    pub present: bool,
    /// Hostname, empty when absent or unparsable
    pub host: String,
    /// Serialized origin, empty when absent or unparsable
    pub origin: String,
}

impl RefererInfo {
    /// Parse a raw Referer value. Never fails: an invalid URL yields a present
    /// referer with empty host and origin.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::default();
        };

        match Url::parse(raw) {
            Ok(url) => Self {
                present: true,
                host: url.host_str().unwrap_or_default().to_string(),
                origin: url.origin().ascii_serialization(),
            },
            Err(_) => Self {
                present: true,
                ..Default::default()
            },
        }
    }

    /// Parse the request's Referer header
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(header::REFERER) {
            None => Self::default(),
            // Present but not text: treated like an unparsable URL
            Some(value) => match value.to_str() {
                Ok(s) => Self::parse(Some(s)),
                Err(_) => Self {
                    present: true,
                    ..Default::default()
                },
            },
        }
    }

    /// Value for `Access-Control-Allow-Origin`
    pub fn allow_origin_value(&self) -> &str {
        if self.origin.is_empty() {
            "*"
        } else {
            &self.origin
        }
    }
}

/// Immutable access policy built once from configuration
#[derive(Clone, Debug)]
pub struct EdgePolicy {
    pub allowed_origins: AllowedOrigins,
    pub trusted_user_agents: Vec<String>,
    pub corp: CorpPolicy,
}

impl EdgePolicy {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            allowed_origins: AllowedOrigins::new(&config.allowed_hosts),
            trusted_user_agents: config
                .trusted_user_agents
                .iter()
                .filter(|ua| !ua.is_empty())
                .cloned()
                .collect(),
            corp: config.corp,
        }
    }

    /// True when the User-Agent carries a trusted client marker
    pub fn is_trusted_client(&self, user_agent: &str) -> bool {
        self.trusted_user_agents
            .iter()
            .any(|marker| user_agent.contains(marker.as_str()))
    }

    /// Allowlisted host, trusted client, or no Referer at all
    pub fn authorize(&self, referer: &RefererInfo, user_agent: &str) -> bool {
        !referer.present
            || self.allowed_origins.contains(&referer.host)
            || self.is_trusted_client(user_agent)
    }

    /// Gate a request on its headers
    pub fn check(&self, headers: &HeaderMap) -> Result<RefererInfo, GateError> {
        let referer = RefererInfo::from_headers(headers);
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if self.authorize(&referer, user_agent) {
            Ok(referer)
        } else {
            tracing::info!(
                referer_host = %referer.host,
                user_agent = %user_agent,
                "Blocked request from disallowed referer"
            );
            Err(GateError::Blocked)
        }
    }
}

/// Object key from a request path: drop one leading `/`, then percent-decode
pub fn extract_key(path: &str) -> Result<String, GateError> {
    let raw = path.strip_prefix('/').unwrap_or(path);
    let key = urlencoding::decode(raw).map_err(|_| GateError::BadRequest)?;
    if key.is_empty() {
        return Err(GateError::BadRequest);
    }
    Ok(key.into_owned())
}

/// Parse `bytes=<start>-<end?>`. Anything else means "no range".
pub fn parse_range(value: &str) -> Option<ByteRange> {
    let spec = value.trim().strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;

    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(start) || !(end.is_empty() || is_digits(end)) {
        return None;
    }

    let start: u64 = start.parse().ok()?;
    if end.is_empty() {
        return Some(ByteRange::from_offset(start));
    }
    let end: u64 = end.parse().ok()?;
    ByteRange::inclusive(start, end)
}

/// Range requested by the `Range` header, if any usable one was sent
pub fn range_from_headers(headers: &HeaderMap) -> Option<ByteRange> {
    headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range)
}

/// Header value from a string that may hold bytes a header cannot carry
pub(crate) fn header_value(value: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(value).ok()
}
