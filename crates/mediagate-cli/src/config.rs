//! Gateway configuration

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// `Cross-Origin-Resource-Policy` value attached to object responses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CorpPolicy {
    #[default]
    SameSite,
    SameOrigin,
    CrossOrigin,
}

impl CorpPolicy {
    /// Header value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SameSite => "same-site",
            Self::SameOrigin => "same-origin",
            Self::CrossOrigin => "cross-origin",
        }
    }
}

impl fmt::Display for CorpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which object store backs the bucket
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-memory store, starts empty
    Memory,
    /// Bucket directory on the local filesystem
    #[default]
    Fs,
    /// Remote bucket over HTTP range requests
    Http,
}

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Referer hostnames allowed to embed media
    pub allowed_hosts: Vec<String>,
    /// User-Agent substrings that bypass the Referer check
    pub trusted_user_agents: Vec<String>,
    /// Cross-Origin-Resource-Policy for object responses
    pub corp: CorpPolicy,
    /// Object store backend
    pub store: StoreBackend,
    /// Parent directory of bucket directories (fs backend)
    pub data_dir: PathBuf,
    /// Bucket binding name
    pub bucket: String,
    /// Base URL of the remote bucket host (http backend)
    pub upstream_url: String,
    /// Upstream request timeout (seconds)
    pub upstream_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            allowed_hosts: Vec::new(),
            trusted_user_agents: vec!["Obsidian".to_string()],
            corp: CorpPolicy::SameSite,
            store: StoreBackend::Fs,
            data_dir: PathBuf::from("./data"),
            bucket: "MEDIA".to_string(),
            upstream_url: "http://localhost:9000".to_string(),
            upstream_timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Bucket directory for the fs backend
    pub fn bucket_dir(&self) -> PathBuf {
        self.data_dir.join(&self.bucket)
    }

    /// Bucket URL for the http backend
    pub fn bucket_url(&self) -> String {
        format!(
            "{}/{}",
            self.upstream_url.trim_end_matches('/'),
            urlencoding::encode(&self.bucket)
        )
    }
}
