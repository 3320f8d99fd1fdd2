//! # Mediagate
//!
//! Referer-gated media edge serving byte ranges from an object store.
//!
//! This crate provides:
//! - **Origin gate**: Referer hostname allowlist with trusted-client bypass
//! - **CORS**: preflight answers and cross-origin headers for media elements
//! - **Range reads**: single `bytes=` ranges answered with 206 Partial Content
//! - **Backends**: bucket directory, remote HTTP bucket, or in-memory store
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │         Browsers / media players / Obsidian         │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                     Mediagate                       │
//! ├─────────────────────────────────────────────────────┤
//! │  Request ID │ Access Log │ Referer / UA Origin Gate │
//! ├─────────────────────────────────────────────────────┤
//! │      GET / HEAD object      │     OPTIONS preflight │
//! ├─────────────────────────────────────────────────────┤
//! │                  mediagate-store                    │
//! │          (memory, bucket directory, HTTP)           │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{CorpPolicy, GatewayConfig, StoreBackend};
pub use error::GateError;
pub use server::{run_server, run_server_with_shutdown, shutdown_signal};
pub use state::AppState;
