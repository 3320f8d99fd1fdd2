//! Mediagate - Referer-gated media edge

use clap::Parser;
use mediagate_cli::{run_server_with_shutdown, shutdown_signal, CorpPolicy, GatewayConfig, StoreBackend};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mediagate")]
#[command(about = "Serve media byte ranges to allowlisted sites")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "MEDIAGATE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8787", env = "MEDIAGATE_PORT")]
    port: u16,

    /// Referer hostnames allowed to embed media (comma separated)
    #[arg(long = "allowed-host", env = "MEDIAGATE_ALLOWED_HOSTS", value_delimiter = ',')]
    allowed_hosts: Vec<String>,

    /// User-Agent substrings that bypass the Referer check (comma separated)
    #[arg(
        long = "trusted-user-agent",
        env = "MEDIAGATE_TRUSTED_USER_AGENTS",
        value_delimiter = ',',
        default_value = "Obsidian"
    )]
    trusted_user_agents: Vec<String>,

    /// Cross-Origin-Resource-Policy for object responses
    #[arg(long, value_enum, default_value_t = CorpPolicy::SameSite, env = "MEDIAGATE_CORP")]
    corp: CorpPolicy,

    /// Object store backend
    #[arg(long, value_enum, default_value_t = StoreBackend::Fs, env = "MEDIAGATE_STORE")]
    store: StoreBackend,

    /// Directory holding bucket directories (fs backend)
    #[arg(long, default_value = "./data", env = "MEDIAGATE_DATA_DIR")]
    data_dir: PathBuf,

    /// Bucket binding name
    #[arg(long, default_value = "MEDIA", env = "MEDIAGATE_BUCKET")]
    bucket: String,

    /// Remote bucket host URL (http backend)
    #[arg(long, default_value = "http://localhost:9000", env = "MEDIAGATE_UPSTREAM_URL")]
    upstream_url: String,

    /// Remote bucket request timeout in seconds
    #[arg(long, default_value = "30", env = "MEDIAGATE_UPSTREAM_TIMEOUT")]
    upstream_timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long, env = "MEDIAGATE_DEBUG")]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "MEDIAGATE_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "mediagate_cli={level},mediagate_store={level},tower_http={level}",
            level = log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Mediagate on {}:{}", args.host, args.port);

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        allowed_hosts: args.allowed_hosts,
        trusted_user_agents: args.trusted_user_agents,
        corp: args.corp,
        store: args.store,
        data_dir: args.data_dir,
        bucket: args.bucket,
        upstream_url: args.upstream_url,
        upstream_timeout_secs: args.upstream_timeout_secs,
    };

    run_server_with_shutdown(config, shutdown_signal()).await
}
