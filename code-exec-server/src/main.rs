use clap::Parser;
use code_exec::EngineConfig;
use code_exec_server::{create_app, run_server};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    addr: SocketAddr,

    /// TOML file with engine settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wall-clock limit for build and run together, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Maximum captured bytes per output stream
    #[arg(long)]
    max_output_bytes: Option<usize>,

    /// Maximum number of concurrent executions
    #[arg(short, long)]
    max_concurrent: Option<usize>,

    /// Directory for per-request workspaces
    #[arg(long)]
    workspace_root: Option<PathBuf>,
}

impl Args {
    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(max_output_bytes) = self.max_output_bytes {
            config.max_output_bytes = max_output_bytes;
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.max_concurrent_executions = max_concurrent;
        }
        if let Some(workspace_root) = &self.workspace_root {
            config.workspace_root = workspace_root.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.engine_config()?;
    tracing::info!(
        "Engine limits: timeout {} ms, {} bytes per stream, {} concurrent, workspaces in {:?}",
        config.timeout_ms,
        config.max_output_bytes,
        config.max_concurrent_executions,
        config.workspace_root
    );

    let app = create_app(config)?;
    run_server(app, args.addr).await?;

    Ok(())
}
