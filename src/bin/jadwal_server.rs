use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use log::{error, info};
use jadwal::{ApiServer, JadwalConfig, Result, TableService};
use jadwal::config::subsystems::logging::parse_level;
use jadwal::utils::init_logging;

/// HTTP server for append, join and cluster-matching table operations
#[derive(Parser, Debug)]
#[command(name = "jadwal_server", version, about)]
struct Args {
    /// INI configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the config file and environment
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(args: &Args) -> Result<JadwalConfig> {
    let mut config = match args.config {
        Some(ref path) => JadwalConfig::from_ini(path)?,
        None => JadwalConfig::default(),
    };
    config.apply_env()?;

    if let Some(addr) = args.listen {
        config.server.listen_addr = addr;
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = parse_level(level)?;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(path) = init_logging(&config.logging)? {
        eprintln!("Logging to {}", path.display());
    }
    info!(
        "Starting jadwal server (scorer: {}, parallel threshold: {}, {} matcher threads)",
        config.matcher.scorer.as_str(),
        config.matcher.parallel_threshold,
        config.matcher.thread_count()
    );

    let service = Arc::new(TableService::new(config.clone())?);
    let server = ApiServer::new(service, config.server.clone())?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    server.run_until(shutdown).await?;
    info!("Server stopped");
    Ok(())
}
