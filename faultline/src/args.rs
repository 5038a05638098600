use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Structured error service
#[derive(Debug, Parser)]
#[command(name = "faultline", about = "Serves the error catalog and renders failures at the HTTP boundary")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "etc/faultline.toml", env = "FAULTLINE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "FAULTLINE_LISTEN")]
    pub listen: Option<SocketAddr>,
}
