//! Command-line arguments for the stats agent.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the OpenVPN status log to poll.
    #[clap(long, default_value = "/var/log/openvpn/openvpn-status.log")]
    pub status_log: PathBuf,

    /// Directory holding one counter record per client.
    #[clap(long, default_value = "db")]
    pub db_dir: PathBuf,

    /// Interface label the report is grouped under in the output.
    #[clap(long, default_value = "tun0")]
    pub interface: String,
}
