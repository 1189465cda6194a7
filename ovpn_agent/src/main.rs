//! OpenVPN stats agent for SNMP-based monitoring.
//!
//! This binary is meant to be called by snmpd's `extend` mechanism at a fixed
//! interval. One invocation performs one poll cycle:
//!
//! 1. Read and parse the OpenVPN status log (`parser`).
//! 2. Merge each connected client's snapshot into its durable counter record
//!    (`reconciler` over `store`), folding closed sessions into lifetime
//!    totals so the counters stay monotonic across reconnects.
//! 3. Derive per-client metrics for every client ever observed (`report`).
//! 4. Print the JSON envelope the monitoring host's wireguard application
//!    consumes (`ovpn_common::envelope`).
//!
//! stdout carries exactly one JSON document, since snmpd captures it;
//! all diagnostics go to the logger on stderr. Any failure aborts the cycle,
//! is reported inside the envelope's error fields, and exits with status 1.
//! Clients already reconciled before the failure keep their saved state; the
//! rest catch up on the next poll.
#![warn(missing_docs)]
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use log::{error, info};
use ovpn_common::envelope::{Envelope, InterfaceReport};
use ovpn_common::{CollectorError, Result};

use crate::args::Args;
use crate::store::ClientStore;

mod args;
mod parser;
mod reconciler;
mod report;
mod store;

fn run(args: &Args) -> Result<InterfaceReport> {
    let status_file = File::open(&args.status_log).map_err(|e| {
        CollectorError::SourceRead(format!("{}: {e}", args.status_log.display()))
    })?;
    let snapshots = parser::parse_status(BufReader::new(status_file))?;

    let store = ClientStore::open(&args.db_dir)?;
    reconciler::reconcile_all(&store, snapshots)?;

    report::build_report(&store, Local::now().naive_local())
}

fn main() -> ExitCode {
    init_logger();
    let args = Args::parse();

    match run(&args) {
        Ok(report) => {
            info!("Poll cycle finished, {} client(s) reported", report.len());
            emit(&Envelope::success(&args.interface, report));
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Poll cycle failed: {err}");
            emit(&Envelope::failure(&err));
            ExitCode::FAILURE
        }
    }
}

/// Prints the envelope to stdout. A serialization failure here has no
/// envelope left to report itself in, so it only goes to the logger.
fn emit(envelope: &Envelope) {
    match envelope.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to serialize output envelope: {e}"),
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
