// SPDX-License-Identifier: MIT

//! `cronmeshd-agent`: loads a TOML config, opens the Event Channel to the
//! center, and runs the scheduler's periodic timer loop until signalled to
//! stop.

use anyhow::{Context, Result};
use clap::Parser;
use cronmesh_agent::{AgentChannel, AgentIdentity, AgentScheduler, TracingLogSink, WsDialer};
use cronmesh_core::AgentConfig;
use cronmesh_wire::AgentReport;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Size of the scheduler's outbound `AgentReport` queue (`task_finished`,
/// `hash_report`). Backpressure here surfaces as the bounded-retry
/// publish path in [`cronmesh_agent::AgentScheduler`], not a dropped
/// message.
const REPORT_QUEUE_CAPACITY: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "cronmeshd-agent", about = "cronmesh Agent Scheduler process")]
struct Args {
    /// Path to the agent's TOML config file.
    #[arg(long, default_value = "agent.toml")]
    config: PathBuf,
}

fn init_tracing(log_level: &str) {
    let filter = if log_level.is_empty() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new(log_level)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AgentConfig::load(&args.config).with_context(|| format!("loading {:?}", args.config))?;
    init_tracing(&config.log_level);

    let address = if config.address.is_empty() { local_address_hint() } else { config.address.clone() };

    let (report_tx, report_rx) = mpsc::channel::<AgentReport>(REPORT_QUEUE_CAPACITY);
    let sink = Arc::new(TracingLogSink);
    let scheduler = Arc::new(AgentScheduler::new(config.shell.clone(), sink, report_tx));

    let shutdown = CancellationToken::new();
    let timer_handle = tokio::spawn(scheduler.clone().run_periodic_loop(shutdown.clone()));

    let identity = AgentIdentity {
        agent_ip: address,
        agent_version: env!("CARGO_PKG_VERSION").to_string(),
        project_ids: config.projects.clone(),
        organization: config.micro.org_id.clone(),
        region: config.micro.region.clone(),
        weight: config.micro.weight,
    };
    let channel = AgentChannel::new(
        config.micro.endpoint.clone(),
        WsDialer,
        scheduler,
        identity,
        report_rx,
        cronmesh_agent::channel::DEFAULT_HASH_RECONCILE_INTERVAL,
    );

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        signal_shutdown.cancel();
    });

    channel.run(shutdown).await;
    timer_handle.abort();
    Ok(())
}

/// Best-effort local address hint used when `address` is left empty in
/// config; the center only uses this value as an opaque connection-table
/// key, so an imprecise guess is harmless — it is informational, not
/// dialed by the center.
fn local_address_hint() -> String {
    std::env::var("CRONMESH_AGENT_ADDRESS").unwrap_or_else(|_| "0.0.0.0:0".to_string())
}
