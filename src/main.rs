mod banner;
mod config;
mod conn;
mod console;
mod engine;
mod error;
mod handlers;
mod sink;

use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chromeaudit_cdp::browser_protocol::target::SetDiscoverTargetsParams;

use config::{CliArgs, Config};
use conn::Transport;
use console::Console;
use engine::Engine;
use error::AppError;
use sink::AuditSink;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_tracing();
    banner::print();

    let config = Config::load(CliArgs::parse())?;
    info!(host = %config.debugee_host, port = config.debugee_port, "connecting to debuggee");

    let transport = Arc::new(Transport::connect(&config.debugee_host, config.debugee_port).await?);
    let sink = AuditSink::open(config).await?;
    let engine = Engine::new(transport, sink)?;

    let engine_for_loop = engine.clone();
    let run_handle = tokio::spawn(async move { engine_for_loop.run().await });

    // Root, session-less bootstrap: without this no `Target.targetCreated`
    // ever fires and the collector never attaches to anything.
    engine
        .cmd
        .send(&SetDiscoverTargetsParams::new(true), None)
        .await?;

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    let console = Console::new(engine.clone(), shutdown_tx);
    let console_handle = tokio::spawn(console.run());

    tokio::select! {
        result = run_handle => {
            match result {
                Ok(Err(err)) => error!(error = %err, "receive loop exited with an error"),
                Ok(Ok(())) => {}
                Err(err) => error!(error = %err, "receive loop task panicked"),
            }
        }
        _ = shutdown_rx.recv() => {
            info!("shutdown requested from console");
        }
    }

    console_handle.abort();
    Ok(())
}
