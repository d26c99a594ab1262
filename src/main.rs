// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use futures::StreamExt;
use instana_agent_operator::constants::{
    ERROR_REQUEUE_DURATION_SECS, METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH,
    METRICS_SERVER_PORT, RECONCILE_REQUEUE_DURATION_SECS, TOKIO_WORKER_THREADS,
};
use instana_agent_operator::crd::{InstanaAgent, RemoteAgent};
use instana_agent_operator::metrics::{
    record_reconciliation_error, record_reconciliation_success, render_metrics,
};
use instana_agent_operator::reconcilers::{reconcile_instana_agent, reconcile_remote_agent};
use kube::runtime::controller::Action;
use kube::runtime::watcher::Config;
use kube::runtime::Controller;
use kube::{Api, Client, ResourceExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

/// Instana Agent operator
#[derive(Debug, Parser)]
#[command(name = "instana-agent-operator", version, about)]
struct Args {
    /// Log output format (text or json); RUST_LOG_FORMAT overrides
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Port for the health and metrics HTTP server
    #[arg(long, default_value_t = METRICS_SERVER_PORT)]
    server_port: u16,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("instana-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Respects RUST_LOG if set, defaults to INFO otherwise
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or(args.log_format.clone());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting Instana Agent operator");

    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized");

    // Controllers should never exit - if one does, the process goes down
    // with it and lets the Deployment restart us
    tokio::select! {
        result = run_http_server(args.server_port) => {
            error!("CRITICAL: HTTP server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("HTTP server exited unexpectedly without error")
        }
        result = run_instana_agent_controller(client.clone()) => {
            error!("CRITICAL: InstanaAgent controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("InstanaAgent controller exited unexpectedly without error")
        }
        result = run_remote_agent_controller(client.clone()) => {
            error!("CRITICAL: RemoteAgent controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("RemoteAgent controller exited unexpectedly without error")
        }
    }
}

/// Serve `/healthz` and `/metrics`.
async fn run_http_server(port: u16) -> Result<()> {
    let app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route(METRICS_SERVER_PATH, get(|| async { render_metrics() }));

    let addr = format!("{METRICS_SERVER_BIND_ADDRESS}:{port}");
    info!(addr = %addr, "Starting health and metrics server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the `InstanaAgent` controller.
async fn run_instana_agent_controller(client: Client) -> Result<()> {
    info!("Starting InstanaAgent controller");

    let api = Api::<InstanaAgent>::all(client.clone());

    Controller::new(api, Config::default())
        .run(reconcile_instana_agent_wrapper, error_policy_agent, Arc::new(client))
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the `RemoteAgent` controller.
async fn run_remote_agent_controller(client: Client) -> Result<()> {
    info!("Starting RemoteAgent controller");

    let api = Api::<RemoteAgent>::all(client.clone());

    Controller::new(api, Config::default())
        .run(reconcile_remote_agent_wrapper, error_policy_remote, Arc::new(client))
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `InstanaAgent`.
async fn reconcile_instana_agent_wrapper(
    agent: Arc<InstanaAgent>,
    ctx: Arc<Client>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();

    match reconcile_instana_agent((*ctx).clone(), (*agent).clone()).await {
        Ok(()) => {
            record_reconciliation_success("InstanaAgent", start.elapsed());
            info!("Successfully reconciled InstanaAgent: {}", agent.name_any());
            Ok(Action::requeue(Duration::from_secs(
                RECONCILE_REQUEUE_DURATION_SECS,
            )))
        }
        Err(e) => {
            record_reconciliation_error("InstanaAgent", start.elapsed());
            error!("Failed to reconcile InstanaAgent: {}", e);
            Err(e.into())
        }
    }
}

/// Reconcile wrapper for `RemoteAgent`.
async fn reconcile_remote_agent_wrapper(
    agent: Arc<RemoteAgent>,
    ctx: Arc<Client>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();

    match reconcile_remote_agent((*ctx).clone(), (*agent).clone()).await {
        Ok(()) => {
            record_reconciliation_success("RemoteAgent", start.elapsed());
            info!("Successfully reconciled RemoteAgent: {}", agent.name_any());
            Ok(Action::requeue(Duration::from_secs(
                RECONCILE_REQUEUE_DURATION_SECS,
            )))
        }
        Err(e) => {
            record_reconciliation_error("RemoteAgent", start.elapsed());
            error!("Failed to reconcile RemoteAgent: {}", e);
            Err(e.into())
        }
    }
}

/// Error policy for the `InstanaAgent` controller.
fn error_policy_agent(
    _resource: Arc<InstanaAgent>,
    _err: &ReconcileError,
    _ctx: Arc<Client>,
) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Error policy for the `RemoteAgent` controller.
fn error_policy_remote(
    _resource: Arc<RemoteAgent>,
    _err: &ReconcileError,
    _ctx: Arc<Client>,
) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
