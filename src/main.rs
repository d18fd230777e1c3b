// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use genomic_tee_server::{
    api::router,
    blockchain::{LedgerGateway, NetworkConfig, RpcLedgerGateway, SimulatedLedger},
    config::{AppConfig, LedgerMode, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    enclave::Enclave,
    pipeline::{Pipeline, StaticProof},
    state::AppState,
    storage::InMemoryContentStore,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_ledger(config: &AppConfig) -> Result<Arc<dyn LedgerGateway>, BoxError> {
    let identity = Arc::new(config.build_identity()?);

    let ledger: Arc<dyn LedgerGateway> = match config.ledger_mode {
        LedgerMode::Rpc => {
            let network = NetworkConfig::new("LIFE Network", config.chain_id, &config.rpc_url);
            let controller = config.controller_address.as_deref().unwrap_or_default();
            Arc::new(RpcLedgerGateway::new(
                network,
                controller,
                identity,
                config.settlement_timeout,
            )?)
        }
        LedgerMode::Simulated => {
            warn!("Using the simulated ledger; nothing is settled on chain");
            let network =
                NetworkConfig::new("LIFE Network (simulated)", config.chain_id, &config.rpc_url);
            Arc::new(SimulatedLedger::new(
                network,
                identity,
                config.settlement_timeout,
            ))
        }
    };

    Ok(ledger)
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install rustls crypto provider")?;

    init_tracing();

    let config = AppConfig::from_env()?;
    let ledger = build_ledger(&config)?;

    let enclave = Arc::new(Enclave::new());
    info!(public_key = %enclave.public_key_hex(), "Enclave key pair generated");
    info!(
        network = %ledger.network().name,
        chain_id = ledger.network().chain_id,
        sender = %ledger.sender_address(),
        "Ledger gateway ready"
    );

    let pipeline = Pipeline::new(
        Arc::new(InMemoryContentStore::new()),
        enclave,
        ledger,
        Arc::new(StaticProof::new(config.settlement_proof.clone())),
    );
    let app = router(AppState::new(pipeline), config.max_upload_bytes);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let handle = Handle::new();
    {
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });
    }

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            info!("Genomic TEE server listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!("Genomic TEE server listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
