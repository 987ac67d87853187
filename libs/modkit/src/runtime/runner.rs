//! Lifecycle runner: init → db → rest → start → wait → stop.
//!
//! One `ModuleCtx` is built up front and reused by every phase. Shutdown is
//! driven by OS signals, an external `CancellationToken` or an arbitrary
//! future.

use axum::Router;
use std::{future::Future, pin::Pin, sync::Arc};
use tokio_util::sync::CancellationToken;

use crate::client_hub::ClientHub;
use crate::context::{ConfigProvider, ModuleCtxBuilder};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;

pub enum DbOptions {
    /// Modules see no database; `db_required()` fails.
    None,
    Handle(Arc<modkit_db::DbHandle>),
}

pub enum ShutdownOptions {
    /// SIGINT / SIGTERM / Ctrl+C.
    Signals,
    Token(CancellationToken),
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

pub struct RunOptions {
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub db: DbOptions,
    pub shutdown: ShutdownOptions,
    pub registry: ModuleRegistry,
    /// Hub shared with the caller; a fresh one is created when `None`.
    pub client_hub: Option<Arc<ClientHub>>,
}

pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let cancel = match &opts.shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };

    match opts.shutdown {
        ShutdownOptions::Signals => {
            let c = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = shutdown::wait_for_shutdown().await {
                    tracing::warn!(error = %e, "signal listener failed, falling back to ctrl_c");
                    let _ = tokio::signal::ctrl_c().await;
                }
                tracing::info!("shutdown requested");
                c.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown future completed");
                c.cancel();
            });
        }
        ShutdownOptions::Token(_) => {}
    }

    let hub = opts
        .client_hub
        .unwrap_or_else(|| Arc::new(ClientHub::default()));
    let mut builder = ModuleCtxBuilder::new(cancel.clone())
        .with_client_hub(hub)
        .with_config_provider(opts.modules_cfg);
    if let DbOptions::Handle(db) = &opts.db {
        builder = builder.with_db(db.clone());
    }
    let base_ctx = builder.build();
    let registry = opts.registry;

    tracing::info!(modules = ?registry.names(), "phase: init");
    registry.run_init_phase(&base_ctx).await?;

    if let DbOptions::Handle(db) = &opts.db {
        tracing::info!("phase: db");
        registry.run_db_phase(db).await?;
    }

    tracing::info!("phase: rest");
    registry.run_rest_phase(&base_ctx, Router::new())?;

    tracing::info!("phase: start");
    registry.run_start_phase(cancel.clone()).await?;

    cancel.cancelled().await;

    tracing::info!("phase: stop");
    registry.run_stop_phase(cancel).await;
    Ok(())
}
