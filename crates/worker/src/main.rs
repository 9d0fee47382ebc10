//! Headless auto-publish runner.
//!
//! Publishes the whole configured workspace through the mass-action
//! protocol and exits. Configuration comes from the environment (see
//! `ModuleConfig::from_env`) plus:
//!
//! | Env Var                         | Default |
//! |---------------------------------|---------|
//! | `AUTO_PUBLISH_LANGUAGE`         | `all`   |
//! | `AUTO_PUBLISH_ACCEPT_WARNINGS`  | `false` |

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workspaces_core::mass_action::ACTION_PUBLISH;
use workspaces_core::settings::ALL_LANGUAGES;
use workspaces_events::EventBus;
use workspaces_module::preferences::{self, storage_key};
use workspaces_module::{
    MassActionOutcome, MemoryStore, ModuleConfig, ModuleDataStore, ModuleError, Unattended,
    WorkspaceModule,
};
use workspaces_remote::HttpGateway;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workspaces_worker=info,workspaces_module=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(MassActionOutcome::Completed {
            rounds,
            total,
            processed,
        }) => {
            tracing::info!(rounds, total, processed, "Auto-publish finished");
            ExitCode::SUCCESS
        }
        Ok(MassActionOutcome::Aborted { progress }) => {
            tracing::warn!(?progress, "Auto-publish interrupted");
            ExitCode::FAILURE
        }
        Ok(outcome) => {
            tracing::warn!(?outcome, "Auto-publish did not run");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Auto-publish failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<MassActionOutcome, ModuleError> {
    // --- Configuration ---
    let config = ModuleConfig::from_env()?;
    let language =
        std::env::var("AUTO_PUBLISH_LANGUAGE").unwrap_or_else(|_| ALL_LANGUAGES.to_string());
    let accept_warnings = std::env::var("AUTO_PUBLISH_ACCEPT_WARNINGS")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);
    tracing::info!(
        workspace_id = config.workspace_id,
        url = %config.dispatch_url,
        %language,
        accept_warnings,
        "Loaded worker configuration",
    );

    // --- Gateway ---
    let gateway = HttpGateway::new(
        config.dispatch_url.clone(),
        config.token.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    // --- Event bus ---
    let events = Arc::new(EventBus::default());
    let mut notifications = events.subscribe();
    let log_handle = tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            tracing::info!(
                workspace_id = notification.workspace_id,
                event_type = notification.event.event_type(),
                "Module event",
            );
        }
    });

    // The language filter is picked up from preferences on start.
    let store = Arc::new(MemoryStore::new());
    store
        .set(&storage_key(preferences::LANGUAGE), language)
        .await;

    let module = WorkspaceModule::new(
        config,
        Arc::new(gateway),
        Arc::new(Unattended {
            proceed_on_integrity_warning: accept_warnings,
        }),
        Arc::clone(&events),
        store,
    );
    module.start().await?;

    // --- Shutdown ---
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    let outcome = module.run_mass_action(ACTION_PUBLISH, &cancel).await;

    drop(module);
    drop(events);
    let _ = log_handle.await;

    outcome
}

/// Wait for a termination signal; the running mass action stops after its
/// current round.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), stopping after the current round");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, stopping after the current round");
        }
    }
}
