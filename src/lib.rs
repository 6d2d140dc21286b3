#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::smtp::SmtpRelay;
use crate::adapters::storage::{FileSubmissionStore, SubmissionStore};
use crate::api::MgmtState;
use crate::config::{Config, Deployment};
use crate::services::contact_service::ContactService;
use crate::services::health_service::HealthService;
use crate::services::relay::MailRelay;
use std::sync::Arc;
use tokio::sync::watch;

/// Routers ready to be served.
#[derive(Debug)]
pub struct App {
    pub api_router: axum::Router,
    pub mgmt_router: axum::Router,
}

/// Wires the contact pipeline for the configured deployment shape.
///
/// The store and relay default to the file store and SMTP relay; tests swap them out.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    store: Option<Arc<dyn SubmissionStore>>,
    relay: Option<Arc<dyn MailRelay>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, store: None, relay: None }
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SubmissionStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_relay(mut self, relay: Arc<dyn MailRelay>) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Builds the routers.
    ///
    /// # Errors
    /// Returns an error if the messages directory cannot be created or the mail settings
    /// are unusable.
    pub async fn build(self) -> anyhow::Result<App> {
        let relay: Arc<dyn MailRelay> = if let Some(relay) = self.relay {
            relay
        } else {
            Arc::new(SmtpRelay::new(&self.config.mail)?)
        };

        let store: Option<Arc<dyn SubmissionStore>> = match self.config.deployment {
            Deployment::Server => {
                if let Some(store) = self.store {
                    Some(store)
                } else {
                    let store: Arc<dyn SubmissionStore> =
                        Arc::new(FileSubmissionStore::open(&self.config.storage.messages_dir).await?);
                    Some(store)
                }
            }
            Deployment::Function => {
                if self.store.is_some() {
                    tracing::warn!("Ignoring submission store: function deployment does not persist submissions");
                }
                None
            }
        };

        // Function deployments verify on every request instead.
        if self.config.deployment == Deployment::Server && self.config.mail.verify_on_startup {
            spawn_relay_verification(Arc::clone(&relay));
        }

        tracing::info!(deployment = ?self.config.deployment, "Contact pipeline ready");

        let contact_service = ContactService::new(store.clone(), Arc::clone(&relay), self.config.server.relay_budget());
        let health_service = HealthService::new(store, relay, self.config.health.clone());

        Ok(App {
            api_router: api::app_router(&self.config, contact_service),
            mgmt_router: api::mgmt_router(MgmtState { health_service }),
        })
    }
}

/// Checks the relay credentials in the background. The outcome is only logged.
fn spawn_relay_verification(relay: Arc<dyn MailRelay>) {
    tokio::spawn(async move {
        match relay.verify().await {
            Ok(()) => tracing::info!("Email server is ready to send messages"),
            Err(e) => tracing::warn!(error = %e, "Email configuration error"),
        }
    });
}

/// Flips `shutdown_tx` to `true` on Ctrl+C or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
            () = ctrl_c => tracing::info!("Received Ctrl+C, starting graceful shutdown"),
            () = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
        }

        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` so they reach the configured log sink.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();

        tracing::error!(panic.location = %location, panic.payload = %payload, "Panic occurred");
    }));
}
