#![allow(dead_code, unreachable_pub, clippy::unwrap_used, clippy::missing_panics_doc, clippy::must_use_candidate)]
use async_trait::async_trait;
use portfolio_contact::AppBuilder;
use portfolio_contact::api::submission_path;
use portfolio_contact::adapters::storage::files::LEDGER_FILE;
use portfolio_contact::config::{
    Config, Deployment, HealthConfig, LogFormat, MailConfig, ServerConfig, StorageConfig, TelemetryConfig,
};
use portfolio_contact::domain::mail::OutgoingMail;
use portfolio_contact::services::relay::{MailRelay, RelayError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::watch;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("portfolio_contact=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// In-memory stand-in for the SMTP relay.
#[derive(Debug, Default)]
pub struct RecordingRelay {
    sent: Mutex<Vec<OutgoingMail>>,
    fail_send: AtomicBool,
    fail_verify: AtomicBool,
    verify_calls: AtomicUsize,
    send_delay: Duration,
}

impl RecordingRelay {
    pub fn failing_send() -> Self {
        let relay = Self::default();
        relay.fail_send.store(true, Ordering::SeqCst);
        relay
    }

    pub fn failing_verify() -> Self {
        let relay = Self::default();
        relay.fail_verify.store(true, Ordering::SeqCst);
        relay
    }

    /// A relay whose `send` stalls for `delay` before succeeding.
    pub fn slow_send(delay: Duration) -> Self {
        Self { send_delay: delay, ..Self::default() }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailRelay for RecordingRelay {
    async fn verify(&self) -> Result<(), RelayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_verify.load(Ordering::SeqCst) { Err(RelayError::Unavailable) } else { Ok(()) }
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), RelayError> {
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(RelayError::Other(anyhow::anyhow!("connection reset by provider")));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

pub fn get_test_config(deployment: Deployment, messages_dir: &Path, static_dir: &Path) -> Config {
    Config {
        deployment,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            mgmt_port: 0,
            static_dir: static_dir.to_path_buf(),
            request_timeout_secs: 10,
            shutdown_timeout_secs: 1,
            cors_permissive: true,
        },
        mail: MailConfig {
            smtp_host: "smtp.invalid".to_string(),
            smtp_user: "owner@example.com".to_string(),
            smtp_password: "app-password".to_string(),
            mail_to: None,
            smtp_timeout_secs: 1,
            verify_on_startup: false,
        },
        storage: StorageConfig { messages_dir: messages_dir.to_path_buf() },
        telemetry: TelemetryConfig { log_format: LogFormat::Text },
        health: HealthConfig { storage_timeout_ms: 500, mail_timeout_ms: 500 },
    }
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub relay: Arc<RecordingRelay>,
    pub config: Config,
    pub shutdown_tx: watch::Sender<bool>,
    _root: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Deployment::Server, RecordingRelay::default(), |_| {}).await
    }

    pub async fn spawn_function() -> Self {
        Self::spawn_with(Deployment::Function, RecordingRelay::default(), |_| {}).await
    }

    pub async fn spawn_with(
        deployment: Deployment,
        relay: RecordingRelay,
        customize: impl FnOnce(&mut Config),
    ) -> Self {
        setup_tracing();

        let root = tempfile::tempdir().unwrap();
        let static_dir = root.path().join("public");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "<!DOCTYPE html><title>Portfolio</title><h1>Hello</h1>").unwrap();
        std::fs::write(static_dir.join("style.css"), "body { color: #2C3E50; }").unwrap();

        let mut config = get_test_config(deployment, &root.path().join("messages"), &static_dir);
        customize(&mut config);

        let relay = Arc::new(relay);
        let app = AppBuilder::new(config.clone())
            .with_relay(Arc::clone(&relay) as Arc<dyn MailRelay>)
            .build()
            .await
            .unwrap();

        let api_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", api_listener.local_addr().unwrap());
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut api_rx = shutdown_rx.clone();
        tokio::spawn(async move {
            axum::serve(api_listener, app.api_router)
                .with_graceful_shutdown(async move {
                    let _ = api_rx.wait_for(|&s| s).await;
                })
                .await
                .unwrap();
        });

        let mut mgmt_rx = shutdown_rx;
        tokio::spawn(async move {
            axum::serve(mgmt_listener, app.mgmt_router)
                .with_graceful_shutdown(async move {
                    let _ = mgmt_rx.wait_for(|&s| s).await;
                })
                .await
                .unwrap();
        });

        let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build().unwrap();

        Self { server_url, mgmt_url, client, relay, config, shutdown_tx, _root: root }
    }

    pub fn send_url(&self) -> String {
        format!("{}{}", self.server_url, submission_path(self.config.deployment))
    }

    /// Posts a JSON body to the submission endpoint and returns the status and parsed body.
    pub async fn submit(&self, body: &Value) -> (reqwest::StatusCode, Value) {
        let resp = self.client.post(self.send_url()).json(body).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    pub fn messages_dir(&self) -> PathBuf {
        self.config.storage.messages_dir.clone()
    }

    pub fn ledger_raw(&self) -> Option<String> {
        std::fs::read_to_string(self.messages_dir().join(LEDGER_FILE)).ok()
    }

    pub fn ledger_rows(&self) -> Vec<csv::StringRecord> {
        let path = self.messages_dir().join(LEDGER_FILE);
        let Ok(mut reader) = csv::ReaderBuilder::new().has_headers(true).from_path(path) else {
            return Vec::new();
        };
        reader.records().map(Result::unwrap).collect()
    }

    pub fn snapshot_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.messages_dir()) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with("message_") && n.ends_with(".txt"))
            })
            .collect();
        files.sort();
        files
    }
}

pub fn contact_body(name: &str, email: &str, phone: &str, message: &str) -> Value {
    serde_json::json!({ "name": name, "email": email, "phone": phone, "message": message })
}
