use clap::{ArgAction, Args, Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Which backend shape serves the contact form.
///
/// The two shapes are alternatives for the same front-end form and must never share a
/// messages directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Deployment {
    /// Long-running server: stores every submission on disk, then relays it by email.
    #[default]
    Server,
    /// On-demand handler: no storage, verifies credentials and relays on every call.
    Function,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Backend shape to run
    #[arg(long, env = "PORTFOLIO_DEPLOYMENT", value_enum, default_value_t = Deployment::Server)]
    pub deployment: Deployment,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub mail: MailConfig,

    #[command(flatten)]
    pub storage: StorageConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    #[command(flatten)]
    pub health: HealthConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "PORTFOLIO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORTFOLIO_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management server (liveness/readiness probes)
    #[arg(long, env = "PORTFOLIO_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// Directory holding the static site (index.html, styles, scripts)
    #[arg(long, env = "PORTFOLIO_STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Upper bound on the time spent handling a single request
    #[arg(long, env = "PORTFOLIO_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// How long to wait for in-flight requests once shutdown starts
    #[arg(long, env = "PORTFOLIO_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Allow cross-origin requests from any origin
    #[arg(long, env = "PORTFOLIO_CORS_PERMISSIVE", default_value_t = true, action = ArgAction::Set)]
    pub cors_permissive: bool,
}

#[derive(Clone, Debug, Args)]
pub struct MailConfig {
    /// SMTP relay host (implicit TLS on port 465)
    #[arg(long, env = "PORTFOLIO_SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// Mail account used to authenticate and as the sender address
    #[arg(long, env = "PORTFOLIO_SMTP_USER")]
    pub smtp_user: String,

    /// Application-specific password for the mail account (not the account password)
    #[arg(long, env = "PORTFOLIO_SMTP_APP_PASSWORD", hide_env_values = true)]
    pub smtp_password: String,

    /// Mailbox that receives submissions (defaults to the SMTP user)
    #[arg(long, env = "PORTFOLIO_MAIL_TO")]
    pub mail_to: Option<String>,

    /// Socket timeout for every SMTP operation
    #[arg(long, env = "PORTFOLIO_SMTP_TIMEOUT_SECS", default_value_t = 10)]
    pub smtp_timeout_secs: u64,

    /// Check the SMTP credentials once at startup and log the result
    #[arg(long, env = "PORTFOLIO_SMTP_VERIFY_ON_STARTUP", default_value_t = true, action = ArgAction::Set)]
    pub verify_on_startup: bool,
}

impl ServerConfig {
    /// Time allowed for relaying one submission. Always shorter than the request timeout.
    #[must_use]
    pub const fn relay_budget(&self) -> Duration {
        Duration::from_millis(self.request_timeout_secs.saturating_mul(750))
    }
}

impl MailConfig {
    #[must_use]
    pub fn recipient(&self) -> &str {
        self.mail_to.as_deref().unwrap_or(&self.smtp_user)
    }
}

#[derive(Clone, Debug, Args)]
pub struct StorageConfig {
    /// Directory for the CSV ledger and per-submission snapshots
    #[arg(long, env = "PORTFOLIO_MESSAGES_DIR", default_value = "messages")]
    pub messages_dir: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "PORTFOLIO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the storage readiness check
    #[arg(long, env = "PORTFOLIO_HEALTH_STORAGE_TIMEOUT_MS", default_value_t = 2000)]
    pub storage_timeout_ms: u64,

    /// Timeout for the mail relay readiness check
    #[arg(long, env = "PORTFOLIO_HEALTH_MAIL_TIMEOUT_MS", default_value_t = 5000)]
    pub mail_timeout_ms: u64,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
