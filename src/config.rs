// Run configuration loaded from environment variables.
//
// Every variable is optional; the defaults reproduce the candidate identity
// and hiring endpoints the tool was written for.
//
// - `HRX_NAME`, `HRX_REG_NO`, `HRX_EMAIL` - identity sent at registration
// - `HRX_REGISTER_URL` - registration endpoint
// - `HRX_FALLBACK_WEBHOOK_URL` - used when registration returns no webhook
// - `HRX_OUTPUT_PATH` - local copy of the query (default: `final-query.txt`)
// - `HRX_SAVE_QUERY` - `false`/`0` disables the local copy (default: `true`)
// - `HRX_HTTP_TIMEOUT_SECS` - per-request timeout (default: 30)
// - `RUST_LOG` - log filter (default: `info`)
// - `LOG_FORMAT` - `text` or `json` (default: `text`), read by `main` before
//   the config is loaded

use crate::api::RegistrationRequest;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::ValidateEmail;

pub const DEFAULT_NAME: &str = "John Doe";
pub const DEFAULT_REG_NO: &str = "REG12347";
pub const DEFAULT_EMAIL: &str = "john@example.com";
pub const DEFAULT_REGISTER_URL: &str =
    "https://bfhldevapigw.healthrx.co.in/hiring/generateWebhook/JAVA";
pub const DEFAULT_FALLBACK_WEBHOOK_URL: &str =
    "https://bfhldevapigw.healthrx.co.in/hiring/testWebhook/JAVA";
pub const DEFAULT_OUTPUT_PATH: &str = "final-query.txt";

#[derive(Debug, Clone)]
pub struct Config {
    pub identity: RegistrationRequest,
    pub register_url: String,
    pub fallback_webhook_url: String,
    /// `None` when saving the local copy is disabled.
    pub output_path: Option<PathBuf>,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            identity: RegistrationRequest {
                name: DEFAULT_NAME.to_string(),
                reg_no: DEFAULT_REG_NO.to_string(),
                email: DEFAULT_EMAIL.to_string(),
            },
            register_url: DEFAULT_REGISTER_URL.to_string(),
            fallback_webhook_url: DEFAULT_FALLBACK_WEBHOOK_URL.to_string(),
            output_path: Some(PathBuf::from(DEFAULT_OUTPUT_PATH)),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Read the configuration from the environment, falling back to the
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `HRX_HTTP_TIMEOUT_SECS` is not a number.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let identity = RegistrationRequest {
            name: var_or("HRX_NAME", defaults.identity.name),
            reg_no: var_or("HRX_REG_NO", defaults.identity.reg_no),
            email: var_or("HRX_EMAIL", defaults.identity.email),
        };

        let save_query = env::var("HRX_SAVE_QUERY")
            .map(|v| !(v.eq_ignore_ascii_case("false") || v == "0"))
            .unwrap_or(true);
        let output_path = save_query.then(|| {
            env::var("HRX_OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_PATH))
        });

        let http_timeout = match env::var("HRX_HTTP_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(
                v.trim()
                    .parse()
                    .with_context(|| format!("HRX_HTTP_TIMEOUT_SECS must be a number, got '{v}'"))?,
            ),
            Err(_) => defaults.http_timeout,
        };

        Ok(Config {
            identity,
            register_url: var_or("HRX_REGISTER_URL", defaults.register_url),
            fallback_webhook_url: var_or("HRX_FALLBACK_WEBHOOK_URL", defaults.fallback_webhook_url),
            output_path,
            http_timeout,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - an identity field is blank, or the email is not an email address
    /// - an endpoint does not parse as an `http(s)` URL with a host
    /// - the timeout is zero
    pub fn validate(&self) -> Result<()> {
        let id = &self.identity;
        for (field, value) in [
            ("HRX_NAME", &id.name),
            ("HRX_REG_NO", &id.reg_no),
            ("HRX_EMAIL", &id.email),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{field} must not be blank");
            }
        }
        if !id.email.validate_email() {
            anyhow::bail!("HRX_EMAIL must be an email address, got '{}'", id.email);
        }

        for (field, raw) in [
            ("HRX_REGISTER_URL", &self.register_url),
            ("HRX_FALLBACK_WEBHOOK_URL", &self.fallback_webhook_url),
        ] {
            let url = Url::parse(raw)
                .with_context(|| format!("{field} is not a valid URL: '{raw}'"))?;
            match url.scheme() {
                "http" | "https" => {}
                other => anyhow::bail!("{field} must use http or https, got '{other}'"),
            }
            if url.host_str().map_or(true, str::is_empty) {
                anyhow::bail!("{field} must name a host, got '{raw}'");
            }
        }

        if self.http_timeout.is_zero() {
            anyhow::bail!("HRX_HTTP_TIMEOUT_SECS must be greater than 0");
        }

        Ok(())
    }

    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  Candidate: {} <{}> ({})",
            self.identity.name,
            self.identity.email,
            self.identity.reg_no
        );
        tracing::info!("  Register URL: {}", self.register_url);
        tracing::info!("  Fallback webhook: {}", self.fallback_webhook_url);
        match &self.output_path {
            Some(path) => tracing::info!("  Local copy: {}", path.display()),
            None => tracing::info!("  Local copy: disabled"),
        }
        tracing::info!("  HTTP timeout: {}s", self.http_timeout.as_secs());
    }
}

/// Log output selected by `LOG_FORMAT`. Read apart from `Config` because
/// logging is set up before the config is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// `json` in any case selects JSON; anything else, or unset, is text.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(env::var("LOG_FORMAT").ok().as_deref())
    }
}

/// Loads and validates configuration from environment variables.
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

fn var_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}
