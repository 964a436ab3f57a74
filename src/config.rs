//! Process configuration read from the environment (and `.env` when present).

use std::env;
use std::time::Duration;

use actix_web::cookie::Key;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_CHROMIUM_PATH: &str = "chromium";
pub const DEFAULT_PDF_LAUNCH_ARGS: &str = "--no-sandbox --disable-setuid-sandbox";
pub const DEFAULT_PDF_TIMEOUT_SECS: u64 = 30;

/// Headless browser settings for the PDF export.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfConfig {
    pub chromium_path: String,
    pub launch_args: Vec<String>,
    pub timeout: Duration,
}

impl Default for PdfConfig {
    fn default() -> Self {
        PdfConfig {
            chromium_path: DEFAULT_CHROMIUM_PATH.to_string(),
            launch_args: split_args(DEFAULT_PDF_LAUNCH_ARGS),
            timeout: Duration::from_secs(DEFAULT_PDF_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Postgres URL. Without one the server keeps everything in memory.
    pub database_url: Option<String>,
    /// Raw SESSION_KEY value, if any.
    pub session_key: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// When set, every /api request must carry it in an `apikey` header.
    pub api_key: Option<String>,
    pub seed_demo: bool,
    pub pdf: PdfConfig,
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

fn truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl AppConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {e}");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = match get("PDF_TIMEOUT_SECS").map(|v| v.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => secs,
            Some(_) => {
                log::warn!("Ignoring invalid PDF_TIMEOUT_SECS, using {DEFAULT_PDF_TIMEOUT_SECS}");
                DEFAULT_PDF_TIMEOUT_SECS
            }
            None => DEFAULT_PDF_TIMEOUT_SECS,
        };

        AppConfig {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: get("DATABASE_URL"),
            session_key: get("SESSION_KEY"),
            admin_email: get("ADMIN_EMAIL"),
            admin_password: get("ADMIN_PASSWORD"),
            api_key: get("API_KEY"),
            seed_demo: get("SEED_DEMO").is_some_and(|v| truthy(&v)),
            pdf: PdfConfig {
                chromium_path: get("CHROMIUM_PATH")
                    .unwrap_or_else(|| DEFAULT_CHROMIUM_PATH.to_string()),
                launch_args: split_args(
                    &get("PDF_LAUNCH_ARGS").unwrap_or_else(|| DEFAULT_PDF_LAUNCH_ARGS.to_string()),
                ),
                timeout: Duration::from_secs(timeout_secs),
            },
        }
    }

    /// Cookie signing key. Keys shorter than 64 bytes are replaced by a random
    /// one, which logs everybody out on restart.
    pub fn session_key(&self) -> Key {
        match &self.session_key {
            Some(val) if val.len() >= 64 => {
                log::info!("Using SESSION_KEY from environment");
                Key::from(val.as_bytes())
            }
            Some(val) => {
                log::warn!(
                    "SESSION_KEY too short ({} bytes, need 64+), generating random key",
                    val.len()
                );
                Key::generate()
            }
            None => {
                log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
                Key::generate()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert!(cfg.database_url.is_none());
        assert!(cfg.api_key.is_none());
        assert!(!cfg.seed_demo);
        assert_eq!(cfg.pdf, PdfConfig::default());
        assert_eq!(cfg.pdf.launch_args, vec!["--no-sandbox", "--disable-setuid-sandbox"]);
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("API_KEY", "kunci"),
            ("SEED_DEMO", "true"),
            ("CHROMIUM_PATH", "/usr/bin/chromium-browser"),
            ("PDF_LAUNCH_ARGS", "--no-sandbox"),
            ("PDF_TIMEOUT_SECS", "5"),
        ]);
        assert_eq!(cfg.bind_addr, "0.0.0.0:9000");
        assert_eq!(cfg.api_key.as_deref(), Some("kunci"));
        assert!(cfg.seed_demo);
        assert_eq!(cfg.pdf.chromium_path, "/usr/bin/chromium-browser");
        assert_eq!(cfg.pdf.launch_args, vec!["--no-sandbox"]);
        assert_eq!(cfg.pdf.timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_and_invalid_values_fall_back() {
        let cfg = config(&[("API_KEY", "  "), ("PDF_TIMEOUT_SECS", "nol")]);
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.pdf.timeout, Duration::from_secs(DEFAULT_PDF_TIMEOUT_SECS));
    }
}
