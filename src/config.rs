use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::triage::registry::Registries;

/// Root configuration structure, deserialized from `.favhunt/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub registries: RegistryConfig,
    pub http: HttpConfig,
}

/// Match lists used by the triage classifier. Entries are case-insensitive substrings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Organizations whose addresses are CDN edges, never the origin.
    pub cdn: Vec<String>,
    /// Generic shared-hosting providers.
    pub hosting: Vec<String>,
    /// Sensitive words looked for in titles and host names.
    pub keywords: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            cdn: to_strings(&[
                "cloudflare",
                "akamai",
                "fastly",
                "amazon",
                "google",
                "microsoft",
                "alicloud",
                "cdnetworks",
                "incapsula",
                "sucuri",
            ]),
            hosting: to_strings(&["godaddy", "go-daddy", "namecheap"]),
            keywords: to_strings(&[
                "admin",
                "login",
                "system",
                "dashboard",
                "dev",
                "staging",
                "test",
                "prod",
                "internal",
                "config",
                "management",
                "vpn",
                "git",
                "gray",
                "back",
                "backend",
                "api",
                "console",
                "管理",
                "后台",
                "系统",
            ]),
        }
    }
}

impl RegistryConfig {
    pub fn to_registries(&self) -> Registries {
        Registries::new(&self.cdn, &self.hosting, &self.keywords)
    }
}

/// Settings for the favicon fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Origin hosts often serve self-signed or mismatched certificates.
    pub accept_invalid_certs: bool,
    /// Path tried when the page declares no icon.
    pub fallback_path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept_invalid_certs: true,
            fallback_path: "/favicon.ico".to_string(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<work_dir>/.favhunt/config.toml`
/// 3. `~/.config/favhunt/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(work_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local = work_dir.join(".favhunt").join("config.toml");
    if local.exists() {
        return read_config(&local);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config: PathBuf = home.join(".config").join("favhunt").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    info!("no config file found, using built-in registries");
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}
