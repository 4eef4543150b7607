//! Configuration management for lead-desk
//!
//! Config file location:
//! - Linux: ~/.config/lead-desk/config.toml
//! - macOS: ~/Library/Application Support/in.allinonepay.lead-desk/config.toml
//! - Windows: %APPDATA%/allinonepay/lead-desk/config/config.toml
//!
//! You can override the config location by setting `LEAD_DESK_CONFIG_PATH`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Lead backend configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Deep link fallback settings
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Direct contact details shown to visitors
    #[serde(default)]
    pub business: BusinessConfig,

    /// Local web API settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

            let config: Config = toml::from_str(&content).with_context(|| {
                format!("Failed to parse config from {}", config_path.display())
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, toml)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("LEAD_DESK_CONFIG_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let proj_dirs = ProjectDirs::from("in", "allinonepay", "lead-desk")
            .context("Could not determine project directories")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Create default config file if it doesn't exist
    pub fn init() -> Result<Self> {
        let config = Self::load()?;

        let config_path = Self::config_path()?;
        if !config_path.exists() {
            config.save()?;
        }

        Ok(config)
    }
}

/// Lead backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL; `/api/contact` and `/api/kundli` are appended
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Request timeout in seconds. Unset leaves the transport default in place.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Whether to verify SSL certificates
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_seconds: None,
            verify_ssl: default_true(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_true() -> bool {
    true
}

/// WhatsApp fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Number the Kundli request message is addressed to (non-digits are stripped)
    #[serde(default = "default_whatsapp_number")]
    pub whatsapp_number: String,

    /// Closing "Source" line of the generated message
    #[serde(default = "default_source_label")]
    pub source_label: String,

    /// Open the deep link with the system handler after a Kundli submission from the CLI
    #[serde(default = "default_true")]
    pub open_links: bool,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: default_whatsapp_number(),
            source_label: default_source_label(),
            open_links: true,
        }
    }
}

fn default_whatsapp_number() -> String {
    "919660306030".to_string()
}

fn default_source_label() -> String {
    "All In One Horoscope & Kundli Service".to_string()
}

/// Direct contact details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    #[serde(default = "default_business_name")]
    pub name: String,

    #[serde(default = "default_business_phone")]
    pub phone: String,

    #[serde(default = "default_business_email")]
    pub email: String,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: default_business_name(),
            phone: default_business_phone(),
            email: default_business_email(),
        }
    }
}

fn default_business_name() -> String {
    "Shree Mayank Computers".to_string()
}

fn default_business_phone() -> String {
    "+919660306030".to_string()
}

fn default_business_email() -> String {
    "info@allinonepay.in".to_string()
}

/// Local web API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the local API from a browser. Empty allows none; `*` allows any.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Open WhatsApp links on this machine for Kundli requests posted to the local API.
    /// Off by default: the caller gets `whatsapp_url` back and opens it itself.
    #[serde(default)]
    pub open_links: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allowed_origins: Vec::new(),
            open_links: false,
        }
    }
}

fn default_port() -> u16 {
    3000
}

/// Get configuration file path for display purposes
pub fn get_config_path() -> Result<String> {
    let path = Config::config_path()?;
    Ok(path.display().to_string())
}

/// Initialize configuration (load or create default)
pub fn init_config() -> Result<Config> {
    Config::init()
}
