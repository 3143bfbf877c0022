//! Конфигурация страницы Generate PDF
//!
//! По умолчанию используется встроенный TOML. Его можно переопределить
//! TOML-строкой в localStorage под ключом [`CONFIG_STORAGE_KEY`].

use contracts::shared::retry::RetryPolicy;
use serde::Deserialize;
use std::time::Duration;

pub const CONFIG_STORAGE_KEY: &str = "generate_pdf_config";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PageConfig {
    pub api: ApiConfig,
    pub retry: RetryConfig,
    pub fields: FieldsConfig,
    pub approval: ApprovalConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    /// Адрес бэкенда (`https://host:port`); пустой: origin страницы
    #[serde(default)]
    pub origin: String,
    /// Префикс путей API, добавляется к адресу бэкенда
    pub base_path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_secs: u64,
    pub transient_signature: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FieldsConfig {
    pub max_selected: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApprovalConfig {
    pub route: String,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[api]
origin = ""
base_path = "/api"

[retry]
max_retries = 3
base_delay_secs = 2
transient_signature = "connection slots are reserved"

[fields]
max_selected = 15

[approval]
route = "/sedforapproval"
"#;

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                origin: String::new(),
                base_path: "/api".to_string(),
            },
            retry: RetryConfig {
                max_retries: 3,
                base_delay_secs: 2,
                transient_signature: "connection slots are reserved".to_string(),
            },
            fields: FieldsConfig { max_selected: 15 },
            approval: ApprovalConfig {
                route: "/sedforapproval".to_string(),
            },
        }
    }
}

impl PageConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_secs(self.retry.base_delay_secs),
            transient_signature: self.retry.transient_signature.clone(),
        }
    }
}

pub fn parse_config(contents: &str) -> anyhow::Result<PageConfig> {
    Ok(toml::from_str(contents)?)
}

/// Load page configuration
///
/// Search order:
/// 1. TOML override in localStorage
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<PageConfig> {
    let stored = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(CONFIG_STORAGE_KEY).ok().flatten());

    if let Some(contents) = stored {
        match parse_config(&contents) {
            Ok(config) => {
                log::info!("Loading page config from localStorage: {}", CONFIG_STORAGE_KEY);
                return Ok(config);
            }
            Err(e) => {
                log::warn!("Ignoring invalid page config override: {}", e);
            }
        }
    }

    log::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}
