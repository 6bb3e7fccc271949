use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 18797;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Per-request timeout for webhook delivery, in seconds.
pub const DEFAULT_DELIVERY_TIMEOUT_SECS: u64 = 10;

/// Top-level config (sojourner.toml + SOJOURNER_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SojournerConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub recipes: RecipesConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub update: UpdateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipesConfig {
    /// Path to the JSON recipe catalog.
    #[serde(default = "default_recipes_path")]
    pub path: String,
}

impl Default for RecipesConfig {
    fn default() -> Self {
        Self {
            path: default_recipes_path(),
        }
    }
}

/// Outbound delivery settings for fired reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Webhook endpoint fired reminders are POSTed to.
    /// When unset, fired reminders are logged instead.
    pub webhook_url: Option<String>,
    /// Per-request delivery timeout in seconds.
    #[serde(default = "default_delivery_timeout")]
    pub timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: DEFAULT_DELIVERY_TIMEOUT_SECS,
        }
    }
}

/// Update subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Check for a newer release on server start (default: true).
    #[serde(default = "bool_true")]
    pub check_on_start: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            check_on_start: true,
        }
    }
}

fn bool_true() -> bool {
    true
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_delivery_timeout() -> u64 {
    DEFAULT_DELIVERY_TIMEOUT_SECS
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sojourner/sojourner.db", home)
}
fn default_recipes_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sojourner/recipes.json", home)
}

impl SojournerConfig {
    /// Load config from a TOML file with SOJOURNER_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.sojourner/sojourner.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: SojournerConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SOJOURNER_").split("_"))
            .extract()
            .map_err(|e| crate::error::SojournerError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sojourner/sojourner.toml", home)
}

/// Create the parent directory of a file path if it does not exist.
pub fn ensure_parent_dir(path: &str) -> crate::error::Result<()> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = SojournerConfig::default();
        assert_eq!(config.gateway.port, DEFAULT_PORT);
        assert_eq!(config.gateway.bind, DEFAULT_BIND);
        assert!(config.database.path.ends_with(".sojourner/sojourner.db"));
        assert!(config.delivery.webhook_url.is_none());
        assert!(config.update.check_on_start);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config: SojournerConfig = Figment::new()
            .merge(Toml::string(
                "[gateway]\nport = 9000\n\n[delivery]\nwebhook_url = \"http://localhost:9999/fire\"\n",
            ))
            .extract()
            .unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.bind, DEFAULT_BIND);
        assert_eq!(
            config.delivery.webhook_url.as_deref(),
            Some("http://localhost:9999/fire")
        );
        assert_eq!(config.delivery.timeout_secs, DEFAULT_DELIVERY_TIMEOUT_SECS);
    }
}
