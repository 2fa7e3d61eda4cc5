//! Application configuration.
//!
//! Server settings come from environment variables (a `.env` file is honoured),
//! while the set of paginated models is read from a TOML registry file through the
//! `config` crate. Any model setting can be overridden from the environment as
//! `PAGINATE__MODELS__<NAME>__<SETTING>`, e.g. `PAGINATE__MODELS__ITEM__LIMIT=25`.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Logging level (default: "info,paginate=debug,tower_http=debug")
//! - `HOST`: Server bind address (default: "0.0.0.0")
//! - `PORT`: Server port (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string; in-memory stores are used when unset
//! - `DATABASE_MAX_CONNECTIONS`: DB pool size (default: 10)
//! - `MODELS_FILE`: Path of the model registry (default: "models.toml")
//!
//! # Model Registry
//!
//! ```toml
//! [models.item]
//! properties = ["name", "description", "status"]
//! limit = 10
//! max_limit = 100
//! ```

use crate::domain::{model::entity::ModelDefinition, pagination::resolver::ResolverConfig};
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use validator::Validate;

/// Server configuration loaded from environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// PostgreSQL connection string; `None` keeps records in memory
    pub database_url: Option<String>,

    /// Maximum number of concurrent database connections
    pub database_max_connections: u32,

    /// Path of the TOML model registry
    pub models_file: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env_or("HOST", "0.0.0.0".to_string())?,
            port: env_or("PORT", 3000)?,
            database_url: std::env::var("DATABASE_URL").ok(),
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            models_file: env_or("MODELS_FILE", "models.toml".to_string())?,
        })
    }
}

/// Pagination settings of one model, as written in the registry file.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ModelSettings {
    /// Taken from the registry key
    #[serde(skip)]
    #[validate(length(min = 1))]
    pub name: String,

    /// Backing table for the Postgres store (defaults to `name`)
    pub table: Option<String>,

    /// Schema fields searched by the `*` search term
    #[serde(default)]
    pub properties: Vec<String>,

    /// Default page size
    #[validate(range(min = 1))]
    pub limit: Option<i64>,

    /// Page size ceiling
    #[validate(range(min = 1))]
    pub max_limit: Option<i64>,

    /// JSON file seeding the in-memory store
    pub fixtures: Option<String>,
}

impl ModelSettings {
    pub fn table(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }

    pub fn definition(&self) -> ModelDefinition {
        ModelDefinition::new(self.name.clone(), self.properties.iter().cloned())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            limit: self.limit,
            max_limit: self.max_limit,
        }
    }
}

/// Paginated models keyed by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrySettings {
    #[serde(default)]
    pub models: BTreeMap<String, ModelSettings>,
}

impl RegistrySettings {
    /// Loads the registry from `path` (optional) layered under `PAGINATE__*`
    /// environment overrides, then validates every model entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or a model fails validation.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        Self::load_with(path, registry_environment())
    }

    fn load_with(path: &str, environment: config::Environment) -> anyhow::Result<Self> {
        let settings: RegistrySettings = config::Config::builder()
            .add_source(config::File::from(Path::new(path)).required(false))
            .add_source(environment)
            .build()
            .with_context(|| format!("Failed to read model registry {}", path))?
            .try_deserialize()
            .with_context(|| format!("Malformed model registry {}", path))?;

        settings.named()
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let settings: RegistrySettings = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.named()
    }

    /// Copies each registry key into its model's `name` and validates the entry.
    fn named(mut self) -> anyhow::Result<Self> {
        for (key, model) in &mut self.models {
            model.name = key.clone();
            model
                .validate()
                .with_context(|| format!("Invalid settings for model `{}`", key))?;
        }
        Ok(self)
    }
}

fn registry_environment() -> config::Environment {
    config::Environment::with_prefix("PAGINATE")
        .separator("__")
        .try_parsing(true)
}

/// Load an environment variable with a default value.
///
/// # Errors
///
/// Returns an error if the variable is set but cannot be parsed.
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
