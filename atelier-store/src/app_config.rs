use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub costing: CostingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string. Records are kept in memory when absent.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 { 5 }

/// Defaults for the costing endpoint when a request supplies no override
#[derive(Debug, Deserialize, Clone)]
pub struct CostingConfig {
    #[serde(default = "default_labor_percentage")]
    pub labor_percentage: f64,
    #[serde(default = "default_overhead_percentage")]
    pub overhead_percentage: f64,
    #[serde(default = "default_markup_multiplier")]
    pub markup_multiplier: f64,
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self {
            labor_percentage: default_labor_percentage(),
            overhead_percentage: default_overhead_percentage(),
            markup_multiplier: default_markup_multiplier(),
        }
    }
}

fn default_labor_percentage() -> f64 { 30.0 }
fn default_overhead_percentage() -> f64 { 15.0 }
fn default_markup_multiplier() -> f64 { 2.5 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `ATELIER__SERVER__PORT=8080` sets `server.port`
            .add_source(config::Environment::with_prefix("ATELIER").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(contents: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml("[server]\nport = 8080\n").unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.costing.labor_percentage, 30.0);
        assert_eq!(config.costing.overhead_percentage, 15.0);
        assert_eq!(config.costing.markup_multiplier, 2.5);
    }

    #[test]
    fn test_costing_section_overrides() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 3000

            [database]
            url = "postgres://localhost/atelier"

            [costing]
            labor_percentage = 25.0
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/atelier"));
        assert_eq!(config.costing.labor_percentage, 25.0);
        assert_eq!(config.costing.overhead_percentage, 15.0);
    }

    #[test]
    fn test_missing_server_section_is_an_error() {
        assert!(Config::from_toml("[costing]\nlabor_percentage = 10.0\n").is_err());
    }
}
