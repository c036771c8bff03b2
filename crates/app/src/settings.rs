//! Handles settings for the application.
//!
//! Settings are read from an optional `settings.toml` in the working
//! directory and from `SPLITPAY__*` environment variables, which win
//! (`SPLITPAY__SERVER__PORT=3000`, `SPLITPAY__ENGINE__AUDIT=database`).
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3000
//! database = { sqlite = "splitpay.db" }
//!
//! [engine]
//! reconcile_settlements = true
//! audit = "database"
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// Where audit events go.
#[derive(Debug, Default, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum AuditBackend {
    #[default]
    Log,
    Database,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub reconcile_settlements: bool,
    pub audit: AuditBackend,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reconcile_settlements: true,
            audit: AuditBackend::Log,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub engine: EngineSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("SPLITPAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
        assert!(settings.engine.reconcile_settlements);
        assert_eq!(settings.engine.audit, AuditBackend::Log);
    }

    #[test]
    fn full_file_is_parsed() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 4000
            database = { sqlite = "splitpay.db" }

            [engine]
            reconcile_settlements = false
            audit = "database"
            "#,
        );
        let server = settings.server.unwrap();
        assert_eq!(server.port, 4000);
        assert_eq!(server.bind, None);
        assert_eq!(server.database, Database::Sqlite("splitpay.db".to_string()));
        assert!(!settings.engine.reconcile_settlements);
        assert_eq!(settings.engine.audit, AuditBackend::Database);
    }

    #[test]
    fn memory_database_is_a_plain_string() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        );
        assert_eq!(settings.server.unwrap().database, Database::Memory);
    }
}
