use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "MEDBOOK_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "medbook.toml";

static VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("invalid variable regex")
});

/// Configuration for the gateway and the three services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedbookConfig {
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/medbook".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: SocketAddr,
    /// Allow any origin. Development only.
    pub cors_permissive: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub booking: ServiceConfig,
    pub healthcare: ServiceConfig,
    pub user: ServiceConfig,
}

/// Per-service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Deadline applied to every repository call of the service
    pub context_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            context_timeout_secs: 7,
        }
    }
}

impl ServiceConfig {
    pub fn context_timeout(&self) -> Duration {
        Duration::from_secs(self.context_timeout_secs)
    }
}

impl MedbookConfig {
    /// Resolve the config file and apply environment overrides.
    ///
    /// Lookup order: `explicit`, then `$MEDBOOK_CONFIG`, then `./medbook.toml`.
    /// An explicitly named file must exist; otherwise a missing file means
    /// defaults. `DATABASE_URL` always wins over the file.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::load_from(&path)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load_from(&fallback)?
                } else {
                    tracing::debug!("no config file found, using defaults");
                    Self::default()
                }
            }
        };

        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.is_empty() {
                config.database.url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file, expanding `${VAR}` references from the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let expanded = expand_env(&content);
        let config: Self = toml::from_str(&expanded).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::invalid("database.url cannot be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid("database.max_connections must be at least 1"));
        }

        let services = [
            ("booking", &self.services.booking),
            ("healthcare", &self.services.healthcare),
            ("user", &self.services.user),
        ];
        for (name, service) in services {
            if service.context_timeout_secs == 0 {
                return Err(ConfigError::invalid(format!(
                    "services.{}.context_timeout_secs must be at least 1",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Render as TOML, for `medbook config`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::invalid(e.to_string()))
    }
}

/// Expand `${VAR}` references; unset variables expand to an empty string.
fn expand_env(s: &str) -> String {
    VAR_RE
        .replace_all(s, |caps: &Captures<'_>| {
            let name = &caps[1];
            env::var(name).unwrap_or_else(|_| {
                tracing::warn!(variable = name, "config references unset variable");
                String::new()
            })
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let config = MedbookConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gateway.bind.port(), 8080);
        assert_eq!(
            config.services.booking.context_timeout(),
            Duration::from_secs(7)
        );
    }

    #[test]
    fn loads_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[database]
url = "postgres://clinic@db/medbook"

[services.user]
context_timeout_secs = 3
"#
        )
        .unwrap();

        let config = MedbookConfig::load_from(file.path()).unwrap();
        assert_eq!(config.database.url, "postgres://clinic@db/medbook");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.services.user.context_timeout_secs, 3);
        assert_eq!(config.services.booking.context_timeout_secs, 7);
    }

    #[test]
    fn expands_environment_variables() {
        env::set_var("MEDBOOK_TEST_DB_HOST", "pg.internal");
        let expanded = expand_env("postgres://${MEDBOOK_TEST_DB_HOST}/medbook ${MEDBOOK_TEST_UNSET_VAR}");
        assert_eq!(expanded, "postgres://pg.internal/medbook ");
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = MedbookConfig::default();
        config.services.healthcare.context_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("services.healthcare"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[database\nurl = ").unwrap();
        assert!(matches!(
            MedbookConfig::load_from(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = MedbookConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed: MedbookConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
