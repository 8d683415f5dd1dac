//! Persisted settings: device host, credentials, last used port and aliases.
//!
//! The session driver never reads this file; the CLI loads it, hands the
//! driver a [`DeviceEndpoint`] and an [`AliasTable`], and records the last
//! used port after a successful operation.
//!
//! ```yaml
//! hostname: 10.0.0.5
//! user: apc
//! password: apc
//! last_port: 3
//! aliases:
//!   - port: 3
//!     name: printer
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error;

use crate::port::{AliasTable, PortNumber, ResolveError, resolve_port};
use crate::status::OUTLET_COUNT;
use crate::transport::DeviceEndpoint;

/// Default location of the config file.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/apc/config";

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid YAML for this schema
    #[error("Could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file could not be written
    #[error("Unable to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serializing the settings failed
    #[error("Could not serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// A required setting is empty
    #[error("'{name}' is not set in the config file")]
    MissingSetting { name: &'static str },

    /// No alias with this name
    #[error("No alias named '{name}'")]
    UnknownAlias { name: String },

    /// Alias target outside the device's outlets
    #[error("Port {port} is not an outlet on this device")]
    PortOutOfRange { port: PortNumber },

    /// No port given and none used before
    #[error("No port given and no last used port recorded")]
    NoLastPort,

    /// `~` could not be expanded
    #[error("Unable to determine home directory")]
    NoHomeDir,

    /// Port token did not resolve
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// One named outlet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub port: PortNumber,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Settings stored in the YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Where the settings were loaded from and will be saved to.
    #[serde(skip)]
    pub path: PathBuf,

    #[serde(default)]
    pub hostname: String,

    #[serde(default)]
    pub user: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_last_port",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_port: Option<PortNumber>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub aliases: Vec<Alias>,
}

impl ConfigFile {
    /// Load settings from `path` (a leading `~` is expanded).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = expand_user_dir(path.as_ref())?;
        let data = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config: ConfigFile =
            serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!("loaded config from {}", path.display());
        config.path = path;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields empty settings.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::Read { path, source }) if source.kind() == io::ErrorKind::NotFound => {
                debug!("no config at {}, starting empty", path.display());
                Ok(Self {
                    path,
                    ..Self::default()
                })
            }
            other => other,
        }
    }

    /// Write the settings back to [`path`](Self::path), creating parent
    /// directories as needed.
    pub fn save(&mut self) -> Result<(), ConfigError> {
        self.description = Some("modified".to_string());
        let data = serde_yaml::to_string(self)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, data).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("saved config to {}", self.path.display());
        Ok(())
    }

    /// Hostname and user must be set before talking to the device.
    pub fn check_basic_settings(&self) -> Result<(), ConfigError> {
        if self.hostname.is_empty() {
            return Err(ConfigError::MissingSetting { name: "hostname" });
        }
        if self.user.is_empty() {
            return Err(ConfigError::MissingSetting { name: "user" });
        }
        Ok(())
    }

    /// Endpoint for the session driver.
    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint::new(
            self.hostname.clone(),
            self.user.clone(),
            self.password.clone().unwrap_or_default(),
        )
    }

    /// Aliases as a lookup table.
    pub fn alias_table(&self) -> AliasTable {
        self.aliases
            .iter()
            .map(|a| (a.port, a.name.clone()))
            .collect()
    }

    /// Resolve a port token against the aliases and last used port.
    pub fn resolve_port(&self, token: &str) -> Result<PortNumber, ConfigError> {
        let last_used = match (token.is_empty(), self.last_port) {
            (true, None) => return Err(ConfigError::NoLastPort),
            (_, last) => last.unwrap_or_default(),
        };
        Ok(resolve_port(token, last_used, &self.alias_table())?)
    }

    /// Bind `name` to `port`, replacing any alias using either.
    pub fn set_alias(&mut self, port: PortNumber, name: &str) -> Result<(), ConfigError> {
        let in_range = usize::try_from(port).is_ok_and(|p| (1..=OUTLET_COUNT).contains(&p));
        if !in_range {
            return Err(ConfigError::PortOutOfRange { port });
        }
        self.aliases.retain(|a| a.port != port && a.name != name);
        self.aliases.push(Alias {
            port,
            name: name.to_string(),
            description: None,
        });
        self.aliases.sort_by_key(|a| a.port);
        Ok(())
    }

    /// Remove the alias called `name`.
    pub fn rm_alias(&mut self, name: &str) -> Result<(), ConfigError> {
        let before = self.aliases.len();
        self.aliases.retain(|a| a.name != name);
        if self.aliases.len() == before {
            return Err(ConfigError::UnknownAlias {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Point at a different device.
    pub fn set_host(&mut self, hostname: impl Into<String>) {
        self.hostname = hostname.into();
    }

    /// Record the port used by the last successful operation.
    pub fn set_last_port(&mut self, port: PortNumber) {
        self.last_port = Some(port);
    }
}

/// `last_port` as written by hand or by older tools: a number, a quoted
/// number, or an empty string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPort {
    Number(PortNumber),
    Text(String),
}

fn deserialize_last_port<'de, D>(deserializer: D) -> Result<Option<PortNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StoredPort>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StoredPort::Number(port)) => Ok(Some(port)),
        Some(StoredPort::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(StoredPort::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid last_port {text:?}"))),
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_user_dir(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
    Ok(dirs.home_dir().join(rest))
}
