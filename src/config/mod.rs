/// Configuration management for readpref

use crate::core::{Connection, NodeRole};
pub use crate::error::ConfigError;
use crate::error::SelectionError;
use crate::read_preference::{ReadMode, ReadPreference, TagSet};
use crate::selection::DEFAULT_CUTOFF_MS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Upper bound accepted for the latency window
pub const MAX_CUTOFF_MS: u64 = 10_000;

/// Main readpref configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Selection tuning
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Default read preference
    #[serde(default)]
    pub read_preference: ReadPreferenceConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Statically known servers
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

/// Selection tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Width of the acceptable-latency window in milliseconds
    pub cutoff_ms: u64,
    /// Seed for the random pick; unset means seeded from entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Read preference as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadPreferenceConfig {
    /// primary, primaryPreferred, secondary, secondaryPreferred or nearest
    pub mode: String,
    /// Tag sets tried in order, each a list of `name:value` tags
    #[serde(default)]
    pub tag_sets: Vec<Vec<String>>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, text)
    pub format: String,
}

/// A statically configured server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Identifier, usually host:port
    pub id: String,
    pub role: NodeRole,
    /// Round-trip time in milliseconds
    pub latency_ms: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            cutoff_ms: DEFAULT_CUTOFF_MS,
            seed: None,
        }
    }
}

impl Default for ReadPreferenceConfig {
    fn default() -> Self {
        Self {
            mode: "primary".to_string(),
            tag_sets: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl ReadPreferenceConfig {
    /// Build the read preference value this section describes
    pub fn to_read_preference(&self) -> Result<ReadPreference, SelectionError> {
        let mode: ReadMode = self.mode.parse()?;
        let mut rp = ReadPreference::new(mode);
        for tags in &self.tag_sets {
            let mut tag_set = TagSet::new();
            for tag in tags {
                match tag.split_once(':') {
                    Some((name, value)) if is_valid_tag(tag) => tag_set.add_tag(name, value),
                    _ => return Err(SelectionError::invalid_tag(tag.as_str())),
                }
            }
            rp.add_tag_set(tag_set);
        }
        Ok(rp)
    }
}

impl ServerConfig {
    pub fn to_connection(&self) -> Connection {
        Connection {
            id: self.id.clone(),
            role: self.role,
            latency_ms: self.latency_ms,
            tags: self.tags.clone(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// The configured default read preference
    pub fn read_preference(&self) -> Result<ReadPreference, SelectionError> {
        self.read_preference.to_read_preference()
    }

    /// Connection records for the statically configured servers, in file order
    pub fn build_connections(&self) -> Vec<Connection> {
        self.servers.iter().map(ServerConfig::to_connection).collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selection.cutoff_ms > MAX_CUTOFF_MS {
            return Err(ConfigError::ValidationError(format!(
                "cutoff_ms must be at most {}",
                MAX_CUTOFF_MS
            )));
        }

        self.read_preference()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        let mut seen = HashSet::new();
        for server in &self.servers {
            if server.id.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "server id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(server.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate server id: {}",
                    server.id
                )));
            }
            for tag in &server.tags {
                if !is_valid_tag(tag) {
                    return Err(ConfigError::ValidationError(format!(
                        "Invalid tag '{}' on server {}: must be name:value",
                        tag, server.id
                    )));
                }
            }
        }

        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(ConfigError::ValidationError(
                format!("Invalid log level: {}", self.logging.level)
            )),
        }

        match self.logging.format.as_str() {
            "json" | "text" => {}
            _ => return Err(ConfigError::ValidationError(
                format!("Invalid log format: {}", self.logging.format)
            )),
        }

        Ok(())
    }

    /// Example configuration for a three member replica set
    pub fn example() -> Self {
        let server = |id: &str, role, latency_ms, tags: &[&str]| ServerConfig {
            id: id.to_string(),
            role,
            latency_ms,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        };

        Config {
            read_preference: ReadPreferenceConfig {
                mode: "secondaryPreferred".to_string(),
                tag_sets: vec![
                    vec!["dc:east".to_string(), "rack:2".to_string()],
                    vec!["dc:east".to_string()],
                    Vec::new(),
                ],
            },
            servers: vec![
                server("10.0.1.10:27017", NodeRole::Primary, 10, &["dc:east", "rack:1"]),
                server("10.0.1.11:27017", NodeRole::Secondary, 5, &["dc:east", "rack:2"]),
                server("10.0.2.10:27017", NodeRole::Secondary, 40, &["dc:west", "rack:1"]),
            ],
            ..Default::default()
        }
    }

    /// Create example configuration file
    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        Self::example().save_to_file(path)
    }
}

fn is_valid_tag(tag: &str) -> bool {
    matches!(tag.split_once(':'), Some((name, _)) if !name.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.selection.cutoff_ms, 15);
        assert_eq!(config.read_preference().unwrap().mode, ReadMode::Primary);
    }

    #[test]
    fn test_example_config() {
        let config = Config::example();
        assert!(config.validate().is_ok());

        let rp = config.read_preference().unwrap();
        assert_eq!(rp.mode, ReadMode::SecondaryPreferred);
        assert_eq!(rp.tag_sets().len(), 3);
        assert_eq!(rp.tag_sets()[0].squash(), "dc:east, rack:2");
        assert!(rp.tag_sets()[2].is_empty());

        let connections = config.build_connections();
        assert_eq!(connections.len(), 3);
        assert_eq!(connections[1].role, NodeRole::Secondary);
        assert!(connections[1].has_tag("rack:2"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.selection.cutoff_ms = MAX_CUTOFF_MS + 1;
        assert!(config.validate().is_err());
        config.selection.cutoff_ms = 0;
        assert!(config.validate().is_ok());

        config.read_preference.mode = "fastest".to_string();
        assert!(config.validate().is_err());
        config.read_preference.mode = "nearest".to_string();
        assert!(config.validate().is_ok());

        config.read_preference.tag_sets = vec![vec!["dc".to_string()]];
        assert!(config.validate().is_err());
        config.read_preference.tag_sets = vec![vec!["dc:east".to_string()]];
        assert!(config.validate().is_ok());

        config.read_preference.tag_sets = vec![vec!["dc:east".to_string(), ":east".to_string()]];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.starts_with("Invalid tag ':east'")
        ));
        config.read_preference.tag_sets = vec![vec!["dc:east".to_string()]];

        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_server_validation() {
        let mut config = Config::example();
        config.servers[1].id = config.servers[0].id.clone();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.starts_with("Duplicate server id")
        ));

        let mut config = Config::example();
        config.servers[0].tags.push("nocolon".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::example();
        config.servers[0].id = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tag_sets_are_taken_verbatim() {
        let mut config = Config::default();
        config.read_preference.mode = "nearest".to_string();
        config.read_preference.tag_sets = vec![
            vec!["note:a,b".to_string()],
            vec!["dc: east".to_string()],
        ];
        config.servers = vec![
            ServerConfig {
                id: "spaced".to_string(),
                role: NodeRole::Secondary,
                latency_ms: 5,
                tags: vec!["dc: east".to_string()],
            },
            ServerConfig {
                id: "plain".to_string(),
                role: NodeRole::Secondary,
                latency_ms: 5,
                tags: vec!["dc:east".to_string()],
            },
        ];
        assert!(config.validate().is_ok());

        let rp = config.read_preference().unwrap();
        assert_eq!(rp.tag_sets()[0].squash(), "note:a,b");
        assert_eq!(rp.tag_sets()[1].squash(), "dc: east");

        let connections = config.build_connections();
        let found = crate::selection::find_candidates(&connections, &rp).unwrap();
        let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["spaced"]);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::example();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed_config: Config = toml::from_str(&toml_str).unwrap();
        assert!(parsed_config.validate().is_ok());
        assert_eq!(parsed_config.servers, config.servers);
        assert_eq!(parsed_config.read_preference, config.read_preference);
    }

    #[test]
    fn test_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [read_preference]
            mode = "nearest"

            [[servers]]
            id = "router:27017"
            role = "mongos"
            latency_ms = 3
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.selection, SelectionConfig::default());
        assert_eq!(config.servers[0].role, NodeRole::RouterProxy);
        assert!(config.servers[0].tags.is_empty());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_file = NamedTempFile::new().unwrap();

        Config::create_example_config(temp_file.path()).unwrap();
        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.servers.len(), 3);
        assert!(Config::load_from_file("/nonexistent/readpref.toml").is_err());
    }
}
