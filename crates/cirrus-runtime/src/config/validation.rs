//! Configuration validation utilities.

use std::collections::HashSet;

use cirrus_core::clean_name;

use super::error::{ConfigError, ConfigResult};
use super::schema::{CirrusConfig, ConnectionConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CirrusConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_connections(&config.connections)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    if logging.max_files == 0 {
        return Err(ConfigError::validation("logging.max_files must be at least 1"));
    }
    Ok(())
}

/// Validates all connections, rejecting names that collide after
/// canonicalization.
pub fn validate_connections(connections: &[ConnectionConfig]) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for conn in connections {
        validate_connection(conn)?;

        let name = clean_name(&conn.name);
        if name.is_empty() {
            return Err(ConfigError::validation(format!(
                "Connection name {:?} has no usable characters",
                conn.name
            )));
        }
        if !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicateConnection(name));
        }
    }

    Ok(())
}

fn validate_connection(conn: &ConnectionConfig) -> ConfigResult<()> {
    if conn.name.trim().is_empty() {
        return Err(ConfigError::missing_field("connection.name"));
    }
    if conn.nick.trim().is_empty() {
        return Err(ConfigError::missing_field("connection.nick"));
    }
    if conn.server.trim().is_empty() {
        return Err(ConfigError::missing_field("connection.server"));
    }
    if conn.port == 0 {
        return Err(ConfigError::InvalidPort(conn.port));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(name: &str) -> ConnectionConfig {
        ConnectionConfig {
            name: name.to_string(),
            nick: "cirrus".to_string(),
            server: "irc.example.net".to_string(),
            port: 6667,
            ssl: false,
            channels: vec![],
            settings: Default::default(),
        }
    }

    #[test]
    fn test_validate_empty_config() {
        let config = CirrusConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_duplicate_after_canonicalization() {
        let config = CirrusConfig {
            connections: vec![conn("My Network!"), conn("My  Network")],
            ..Default::default()
        };

        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::DuplicateConnection(n)) if n == "My_Network"));
    }

    #[test]
    fn test_name_without_usable_characters() {
        let config = CirrusConfig {
            connections: vec![conn("!!!")],
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_invalid_port() {
        let mut c = conn("net");
        c.port = 0;
        assert!(matches!(
            validate_connections(&[c]),
            Err(ConfigError::InvalidPort(0))
        ));
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = CirrusConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));
    }
}
