//! Member seeding configuration loaded from config.toml
//!
//! This module provides functionality to load initial member definitions
//! from a TOML configuration file. The members defined in config.toml are
//! used to seed the database on first run; members whose code already
//! exists in the database are left untouched.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of member definitions to seed
    #[serde(default)]
    pub members: Vec<MemberConfig>,
}

/// Configuration for a single seeded member
#[derive(Debug, Deserialize, Clone)]
pub struct MemberConfig {
    /// External user-facing member code (e.g. "M-01")
    pub member_code: String,
    /// Display name
    pub name: String,
    /// `"member"` or `"admin"`; omitted means member
    pub role: Option<String>,
    /// Initial deposit reference value
    #[serde(default)]
    pub deposit: f64,
    /// Opaque bearer credential for this member
    pub api_token: String,
}

/// Loads member seed configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or required fields are missing.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads member seed configuration from the default location (./config.toml).
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_member_config() {
        let toml_str = r#"
            [[members]]
            member_code = "M-01"
            name = "Arindam"
            role = "admin"
            deposit = 500.0
            api_token = "tok-admin"

            [[members]]
            member_code = "M-02"
            name = "Sourav"
            api_token = "tok-sourav"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.members.len(), 2);
        assert_eq!(config.members[0].member_code, "M-01");
        assert_eq!(config.members[0].role.as_deref(), Some("admin"));
        assert_eq!(config.members[0].deposit, 500.0);

        assert_eq!(config.members[1].name, "Sourav");
        assert!(config.members[1].role.is_none());
        assert_eq!(config.members[1].deposit, 0.0);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.members.is_empty());
    }
}
