//! chitrapost CLI library

pub mod commands;

use anyhow::{Context, Result};
use chitrapost::config::ChitrapostConfig;
use std::path::Path;

/// Load configuration from `path`, or from the standard locations
///
/// # Errors
///
/// Returns an error if the configuration cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<ChitrapostConfig> {
    match path {
        Some(path) => ChitrapostConfig::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => ChitrapostConfig::load().context("failed to load configuration"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "environment = \"staging\"\n[server]\nport = 4000").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.environment, "staging");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_load_config_missing_path_names_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
