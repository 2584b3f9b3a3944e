use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let mut config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("JANITOR_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.normalize();
    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let mut config: Config =
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.normalize();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[login]
address = "http://localhost:8080"
username = "admin"
password = "secret"

[cleanup]
categories_to_check_for_space = ["Movies"]
min_space_gb = 100.0
max_torrents_for_categories = 25
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.cleanup.min_space_gb, 100.0);
        // normalize() lowercases category lists.
        assert_eq!(config.cleanup.categories_to_check_for_space, vec!["movies"]);
    }

    #[test]
    fn test_load_config_from_str_missing_login() {
        let toml = r#"
[cleanup]
min_space_gb = 100.0
max_torrents_for_categories = 25
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[login]
address = "http://localhost:9000"
username = "admin"
password = "secret"

[cleanup]
min_space_gb = 50.0
max_torrents_for_categories = 10
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.login.address, "http://localhost:9000");
        assert_eq!(config.cleanup.max_torrents_for_categories, 10);
    }
}
