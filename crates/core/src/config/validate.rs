use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Required login/cleanup keys exist (enforced by serde)
/// - login.address is non-empty
/// - Space thresholds are non-negative
/// - Bonus values are finite
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.login.address.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "login.address cannot be empty".to_string(),
        ));
    }

    if config.cleanup.min_space_gb < 0.0 {
        return Err(ConfigError::ValidationError(
            "cleanup.min_space_gb cannot be negative".to_string(),
        ));
    }

    if let Some(minspace) = config.cleanup.download_minspace_gb {
        if minspace < 0.0 {
            return Err(ConfigError::ValidationError(
                "cleanup.download_minspace_gb cannot be negative".to_string(),
            ));
        }
    }

    for bonus in &config.bonus {
        if !bonus.value.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "bonus value for pattern '{}' must be finite",
                bonus.pattern
            )));
        }
    }

    Ok(())
}
