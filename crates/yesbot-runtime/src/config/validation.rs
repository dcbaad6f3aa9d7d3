//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, RuntimeConfig, YesBotConfig};

const MAX_SHUTDOWN_GRACE_SECS: u64 = 600;

/// Validates the entire configuration.
pub fn validate_config(config: &YesBotConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_runtime_config(&config.runtime)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    for module in logging.filters.keys() {
        if module.is_empty() || module.contains(char::is_whitespace) {
            return Err(ConfigError::validation(format!(
                "Invalid module name in logging.filters: {module:?}"
            )));
        }
    }

    Ok(())
}

fn validate_runtime_config(runtime: &RuntimeConfig) -> ConfigResult<()> {
    if runtime.event_buffer == 0 {
        return Err(ConfigError::validation(
            "runtime.event_buffer must be greater than 0",
        ));
    }

    if runtime.shutdown_grace_secs > MAX_SHUTDOWN_GRACE_SECS {
        return Err(ConfigError::validation(format!(
            "runtime.shutdown_grace_secs must be at most {MAX_SHUTDOWN_GRACE_SECS}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&YesBotConfig::default()).is_ok());
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = YesBotConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.logging.file_path = Some("logs/yesbot.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_filter_module() {
        let mut config = YesBotConfig::default();
        config.logging.filters.insert("yesbot core".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_runtime_limits() {
        let mut config = YesBotConfig::default();
        config.runtime.event_buffer = 0;
        assert!(validate_config(&config).is_err());

        let mut config = YesBotConfig::default();
        config.runtime.shutdown_grace_secs = 3600;
        assert!(validate_config(&config).is_err());
    }
}
