use colored::Colorize;
use std::fmt;

/// Errors that can occur while populating a configuration struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing and has no default
    MissingEnvVar { key: String, description: String },
    /// An environment variable (or a default) could not be converted
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    /// The environment key this error refers to
    pub fn key(&self) -> &str {
        match self {
            ConfigError::MissingEnvVar { key, .. } | ConfigError::InvalidValue { key, .. } => key,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingEnvVar { key, description } => {
                write!(
                    f,
                    "{}: Is missing from environment and is required",
                    key.magenta().bold()
                )?;
                if !description.is_empty() {
                    write!(f, "\n\tDescription: {}", description)?;
                }
                Ok(())
            }
            ConfigError::InvalidValue { key, value, reason } => {
                write!(
                    f,
                    "{}: Invalid value {}\n\tReason: {}",
                    key.magenta().bold(),
                    format!("'{}'", value).red(),
                    reason
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Helper to format multiple configuration errors into a single message
pub fn format_config_errors(errors: &[ConfigError]) -> String {
    let error_summary = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Configuration failed with {} error(s):\n{}",
        errors.len().to_string().yellow().bold(),
        error_summary
    )
}
