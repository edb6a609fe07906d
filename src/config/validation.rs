use crate::config::types::{Config, ContentConfig, OutputConfig, ScopeConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Fingerprints are 64 bits wide and split into `distance + 1` lookup blocks
const MAX_HAMMING_DISTANCE: u32 = 16;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_user_agent_config(&config.user_agent)?;
    validate_scope_config(&config.scope)?;
    validate_content_config(&config.content)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the crawl boundary
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    if config.allowed_suffixes.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_suffixes must list at least one host suffix".to_string(),
        ));
    }

    for suffix in &config.allowed_suffixes {
        validate_suffix(suffix)?;
    }
    validate_suffix(&config.primary_suffix)?;

    for prefix in &config.allowed_prefixes {
        if prefix.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "allowed prefix cannot be empty".to_string(),
            ));
        }
        if prefix.contains("://") {
            return Err(ConfigError::InvalidPattern(format!(
                "allowed prefix '{}' must not include a scheme",
                prefix
            )));
        }
    }

    if config.robots_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "robots_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates content thresholds
fn validate_content_config(config: &ContentConfig) -> Result<(), ConfigError> {
    if config.stop_words_path.is_empty() {
        return Err(ConfigError::Validation(
            "stop_words_path cannot be empty".to_string(),
        ));
    }

    if config.min_tokens < 1 {
        return Err(ConfigError::Validation(
            "min_tokens must be >= 1".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.min_diversity) {
        return Err(ConfigError::Validation(format!(
            "min_diversity must be between 0 and 1, got {}",
            config.min_diversity
        )));
    }

    if config.max_hamming_distance > MAX_HAMMING_DISTANCE {
        return Err(ConfigError::Validation(format!(
            "max_hamming_distance must be <= {}, got {}",
            MAX_HAMMING_DISTANCE, config.max_hamming_distance
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report_path cannot be empty".to_string(),
        ));
    }

    if config.top_words < 1 {
        return Err(ConfigError::Validation(
            "top_words must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates a host suffix such as ".ics.uci.edu"
fn validate_suffix(suffix: &str) -> Result<(), ConfigError> {
    let Some(domain) = suffix.strip_prefix('.') else {
        return Err(ConfigError::InvalidPattern(format!(
            "Suffix '{}' must start with '.'",
            suffix
        )));
    };

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Suffix cannot be just '.'".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Suffix '{}' contains invalid characters",
            suffix
        )));
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.ends_with('-') {
        return Err(ConfigError::InvalidPattern(format!(
            "Suffix '{}' cannot contain empty labels or end with '-'",
            suffix
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Suffix '{}' cannot contain consecutive dots",
            suffix
        )));
    }

    if domain.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ConfigError::InvalidPattern(format!(
            "Suffix '{}' must be lowercase",
            suffix
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
