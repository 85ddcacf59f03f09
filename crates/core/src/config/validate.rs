use super::{types::Config, ConfigError};
use crate::matching::keys;

/// Validate configuration
/// Currently validates:
/// - auto_download.min_score is not 0 while auto-download is enabled
/// - file_matching.min_similarity is within 0.0-1.0
/// - release_scoring only holds known keys
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.auto_download.enabled && config.auto_download.min_score == 0 {
        return Err(ConfigError::ValidationError(
            "auto_download.min_score cannot be 0 while auto_download.enabled is true".to_string(),
        ));
    }

    let similarity = config.file_matching.min_similarity;
    if !(0.0..=1.0).contains(&similarity) {
        return Err(ConfigError::ValidationError(format!(
            "file_matching.min_similarity must be between 0 and 1, got {}",
            similarity
        )));
    }

    if let Some(key) = config
        .release_scoring
        .keys()
        .find(|key| !keys::ALL.contains(key))
    {
        return Err(ConfigError::ValidationError(format!(
            "unknown release_scoring setting: {}",
            key
        )));
    }

    Ok(())
}
