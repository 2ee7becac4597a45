//! Configuration validation.
//!
//! Collects every problem into a single `ConfigError` so the user can fix
//! a config file in one pass.

use neonvibe_common::ConfigError;

use crate::schema::NeonvibeConfig;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &NeonvibeConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_url(&mut errors, "ai.endpoints.gemini", &config.ai.endpoints.gemini);
    validate_url(
        &mut errors,
        "ai.endpoints.openrouter",
        &config.ai.endpoints.openrouter,
    );
    validate_range(
        &mut errors,
        "ai.http.connect_timeout_secs",
        config.ai.http.connect_timeout_secs,
        1,
        3600,
    );
    validate_range(
        &mut errors,
        "ai.http.request_timeout_secs",
        config.ai.http.request_timeout_secs,
        1,
        3600,
    );
    validate_range(
        &mut errors,
        "storage.max_sessions",
        config.storage.max_sessions,
        1,
        10_000,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Push an error if `value` is outside `[min, max]`.
fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

fn validate_url(errors: &mut Vec<String>, name: &str, value: &str) {
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        errors.push(format!("{name} = {value:?} must be an http(s) URL"));
    }
}
