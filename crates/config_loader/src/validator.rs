//! Settings validation
//!
//! Rules:
//! - 0 < samples_per_row <= MAX_SAMPLES_PER_ROW
//! - 0 < samples_per_distribution <= samples_per_row
//! - threshold_ms finite and > 0
//! - max_estimates, when set, > 0
//! - at least one sink

use contracts::{ContractError, EstimatorConfig, Settings, MAX_SAMPLES_PER_ROW};

/// Validate settings
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(settings: &Settings) -> Result<(), ContractError> {
    validate_estimator(&settings.estimator)?;
    validate_sinks(settings)?;
    Ok(())
}

/// Validate the estimator section on its own
///
/// Also used after CLI overrides are applied.
pub fn validate_estimator(config: &EstimatorConfig) -> Result<(), ContractError> {
    validate_sample_counts(config)?;
    validate_threshold(config)?;
    validate_max_estimates(config)?;
    Ok(())
}

fn validate_sample_counts(config: &EstimatorConfig) -> Result<(), ContractError> {
    if config.samples_per_row == 0 {
        return Err(ContractError::config_validation(
            "estimator.samples_per_row",
            "samples_per_row must be > 0",
        ));
    }

    if config.samples_per_row > MAX_SAMPLES_PER_ROW {
        return Err(ContractError::config_validation(
            "estimator.samples_per_row",
            format!(
                "samples_per_row must be <= {MAX_SAMPLES_PER_ROW}, got {}",
                config.samples_per_row
            ),
        ));
    }

    if config.samples_per_distribution == 0 {
        return Err(ContractError::config_validation(
            "estimator.samples_per_distribution",
            "samples_per_distribution must be > 0",
        ));
    }

    if config.samples_per_distribution > config.samples_per_row {
        return Err(ContractError::config_validation(
            "estimator.samples_per_distribution / estimator.samples_per_row",
            format!(
                "samples_per_distribution ({}) must be <= samples_per_row ({})",
                config.samples_per_distribution, config.samples_per_row
            ),
        ));
    }

    Ok(())
}

fn validate_threshold(config: &EstimatorConfig) -> Result<(), ContractError> {
    if !config.threshold_ms.is_finite() || config.threshold_ms <= 0.0 {
        return Err(ContractError::config_validation(
            "estimator.threshold_ms",
            format!("threshold_ms must be > 0, got {}", config.threshold_ms),
        ));
    }
    Ok(())
}

fn validate_max_estimates(config: &EstimatorConfig) -> Result<(), ContractError> {
    if config.max_estimates == Some(0) {
        return Err(ContractError::config_validation(
            "estimator.max_estimates",
            "max_estimates must be > 0 when set",
        ));
    }
    Ok(())
}

fn validate_sinks(settings: &Settings) -> Result<(), ContractError> {
    if settings.output.sinks.is_empty() {
        return Err(ContractError::config_validation(
            "output.sinks",
            "at least one sink must be configured",
        ));
    }
    Ok(())
}
