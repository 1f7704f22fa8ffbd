//! Estimation run: settings resolution, dry run and pipeline execution.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ContractError, Settings, SinkKind, SummaryMode};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute a run
pub fn run_pipeline(cli: &Cli) -> Result<()> {
    let settings = resolve_settings(cli)?;
    let input = settings.input_path();

    println!("Input filename: {}", input.display());

    if cli.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&settings, &input);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        settings,
        input,
    });
    let stats = pipeline.run()?;

    info!(
        records = stats.run.records_read,
        estimates = stats.run.estimates_emitted,
        duration_secs = stats.duration.as_secs_f64(),
        "Speed estimation completed successfully"
    );
    stats.print_summary();

    Ok(())
}

/// Defaults, then the settings file, then environment/flags
pub fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => load_file(path)?,
        None => Settings::default(),
    };

    apply_overrides(&mut settings, cli);

    ConfigLoader::validate(&settings)
        .map_err(|e| CliError::config_validation(e.to_string()))?;

    info!(
        input = %settings.input_path().display(),
        samples_per_distribution = settings.estimator.samples_per_distribution,
        samples_per_row = settings.estimator.samples_per_row,
        threshold_ms = settings.estimator.threshold_ms,
        altitude_mode = settings.estimator.altitude_mode,
        max_estimates = ?settings.estimator.max_estimates,
        "Configuration resolved"
    );

    Ok(settings)
}

fn load_file(path: &Path) -> Result<Settings> {
    info!(config = %path.display(), "Loading configuration");

    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    let settings = ConfigLoader::load_from_path(path)
        .map_err(|e| match e {
            ContractError::ConfigValidation { .. } => CliError::config_validation(e.to_string()),
            other => CliError::config_parse(other.to_string()),
        })
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    Ok(settings)
}

/// Apply flag and environment values on top of file settings
pub fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    let estimator = &mut settings.estimator;

    if let Some(ref file) = cli.file {
        settings.input = Some(file.clone());
    }
    if let Some(samples) = cli.samples {
        estimator.samples_per_distribution = samples;
    }
    if let Some(samples_per_row) = cli.samples_per_row {
        estimator.samples_per_row = samples_per_row;
    }
    if let Some(threshold_ms) = cli.threshold_ms {
        estimator.threshold_ms = threshold_ms;
    }
    if cli.altitude {
        estimator.altitude_mode = true;
    }
    if let Some(max) = cli.max_estimates {
        estimator.max_estimates = Some(max);
    }
    if let Some(ref mode) = cli.mode {
        estimator.summary_mode = SummaryMode::from_flag(mode);
    }

    if !cli.sinks.is_empty() {
        settings.output.sinks = cli.sinks.iter().copied().map(SinkKind::from).collect();
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(settings: &Settings, input: &Path) {
    let estimator = &settings.estimator;

    println!("\n=== Configuration Summary ===\n");
    println!("Input: {}", input.display());
    println!("\nEstimator:");
    println!(
        "  Samples per distribution: {}",
        estimator.samples_per_distribution
    );
    println!("  Samples per row: {}", estimator.samples_per_row);
    println!("  Threshold (ms): {}", estimator.threshold_ms);
    println!("  Altitude mode: {}", estimator.altitude_mode);
    println!(
        "  Summary mode: {:?} (effective: {:?})",
        estimator.summary_mode,
        estimator.summary_mode.effective()
    );
    match estimator.max_estimates {
        Some(max) => println!("  Max estimates: {}", max),
        None => println!("  Max estimates: unlimited"),
    }

    println!("\nSinks ({}):", settings.output.sinks.len());
    for sink in &settings.output.sinks {
        println!("  - {:?}", sink);
    }

    // Resolved settings in file form, reusable via --config
    match ConfigLoader::to_toml(settings) {
        Ok(rendered) => println!("\n=== Resolved Settings (TOML) ===\n\n{rendered}"),
        Err(e) => warn!(error = %e, "Failed to render resolved settings"),
    }
}
