//! Configuration validation.

use crate::config::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_model(config)?;
    validate_output(config)?;
    Ok(())
}

fn validate_model(config: &Config) -> Result<()> {
    let model = &config.model;

    if model.asset.trim().is_empty() {
        return Err(Error::ConfigValidation {
            message: "model asset name must not be empty".to_string(),
        });
    }

    if model.intra_threads == 0 {
        return Err(Error::ConfigValidation {
            message: "intra_threads must be at least 1".to_string(),
        });
    }

    if let Some(labels) = &model.labels
        && !labels.is_file()
    {
        return Err(Error::LabelsFileNotFound {
            path: labels.clone(),
        });
    }

    Ok(())
}

fn validate_output(config: &Config) -> Result<()> {
    if config.output.top_k == 0 {
        return Err(Error::ConfigValidation {
            message: "top_k must be at least 1".to_string(),
        });
    }
    Ok(())
}
