//! sb-model: Scheduling Block Definition file format.

pub mod builders;
pub mod schema;

pub use builders::{low_sbd, low_target, mid_sbd, mid_target, populate_scan_sequences};
pub use schema::*;

use std::path::Path;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Unsupported file extension for {path}: expected .json, .yaml or .yml")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_json_str(content: &str) -> ModelResult<SbDefinition> {
    Ok(serde_json::from_str(content)?)
}

pub fn from_yaml_str(content: &str) -> ModelResult<SbDefinition> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn load_yaml(path: &Path) -> ModelResult<SbDefinition> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &Path, sbd: &SbDefinition) -> ModelResult<()> {
    let content = serde_yaml::to_string(sbd)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ModelResult<SbDefinition> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

pub fn save_json(path: &Path, sbd: &SbDefinition) -> ModelResult<()> {
    let content = serde_json::to_string_pretty(sbd)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load an SBD choosing the format from the file extension.
pub fn load(path: &Path) -> ModelResult<SbDefinition> {
    match extension(path).as_deref() {
        Some("json") => load_json(path),
        Some("yaml") | Some("yml") => load_yaml(path),
        _ => Err(ModelError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
