//! JSON file input.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Read and parse a JSON file; `what` names the input in error messages
pub fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("failed to read {} file {}", what, path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {} file {}", what, path.display()))
}
