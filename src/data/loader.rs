use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::EngineConfig;

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let config: EngineConfig = read_json(path.as_ref(), "engine config")?;
    config
        .validate()
        .with_context(|| format!("invalid engine config: {}", path.as_ref().display()))?;
    Ok(config)
}

pub fn load_config_from_str(json: &str) -> Result<EngineConfig> {
    let config: EngineConfig =
        serde_json::from_str(json).context("failed parsing engine config as JSON")?;
    config.validate().context("invalid engine config")?;
    Ok(config)
}

fn read_json<T>(path: &Path, label: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {label} file: {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing {label} file as JSON: {}", path.display()))
}
