use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;

use super::migrate::migrate;
use super::model::SaveSnapshot;
use super::validate::validate_snapshot;

pub fn save_to_json_string(snapshot: &SaveSnapshot) -> Result<String> {
    serde_json::to_string(snapshot).context("failed to serialize save data to JSON")
}

/// Parse, migrate, validate, then decode. Any failure rejects the save.
pub fn load_from_json_string(json: &str, top_score_cap: usize) -> Result<SaveSnapshot> {
    let tree: Value = serde_json::from_str(json).context("failed to parse save JSON")?;
    let tree = migrate(tree).context("failed to migrate save")?;
    validate_snapshot(&tree, top_score_cap).context("save failed validation")?;
    serde_json::from_value(tree).context("failed to decode save")
}

pub fn export_to_base64(snapshot: &SaveSnapshot) -> Result<String> {
    let json = save_to_json_string(snapshot)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

pub fn import_from_base64(encoded: &str, top_score_cap: usize) -> Result<SaveSnapshot> {
    let trimmed = encoded.trim();
    let raw = STANDARD
        .decode(trimmed)
        .context("failed to decode base64 save payload")?;
    let json = String::from_utf8(raw).context("decoded base64 payload is not UTF-8")?;
    load_from_json_string(&json, top_score_cap)
}
