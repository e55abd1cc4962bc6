use serde_json::{Map, Value, json};
use tracing::info;

use crate::core::{DEFAULT_PLAYER_NAME, Resource};

use super::model::CURRENT_SAVE_VERSION;
use super::validate::{SaveError, validate_envelope};

type MigrationStep = fn(&mut Map<String, Value>);

/// Ordered `(from, to, step)` upgrades; each step rewrites the tree in place.
const MIGRATIONS: &[(&str, &str, MigrationStep)] = &[
    ("1.0.0", "1.1.0", add_settings),
    ("1.1.0", "1.2.0", add_renown_and_lifetime_totals),
];

/// Walks the chain until the tree carries the current version. Unknown
/// versions fail closed.
pub fn migrate(mut value: Value) -> Result<Value, SaveError> {
    loop {
        let version = validate_envelope(&value)?.to_string();
        if version == CURRENT_SAVE_VERSION {
            return Ok(value);
        }
        let Some(&(from, to, step)) = MIGRATIONS.iter().find(|(from, _, _)| *from == version)
        else {
            return Err(SaveError::UnsupportedVersion(version));
        };
        let root = value.as_object_mut().ok_or(SaveError::NotAnObject)?;
        step(root);
        root.insert("version".to_string(), Value::String(to.to_string()));
        info!(from, to, "migrated save");
    }
}

fn add_settings(root: &mut Map<String, Value>) {
    root.entry("settings").or_insert_with(|| {
        json!({
            "offlineProgressEnabled": true,
            "playerName": DEFAULT_PLAYER_NAME,
        })
    });
}

/// Older saves never tracked renown or lifetime totals; lifetime starts at
/// the current balances.
fn add_renown_and_lifetime_totals(root: &mut Map<String, Value>) {
    if let Some(resources) = root.get_mut("resources").and_then(Value::as_object_mut) {
        resources
            .entry(Resource::RenownPoints.id())
            .or_insert_with(|| Value::String("0".to_string()));
    }
    let resources = root.get("resources").cloned().unwrap_or_else(|| json!({}));
    if let Some(stats) = root.get_mut("stats").and_then(Value::as_object_mut) {
        stats
            .entry("totalResourcesEarned")
            .or_insert(resources);
    }
}
