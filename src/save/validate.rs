use serde_json::{Map, Value};
use thiserror::Error;

use crate::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("save root is not a JSON object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    #[error("field `{field}` is invalid: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("unsupported save version `{0}`")]
    UnsupportedVersion(String),
}

type Checked<T> = Result<T, SaveError>;

/// Checks just enough to route the tree through migration: an object with
/// a string `version`. Returns the version.
pub fn validate_envelope(value: &Value) -> Checked<&str> {
    let root = value.as_object().ok_or(SaveError::NotAnObject)?;
    let version = required(root, "version", "version")?;
    version.as_str().ok_or_else(|| wrong_type("version", "a string"))
}

/// Full structural validation of a current-version save tree. Nothing is
/// repaired; the first problem rejects the whole save.
pub fn validate_snapshot(value: &Value, top_score_cap: usize) -> Checked<()> {
    let root = value.as_object().ok_or(SaveError::NotAnObject)?;
    validate_envelope(value)?;
    for key in ["lastSaved", "lastPlayed"] {
        expect_timestamp(required(root, key, key)?, key)?;
    }
    validate_decimal_map(required(root, "resources", "resources")?, "resources")?;
    validate_level_map(required(root, "upgrades", "upgrades")?, "upgrades")?;

    let minigames = expect_object(required(root, "minigames", "minigames")?, "minigames")?;
    for (id, entry) in minigames {
        validate_minigame(entry, &format!("minigames.{id}"), top_score_cap)?;
    }

    let settings = expect_object(required(root, "settings", "settings")?, "settings")?;
    let enabled = required(
        settings,
        "offlineProgressEnabled",
        "settings.offlineProgressEnabled",
    )?;
    if !enabled.is_boolean() {
        return Err(wrong_type("settings.offlineProgressEnabled", "a boolean"));
    }
    if let Some(name) = settings.get("playerName")
        && !name.is_string()
    {
        return Err(wrong_type("settings.playerName", "a string"));
    }

    let stats = expect_object(required(root, "stats", "stats")?, "stats")?;
    let play_time = required(stats, "totalPlayTime", "stats.totalPlayTime")?;
    match play_time.as_f64() {
        Some(ms) if ms.is_finite() && ms >= 0.0 => {}
        _ => return Err(wrong_type("stats.totalPlayTime", "a non-negative number")),
    }
    validate_decimal_map(
        required(stats, "totalResourcesEarned", "stats.totalResourcesEarned")?,
        "stats.totalResourcesEarned",
    )?;
    Ok(())
}

fn validate_minigame(value: &Value, path: &str, top_score_cap: usize) -> Checked<()> {
    let entry = expect_object(value, path)?;
    let unlocked_path = format!("{path}.unlocked");
    if !required(entry, "unlocked", &unlocked_path)?.is_boolean() {
        return Err(wrong_type(&unlocked_path, "a boolean"));
    }
    let count_path = format!("{path}.playCount");
    if required(entry, "playCount", &count_path)?.as_u64().is_none() {
        return Err(wrong_type(&count_path, "a non-negative integer"));
    }
    let upgrades_path = format!("{path}.upgrades");
    validate_level_map(required(entry, "upgrades", &upgrades_path)?, &upgrades_path)?;

    let scores_path = format!("{path}.topScores");
    let scores = required(entry, "topScores", &scores_path)?
        .as_array()
        .ok_or_else(|| wrong_type(&scores_path, "an array"))?;
    if scores.len() > top_score_cap {
        return Err(invalid(
            &scores_path,
            format!("holds {} scores, cap is {top_score_cap}", scores.len()),
        ));
    }
    let mut previous: Option<Decimal> = None;
    for (index, score) in scores.iter().enumerate() {
        let score = expect_decimal(score, &format!("{scores_path}[{index}]"))?;
        if previous.is_some_and(|previous| score > previous) {
            return Err(invalid(&scores_path, "scores are not in descending order"));
        }
        previous = Some(score);
    }
    Ok(())
}

fn validate_decimal_map(value: &Value, path: &str) -> Checked<()> {
    for (key, amount) in expect_object(value, path)? {
        expect_decimal(amount, &format!("{path}.{key}"))?;
    }
    Ok(())
}

fn validate_level_map(value: &Value, path: &str) -> Checked<()> {
    for (key, level) in expect_object(value, path)? {
        let in_range = level
            .as_u64()
            .is_some_and(|level| u32::try_from(level).is_ok());
        if !in_range {
            return Err(wrong_type(&format!("{path}.{key}"), "a non-negative integer level"));
        }
    }
    Ok(())
}

fn expect_decimal(value: &Value, path: &str) -> Checked<Decimal> {
    let text = value
        .as_str()
        .ok_or_else(|| wrong_type(path, "a decimal string"))?;
    let amount: Decimal = text
        .parse()
        .map_err(|error: crate::DecimalError| invalid(path, error.to_string()))?;
    if amount.is_negative() {
        return Err(invalid(path, "must not be negative"));
    }
    Ok(amount)
}

fn expect_timestamp(value: &Value, path: &str) -> Checked<i64> {
    value
        .as_i64()
        .ok_or_else(|| wrong_type(path, "an integer timestamp"))
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Checked<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| wrong_type(path, "an object"))
}

fn required<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Checked<&'a Value> {
    object
        .get(key)
        .ok_or_else(|| SaveError::MissingField(path.to_string()))
}

fn wrong_type(path: &str, expected: &'static str) -> SaveError {
    SaveError::WrongType {
        field: path.to_string(),
        expected,
    }
}

fn invalid(path: &str, reason: impl Into<String>) -> SaveError {
    SaveError::InvalidValue {
        field: path.to_string(),
        reason: reason.into(),
    }
}
