use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MinigameId {
    CodeBreaker,
    CodeRunner,
}

impl MinigameId {
    pub const ALL: [MinigameId; 2] = [MinigameId::CodeBreaker, MinigameId::CodeRunner];

    pub fn id(self) -> &'static str {
        match self {
            Self::CodeBreaker => "codeBreaker",
            Self::CodeRunner => "codeRunner",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|minigame| minigame.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CodeBreaker => "Code Breaker",
            Self::CodeRunner => "Code Runner",
        }
    }

    /// Minigames playable in a fresh game.
    pub fn unlocked_by_default(self) -> bool {
        matches!(self, Self::CodeBreaker)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinigameRecord {
    pub unlocked: bool,
    /// Best results, non-increasing.
    pub top_scores: Vec<Decimal>,
    pub play_count: u64,
    /// Levels of upgrades local to this minigame.
    pub upgrades: BTreeMap<String, u32>,
}

impl MinigameRecord {
    pub fn new(unlocked: bool) -> Self {
        Self {
            unlocked,
            ..Self::default()
        }
    }

    pub fn upgrade_level(&self, upgrade_id: &str) -> u32 {
        self.upgrades.get(upgrade_id).copied().unwrap_or(0)
    }

    pub fn top_score_sum(&self) -> Decimal {
        self.top_scores.iter().sum()
    }

    pub fn best_score(&self) -> Option<Decimal> {
        self.top_scores.first().copied()
    }
}

/// Inserts `score` into a non-increasing list, ahead of the first strictly
/// smaller entry (ties keep submission order), then truncates to `cap`.
/// Returns the rank the score landed at, or `None` if it did not make the cut.
pub fn insert_score(scores: &mut Vec<Decimal>, score: Decimal, cap: usize) -> Option<usize> {
    let position = scores
        .iter()
        .position(|existing| score > *existing)
        .unwrap_or(scores.len());
    if position >= cap {
        return None;
    }
    scores.insert(position, score);
    scores.truncate(cap);
    Some(position)
}
