use std::time::Duration;
use serde::{Deserialize, Serialize};

const MAX_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How many answers a decider gets before the engine picks for it.
    pub decision_attempts: usize,
    /// Answers that arrive later than this are thrown away.
    pub decision_timeout_ms: u64,
    /// Only the target may block Assassinate and Steal. Foreign Aid can
    /// always be blocked by anyone.
    pub target_only_counters: bool,
    /// Stop the game after this many turns.
    pub max_turns: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decision_attempts: 5,
            decision_timeout_ms: 30_000,
            target_only_counters: false,
            max_turns: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    // capped at a day so a deadline can always be computed
    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms.min(MAX_TIMEOUT_MS))
    }
}
