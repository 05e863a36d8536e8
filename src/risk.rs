// Cumulative risk scoring for an intake run

use crate::models::{RecommendedAction, RiskFlag};
use serde::{Deserialize, Serialize};

/// Score bounds enforced after every delta application
pub const SCORE_MIN: i32 = 0;
pub const SCORE_MAX: i32 = 100;

/// Accumulated risk across all evaluated sections of one wizard run.
/// The score is clamped to [0, 100] after every delta; flags are a
/// deduplicated set that preserves first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskState {
    pub score: i32,
    pub flags: Vec<RiskFlag>,
}

impl RiskState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a signed risk delta, clamping the resulting score to [0, 100]
    pub fn apply_delta(&mut self, delta: i32) {
        self.score = (self.score + delta).clamp(SCORE_MIN, SCORE_MAX);
    }

    /// Merge flags into the accumulated set. Duplicates are dropped and
    /// first-seen order is preserved.
    pub fn merge_flags(&mut self, flags: &[RiskFlag]) {
        for flag in flags {
            if !self.flags.contains(flag) {
                self.flags.push(flag.clone());
            }
        }
    }

    /// Derive the recommended next action from the current (score, flags)
    pub fn recommended_action(&self) -> RecommendedAction {
        recommended_action(self.score, &self.flags)
    }
}

/// Pure derivation of the recommended action from a score and flag set.
///
/// The thresholds are the contract of the system and must not drift:
/// - `Strategic Misalignment` flag or score >= 70 -> strategic review
/// - any flag or score >= 45 -> clarification call
/// - otherwise -> backlog ready
pub fn recommended_action(score: i32, flags: &[RiskFlag]) -> RecommendedAction {
    if flags.contains(&RiskFlag::StrategicMisalignment) || score >= 70 {
        RecommendedAction::StrategicReviewRequired
    } else if !flags.is_empty() || score >= 45 {
        RecommendedAction::ClarificationCallRecommended
    } else {
        RecommendedAction::BacklogReady
    }
}
