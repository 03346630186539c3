//! Onboarding phase machine — tracks which interview step the user is in.

use serde::{Deserialize, Serialize};

/// The phases of the onboarding interview.
///
/// Progresses linearly: AskWeight → AskHeight → AskAge → AskGender →
/// AskActivity → AskGoal → Done. `Done` is terminal; there is no
/// back-navigation and no step-skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingPhase {
    AskWeight,
    AskHeight,
    AskAge,
    AskGender,
    AskActivity,
    AskGoal,
    Done,
}

impl OnboardingPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: OnboardingPhase) -> bool {
        use OnboardingPhase::*;
        matches!(
            (self, target),
            (AskWeight, AskHeight)
                | (AskHeight, AskAge)
                | (AskAge, AskGender)
                | (AskGender, AskActivity)
                | (AskActivity, AskGoal)
                | (AskGoal, Done)
        )
    }

    /// Whether this phase is terminal (the interview is over).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Get the next phase in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingPhase> {
        use OnboardingPhase::*;
        match self {
            AskWeight => Some(AskHeight),
            AskHeight => Some(AskAge),
            AskAge => Some(AskGender),
            AskGender => Some(AskActivity),
            AskActivity => Some(AskGoal),
            AskGoal => Some(Done),
            Done => None,
        }
    }
}

impl Default for OnboardingPhase {
    fn default() -> Self {
        Self::AskWeight
    }
}

impl std::fmt::Display for OnboardingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AskWeight => "ask_weight",
            Self::AskHeight => "ask_height",
            Self::AskAge => "ask_age",
            Self::AskGender => "ask_gender",
            Self::AskActivity => "ask_activity",
            Self::AskGoal => "ask_goal",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}
