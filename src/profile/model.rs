//! User profile record and its closed enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::OnboardingPhase;

/// Biological sex used by the energy model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Map a free-text answer onto the enum. Accepts the long tokens and the
    /// localized single letters (`l` for laki-laki, `p` for perempuan).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "m" | "male" | "l" => Some(Self::Male),
            "f" | "female" | "p" => Some(Self::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Self-reported activity level, scaling BMR up to TDEE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "moderate" => Some(Self::Moderate),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// TDEE multiplier applied to the BMR.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Low => 1.2,
            Self::Moderate => 1.55,
            Self::High => 1.725,
        }
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
        }
    }
}

/// What the user wants their calorie budget to work toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "lose" => Some(Self::Lose),
            "maintain" => Some(Self::Maintain),
            "gain" => Some(Self::Gain),
            _ => None,
        }
    }

    /// Flat kcal adjustment applied after the TDEE rounding point.
    pub fn calorie_adjustment(&self) -> i32 {
        match self {
            Self::Lose => -500,
            Self::Maintain => 0,
            Self::Gain => 300,
        }
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lose => write!(f, "lose"),
            Self::Maintain => write!(f, "maintain"),
            Self::Gain => write!(f, "gain"),
        }
    }
}

/// One user's record in the store.
///
/// Anthropometric fields fill in one-by-one as interview answers validate;
/// all of them are `Some` once `phase == Done`. `daily_calorie_target` is
/// computed exactly once, at the transition into `Done`, and
/// `calories_consumed_today` only ever grows (no decrement exists).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub phase: OnboardingPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_calorie_target: Option<i32>,
    pub calories_consumed_today: i32,
    pub last_active_at: DateTime<Utc>,
}

impl Profile {
    /// A fresh record for a first-ever inbound event, parked at the first
    /// interview question.
    pub fn seed(id: &str, display_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            phase: OnboardingPhase::AskWeight,
            weight_kg: None,
            height_cm: None,
            age_years: None,
            gender: None,
            activity: None,
            goal: None,
            daily_calorie_target: None,
            calories_consumed_today: 0,
            last_active_at: now,
        }
    }
}
