//! Food classification — free text in, calorie estimate + reply text out.
//!
//! The classifier is an external collaborator behind a narrow trait. The
//! production implementation calls the Gemini `generateContent` REST API;
//! tests script the trait directly.

pub mod gemini;

pub use gemini::GeminiClassifier;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::ClassifierError;
use crate::profile::{Goal, Profile};

/// What the classifier detected in one chat message.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Estimated kcal; zero or negative means "not food".
    pub calories_detected: i32,
    /// Reply text, sent to the user verbatim.
    pub response_message: String,
}

/// Read-only view of a profile handed to the classifier.
///
/// Used only to shape the reply text — never to alter energy-model or
/// ledger arithmetic. The anthropometric fields feed the personalized
/// prompt variant and are ignored otherwise.
#[derive(Debug, Clone)]
pub struct ProfileSnapshot {
    pub calories_consumed_today: i32,
    pub daily_calorie_target: i32,
    pub age_years: Option<u32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<Goal>,
}

impl ProfileSnapshot {
    pub fn of(profile: &Profile) -> Self {
        Self {
            calories_consumed_today: profile.calories_consumed_today,
            daily_calorie_target: profile.daily_calorie_target.unwrap_or(0),
            age_years: profile.age_years,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            goal: profile.goal,
        }
    }
}

/// Configuration for the production classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: SecretString,
    pub model: String,
    /// Include age/height/weight/goal in the prompt.
    pub personalized: bool,
}

/// Maps one chat message plus a profile snapshot to a detection.
#[async_trait]
pub trait FoodClassifier: Send + Sync {
    async fn classify(
        &self,
        display_name: &str,
        text: &str,
        snapshot: &ProfileSnapshot,
    ) -> Result<Detection, ClassifierError>;
}
