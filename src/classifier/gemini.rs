//! Gemini `generateContent` classifier.
//!
//! One round-trip per message: prompt in, strict-JSON detection out. All
//! Gemini wire types are private to this module — callers only see
//! `Detection`.

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

use super::{ClassifierConfig, Detection, FoodClassifier, ProfileSnapshot};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Classifier backed by the Gemini REST API.
pub struct GeminiClassifier {
    client: Client,
    config: ClassifierConfig,
}

impl GeminiClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ClassifierError::RequestFailed(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/{}:generateContent", self.config.model)
    }
}

#[async_trait::async_trait]
impl FoodClassifier for GeminiClassifier {
    async fn classify(
        &self,
        display_name: &str,
        text: &str,
        snapshot: &ProfileSnapshot,
    ) -> Result<Detection, ClassifierError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: build_prompt(display_name, snapshot, self.config.personalized),
                    },
                    Part {
                        text: format!("User input: {text}"),
                    },
                ],
            }],
        };

        tracing::debug!(model = %self.config.model, input_len = text.len(), "classifying message");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifierError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::RequestFailed(format!(
                "generateContent returned {status}: {body}"
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let raw_text = payload
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .ok_or_else(|| ClassifierError::InvalidResponse("no candidates".to_string()))?;

        parse_detection(&raw_text)
    }
}

/// Parse the model's reply into a detection, tolerating markdown fences and
/// fractional calorie estimates (rounded before they reach the ledger).
fn parse_detection(raw: &str) -> Result<Detection, ClassifierError> {
    let cleaned = strip_code_fences(raw);
    let wire: WireDetection = serde_json::from_str(&cleaned)?;
    Ok(Detection {
        calories_detected: wire.calories_detected.round() as i32,
        response_message: wire.response_message,
    })
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

fn build_prompt(display_name: &str, snapshot: &ProfileSnapshot, personalized: bool) -> String {
    let mut prompt = format!(
        "You are a personal nutrition assistant called \"NutriBot\".\n\
         User: {display_name}\n\
         Current status: {consumed} / {target} kcal consumed today.\n",
        consumed = snapshot.calories_consumed_today,
        target = snapshot.daily_calorie_target,
    );

    if personalized {
        if let (Some(age), Some(height), Some(weight), Some(goal)) = (
            snapshot.age_years,
            snapshot.height_cm,
            snapshot.weight_kg,
            snapshot.goal,
        ) {
            prompt.push_str(&format!(
                "Profile: {age} years old, {height} cm, {weight} kg, goal: {goal}.\n"
            ));
        }
    }

    prompt.push_str(
        "\nTask:\n\
         1. Analyze the user's chat message for food intake.\n\
         2. Estimate calories aggressively but fairly.\n\
         3. Answer ONLY with JSON.\n\
         \n\
         Output JSON format:\n\
         {\n\
           \"calories_detected\": number (0 if not food),\n\
           \"response_message\": string (casual chat reply mentioning the \
         remaining calories; use emoji; introduce yourself as NutriBot when \
         asked)\n\
         }",
    );

    prompt
}

// ── Gemini wire types ───────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

/// The model's JSON reply. Calories may come back fractional.
#[derive(Deserialize)]
struct WireDetection {
    #[serde(default)]
    calories_detected: f64,
    response_message: String,
}
