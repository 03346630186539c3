//! Interview question, validation-notice, and summary texts.

use crate::profile::{OnboardingPhase, Profile};

/// Combined welcome + first question for a first-ever inbound event.
pub fn welcome(display_name: &str) -> String {
    format!(
        "Hi {display_name}! I'm NutriBot 🤖 — I track your daily calories from \
         whatever you tell me you ate. First, a few quick questions to set up \
         your profile.\n\n{}",
        question(OnboardingPhase::AskWeight)
    )
}

/// The question asked in a given phase. Empty for the terminal phase.
pub fn question(phase: OnboardingPhase) -> &'static str {
    match phase {
        OnboardingPhase::AskWeight => "What's your weight in kg?",
        OnboardingPhase::AskHeight => "What's your height in cm?",
        OnboardingPhase::AskAge => "How old are you?",
        OnboardingPhase::AskGender => "What's your gender? (m/f)",
        OnboardingPhase::AskActivity => "How active are you? (low / moderate / high)",
        OnboardingPhase::AskGoal => "What's your goal? (lose / maintain / gain)",
        OnboardingPhase::Done => "",
    }
}

/// Validation notice + re-asked question for an answer that didn't take.
pub fn invalid(phase: OnboardingPhase) -> String {
    let notice = match phase {
        OnboardingPhase::AskWeight => "Hmm, I need a weight between 20 and 300 kg.",
        OnboardingPhase::AskHeight => "Hmm, I need a height between 50 and 250 cm.",
        OnboardingPhase::AskAge => "Age should be a whole number between 10 and 100.",
        OnboardingPhase::AskGender => "Just answer m or f, please.",
        OnboardingPhase::AskActivity => "Just answer low, moderate or high, please.",
        OnboardingPhase::AskGoal => "Just answer lose, maintain or gain, please.",
        OnboardingPhase::Done => "",
    };
    format!("{notice} {}", question(phase))
}

/// Acknowledgement + next question after a validated answer.
pub fn advance(next: OnboardingPhase) -> String {
    format!("Got it! {}", question(next))
}

/// Profile summary emitted at the transition into the terminal phase.
pub fn summary(profile: &Profile) -> String {
    let (
        Some(weight),
        Some(height),
        Some(age),
        Some(gender),
        Some(activity),
        Some(goal),
        Some(target),
    ) = (
        profile.weight_kg,
        profile.height_cm,
        profile.age_years,
        profile.gender,
        profile.activity,
        profile.goal,
        profile.daily_calorie_target,
    )
    else {
        // Interview completion always fills every field first.
        return "You're all set! Tell me what you eat and I'll keep count. 🍽".to_string();
    };

    format!(
        "You're all set, {name}! 🎉\n\
         • Weight: {weight} kg\n\
         • Height: {height} cm\n\
         • Age: {age}\n\
         • Gender: {gender}\n\
         • Activity: {activity}\n\
         • Goal: {goal}\n\n\
         Your daily calorie target is {target} kcal. Tell me what you eat \
         and I'll keep count. 🍽",
        name = profile.display_name,
    )
}
