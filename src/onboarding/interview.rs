//! Interview step logic — one validated answer per turn.

use crate::energy;
use crate::profile::{ActivityLevel, Gender, Goal, OnboardingPhase, Profile};

use super::prompts;

/// Whether an answer advanced the interview or the question was re-asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Advanced,
    Retry,
}

/// One handled answer: the outbound reply plus what happened to the phase.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub reply: String,
    pub outcome: AnswerOutcome,
}

/// Validate `raw` against the profile's current phase and advance on
/// success.
///
/// A value that parses but fails its range check behaves exactly like an
/// unparseable one: the phase stays put and the same question is re-asked
/// with a notice. Nothing here ever reaches the transport layer as an
/// error. The last validated answer computes the calorie target, freezes
/// it, and returns the profile summary.
pub fn handle_answer(profile: &mut Profile, raw: &str) -> StepResult {
    let phase = profile.phase;
    match phase {
        OnboardingPhase::AskWeight => match parse_range(raw, 20.0, 300.0) {
            Some(weight) => {
                profile.weight_kg = Some(weight);
                advance(profile)
            }
            None => retry(phase),
        },
        OnboardingPhase::AskHeight => match parse_range(raw, 50.0, 250.0) {
            Some(height) => {
                profile.height_cm = Some(height);
                advance(profile)
            }
            None => retry(phase),
        },
        OnboardingPhase::AskAge => match raw.trim().parse::<u32>() {
            Ok(age) if (10..=100).contains(&age) => {
                profile.age_years = Some(age);
                advance(profile)
            }
            _ => retry(phase),
        },
        OnboardingPhase::AskGender => match Gender::from_token(raw) {
            Some(gender) => {
                profile.gender = Some(gender);
                advance(profile)
            }
            None => retry(phase),
        },
        OnboardingPhase::AskActivity => match ActivityLevel::from_token(raw) {
            Some(activity) => {
                profile.activity = Some(activity);
                advance(profile)
            }
            None => retry(phase),
        },
        OnboardingPhase::AskGoal => match Goal::from_token(raw) {
            Some(goal) => {
                profile.goal = Some(goal);
                finalize(profile)
            }
            None => retry(phase),
        },
        // Terminal phase has no question; the dispatcher routes these turns
        // to the ledger instead. Repeating the summary is harmless.
        OnboardingPhase::Done => StepResult {
            reply: prompts::summary(profile),
            outcome: AnswerOutcome::Retry,
        },
    }
}

fn parse_range(raw: &str, min: f64, max: f64) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

fn retry(phase: OnboardingPhase) -> StepResult {
    StepResult {
        reply: prompts::invalid(phase),
        outcome: AnswerOutcome::Retry,
    }
}

fn advance(profile: &mut Profile) -> StepResult {
    if let Some(next) = profile.phase.next() {
        profile.phase = next;
        StepResult {
            reply: prompts::advance(next),
            outcome: AnswerOutcome::Advanced,
        }
    } else {
        retry(profile.phase)
    }
}

/// The goal answer was the last one: compute and freeze the target, move to
/// the terminal phase, and emit the summary.
fn finalize(profile: &mut Profile) -> StepResult {
    if let (Some(weight), Some(height), Some(age), Some(gender), Some(activity), Some(goal)) = (
        profile.weight_kg,
        profile.height_cm,
        profile.age_years,
        profile.gender,
        profile.activity,
        profile.goal,
    ) {
        profile.daily_calorie_target = Some(energy::compute_target(
            weight, height, age, gender, activity, goal,
        ));
    }
    profile.phase = OnboardingPhase::Done;
    StepResult {
        reply: prompts::summary(profile),
        outcome: AnswerOutcome::Advanced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fresh() -> Profile {
        Profile::seed("628123", "Ayu", Utc::now())
    }

    #[test]
    fn invalid_answers_leave_every_phase_unchanged() {
        let cases = [
            (OnboardingPhase::AskWeight, "potato"),
            (OnboardingPhase::AskWeight, "10"),  // below range
            (OnboardingPhase::AskWeight, "400"), // above range
            (OnboardingPhase::AskHeight, "40"),
            (OnboardingPhase::AskAge, "9"),
            (OnboardingPhase::AskAge, "25.5"), // not an integer
            (OnboardingPhase::AskGender, "yes"),
            (OnboardingPhase::AskActivity, "medium"),
            (OnboardingPhase::AskGoal, "bulk"),
        ];
        for (phase, answer) in cases {
            let mut p = fresh();
            p.phase = phase;
            let step = handle_answer(&mut p, answer);
            assert_eq!(step.outcome, AnswerOutcome::Retry, "{phase}: {answer}");
            assert_eq!(p.phase, phase, "phase must not move on {answer:?}");
            assert!(
                step.reply.contains(prompts::question(phase)),
                "reply must re-ask the {phase} question"
            );
        }
    }

    #[test]
    fn out_of_range_and_unparseable_look_identical() {
        let mut p1 = fresh();
        let r1 = handle_answer(&mut p1, "banana");
        let mut p2 = fresh();
        let r2 = handle_answer(&mut p2, "301");
        assert_eq!(r1.reply, r2.reply);
        assert_eq!(r1.outcome, r2.outcome);
    }

    #[test]
    fn six_valid_answers_reach_done_and_freeze_target() {
        let mut p = fresh();
        let answers = ["65", "170", "25", "m", "moderate", "lose"];
        for (i, answer) in answers.iter().enumerate() {
            let step = handle_answer(&mut p, answer);
            assert_eq!(
                step.outcome,
                AnswerOutcome::Advanced,
                "answer {i} ({answer}) should advance"
            );
        }
        assert_eq!(p.phase, OnboardingPhase::Done);
        assert_eq!(p.weight_kg, Some(65.0));
        assert_eq!(p.height_cm, Some(170.0));
        assert_eq!(p.age_years, Some(25));
        assert_eq!(p.gender, Some(Gender::Male));
        assert_eq!(p.activity, Some(ActivityLevel::Moderate));
        assert_eq!(p.goal, Some(Goal::Lose));
        assert_eq!(p.daily_calorie_target, Some(1968));
    }

    #[test]
    fn summary_includes_anthropometrics_and_target() {
        let mut p = fresh();
        for answer in ["65", "170", "25", "m", "moderate", "lose"] {
            handle_answer(&mut p, answer);
        }
        let step = handle_answer(&mut p, "anything"); // terminal phase
        assert!(step.reply.contains("65"));
        assert!(step.reply.contains("170"));
        assert!(step.reply.contains("1968"));
    }

    #[test]
    fn target_survives_terminal_turns_untouched() {
        let mut p = fresh();
        for answer in ["65", "170", "25", "m", "moderate", "lose"] {
            handle_answer(&mut p, answer);
        }
        let frozen = p.daily_calorie_target;
        handle_answer(&mut p, "gain");
        handle_answer(&mut p, "70");
        assert_eq!(p.daily_calorie_target, frozen);
        assert_eq!(p.phase, OnboardingPhase::Done);
    }

    #[test]
    fn answers_tolerate_surrounding_whitespace() {
        let mut p = fresh();
        let step = handle_answer(&mut p, "  65.5 ");
        assert_eq!(step.outcome, AnswerOutcome::Advanced);
        assert_eq!(p.weight_kg, Some(65.5));
        assert_eq!(p.phase, OnboardingPhase::AskHeight);
    }
}
