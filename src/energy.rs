//! Daily energy expenditure — Mifflin–St Jeor with an activity multiplier.

use crate::profile::{ActivityLevel, Gender, Goal};

/// Compute a daily calorie target in kcal.
///
/// `bmr = 10·weight + 6.25·height − 5·age + 5` for males, `− 161` for
/// females. TDEE rounds once after the activity multiplier; the goal
/// adjustment is applied to the rounded value. Implausible inputs are
/// accepted as-is — range checking belongs to the interview.
pub fn compute_target(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    gender: Gender,
    activity: ActivityLevel,
    goal: Goal,
) -> i32 {
    let bmr = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years)
        + match gender {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
        };
    let tdee = (bmr * activity.multiplier()).round() as i32;
    tdee + goal.calorie_adjustment()
}
