//! Onboarding interview — guided profile collection for new users.
//!
//! The interview walks a fixed question sequence (weight, height, age,
//! gender, activity, goal), validating one answer per turn. Invalid answers
//! re-ask the same question; the final valid answer freezes the daily
//! calorie target and hands the user over to the food ledger.

pub mod interview;
pub mod prompts;

pub use interview::{AnswerOutcome, StepResult, handle_answer};
