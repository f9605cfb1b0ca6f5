//! Daily hydration accounting and badge evaluation.
//!
//! Everything here is a pure function of the documents passed in: callers
//! hand in snapshots and get new snapshots back, then decide what to persist.

use crate::errors::AppError;
use crate::models::{BadgeDocument, BadgeId, BadgeState, DailySummary, LogDocument, LogEntry};
use chrono::{Duration, NaiveDate};

pub const QUICK_LOG_AMOUNTS: [u32; 4] = [50, 100, 250, 500];
pub const MAX_ENTRY_ML: u32 = 5000;
pub const ONE_LITER_ML: u64 = 1000;
pub const STREAK_DAYS: i64 = 7;

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn validate_amount(amount_ml: i64) -> Result<u32, AppError> {
    if amount_ml <= 0 {
        return Err(AppError::bad_request("amount must be a positive number of ml"));
    }
    if amount_ml > i64::from(MAX_ENTRY_ML) {
        return Err(AppError::bad_request(format!(
            "amount must be at most {MAX_ENTRY_ML} ml"
        )));
    }
    Ok(amount_ml as u32)
}

pub fn parse_amount(raw: &str) -> Result<u32, AppError> {
    let amount = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::bad_request("amount must be a whole number of ml"))?;
    validate_amount(amount)
}

pub fn json_amount(raw: &serde_json::Value) -> Result<u32, AppError> {
    match raw {
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(amount) => validate_amount(amount),
            None => Err(AppError::bad_request("amount must be a whole number of ml")),
        },
        serde_json::Value::String(text) => parse_amount(text),
        _ => Err(AppError::bad_request("amount must be a whole number of ml")),
    }
}

/// Returns a copy of `logs` with `entry` appended to the bucket for `date`.
pub fn record_entry(logs: &LogDocument, date: NaiveDate, entry: LogEntry) -> LogDocument {
    let mut next = logs.clone();
    next.days.entry(date_key(date)).or_default().push(entry);
    next
}

pub fn summarize_day(today: NaiveDate, logs: &LogDocument, goal_ml: Option<u32>) -> DailySummary {
    let date = date_key(today);
    let consumed_ml = logs.total_for(&date);
    let entries = logs.days.get(&date).map(Vec::len).unwrap_or(0);
    let goal_ml = goal_ml.filter(|goal| *goal > 0);

    let (remaining_ml, progress) = match goal_ml {
        Some(goal) => (
            Some(u64::from(goal).saturating_sub(consumed_ml)),
            Some(consumed_ml as f64 / f64::from(goal)),
        ),
        None => (None, None),
    };

    DailySummary {
        date,
        consumed_ml,
        goal_ml,
        remaining_ml,
        progress,
        progress_display: progress.map(|ratio| ratio.clamp(0.0, 1.0)),
        goal_exceeded: progress.is_some_and(|ratio| ratio > 1.0),
        entries,
    }
}

fn met_goal(logs: &LogDocument, date: NaiveDate, goal_ml: u32) -> bool {
    logs.total_for(&date_key(date)) >= u64::from(goal_ml)
}

fn qualifies(id: BadgeId, today: NaiveDate, logs: &LogDocument, goal_ml: Option<u32>) -> bool {
    match id {
        BadgeId::FirstLog => logs.entry_count() > 0,
        BadgeId::DailyGoal => goal_ml.is_some_and(|goal| met_goal(logs, today, goal)),
        // The current goal is applied to every day in the window; no history of
        // past goals is kept.
        BadgeId::SevenDayStreak => goal_ml.is_some_and(|goal| {
            (0..STREAK_DAYS).all(|offset| met_goal(logs, today - Duration::days(offset), goal))
        }),
        BadgeId::OneLiterChallenge => logs.days.keys().any(|day| logs.total_for(day) >= ONE_LITER_ML),
    }
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeEvaluation {
    pub badges: BadgeDocument,
    pub newly_earned: Vec<BadgeId>,
}

/// Re-evaluates every badge against the stored logs. Earned badges are never
/// revoked and keep their original date, so repeated passes over unchanged
/// data return the same document with nothing newly earned.
pub fn evaluate_badges(
    today: NaiveDate,
    logs: &LogDocument,
    goal_ml: Option<u32>,
    badges: &BadgeDocument,
) -> BadgeEvaluation {
    let goal_ml = goal_ml.filter(|goal| *goal > 0);
    let mut next = badges.clone();
    let mut newly_earned = Vec::new();

    for id in BadgeId::ALL {
        if badges.is_earned(id) || !qualifies(id, today, logs, goal_ml) {
            continue;
        }
        next.badges.insert(
            id.as_str().to_string(),
            BadgeState {
                earned: true,
                earned_date: Some(date_key(today)),
            },
        );
        newly_earned.push(id);
    }

    BadgeEvaluation {
        badges: next,
        newly_earned,
    }
}

/// Motivational line shown under the progress bar.
pub fn progress_message(summary: &DailySummary) -> String {
    match (summary.goal_ml, summary.progress) {
        (None, _) | (_, None) => "Set a daily goal in your profile to track progress.".to_string(),
        (Some(goal), Some(ratio)) if ratio > 1.0 => format!(
            "Goal smashed! {} ml over your {goal} ml target.",
            summary.consumed_ml - u64::from(goal)
        ),
        (Some(_), Some(ratio)) if ratio >= 1.0 => "Goal reached. Nicely done!".to_string(),
        (Some(_), Some(ratio)) if ratio >= 0.75 => "Almost there, one or two more glasses.".to_string(),
        (Some(_), Some(ratio)) if ratio >= 0.5 => "Halfway there. Keep sipping.".to_string(),
        (Some(_), Some(ratio)) if ratio > 0.0 => "Good start. Keep a bottle nearby.".to_string(),
        _ => "Nothing logged yet today. Start with a glass of water.".to_string(),
    }
}
