use crate::accounting::date_key;
use crate::models::{DailyPoint, Insights, LogDocument, StatsResponse, WeeklyPoint};
use chrono::{Datelike, Duration, Local, NaiveDate};

pub const BOTTLE_ML: f64 = 500.0;
pub const CO2_KG_PER_BOTTLE: f64 = 0.082;

pub fn build_stats(logs: &LogDocument, goal_ml: Option<u32>, eco_mode: bool) -> StatsResponse {
    build_stats_at(Local::now().date_naive(), logs, goal_ml, eco_mode)
}

pub fn build_stats_at(
    today: NaiveDate,
    logs: &LogDocument,
    goal_ml: Option<u32>,
    eco_mode: bool,
) -> StatsResponse {
    const WEEK_COUNT: usize = 8;
    let goal_ml = goal_ml.filter(|goal| *goal > 0);

    let last_7_days: Vec<DailyPoint> = daily_totals(today, logs, 7)
        .into_iter()
        .map(|(date, total_ml)| DailyPoint {
            date: date.to_string(),
            total_ml,
            goal_met: goal_ml.is_some_and(|goal| total_ml >= u64::from(goal)),
        })
        .collect();

    let current_week_start = week_start(today);
    let mut weekly_totals = Vec::with_capacity(WEEK_COUNT);

    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let end = start + Duration::days(6);

        let mut total_ml = 0u64;
        for day_offset in 0..7 {
            let date = start + Duration::days(day_offset);
            total_ml = total_ml.saturating_add(logs.total_for(&date_key(date)));
        }

        let days_counted = if today < start {
            0
        } else if today > end {
            7
        } else {
            (today - start).num_days() as u8 + 1
        };

        let denom = if days_counted == 0 { 1.0 } else { f64::from(days_counted) };

        weekly_totals.push(WeeklyPoint {
            week: week_label(start),
            start_date: start.to_string(),
            end_date: end.to_string(),
            total_ml,
            days_counted,
            avg_ml: total_ml as f64 / denom,
        });
    }

    let last_14_days = daily_totals(today, logs, 14);
    let avg_14_days_ml = last_14_days.iter().map(|(_, total)| total).sum::<u64>() / 14;
    let week_total_ml: u64 = last_7_days.iter().map(|day| day.total_ml).sum();
    let refill_bottles = week_total_ml as f64 / BOTTLE_ML;
    let adjustment = intake_adjustment(&last_7_days, goal_ml);

    StatsResponse {
        goal_ml,
        last_7_days,
        weekly_totals,
        insights: Insights {
            avg_14_days_ml,
            week_total_ml,
            refill_bottles,
            co2_saved_kg: refill_bottles * CO2_KG_PER_BOTTLE,
            adjustment,
            suggestion: suggestion(adjustment, eco_mode).to_string(),
        },
    }
}

/// Totals for the `days` calendar days ending at `today`, oldest first.
pub fn daily_totals(today: NaiveDate, logs: &LogDocument, days: i64) -> Vec<(NaiveDate, u64)> {
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            (date, logs.total_for(&date_key(date)))
        })
        .collect()
}

/// How much harder to nudge, from the average of the last three days against
/// the goal.
fn intake_adjustment(last_7_days: &[DailyPoint], goal_ml: Option<u32>) -> f64 {
    let Some(goal) = goal_ml else {
        return 1.0;
    };
    let recent = &last_7_days[last_7_days.len().saturating_sub(3)..];
    if recent.is_empty() {
        return 1.0;
    }
    let avg = recent.iter().map(|day| day.total_ml as f64).sum::<f64>() / recent.len() as f64;
    let goal = f64::from(goal);
    if avg < 0.7 * goal {
        1.2
    } else if avg < 0.9 * goal {
        1.05
    } else {
        1.0
    }
}

pub fn suggestion(adjustment: f64, eco_mode: bool) -> &'static str {
    let behind = adjustment > 1.05;
    match (behind, eco_mode) {
        (true, false) => {
            "Recent intake is below your goal. Try smaller, more frequent sips through the day."
        }
        (true, true) => {
            "Recent intake is below your goal. Keep a refillable bottle on your desk and top it up from the tap."
        }
        (false, false) => "You're doing well! Keep the streak going.",
        (false, true) => "You're doing well! Every refill saves a single-use bottle.",
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}
