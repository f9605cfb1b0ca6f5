use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    #[default]
    #[serde(alias = "normal")]
    Medium,
    High,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "normal" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub daily_goal_ml: u32,
}

impl Profile {
    /// The goal, or `None` when no positive goal is configured.
    pub fn goal(&self) -> Option<u32> {
        (self.daily_goal_ml > 0).then_some(self.daily_goal_ml)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub amount_ml: u32,
    #[serde(default)]
    pub eco: bool,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Entries bucketed by ISO date (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct LogDocument {
    pub days: BTreeMap<String, Vec<LogEntry>>,
}

impl LogDocument {
    pub fn total_for(&self, date: &str) -> u64 {
        self.days
            .get(date)
            .map(|entries| entries.iter().map(|entry| u64::from(entry.amount_ml)).sum())
            .unwrap_or(0)
    }

    pub fn entry_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// The `limit` most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<EntryView> {
        self.days
            .iter()
            .rev()
            .flat_map(|(date, entries)| {
                entries.iter().rev().map(move |entry| EntryView {
                    date: date.clone(),
                    timestamp: entry.timestamp.clone(),
                    amount_ml: entry.amount_ml,
                    eco: entry.eco,
                    note: entry.note.clone(),
                })
            })
            .take(limit)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryView {
    pub date: String,
    pub timestamp: String,
    pub amount_ml: u32,
    pub eco: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeId {
    FirstLog,
    DailyGoal,
    SevenDayStreak,
    OneLiterChallenge,
}

impl BadgeId {
    pub const ALL: [BadgeId; 4] = [
        Self::FirstLog,
        Self::DailyGoal,
        Self::SevenDayStreak,
        Self::OneLiterChallenge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstLog => "first-log",
            Self::DailyGoal => "daily-goal",
            Self::SevenDayStreak => "seven-day-streak",
            Self::OneLiterChallenge => "one-liter-challenge",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::FirstLog => "First sip",
            Self::DailyGoal => "Goal reached",
            Self::SevenDayStreak => "7-day streak",
            Self::OneLiterChallenge => "1-liter challenge",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FirstLog => "Log your first drink.",
            Self::DailyGoal => "Drink your full daily goal in one day.",
            Self::SevenDayStreak => "Meet your goal seven days in a row.",
            Self::OneLiterChallenge => "Drink at least 1000 ml in a single day.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BadgeState {
    pub earned: bool,
    pub earned_date: Option<String>,
}

/// Badge state keyed by badge identifier string. Unknown keys are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct BadgeDocument {
    pub badges: BTreeMap<String, BadgeState>,
}

impl BadgeDocument {
    pub fn get(&self, id: BadgeId) -> BadgeState {
        self.badges.get(id.as_str()).cloned().unwrap_or_default()
    }

    pub fn is_earned(&self, id: BadgeId) -> bool {
        self.badges.get(id.as_str()).is_some_and(|state| state.earned)
    }

    /// Every known badge in display order, earned or not.
    pub fn gallery(&self) -> Vec<BadgeView> {
        BadgeId::ALL
            .into_iter()
            .map(|id| {
                let state = self.get(id);
                BadgeView {
                    id: id.as_str().to_string(),
                    title: id.title().to_string(),
                    description: id.description().to_string(),
                    earned: state.earned,
                    earned_date: state.earned_date,
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct LogRequest {
    /// Kept as raw JSON so a fractional or textual amount is rejected with the
    /// same message as the form.
    #[serde(default)]
    pub amount_ml: serde_json::Value,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogForm {
    pub amount_ml: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub age: i64,
    pub weight: f64,
    pub activity_level: String,
    #[serde(default)]
    pub daily_goal_ml: Option<i64>,
}

/// HTML forms send every field as text, including an empty goal.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub age: String,
    pub weight: String,
    pub activity_level: String,
    #[serde(default)]
    pub daily_goal_ml: String,
}

#[derive(Debug, Deserialize)]
pub struct EcoRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecommendedGoalQuery {
    pub weight: f64,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub activity_level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendedGoalResponse {
    pub daily_goal_ml: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    pub consumed_ml: u64,
    pub goal_ml: Option<u32>,
    pub remaining_ml: Option<u64>,
    pub progress: Option<f64>,
    pub progress_display: Option<f64>,
    pub goal_exceeded: bool,
    pub entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub earned: bool,
    pub earned_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
    pub summary: DailySummary,
    pub badges: Vec<BadgeView>,
    pub newly_earned: Vec<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EcoResponse {
    pub eco_mode: bool,
    pub suggestion: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub total_ml: u64,
    pub goal_met: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub total_ml: u64,
    pub days_counted: u8,
    pub avg_ml: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Insights {
    pub avg_14_days_ml: u64,
    pub week_total_ml: u64,
    pub refill_bottles: f64,
    pub co2_saved_kg: f64,
    pub adjustment: f64,
    pub suggestion: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub goal_ml: Option<u32>,
    pub last_7_days: Vec<DailyPoint>,
    pub weekly_totals: Vec<WeeklyPoint>,
    pub insights: Insights,
}
