use crate::accounting::{evaluate_badges, json_amount, parse_amount, record_entry, summarize_day};
use crate::errors::AppError;
use crate::models::{
    ActivityLevel, BadgeView, DailySummary, EcoRequest, EcoResponse, EntryView, LogEntry, LogForm,
    LogRequest, LogResponse, Profile, ProfileForm, ProfileInput, ProfileResponse,
    RecommendedGoalQuery, RecommendedGoalResponse, StatsResponse,
};
use crate::profile::{WEIGHT_RANGE, recommended_goal_ml, validate_profile};
use crate::state::AppState;
use crate::stats::{build_stats, build_stats_at};
use crate::storage::{export_csv, persist_document};
use crate::ui::render_index;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
};
use chrono::Local;
use tracing::{info, warn};

const MAX_NOTE_CHARS: usize = 200;
const RECENT_ENTRIES: usize = 10;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let today = Local::now().date_naive();
    let mut session = state.session.lock().await;
    let notice = session.notice.take();
    let summary = summarize_day(today, &session.logs, session.profile.goal());
    let stats = build_stats(&session.logs, session.profile.goal(), session.eco_mode);
    Html(render_index(
        &session.profile,
        &summary,
        &session.badges.gallery(),
        &session.logs.recent(RECENT_ENTRIES),
        &stats,
        session.eco_mode,
        notice.as_deref(),
    ))
}

pub async fn get_today(State(state): State<AppState>) -> Json<DailySummary> {
    let today = Local::now().date_naive();
    let session = state.session.lock().await;
    Json(summarize_day(today, &session.logs, session.profile.goal()))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let session = state.session.lock().await;
    Json(build_stats(&session.logs, session.profile.goal(), session.eco_mode))
}

pub async fn get_badges(State(state): State<AppState>) -> Json<Vec<BadgeView>> {
    let session = state.session.lock().await;
    Json(session.badges.gallery())
}

pub async fn get_entries(State(state): State<AppState>) -> Json<Vec<EntryView>> {
    let session = state.session.lock().await;
    Json(session.logs.recent(RECENT_ENTRIES))
}

pub async fn log_drink(
    State(state): State<AppState>,
    Json(payload): Json<LogRequest>,
) -> Result<Json<LogResponse>, AppError> {
    let amount_ml = json_amount(&payload.amount_ml)?;
    Ok(Json(apply_log(&state, amount_ml, payload.note).await))
}

pub async fn log_drink_form(State(state): State<AppState>, Form(form): Form<LogForm>) -> Redirect {
    let message = match parse_amount(&form.amount_ml) {
        Ok(amount_ml) => {
            let response = apply_log(&state, amount_ml, form.note).await;
            response.notice.unwrap_or_else(|| logged_message(amount_ml, &response.newly_earned))
        }
        Err(err) => err.message,
    };
    state.session.lock().await.notice = Some(message);
    Redirect::to("/")
}

pub async fn get_profile(State(state): State<AppState>) -> Json<Profile> {
    let session = state.session.lock().await;
    Json(session.profile.clone())
}

pub async fn put_profile(
    State(state): State<AppState>,
    Json(payload): Json<ProfileInput>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = validate_profile(payload)?;
    Ok(Json(apply_profile(&state, profile).await))
}

pub async fn profile_form(State(state): State<AppState>, Form(form): Form<ProfileForm>) -> Redirect {
    let result = ProfileInput::try_from(form).and_then(validate_profile);
    let message = match result {
        Ok(profile) => apply_profile(&state, profile)
            .await
            .notice
            .unwrap_or_else(|| "Profile saved.".to_string()),
        Err(err) => err.message,
    };
    state.session.lock().await.notice = Some(message);
    Redirect::to("/")
}

pub async fn set_eco(
    State(state): State<AppState>,
    Json(payload): Json<EcoRequest>,
) -> Json<EcoResponse> {
    Json(apply_eco(&state, |_| payload.enabled).await)
}

pub async fn eco_toggle_form(State(state): State<AppState>) -> Redirect {
    apply_eco(&state, |enabled| !enabled).await;
    Redirect::to("/")
}

pub async fn recommended_goal(
    Query(query): Query<RecommendedGoalQuery>,
) -> Result<Json<RecommendedGoalResponse>, AppError> {
    if !query.weight.is_finite() || !WEIGHT_RANGE.contains(&query.weight) {
        return Err(AppError::bad_request(format!(
            "weight must be between {} and {} kg",
            WEIGHT_RANGE.start(),
            WEIGHT_RANGE.end()
        )));
    }
    let activity = match query.activity_level.as_deref() {
        Some(raw) => ActivityLevel::parse(raw)
            .ok_or_else(|| AppError::bad_request("activity level must be 'low', 'medium' or 'high'"))?,
        None => ActivityLevel::default(),
    };

    Ok(Json(RecommendedGoalResponse {
        daily_goal_ml: recommended_goal_ml(query.weight, query.age, activity),
    }))
}

pub async fn export_logs(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"water_buddy_logs.csv\"",
            ),
        ],
        export_csv(&session.logs),
    )
}

/// Appends an entry for today, re-runs badge evaluation and saves both
/// documents. The session is updated before any write, so a failed write only
/// produces a notice.
async fn apply_log(state: &AppState, amount_ml: u32, note: Option<String>) -> LogResponse {
    let now = Local::now();
    let today = now.date_naive();
    let mut session = state.session.lock().await;

    let entry = LogEntry {
        amount_ml,
        eco: session.eco_mode,
        timestamp: now.to_rfc3339(),
        note: clean_note(note),
    };
    let logs = record_entry(&session.logs, today, entry);
    let goal = session.profile.goal();
    let evaluation = evaluate_badges(today, &logs, goal, &session.badges);

    session.logs = logs;
    session.badges = evaluation.badges;

    let mut failures = Vec::new();
    if let Err(err) = persist_document(&state.paths.logs, &session.logs).await {
        warn!("failed to save logs: {err}");
        failures.push("log");
    }
    if !evaluation.newly_earned.is_empty() {
        if let Err(err) = persist_document(&state.paths.badges, &session.badges).await {
            warn!("failed to save badges: {err}");
            failures.push("badges");
        }
    }

    let newly_earned: Vec<String> = evaluation
        .newly_earned
        .iter()
        .map(|id| id.as_str().to_string())
        .collect();
    if !newly_earned.is_empty() {
        info!(badges = ?newly_earned, "badges earned");
    }

    LogResponse {
        summary: summarize_day(today, &session.logs, goal),
        badges: session.badges.gallery(),
        newly_earned,
        notice: unsaved_notice(&failures),
    }
}

async fn apply_profile(state: &AppState, profile: Profile) -> ProfileResponse {
    let mut session = state.session.lock().await;
    session.profile = profile;

    let mut failures = Vec::new();
    if let Err(err) = persist_document(&state.paths.profile, &session.profile).await {
        warn!("failed to save profile: {err}");
        failures.push("profile");
    }
    info!(goal_ml = session.profile.daily_goal_ml, "profile updated");

    ProfileResponse {
        profile: session.profile.clone(),
        notice: unsaved_notice(&failures),
    }
}

/// Sets eco mode from its current value while holding the session lock.
async fn apply_eco(state: &AppState, update: impl FnOnce(bool) -> bool) -> EcoResponse {
    let today = Local::now().date_naive();
    let mut session = state.session.lock().await;
    let enabled = update(session.eco_mode);
    session.eco_mode = enabled;

    info!(enabled, "eco mode toggled");

    let stats = build_stats_at(today, &session.logs, session.profile.goal(), enabled);
    EcoResponse {
        eco_mode: enabled,
        suggestion: stats.insights.suggestion,
    }
}

fn clean_note(note: Option<String>) -> Option<String> {
    let note = note?;
    let trimmed = note.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_NOTE_CHARS).collect())
}

fn logged_message(amount_ml: u32, newly_earned: &[String]) -> String {
    if newly_earned.is_empty() {
        format!("Logged {amount_ml} ml.")
    } else {
        format!("Logged {amount_ml} ml. New badge: {}", newly_earned.join(", "))
    }
}

fn unsaved_notice(failures: &[&str]) -> Option<String> {
    if failures.is_empty() {
        return None;
    }
    Some(format!(
        "Could not save {} to disk. Changes are kept for this session only.",
        failures.join(" and ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BadgeDocument, LogDocument};
    use crate::storage::{Documents, StorePaths};
    use std::path::PathBuf;

    fn missing_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("water_buddy_{tag}_{}_{}", std::process::id(), nanos));
        path.join("not/created")
    }

    fn state_in(dir: &std::path::Path) -> AppState {
        AppState::new(
            StorePaths::in_dir(dir),
            Documents {
                profile: Profile::default(),
                logs: LogDocument::default(),
                badges: BadgeDocument::default(),
            },
        )
    }

    #[tokio::test]
    async fn failed_log_write_keeps_entry_in_session() {
        let dir = missing_dir("unwritable_log");
        let state = state_in(&dir);

        let response = apply_log(&state, 250, Some("desk".to_string())).await;
        assert_eq!(
            response.notice.as_deref(),
            Some("Could not save log and badges to disk. Changes are kept for this session only.")
        );
        assert_eq!(response.summary.consumed_ml, 250);
        assert_eq!(response.summary.entries, 1);
        assert_eq!(response.newly_earned, vec!["first-log".to_string()]);

        let session = state.session.lock().await;
        assert_eq!(session.logs.entry_count(), 1);
        assert!(session.badges.is_earned(crate::models::BadgeId::FirstLog));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn failed_profile_write_keeps_profile_in_session() {
        let dir = missing_dir("unwritable_profile");
        let state = state_in(&dir);
        let profile = Profile {
            name: "Sam".to_string(),
            daily_goal_ml: 1800,
            ..Profile::default()
        };

        let response = apply_profile(&state, profile.clone()).await;
        assert_eq!(
            response.notice.as_deref(),
            Some("Could not save profile to disk. Changes are kept for this session only.")
        );
        assert_eq!(response.profile, profile);
        assert_eq!(state.session.lock().await.profile, profile);
    }

    #[tokio::test]
    async fn eco_toggle_flips_current_mode() {
        let state = state_in(&missing_dir("eco"));

        assert!(apply_eco(&state, |enabled| !enabled).await.eco_mode);
        assert!(state.session.lock().await.eco_mode);
        assert!(!apply_eco(&state, |enabled| !enabled).await.eco_mode);
        assert!(apply_eco(&state, |_| true).await.eco_mode);
        assert!(apply_eco(&state, |_| true).await.eco_mode);
    }

    #[test]
    fn notes_are_trimmed_and_capped() {
        assert_eq!(clean_note(None), None);
        assert_eq!(clean_note(Some("   ".to_string())), None);
        assert_eq!(clean_note(Some(" after run ".to_string())).as_deref(), Some("after run"));
        let long = "x".repeat(MAX_NOTE_CHARS + 50);
        assert_eq!(clean_note(Some(long)).unwrap().len(), MAX_NOTE_CHARS);
    }

    #[test]
    fn unsaved_notice_names_each_document() {
        assert_eq!(unsaved_notice(&[]), None);
        assert_eq!(
            unsaved_notice(&["log", "badges"]).as_deref(),
            Some("Could not save log and badges to disk. Changes are kept for this session only.")
        );
    }
}
