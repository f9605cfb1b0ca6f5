use crate::errors::AppError;
use crate::models::{BadgeDocument, LogDocument, Profile};
use serde::{Serialize, de::DeserializeOwned};
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

pub fn resolve_data_dir() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_DIR") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data"))
}

/// Locations of the three documents. Each is read and written on its own.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub profile: PathBuf,
    pub logs: PathBuf,
    pub badges: PathBuf,
}

impl StorePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            profile: dir.join("profile.json"),
            logs: dir.join("logs.json"),
            badges: dir.join("badges.json"),
        }
    }
}

/// Reads a JSON document, falling back to the default when the file is
/// missing or cannot be parsed.
pub async fn load_document<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse {}: {err}", path.display());
                T::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => T::default(),
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            T::default()
        }
    }
}

pub async fn persist_document<T: Serialize>(path: &Path, data: &T) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await?;
    Ok(())
}

/// Loads the profile, writing the default record on first run.
pub async fn load_profile(path: &Path) -> Profile {
    if fs::try_exists(path).await.unwrap_or(false) {
        return load_document(path).await;
    }

    let profile = Profile::default();
    match persist_document(path, &profile).await {
        Ok(()) => info!("created default profile at {}", path.display()),
        Err(err) => error!("failed to write default profile: {}", err.message),
    }
    profile
}

pub struct Documents {
    pub profile: Profile,
    pub logs: LogDocument,
    pub badges: BadgeDocument,
}

pub async fn load_documents(paths: &StorePaths) -> Documents {
    Documents {
        profile: load_profile(&paths.profile).await,
        logs: load_document(&paths.logs).await,
        badges: load_document(&paths.badges).await,
    }
}

pub fn export_csv(logs: &LogDocument) -> String {
    let mut out = String::from("date,timestamp,amount_ml,eco,note\n");
    for (date, entries) in &logs.days {
        for entry in entries {
            let note = entry.note.as_deref().map(csv_field).unwrap_or_default();
            out.push_str(&format!(
                "{date},{},{},{},{note}\n",
                entry.timestamp, entry.amount_ml, entry.eco
            ));
        }
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BadgeState, LogEntry};

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("water_buddy_{tag}_{}_{}", std::process::id(), nanos));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    fn entry(amount_ml: u32, note: Option<&str>) -> LogEntry {
        LogEntry {
            amount_ml,
            eco: false,
            timestamp: "2026-01-05T08:00:00+00:00".to_string(),
            note: note.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn missing_files_load_defaults_and_create_profile() {
        let dir = temp_dir("missing");
        let paths = StorePaths::in_dir(&dir);

        let docs = load_documents(&paths).await;
        assert_eq!(docs.profile, Profile::default());
        assert!(docs.logs.days.is_empty());
        assert!(docs.badges.badges.is_empty());
        assert!(paths.profile.exists());
        assert!(!paths.logs.exists());
    }

    #[tokio::test]
    async fn malformed_document_falls_back_to_default() {
        let dir = temp_dir("malformed");
        let paths = StorePaths::in_dir(&dir);
        std::fs::write(&paths.logs, b"{not json").unwrap();
        std::fs::write(&paths.profile, b"[]").unwrap();

        let logs: LogDocument = load_document(&paths.logs).await;
        let profile: Profile = load_profile(&paths.profile).await;
        assert!(logs.days.is_empty());
        assert_eq!(profile, Profile::default());
    }

    #[tokio::test]
    async fn documents_use_the_flat_layout() {
        let dir = temp_dir("layout");
        let paths = StorePaths::in_dir(&dir);

        let mut logs = LogDocument::default();
        logs.days
            .insert("2026-01-05".to_string(), vec![entry(250, None)]);
        let mut badges = BadgeDocument::default();
        badges.badges.insert(
            "daily-goal".to_string(),
            BadgeState {
                earned: true,
                earned_date: Some("2026-01-05".to_string()),
            },
        );
        persist_document(&paths.logs, &logs).await.unwrap();
        persist_document(&paths.badges, &badges).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths.logs).unwrap()).unwrap();
        assert_eq!(raw["2026-01-05"][0]["amount_ml"], 250);
        assert_eq!(raw["2026-01-05"][0]["eco"], false);
        assert!(raw["2026-01-05"][0].get("note").is_none());

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&paths.badges).unwrap()).unwrap();
        assert_eq!(raw["daily-goal"]["earned"], true);
        assert_eq!(raw["daily-goal"]["earned_date"], "2026-01-05");

        let reloaded: LogDocument = load_document(&paths.logs).await;
        assert_eq!(reloaded, logs);
    }

    #[tokio::test]
    async fn persist_to_missing_directory_fails() {
        let dir = temp_dir("gone").join("does/not/exist");
        let err = persist_document(&dir.join("logs.json"), &LogDocument::default())
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn csv_quotes_notes_with_commas() {
        let mut logs = LogDocument::default();
        logs.days.insert(
            "2026-01-05".to_string(),
            vec![entry(250, None), entry(500, Some("lunch, with \"ice\""))],
        );

        let csv = export_csv(&logs);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,timestamp,amount_ml,eco,note");
        assert_eq!(lines[1], "2026-01-05,2026-01-05T08:00:00+00:00,250,false,");
        assert_eq!(
            lines[2],
            "2026-01-05,2026-01-05T08:00:00+00:00,500,false,\"lunch, with \"\"ice\"\"\""
        );
    }
}
