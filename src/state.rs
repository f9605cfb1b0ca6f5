use crate::models::{BadgeDocument, LogDocument, Profile};
use crate::storage::{Documents, StorePaths};
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory view of the running app. Documents are replaced wholesale after
/// each action; `notice` holds the last message for the rendered page.
#[derive(Debug)]
pub struct Session {
    pub profile: Profile,
    pub logs: LogDocument,
    pub badges: BadgeDocument,
    pub eco_mode: bool,
    pub notice: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub paths: StorePaths,
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(paths: StorePaths, documents: Documents) -> Self {
        let session = Session {
            profile: documents.profile,
            logs: documents.logs,
            badges: documents.badges,
            eco_mode: false,
            notice: None,
        };
        Self {
            paths,
            session: Arc::new(Mutex::new(session)),
        }
    }
}
