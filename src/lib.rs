pub mod accounting;
pub mod app;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod profile;
pub mod stats;
pub mod storage;
pub mod ui;
pub mod state;

pub use app::router;
pub use state::AppState;
pub use storage::{load_documents, resolve_data_dir, StorePaths};
