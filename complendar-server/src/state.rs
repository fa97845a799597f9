use std::path::{Path, PathBuf};
use std::sync::Arc;

use complendar_core::ComplendarConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    // Loaded once at startup; requests never change it
    config: Arc<ComplendarConfig>,
    output_dir: PathBuf,
}

impl AppState {
    pub fn new(config: ComplendarConfig, output_dir: PathBuf) -> Self {
        AppState {
            config: Arc::new(config),
            output_dir,
        }
    }

    pub fn config(&self) -> &ComplendarConfig {
        &self.config
    }

    /// Directory the generated calendars are written to and served from
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
