use std::path::PathBuf;

use crate::options::AppOptions;

/// Startup arguments, independent of how they were parsed.
#[derive(Clone, Debug, Default)]
pub struct Args {
    /// Files and directories to load as if they had been dropped on the window.
    pub files: Vec<PathBuf>,
    pub options: AppOptions,
    pub asset_root: Option<String>,
    pub preload: Option<PathBuf>,
    pub placements: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub headless: bool,
}
