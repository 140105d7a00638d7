use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One article to convert: where it is and where it goes.
///
/// Created by the planner and consumed verbatim by the executor, either
/// directly or through the task manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Absolute path of the source Markdown file
    pub file_path: PathBuf,

    /// Base name of the source file, reused for the output file
    pub file_name: String,

    /// Directory containing the source file and its sibling assets
    pub src_dir: PathBuf,

    /// Destination directory
    pub out_dir: PathBuf,
}

impl Task {
    /// Builds a task for `file_path`, deriving the file and directory names.
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let src_dir = file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            file_path,
            file_name,
            src_dir,
            out_dir: out_dir.into(),
        }
    }

    /// Path the converted document is written to.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(&self.file_name)
    }
}
