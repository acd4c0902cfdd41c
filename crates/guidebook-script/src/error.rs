//! Guide loading errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a campaign guide.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The guide document could not be read.
    #[error("failed to read guide {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The guide document is not valid YAML/JSON for the script model.
    #[error("failed to parse guide: {0}")]
    Parse(String),

    /// The guide parsed but its step graph is inconsistent.
    #[error("guide {guide_id} is invalid: {}", .issues.join("; "))]
    Invalid {
        /// The offending guide.
        guide_id: String,
        /// Every structural problem found.
        issues: Vec<String>,
    },

    /// Two documents declare the same guide id.
    #[error("duplicate guide id: {0}")]
    DuplicateGuide(String),
}
