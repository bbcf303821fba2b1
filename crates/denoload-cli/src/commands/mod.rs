//! Subcommand implementations.

pub mod load;
pub mod resolve;
pub mod version;

use denoload_core::paths::absolute;
use denoload_core::PluginError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Error body of a failed `--json` document.
#[derive(Debug, Serialize)]
pub struct ErrorJson {
    pub code: String,
    pub message: String,
}

impl From<&PluginError> for ErrorJson {
    fn from(err: &PluginError) -> Self {
        Self {
            code: err.code.unwrap_or("DENOLOAD_ERROR").to_string(),
            message: err.to_string(),
        }
    }
}

/// Pick the project root: an explicit `--root`, else the nearest ancestor
/// of `cwd` with a root marker, else `cwd` itself. Always absolute.
pub fn project_root(cwd: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        let root = absolute(&cwd.join(root));
        return dunce::canonicalize(&root).unwrap_or(root);
    }
    denoload_core::paths::project_root(cwd).unwrap_or_else(|| absolute(cwd))
}
