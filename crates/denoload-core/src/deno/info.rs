//! The `deno info --json` document.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::compiler::MediaType;
use crate::error::{Error, Result};

/// Root specifier schemes that mark a module as a remote or registry import.
pub const REMOTE_SCHEMES: &[&str] = &["http://", "https://", "jsr:", "npm:"];

/// Parsed output of `deno info --json <specifier>`.
#[derive(Debug, Clone, Deserialize)]
pub struct DenoInfo {
    /// Schema version of the document.
    #[serde(default)]
    pub version: u32,
    /// Original specifier → redirected specifier.
    #[serde(default)]
    pub redirects: BTreeMap<String, String>,
    /// Root specifiers, as requested.
    #[serde(default)]
    pub roots: Vec<String>,
    /// Module graph entries; the first one describes the requested root.
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

/// One module in the `deno info` graph.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    /// Module kind tag (`esm`, `npm`, `asserted`, ...).
    #[serde(default)]
    pub kind: Option<String>,
    /// Absolute path of the module in the project or Deno's cache.
    #[serde(default)]
    pub local: Option<PathBuf>,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Declared media type.
    #[serde(default)]
    pub media_type: Option<MediaType>,
    /// Canonical specifier.
    pub specifier: String,
    /// Set by Deno when the module could not be loaded.
    #[serde(default)]
    pub error: Option<String>,
}

impl DenoInfo {
    /// Parse the stdout of `deno info --json`.
    pub fn parse(specifier: &str, stdout: &[u8]) -> Result<Self> {
        serde_json::from_slice(stdout).map_err(|source| Error::InfoParse {
            specifier: specifier.to_string(),
            source,
        })
    }

    /// The module entry that answers the query.
    pub fn first_module(&self, specifier: &str) -> Result<&ModuleEntry> {
        self.modules.first().ok_or_else(|| Error::EmptyModules {
            specifier: specifier.to_string(),
        })
    }

    /// Whether any root was requested through a remote or registry scheme.
    #[must_use]
    pub fn has_remote_root(&self) -> bool {
        self.roots.iter().any(|root| is_remote_specifier(root))
    }
}

impl ModuleEntry {
    /// The local file path, or an error if Deno did not report one.
    pub fn local_path(&self, specifier: &str) -> Result<&PathBuf> {
        self.local.as_ref().ok_or_else(|| Error::MissingLocal {
            specifier: specifier.to_string(),
        })
    }
}

/// Whether `specifier` starts with `http://`, `https://`, `jsr:` or `npm:`.
#[must_use]
pub fn is_remote_specifier(specifier: &str) -> bool {
    REMOTE_SCHEMES
        .iter()
        .any(|scheme| specifier.starts_with(scheme))
}
