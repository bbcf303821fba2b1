use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::compiler::{EsTarget, JsxRuntime, DEFAULT_JSX_IMPORT_SOURCE};

/// Environment variable overriding the Deno executable.
pub const DENO_BIN_ENV: &str = "DENOLOAD_DENO_BIN";

/// Runtime configuration for the denoload CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Options for the Deno resolver plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenoOptions {
    /// Deno executable used for `deno info`.
    pub deno_bin: String,

    /// Deno config file (`deno.json`) forwarded as `--config`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,

    /// JSX runtime for transpiling foreign `.jsx`/`.tsx` modules.
    pub jsx_runtime: JsxRuntime,

    /// Module the automatic JSX runtime imports from (`react`, `preact`, ...).
    pub jsx_import_source: String,

    /// Output target for foreign modules.
    pub target: EsTarget,
}

impl Default for DenoOptions {
    fn default() -> Self {
        Self {
            deno_bin: "deno".to_string(),
            config_file: None,
            jsx_runtime: JsxRuntime::default(),
            jsx_import_source: DEFAULT_JSX_IMPORT_SOURCE.to_string(),
            target: EsTarget::default(),
        }
    }
}

impl DenoOptions {
    /// Defaults, with the Deno executable taken from `DENOLOAD_DENO_BIN` if set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(bin) = std::env::var(DENO_BIN_ENV) {
            if !bin.trim().is_empty() {
                options.deno_bin = bin;
            }
        }
        options
    }

    /// Set the Deno executable.
    #[must_use]
    pub fn with_deno_bin(mut self, bin: impl Into<String>) -> Self {
        self.deno_bin = bin.into();
        self
    }

    /// Set the Deno config file.
    #[must_use]
    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_file = Some(path);
        self
    }

    /// Set the JSX runtime.
    #[must_use]
    pub fn with_jsx_runtime(mut self, runtime: JsxRuntime) -> Self {
        self.jsx_runtime = runtime;
        self
    }

    /// Set the JSX import source.
    #[must_use]
    pub fn with_jsx_import_source(mut self, source: impl Into<String>) -> Self {
        self.jsx_import_source = source.into();
        self
    }

    /// Set the output target.
    #[must_use]
    pub fn with_target(mut self, target: EsTarget) -> Self {
        self.target = target;
        self
    }
}
