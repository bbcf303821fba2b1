//! Asking Deno whether it owns a specifier.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::DenoOptions;
use crate::error::{Error, Result};

/// Answer from an info source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoOutput {
    /// The specifier is understood; holds the raw JSON document.
    Understood(Vec<u8>),
    /// The specifier is not understood and should be left to other resolvers.
    NotUnderstood {
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Captured stderr, for logging only.
        stderr: String,
    },
}

/// Out-of-process authority that knows which specifiers it can resolve.
///
/// `DenoCli` is the real implementation; anything that maps "owns it" to
/// `Understood` with a `deno info --json` document can stand in.
#[async_trait::async_trait]
pub trait InfoSource: Send + Sync {
    /// Query `specifier`, running with `cwd` as the working directory.
    async fn info(&self, specifier: &str, cwd: &Path) -> Result<InfoOutput>;
}

/// Runs `deno info --json <specifier>`.
#[derive(Debug, Clone)]
pub struct DenoCli {
    bin: String,
    config_file: Option<PathBuf>,
}

impl DenoCli {
    /// Use the given executable.
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            config_file: None,
        }
    }

    /// Forward `--config <path>` to every query.
    #[must_use]
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Build from plugin options.
    pub fn from_options(options: &DenoOptions) -> Self {
        Self::new(options.deno_bin.clone()).with_config_file(options.config_file.clone())
    }

    /// Arguments passed to the executable for `specifier`.
    pub fn args(&self, specifier: &str) -> Vec<String> {
        let mut args = vec!["info".to_string(), "--json".to_string()];
        if let Some(config) = &self.config_file {
            args.push("--config".to_string());
            args.push(config.display().to_string());
        }
        args.push(specifier.to_string());
        args
    }
}

impl Default for DenoCli {
    fn default() -> Self {
        Self::new("deno")
    }
}

#[async_trait::async_trait]
impl InfoSource for DenoCli {
    async fn info(&self, specifier: &str, cwd: &Path) -> Result<InfoOutput> {
        tracing::debug!(bin = %self.bin, specifier, cwd = %cwd.display(), "spawning deno info");

        let output = Command::new(&self.bin)
            .args(self.args(specifier))
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: self.bin.clone(),
                source,
            })?;

        if output.status.success() {
            tracing::trace!(specifier, bytes = output.stdout.len(), "deno info succeeded");
            Ok(InfoOutput::Understood(output.stdout))
        } else {
            Ok(InfoOutput::NotUnderstood {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_without_config() {
        let cli = DenoCli::default();
        assert_eq!(cli.args("jsr:@std/path"), vec!["info", "--json", "jsr:@std/path"]);
    }

    #[test]
    fn test_args_with_config() {
        let options = DenoOptions::default()
            .with_deno_bin("/usr/local/bin/deno")
            .with_config_file(PathBuf::from("deno.json"));
        let cli = DenoCli::from_options(&options);
        assert_eq!(
            cli.args("@/utils.ts"),
            vec!["info", "--json", "--config", "deno.json", "@/utils.ts"]
        );
        assert_eq!(cli.bin, "/usr/local/bin/deno");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let cli = DenoCli::new("/nonexistent/denoload-test/deno");
        let err = cli.info("./main.ts", Path::new(".")).await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_codes_map_to_outcomes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-deno");
        std::fs::write(
            &script,
            "#!/bin/sh\nif [ \"$3\" = \"ok\" ]; then echo '{\"roots\":[]}'; exit 0; fi\necho nope >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cli = DenoCli::new(script.display().to_string());

        let ok = cli.info("ok", dir.path()).await.unwrap();
        assert!(matches!(ok, InfoOutput::Understood(ref out) if out.starts_with(b"{\"roots\"")));

        let no = cli.info("bad", dir.path()).await.unwrap();
        assert_eq!(
            no,
            InfoOutput::NotUnderstood {
                code: Some(1),
                stderr: "nope".to_string()
            }
        );
    }
}
