//! `denoload load` command implementation.

use denoload_core::version::OUTPUT_SCHEMA_VERSION;
use denoload_core::{DenoOptions, DenoPlugin, LoadResult, PluginContainer, PluginError, ResolvedConfig};
use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::ErrorJson;

/// Load command action.
#[derive(Debug, Clone)]
pub struct LoadAction {
    /// Module id, with a real NUL for virtual ids.
    pub id: String,
    /// Project root handed to the plugin.
    pub root: PathBuf,
    /// Plugin options.
    pub options: DenoOptions,
}

/// JSON output for load command.
#[derive(Serialize)]
struct LoadResultJson {
    ok: bool,
    schema_version: u32,
    id: String,
    /// Whether a plugin claimed the id.
    handled: bool,
    code: Option<String>,
    map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

/// Turn a leading literal `\0` into NUL.
///
/// Process arguments cannot carry NUL bytes, so virtual ids are typed
/// as `\0deno:/path`.
pub fn unescape_id(id: &str) -> String {
    match id.strip_prefix("\\0") {
        Some(rest) => format!("\0{rest}"),
        None => id.to_string(),
    }
}

/// Run the load command.
pub fn run(action: LoadAction, json: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
    let result = rt.block_on(load(&action.id, &action.root, &action.options));

    match result {
        Ok(loaded) => {
            if json {
                let handled = loaded.is_some();
                let (code, map) = loaded.map_or((None, None), |l| (Some(l.code), l.map));
                let doc = LoadResultJson {
                    ok: true,
                    schema_version: OUTPUT_SCHEMA_VERSION,
                    id: action.id,
                    handled,
                    code,
                    map,
                    error: None,
                };
                println!("{}", serde_json::to_string(&doc).into_diagnostic()?);
            } else if let Some(loaded) = loaded {
                print!("{}", loaded.code);
                if !loaded.code.ends_with('\n') {
                    println!();
                }
            } else {
                tracing::info!(id = %action.id.replace('\0', "\\0"), "id not handled by any plugin");
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let doc = LoadResultJson {
                    ok: false,
                    schema_version: OUTPUT_SCHEMA_VERSION,
                    id: action.id,
                    handled: false,
                    code: None,
                    map: None,
                    error: Some(ErrorJson::from(&e)),
                };
                println!("{}", serde_json::to_string(&doc).into_diagnostic()?);
                std::process::exit(1);
            }
            Err(miette!("{e}"))
        }
    }
}

async fn load(
    id: &str,
    root: &Path,
    options: &DenoOptions,
) -> Result<Option<LoadResult>, PluginError> {
    let mut container = PluginContainer::new(root.to_path_buf());
    container.add(Box::new(DenoPlugin::new(options.clone())));
    container.call_config_resolved(&ResolvedConfig::with_root(root))?;
    container.build_start().await?;
    let loaded = container.load(id).await?;
    container.build_end().await?;
    Ok(loaded)
}
