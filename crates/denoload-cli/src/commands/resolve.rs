//! `denoload resolve` command implementation.
//!
//! Runs each specifier through a plugin container holding the Deno plugin,
//! exactly as a bundler would during `resolveId`.

use denoload_core::deno::is_deno_id;
use denoload_core::version::OUTPUT_SCHEMA_VERSION;
use denoload_core::{DenoOptions, DenoPlugin, PluginContainer, PluginError, ResolvedConfig};
use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::ErrorJson;

/// Resolve command action.
#[derive(Debug, Clone)]
pub struct ResolveAction {
    /// Specifiers, resolved in order.
    pub specifiers: Vec<String>,
    /// Project root handed to the plugin.
    pub root: PathBuf,
    /// Plugin options.
    pub options: DenoOptions,
}

/// JSON output for resolve command.
#[derive(Serialize)]
struct ResolveResultJson {
    ok: bool,
    schema_version: u32,
    root: String,
    results: Vec<ResolvedJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

#[derive(Debug, Serialize)]
struct ResolvedJson {
    specifier: String,
    /// `None` when the specifier was deferred to other resolvers.
    id: Option<String>,
    foreign: bool,
}

/// Run the resolve command.
pub fn run(action: ResolveAction, json: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
    let result = rt.block_on(resolve_all(&action.specifiers, &action.root, &action.options));

    match result {
        Ok(results) => {
            if json {
                let doc = ResolveResultJson {
                    ok: true,
                    schema_version: OUTPUT_SCHEMA_VERSION,
                    root: action.root.display().to_string(),
                    results,
                    error: None,
                };
                println!("{}", serde_json::to_string(&doc).into_diagnostic()?);
            } else {
                for result in &results {
                    match &result.id {
                        Some(id) => println!("{} -> {}", result.specifier, printable(id)),
                        None => println!("{} -> (deferred)", result.specifier),
                    }
                }
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let doc = ResolveResultJson {
                    ok: false,
                    schema_version: OUTPUT_SCHEMA_VERSION,
                    root: action.root.display().to_string(),
                    results: Vec::new(),
                    error: Some(ErrorJson::from(&e)),
                };
                println!("{}", serde_json::to_string(&doc).into_diagnostic()?);
                std::process::exit(1);
            }
            Err(miette!("{e}"))
        }
    }
}

async fn resolve_all(
    specifiers: &[String],
    root: &Path,
    options: &DenoOptions,
) -> Result<Vec<ResolvedJson>, PluginError> {
    let mut container = PluginContainer::new(root.to_path_buf());
    container.add(Box::new(DenoPlugin::new(options.clone())));
    container.call_config_resolved(&ResolvedConfig::with_root(root))?;
    container.build_start().await?;

    let mut results = Vec::with_capacity(specifiers.len());
    for specifier in specifiers {
        let id = container
            .resolve_id(specifier, None)
            .await?
            .map(|resolved| resolved.id);
        results.push(ResolvedJson {
            specifier: specifier.clone(),
            foreign: id.as_deref().is_some_and(is_deno_id),
            id,
        });
    }

    container.build_end().await?;
    Ok(results)
}

/// Virtual ids start with NUL; show it as `\0` on a terminal.
fn printable(id: &str) -> String {
    id.replace('\0', "\\0")
}
