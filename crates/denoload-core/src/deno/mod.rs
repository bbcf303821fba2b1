//! Deno resolver/loader plugin.
//!
//! Every specifier the bundler meets is offered to `deno info --json`. If
//! Deno understands it, the plugin decides who loads the file:
//!
//! - files inside the project root, reached through a local root, resolve to
//!   their plain path and the bundler loads them like any other file;
//! - everything else (remote `http(s):` imports, `jsr:`/`npm:` registry
//!   imports, files outside the root) resolves to a virtual id
//!   `"\0deno:<local path>"`. The plugin's `load` hook reads the file from
//!   Deno's cache and transpiles it to JavaScript.
//!
//! Outcomes are memoized per specifier for the lifetime of the plugin, so
//! `deno info` runs at most once per distinct specifier.

pub mod cache;
pub mod command;
pub mod info;

pub use cache::ResolutionCache;
pub use command::{DenoCli, InfoOutput, InfoSource};
pub use info::{is_remote_specifier, DenoInfo, ModuleEntry};

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::compiler::{
    CompilerBackend, ModuleKind, SourceMapKind, SwcBackend, TranspileSpec,
};
use crate::config::DenoOptions;
use crate::error::{Error, Result};
use crate::paths::{self, is_outside_root};
use crate::plugin::{
    HookResult, LoadResult, Plugin, PluginContext, PluginEnforce, PluginError, ResolveIdResult,
    ResolvedConfig,
};

/// Prefix marking ids that only this plugin can load.
pub const DENO_PREFIX: &str = "\0deno:";

/// Plugin name used in errors and logs.
pub const PLUGIN_NAME: &str = "deno";

/// Whether `id` is a virtual id produced by this plugin.
#[must_use]
pub fn is_deno_id(id: &str) -> bool {
    id.starts_with(DENO_PREFIX)
}

/// Resolves specifiers through `deno info` and loads foreign modules.
///
/// One instance per build; it owns its cache, so dropping the plugin drops
/// every memoized outcome.
pub struct DenoPlugin {
    options: DenoOptions,
    root: RwLock<Option<PathBuf>>,
    source: Arc<dyn InfoSource>,
    compiler: Arc<dyn CompilerBackend>,
    cache: ResolutionCache,
}

impl DenoPlugin {
    /// Plugin backed by the Deno CLI and SWC.
    pub fn new(options: DenoOptions) -> Self {
        let source = Arc::new(DenoCli::from_options(&options));
        Self {
            options,
            root: RwLock::new(None),
            source,
            compiler: Arc::new(SwcBackend::new()),
            cache: ResolutionCache::default(),
        }
    }

    /// Replace the info source.
    #[must_use]
    pub fn with_info_source(mut self, source: Arc<dyn InfoSource>) -> Self {
        self.source = source;
        self
    }

    /// Replace the compiler backend used by `load`.
    #[must_use]
    pub fn with_compiler(mut self, compiler: Arc<dyn CompilerBackend>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Set the project root directly (what `config_resolved` does).
    pub fn set_root(&self, root: Option<PathBuf>) {
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = root;
    }

    /// Project root used as `deno info` cwd and for the inside/outside check.
    ///
    /// Falls back to the process working directory when no root was configured.
    /// A relative root is taken against the process working directory.
    pub fn root(&self) -> PathBuf {
        let root = self
            .root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        paths::absolute(&root)
    }

    /// The plugin's options.
    pub fn options(&self) -> &DenoOptions {
        &self.options
    }

    /// Number of specifiers processed so far.
    pub fn processed_count(&self) -> usize {
        self.cache.len()
    }

    /// Resolve `specifier`.
    ///
    /// Returns `Ok(None)` when Deno does not understand the specifier, so other
    /// resolvers can try. A repeated call returns the memoized outcome without
    /// running `deno info` again.
    pub async fn resolve(&self, specifier: &str) -> Result<Option<String>> {
        if let Some(hit) = self.cache.lookup(specifier) {
            tracing::debug!(specifier, resolved = ?hit, "resolution cache hit");
            return Ok(hit);
        }

        let gate = self.cache.gate(specifier);
        let _guard = gate.lock().await;

        // Another task may have finished while we waited.
        if let Some(hit) = self.cache.lookup(specifier) {
            return Ok(hit);
        }

        let result = self.resolve_uncached(specifier).await;
        self.cache.release(specifier, &gate);
        result
    }

    async fn resolve_uncached(&self, specifier: &str) -> Result<Option<String>> {
        let root = self.root();
        let output = self.source.info(specifier, &root).await?;

        let stdout = match output {
            InfoOutput::Understood(stdout) => stdout,
            InfoOutput::NotUnderstood { code, stderr } => {
                tracing::debug!(specifier, ?code, %stderr, "deno cannot resolve specifier, deferring");
                self.cache.finish(specifier, None);
                return Ok(None);
            }
        };

        match self.classify(specifier, &stdout, &root) {
            Ok(id) => {
                self.cache.finish(specifier, Some(id.clone()));
                Ok(Some(id))
            }
            Err(err) => {
                // Attempted once; later calls defer instead of retrying.
                self.cache.finish(specifier, None);
                Err(err)
            }
        }
    }

    /// Turn a `deno info` document into the id handed to the bundler.
    fn classify(&self, specifier: &str, stdout: &[u8], root: &Path) -> Result<String> {
        let info = DenoInfo::parse(specifier, stdout)?;
        let module = info.first_module(specifier)?;
        let local = module.local_path(specifier)?;

        let remote_root = info.has_remote_root();
        let outside = is_outside_root(root, local);

        if remote_root || outside {
            if let Some(media_type) = module.media_type {
                self.cache.set_media_type(local, media_type);
            }
            let id = format!("{DENO_PREFIX}{}", local.display());
            tracing::debug!(specifier, local = %local.display(), remote_root, outside, "foreign module");
            Ok(id)
        } else {
            tracing::debug!(specifier, local = %local.display(), "project module");
            Ok(local.display().to_string())
        }
    }

    /// Load a virtual id produced by `resolve`.
    ///
    /// Ids without the `"\0deno:"` prefix are not ours and yield `Ok(None)`.
    pub async fn load(&self, id: &str) -> Result<Option<LoadResult>> {
        let Some(local) = id.strip_prefix(DENO_PREFIX) else {
            return Ok(None);
        };
        let path = PathBuf::from(local);

        let code = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| Error::ReadModule {
                path: path.clone(),
                source,
            })?;

        let mut spec = TranspileSpec::new(&path)
            .with_sourcemaps(SourceMapKind::Inline)
            .with_module(ModuleKind::ESM)
            .with_target(self.options.target)
            .with_jsx_runtime(self.options.jsx_runtime)
            .with_jsx_import_source(self.options.jsx_import_source.clone());
        if let Some(media_type) = self.cache.media_type(&path) {
            spec = spec.with_media_type(media_type);
        }

        let compiler = Arc::clone(&self.compiler);
        let output = tokio::task::spawn_blocking(move || compiler.transpile(&spec, &code))
            .await
            .map_err(|e| Error::other(format!("transpile task failed: {e}")))?
            .map_err(|source| Error::Compile {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), bytes = output.code.len(), "loaded foreign module");

        Ok(Some(
            LoadResult::code(output.code)
                .with_map(output.source_map)
                .with_format(output.module),
        ))
    }
}

impl std::fmt::Debug for DenoPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenoPlugin")
            .field("options", &self.options)
            .field("root", &self.root)
            .field("compiler", &self.compiler.name())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn plugin_error(hook: &'static str, err: &Error) -> PluginError {
    PluginError::new(PLUGIN_NAME, hook, err.to_string()).with_code(err.code())
}

#[async_trait::async_trait]
impl Plugin for DenoPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    fn config_resolved(&self, config: &ResolvedConfig) -> HookResult<()> {
        self.set_root(config.root.clone());
        Ok(())
    }

    async fn resolve_id(
        &self,
        specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        self.resolve(specifier)
            .await
            .map(|id| id.map(ResolveIdResult::resolved))
            .map_err(|e| plugin_error("resolve_id", &e))
    }

    async fn load(&self, id: &str, _ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
        DenoPlugin::load(self, id)
            .await
            .map_err(|e| plugin_error("load", &e))
    }
}
