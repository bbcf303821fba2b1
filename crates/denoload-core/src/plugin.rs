//! Plugin contract between a bundler and its plugins.
//!
//! A Rollup/Vite-style hook interface. Hooks are async so plugins can wait on
//! subprocesses and file I/O without blocking the bundler's runtime.
//!
//! ## Example
//!
//! ```ignore
//! use denoload_core::plugin::{HookResult, LoadResult, Plugin, PluginContext};
//!
//! struct TextPlugin;
//!
//! #[async_trait::async_trait]
//! impl Plugin for TextPlugin {
//!     fn name(&self) -> &str { "text" }
//!
//!     async fn load(&self, id: &str, _ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
//!         if let Some(text) = id.strip_prefix("\0text:") {
//!             return Ok(Some(LoadResult::code(format!("export default {text:?};"))));
//!         }
//!         Ok(None)
//!     }
//! }
//! ```

use rustc_hash::FxHashMap as HashMap;
use std::path::PathBuf;

use crate::compiler::ModuleKind;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin.
#[derive(Debug)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Stable error code, when the plugin provides one.
    pub code: Option<&'static str>,
    /// Error message.
    pub message: String,
}

impl PluginError {
    /// Create a plugin error without a code.
    pub fn new(plugin: impl Into<String>, hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            code: None,
            message: message.into(),
        }
    }

    /// Attach a stable error code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Context passed to plugin hooks.
#[derive(Debug, Default)]
pub struct PluginContext {
    /// Working directory.
    pub cwd: PathBuf,
    /// Environment variables.
    pub env: HashMap<String, String>,
    /// Whether this is a watch/dev build.
    pub watch: bool,
}

impl PluginContext {
    /// Create a new plugin context.
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            env: std::env::vars().collect(),
            watch: false,
        }
    }
}

/// Final build configuration, handed to `config_resolved`.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// Project root. `None` means "use the process working directory".
    pub root: Option<PathBuf>,
    /// Build mode (e.g. "development", "production").
    pub mode: String,
}

impl ResolvedConfig {
    /// Config rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            mode: "development".to_string(),
        }
    }
}

/// Result of resolve hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveIdResult {
    /// Resolved module ID (a file path or a `\0`-prefixed virtual id).
    pub id: String,
    /// Whether this module is external (don't bundle).
    pub external: bool,
}

impl ResolveIdResult {
    /// Create a resolved module result.
    pub fn resolved(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: false,
        }
    }

    /// Create an external module result.
    pub fn external(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: true,
        }
    }

    /// Whether the id is virtual, i.e. only its originating plugin can load it.
    pub fn is_virtual(&self) -> bool {
        self.id.starts_with('\0')
    }
}

/// Result of load hook.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Module source code.
    pub code: String,
    /// Optional source map.
    pub map: Option<String>,
    /// Module format of `code`, when the plugin knows it.
    pub format: Option<ModuleKind>,
}

impl LoadResult {
    /// Create a load result with code only.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            map: None,
            format: None,
        }
    }

    /// Attach a source map.
    pub fn with_map(mut self, map: Option<String>) -> Self {
        self.map = map;
        self
    }

    /// Attach the module format.
    pub fn with_format(mut self, format: ModuleKind) -> Self {
        self.format = Some(format);
        self
    }
}

/// Result of transform hook.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// Transformed code.
    pub code: String,
    /// Optional source map.
    pub map: Option<String>,
}

impl TransformResult {
    /// Create a transform result with code only.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            map: None,
        }
    }
}

/// Plugin enforcement ordering.
///
/// Controls where a plugin runs relative to others in the pipeline.
/// Mirrors Vite's `enforce` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PluginEnforce {
    /// Runs before normal plugins (e.g., alias resolution).
    Pre,
    /// Default ordering (no enforcement).
    #[default]
    Normal,
    /// Runs after normal plugins.
    Post,
}

/// The main plugin trait.
///
/// All hooks have default implementations that do nothing, so a plugin only
/// implements the hooks it cares about. Returning `Ok(None)` from
/// `resolve_id` or `load` defers to the next plugin.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Plugin ordering: `Pre`, `Normal` (default), or `Post`.
    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    /// Called once with the final configuration.
    ///
    /// Plugins can store what they need (e.g. the project root) for later hooks.
    fn config_resolved(&self, _config: &ResolvedConfig) -> HookResult<()> {
        Ok(())
    }

    /// Called at the start of the build.
    async fn build_start(&self, _ctx: &PluginContext) -> HookResult<()> {
        Ok(())
    }

    /// Resolve a module specifier to an ID.
    ///
    /// Return `Some(result)` to handle this resolution, or `None` to let
    /// the next plugin or default resolver handle it.
    async fn resolve_id(
        &self,
        _specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok(None)
    }

    /// Load a module by ID.
    ///
    /// Return `Some(result)` to provide the module source, or `None` to let
    /// the next plugin or default loader handle it.
    async fn load(&self, _id: &str, _ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
        Ok(None)
    }

    /// Transform module source code.
    ///
    /// Return `Some(result)` to transform the code, or `None` to pass it through.
    async fn transform(
        &self,
        _code: &str,
        _id: &str,
        _ctx: &PluginContext,
    ) -> HookResult<Option<TransformResult>> {
        Ok(None)
    }

    /// Called at the end of the build.
    async fn build_end(&self, _ctx: &PluginContext) -> HookResult<()> {
        Ok(())
    }
}

/// A container for managing multiple plugins.
///
/// Plugins are sorted by their `enforce()` ordering: `Pre` → `Normal` → `Post`.
/// Within the same enforcement level, insertion order is preserved.
pub struct PluginContainer {
    plugins: Vec<Box<dyn Plugin>>,
    ctx: PluginContext,
}

impl PluginContainer {
    /// Create a new plugin container.
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            plugins: Vec::new(),
            ctx: PluginContext::new(cwd),
        }
    }

    /// Add a plugin. Plugins are kept sorted by enforce order.
    pub fn add(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
        // stable: insertion order is kept within a level
        self.plugins.sort_by_key(|p| p.enforce());
    }

    /// Plugin names in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Check if any plugins are registered.
    pub fn has_plugins(&self) -> bool {
        !self.plugins.is_empty()
    }

    /// Get the context (for modification).
    pub fn context_mut(&mut self) -> &mut PluginContext {
        &mut self.ctx
    }

    /// Get the context (read-only).
    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Call `config_resolved` on all plugins.
    pub fn call_config_resolved(&self, config: &ResolvedConfig) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.config_resolved(config)?;
        }
        Ok(())
    }

    /// Call `build_start` on all plugins.
    pub async fn build_start(&self) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.build_start(&self.ctx).await?;
        }
        Ok(())
    }

    /// Try to resolve a module ID through plugins.
    /// Returns None if no plugin handled the resolution.
    pub async fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.resolve_id(specifier, importer, &self.ctx).await? {
                tracing::trace!(plugin = plugin.name(), specifier, id = %result.id, "resolved");
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Try to load a module through plugins.
    /// Returns None if no plugin handled the load.
    pub async fn load(&self, id: &str) -> HookResult<Option<LoadResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.load(id, &self.ctx).await? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Transform code through all plugins.
    /// Each plugin's output is passed to the next plugin.
    pub async fn transform(&self, code: &str, id: &str) -> HookResult<String> {
        let mut current = code.to_string();
        for plugin in &self.plugins {
            if let Some(result) = plugin.transform(&current, id, &self.ctx).await? {
                current = result.code;
            }
        }
        Ok(current)
    }

    /// Call `build_end` on all plugins.
    pub async fn build_end(&self) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.build_end(&self.ctx).await?;
        }
        Ok(())
    }
}

impl Default for PluginContainer {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Resolves `prefix + rest` to `target + rest`.
    struct AliasPlugin {
        name: &'static str,
        prefix: &'static str,
        target: &'static str,
        enforce: PluginEnforce,
    }

    #[async_trait::async_trait]
    impl Plugin for AliasPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn enforce(&self) -> PluginEnforce {
            self.enforce
        }

        async fn resolve_id(
            &self,
            specifier: &str,
            _importer: Option<&str>,
            _ctx: &PluginContext,
        ) -> HookResult<Option<ResolveIdResult>> {
            Ok(specifier
                .strip_prefix(self.prefix)
                .map(|rest| ResolveIdResult::resolved(format!("{}{rest}", self.target))))
        }
    }

    fn alias(name: &'static str, enforce: PluginEnforce) -> Box<dyn Plugin> {
        Box::new(AliasPlugin {
            name,
            prefix: "@/",
            target: name,
            enforce,
        })
    }

    /// Appends a marker comment to every module.
    struct MarkPlugin(&'static str);

    #[async_trait::async_trait]
    impl Plugin for MarkPlugin {
        fn name(&self) -> &str {
            "mark"
        }

        async fn transform(
            &self,
            code: &str,
            _id: &str,
            _ctx: &PluginContext,
        ) -> HookResult<Option<TransformResult>> {
            Ok(Some(TransformResult::code(format!("{code}/*{}*/", self.0))))
        }
    }

    #[test]
    fn test_enforce_ordering_is_stable() {
        let mut container = PluginContainer::default();
        container.add(alias("normal-a", PluginEnforce::Normal));
        container.add(alias("post", PluginEnforce::Post));
        container.add(alias("pre", PluginEnforce::Pre));
        container.add(alias("normal-b", PluginEnforce::Normal));

        assert_eq!(container.names(), vec!["pre", "normal-a", "normal-b", "post"]);
    }

    #[tokio::test]
    async fn test_resolve_first_match_wins() {
        let mut container = PluginContainer::default();
        container.add(alias("/normal/", PluginEnforce::Normal));
        container.add(alias("/pre/", PluginEnforce::Pre));

        let result = container.resolve_id("@/button.ts", None).await.unwrap();
        assert_eq!(result, Some(ResolveIdResult::resolved("/pre/button.ts")));

        let result = container.resolve_id("lodash", None).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_load_defers_when_unhandled() {
        let container = PluginContainer::default();
        assert!(container.load("/proj/main.ts").await.unwrap().is_none());
        assert!(!container.has_plugins());
    }

    #[tokio::test]
    async fn test_transform_chains() {
        let mut container = PluginContainer::default();
        container.add(Box::new(MarkPlugin("a")));
        container.add(Box::new(MarkPlugin("b")));

        let code = container.transform("x;", "m.js").await.unwrap();
        assert_eq!(code, "x;/*a*//*b*/");
    }

    #[test]
    fn test_virtual_id() {
        assert!(ResolveIdResult::resolved("\0deno:/x.ts").is_virtual());
        assert!(!ResolveIdResult::resolved("/x.ts").is_virtual());
    }

    #[test]
    fn test_plugin_error_display() {
        let err = PluginError::new("deno", "load", "boom").with_code("DENOLOAD_IO");
        assert_eq!(err.to_string(), "[deno] load: boom");
        assert_eq!(err.code, Some("DENOLOAD_IO"));
    }
}
