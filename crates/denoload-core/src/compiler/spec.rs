//! Transpilation request and output types.
//!
//! These types capture all options for a single transpile call.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// JSX runtime mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JsxRuntime {
    /// Classic JSX transform (React.createElement).
    Classic,
    /// Automatic JSX transform (React 17+ / jsx-runtime).
    #[default]
    Automatic,
}

impl JsxRuntime {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Automatic => "automatic",
        }
    }
}

impl std::fmt::Display for JsxRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JsxRuntime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "automatic" => Ok(Self::Automatic),
            other => Err(format!("unknown JSX runtime: {other}")),
        }
    }
}

/// Module output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// ES Modules (import/export).
    #[default]
    #[serde(alias = "es6")]
    ESM,
    /// CommonJS (require/module.exports).
    #[serde(alias = "cjs")]
    CommonJS,
}

impl ModuleKind {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ESM => "esm",
            Self::CommonJS => "commonjs",
        }
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source map generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapKind {
    /// No source map.
    #[default]
    None,
    /// Inline source map as data URL.
    Inline,
    /// Source map returned alongside the code only.
    External,
}

impl SourceMapKind {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Inline => "inline",
            Self::External => "external",
        }
    }
}

/// ECMAScript target version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EsTarget {
    /// ECMAScript 2015 (ES6).
    #[serde(rename = "es2015")]
    ES2015,
    /// ECMAScript 2016.
    #[serde(rename = "es2016")]
    ES2016,
    /// ECMAScript 2017.
    #[serde(rename = "es2017")]
    ES2017,
    /// ECMAScript 2018.
    #[serde(rename = "es2018")]
    ES2018,
    /// ECMAScript 2019.
    #[serde(rename = "es2019")]
    ES2019,
    /// ECMAScript 2020.
    #[serde(rename = "es2020")]
    ES2020,
    /// ECMAScript 2021.
    #[serde(rename = "es2021")]
    ES2021,
    /// ECMAScript 2022.
    #[default]
    #[serde(rename = "es2022")]
    ES2022,
    /// Latest ECMAScript features.
    #[serde(rename = "esnext")]
    ESNext,
}

impl EsTarget {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ES2015 => "es2015",
            Self::ES2016 => "es2016",
            Self::ES2017 => "es2017",
            Self::ES2018 => "es2018",
            Self::ES2019 => "es2019",
            Self::ES2020 => "es2020",
            Self::ES2021 => "es2021",
            Self::ES2022 => "es2022",
            Self::ESNext => "esnext",
        }
    }
}

impl std::fmt::Display for EsTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EsTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es2015" | "es6" => Ok(Self::ES2015),
            "es2016" => Ok(Self::ES2016),
            "es2017" => Ok(Self::ES2017),
            "es2018" => Ok(Self::ES2018),
            "es2019" => Ok(Self::ES2019),
            "es2020" => Ok(Self::ES2020),
            "es2021" => Ok(Self::ES2021),
            "es2022" => Ok(Self::ES2022),
            "esnext" => Ok(Self::ESNext),
            other => Err(format!("unknown target: {other}")),
        }
    }
}

/// Source media type, as reported by `deno info` (`mediaType`).
///
/// Remote modules live in Deno's cache under hashed file names with no
/// extension, so this is the only reliable syntax hint for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    JavaScript,
    #[serde(rename = "JSX")]
    Jsx,
    Mjs,
    Cjs,
    TypeScript,
    Mts,
    Cts,
    Dts,
    Dmts,
    Dcts,
    #[serde(rename = "TSX")]
    Tsx,
    Json,
    Wasm,
    #[serde(other)]
    Unknown,
}

impl MediaType {
    /// Guess the media type from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_lowercase();
        if name.ends_with(".d.ts") {
            return Self::Dts;
        }
        if name.ends_with(".d.mts") {
            return Self::Dmts;
        }
        if name.ends_with(".d.cts") {
            return Self::Dcts;
        }
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("js") => Self::JavaScript,
            Some("jsx") => Self::Jsx,
            Some("mjs") => Self::Mjs,
            Some("cjs") => Self::Cjs,
            Some("ts") => Self::TypeScript,
            Some("mts") => Self::Mts,
            Some("cts") => Self::Cts,
            Some("tsx") => Self::Tsx,
            Some("json") => Self::Json,
            Some("wasm") => Self::Wasm,
            _ => Self::Unknown,
        }
    }

    /// Whether the source needs TypeScript syntax.
    #[must_use]
    pub fn is_typescript(self) -> bool {
        matches!(
            self,
            Self::TypeScript | Self::Mts | Self::Cts | Self::Dts | Self::Dmts | Self::Dcts | Self::Tsx
        )
    }

    /// Whether the source uses JSX syntax.
    #[must_use]
    pub fn is_jsx(self) -> bool {
        matches!(self, Self::Jsx | Self::Tsx)
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Warning message.
    Warning,
    /// Error message.
    Error,
}

impl DiagnosticSeverity {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A compiler diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Human-readable message.
    pub message: String,
    /// Source file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Line number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Column number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    /// Set the source location.
    #[must_use]
    pub fn with_location(mut self, file: PathBuf, line: u32, column: u32) -> Self {
        self.file = Some(file);
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// One transpilation request: input path plus output options.
///
/// Captures every option that affects the output of a single transpile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranspileSpec {
    /// Path of the source file (used for syntax detection and source maps).
    pub input_path: PathBuf,
    /// Media type hint; overrides detection by extension when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    /// JSX runtime mode.
    #[serde(default)]
    pub jsx_runtime: JsxRuntime,
    /// Module output format.
    #[serde(default)]
    pub module: ModuleKind,
    /// Source map generation mode.
    #[serde(default)]
    pub sourcemaps: SourceMapKind,
    /// ECMAScript target version.
    #[serde(default)]
    pub target: EsTarget,
    /// Module the automatic JSX runtime imports from (`<source>/jsx-runtime`).
    #[serde(default = "default_jsx_import_source")]
    pub jsx_import_source: String,
}

/// Default `jsxImportSource`.
pub const DEFAULT_JSX_IMPORT_SOURCE: &str = "react";

fn default_jsx_import_source() -> String {
    DEFAULT_JSX_IMPORT_SOURCE.to_string()
}

impl TranspileSpec {
    /// Create a new transpile spec for a file with default options.
    #[must_use]
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            media_type: None,
            jsx_runtime: JsxRuntime::default(),
            module: ModuleKind::default(),
            sourcemaps: SourceMapKind::default(),
            target: EsTarget::default(),
            jsx_import_source: default_jsx_import_source(),
        }
    }

    /// Set the media type hint.
    #[must_use]
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// Set the JSX runtime mode.
    #[must_use]
    pub fn with_jsx_runtime(mut self, runtime: JsxRuntime) -> Self {
        self.jsx_runtime = runtime;
        self
    }

    /// Set the module output format.
    #[must_use]
    pub fn with_module(mut self, module: ModuleKind) -> Self {
        self.module = module;
        self
    }

    /// Set the source map mode.
    #[must_use]
    pub fn with_sourcemaps(mut self, sourcemaps: SourceMapKind) -> Self {
        self.sourcemaps = sourcemaps;
        self
    }

    /// Set the ECMAScript target.
    #[must_use]
    pub fn with_target(mut self, target: EsTarget) -> Self {
        self.target = target;
        self
    }

    /// Set the JSX import source (e.g. `preact`).
    #[must_use]
    pub fn with_jsx_import_source(mut self, source: impl Into<String>) -> Self {
        self.jsx_import_source = source.into();
        self
    }

    /// Effective media type: the hint if it is known, else the extension.
    #[must_use]
    pub fn effective_media_type(&self) -> MediaType {
        match self.media_type {
            Some(media_type) if media_type != MediaType::Unknown => media_type,
            _ => MediaType::from_path(&self.input_path),
        }
    }
}

/// Output from a successful transpilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranspileOutput {
    /// Transpiled JavaScript code.
    pub code: String,
    /// Source map JSON (if generated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_map: Option<String>,
    /// Module format of `code`.
    #[serde(default)]
    pub module: ModuleKind,
}

impl TranspileOutput {
    /// Create a new transpile output.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            source_map: None,
            module: ModuleKind::default(),
        }
    }

    /// Set the source map.
    #[must_use]
    pub fn with_source_map(mut self, source_map: impl Into<String>) -> Self {
        self.source_map = Some(source_map.into());
        self
    }

    /// Set the module format.
    #[must_use]
    pub fn with_module(mut self, module: ModuleKind) -> Self {
        self.module = module;
        self
    }
}
