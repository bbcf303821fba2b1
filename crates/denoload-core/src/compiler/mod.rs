//! Compiler backend abstraction for transpilation.
//!
//! Foreign modules (remote, registry, or outside the project root) reach the
//! bundler as TypeScript/JSX straight out of Deno's cache. Bundlers expect
//! plain JavaScript from a `load` hook, so these modules go through a
//! `CompilerBackend` first.
//!
//! ## Usage
//!
//! ```ignore
//! use denoload_core::compiler::{CompilerBackend, SourceMapKind, SwcBackend, TranspileSpec};
//!
//! let backend = SwcBackend::new();
//! let spec = TranspileSpec::new("mod.ts").with_sourcemaps(SourceMapKind::Inline);
//!
//! let output = backend.transpile(&spec, "export const a = 1 as number;")?;
//! println!("{}", output.code);
//! ```

pub mod spec;
pub mod swc;

pub use spec::{
    Diagnostic, DiagnosticSeverity, EsTarget, JsxRuntime, MediaType, ModuleKind, SourceMapKind,
    TranspileOutput, TranspileSpec, DEFAULT_JSX_IMPORT_SOURCE,
};
pub use swc::SwcBackend;

use std::fmt;

/// Error during compilation.
#[derive(Debug)]
pub struct CompilerError {
    /// Error code.
    pub code: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Compiler diagnostics (if available).
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilerError {
    /// Create a new compiler error.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Create an error with diagnostics.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new("COMPILER_PARSE_ERROR", message)
    }

    /// Create a transform error.
    #[must_use]
    pub fn transform_error(message: impl Into<String>) -> Self {
        Self::new("COMPILER_TRANSFORM_ERROR", message)
    }

    /// Create an unsupported option or file type error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new("COMPILER_UNSUPPORTED", message)
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        for diag in &self.diagnostics {
            write!(f, "\n  - {}: {}", diag.severity.as_str(), diag.message)?;
            if let (Some(file), Some(line), Some(col)) = (&diag.file, diag.line, diag.column) {
                write!(f, " at {}:{}:{}", file.display(), line, col)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CompilerError {}

/// Compiler backend trait for transpilation.
///
/// The trait is `Send + Sync` so one backend can be shared by every
/// `load` call of a plugin.
pub trait CompilerBackend: Send + Sync {
    /// Get the backend name (e.g., "swc").
    fn name(&self) -> &'static str;

    /// Transpile `source` according to `spec`.
    ///
    /// # Errors
    ///
    /// Returns a `CompilerError` if the source has syntax errors, the
    /// transformation fails, or `spec` asks for something the backend
    /// cannot produce.
    fn transpile(&self, spec: &TranspileSpec, source: &str)
        -> Result<TranspileOutput, CompilerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_error_display() {
        let error = CompilerError::parse_error("Unexpected token");
        assert!(error.to_string().contains("COMPILER_PARSE_ERROR"));
        assert!(error.to_string().contains("Unexpected token"));
    }

    #[test]
    fn test_compiler_error_with_diagnostics() {
        let diag = Diagnostic::error("Expected '}'")
            .with_location(std::path::PathBuf::from("deps/mod.ts"), 3, 7);

        let error = CompilerError::parse_error("Parse failed").with_diagnostics(vec![diag]);

        let display = error.to_string();
        assert!(display.contains("deps/mod.ts:3:7"));
        assert!(display.contains("Expected '}'"));
    }
}
