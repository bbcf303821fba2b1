use std::path::PathBuf;
use thiserror::Error;

use crate::compiler::CompilerError;

/// Result alias for denoload operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for denoload operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse `deno info` output for \"{specifier}\": {source}")]
    InfoParse {
        specifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("`deno info` returned no modules for \"{specifier}\"")]
    EmptyModules { specifier: String },

    #[error("`deno info` returned no local file for \"{specifier}\"")]
    MissingLocal { specifier: String },

    #[error("Failed to read module {path}: {source}")]
    ReadModule {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to transpile {path}: {source}")]
    Compile {
        path: PathBuf,
        #[source]
        source: CompilerError,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "DENOLOAD_IO",
            Self::Spawn { .. } => "DENOLOAD_SPAWN_FAILED",
            Self::InfoParse { .. } => "DENOLOAD_INFO_PARSE",
            Self::EmptyModules { .. } => "DENOLOAD_INFO_EMPTY",
            Self::MissingLocal { .. } => "DENOLOAD_INFO_NO_LOCAL",
            Self::ReadModule { .. } => "DENOLOAD_READ_FAILED",
            Self::Compile { .. } => "DENOLOAD_COMPILE_FAILED",
            Self::Other(_) => "DENOLOAD_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_module_names_file() {
        let err = Error::ReadModule {
            path: PathBuf::from("/cache/deps/mod.ts"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/cache/deps/mod.ts"));
        assert_eq!(err.code(), "DENOLOAD_READ_FAILED");
    }

    #[test]
    fn test_compile_error_keeps_source() {
        let err = Error::Compile {
            path: PathBuf::from("mod.ts"),
            source: CompilerError::parse_error("Unexpected token"),
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert!(source.unwrap().contains("COMPILER_PARSE_ERROR"));
    }
}
