#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_truncation)]

pub mod compiler;
pub mod config;
pub mod deno;
pub mod error;
pub mod paths;
pub mod plugin;
pub mod version;

pub use config::{Config, DenoOptions};
pub use deno::{DenoCli, DenoPlugin, InfoSource, DENO_PREFIX};
pub use error::{Error, Result};
pub use plugin::{
    HookResult, LoadResult, Plugin, PluginContainer, PluginContext, PluginEnforce, PluginError,
    ResolveIdResult, ResolvedConfig, TransformResult,
};
pub use version::VERSION;
