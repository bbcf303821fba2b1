#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use denoload_core::compiler::{EsTarget, JsxRuntime, DEFAULT_JSX_IMPORT_SOURCE};
use denoload_core::{Config, DenoOptions};
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "denoload")]
#[command(author, version, about = "Resolve and load modules through Deno", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Resolve specifiers the way the bundler plugin would
    Resolve {
        /// Specifiers to resolve (e.g. "jsr:@std/path", "./src/main.ts")
        #[arg(required = true)]
        specifiers: Vec<String>,

        /// Project root (default: nearest directory with deno.json, package.json or .git)
        #[arg(long, value_name = "PATH")]
        root: Option<PathBuf>,

        /// Deno executable (default: $DENOLOAD_DENO_BIN or "deno")
        #[arg(long, value_name = "BIN")]
        deno_bin: Option<String>,

        /// Deno config file forwarded to `deno info --config`
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Load a module id produced by `resolve` and print the JavaScript
    Load {
        /// Module id; write the leading NUL of a virtual id as `\0`
        id: String,

        /// Project root (default: nearest directory with deno.json, package.json or .git)
        #[arg(long, value_name = "PATH")]
        root: Option<PathBuf>,

        /// JSX runtime for .jsx/.tsx modules
        #[arg(long, default_value_t = JsxRuntime::Automatic)]
        jsx: JsxRuntime,

        /// Module the automatic JSX runtime imports from
        #[arg(long, value_name = "MODULE", default_value = DEFAULT_JSX_IMPORT_SOURCE)]
        jsx_import_source: String,

        /// Output target
        #[arg(long, default_value_t = EsTarget::ES2022)]
        target: EsTarget,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Resolve {
            specifiers,
            root,
            deno_bin,
            config: deno_config,
        }) => {
            let span = tracing::info_span!("resolve", cmd = "resolve", cwd = %config.cwd.display());
            let _guard = span.enter();

            let mut options = DenoOptions::from_env();
            if let Some(bin) = deno_bin {
                options = options.with_deno_bin(bin);
            }
            if let Some(file) = deno_config {
                options = options.with_config_file(file);
            }

            let action = commands::resolve::ResolveAction {
                specifiers,
                root: commands::project_root(&config.cwd, root.as_deref()),
                options,
            };
            commands::resolve::run(action, cli.json)
        }
        Some(Commands::Load {
            id,
            root,
            jsx,
            jsx_import_source,
            target,
        }) => {
            let span = tracing::info_span!("load", cmd = "load", cwd = %config.cwd.display());
            let _guard = span.enter();

            let action = commands::load::LoadAction {
                id: commands::load::unescape_id(&id),
                root: commands::project_root(&config.cwd, root.as_deref()),
                options: DenoOptions::from_env()
                    .with_jsx_runtime(jsx)
                    .with_jsx_import_source(jsx_import_source)
                    .with_target(target),
            };
            commands::load::run(action, cli.json)
        }
    }
}
