use denoload_core::version::{version_string, OUTPUT_SCHEMA_VERSION, VERSION};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Serialize)]
struct VersionJson {
    ok: bool,
    schema_version: u32,
    version: &'static str,
}

pub fn run(json: bool) -> Result<()> {
    if json {
        let doc = VersionJson {
            ok: true,
            schema_version: OUTPUT_SCHEMA_VERSION,
            version: VERSION,
        };
        println!("{}", serde_json::to_string(&doc).into_diagnostic()?);
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
