//! Integration tests for `denoload --json` output.

use std::path::Path;
use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "denoload-cli", "--bin", "denoload", "--"]);
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!(
            "stdout should be valid JSON ({e}): {stdout}\nstderr: {}",
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

/// A stand-in for `deno info --json <specifier>`.
///
/// `jsr:` specifiers answer with a module in a fake cache, `./` specifiers
/// with a module under the working directory, anything else exits 1.
#[cfg(unix)]
fn fake_deno(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-deno");
    std::fs::write(
        &script,
        r#"#!/bin/sh
spec="$3"
case "$spec" in
  jsr:*)
    printf '{"version":1,"redirects":{},"roots":["%s"],"modules":[{"kind":"esm","local":"/deno-cache/jsr/8f2c","mediaType":"TypeScript","specifier":"%s"}]}' "$spec" "$spec"
    ;;
  ./*)
    here="$(pwd -P)"
    rel="${spec#./}"
    printf '{"version":1,"redirects":{},"roots":["file://%s/%s"],"modules":[{"kind":"esm","local":"%s/%s","mediaType":"TypeScript","specifier":"file://%s/%s"}]}' "$here" "$rel" "$here" "$rel" "$here" "$rel"
    ;;
  *)
    echo "error: Relative import path \"$spec\" not prefixed" >&2
    exit 1
    ;;
esac
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[test]
fn test_version_json() {
    let output = cargo_bin()
        .args(["--json", "version"])
        .output()
        .expect("Failed to run version command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);
    assert_eq!(json["schema_version"].as_u64(), Some(1));
    assert_eq!(json["version"].as_str(), Some(env!("CARGO_PKG_VERSION")));
}

#[cfg(unix)]
#[test]
fn test_resolve_json_classifies_specifiers() {
    let tools = tempfile::tempdir().unwrap();
    let deno = fake_deno(tools.path());

    let project = tempfile::tempdir().unwrap();
    std::fs::write(project.path().join("deno.json"), "{}").unwrap();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(project.path())
        .args(["resolve", "jsr:@std/path", "./src/main.ts", "lodash", "--deno-bin"])
        .arg(&deno)
        .output()
        .expect("Failed to run resolve command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["specifier"], "jsr:@std/path");
    assert_eq!(results[0]["id"], "\u{0}deno:/deno-cache/jsr/8f2c");
    assert_eq!(results[0]["foreign"], true);

    let local = results[1]["id"].as_str().unwrap();
    assert!(local.ends_with("/src/main.ts"), "unexpected id {local}");
    assert!(!local.starts_with('\0'));
    assert_eq!(results[1]["foreign"], false);

    assert!(results[2]["id"].is_null());
    assert_eq!(results[2]["foreign"], false);
}

#[test]
fn test_resolve_json_reports_spawn_failure() {
    let project = tempfile::tempdir().unwrap();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(project.path())
        .args([
            "resolve",
            "jsr:@std/path",
            "--deno-bin",
            "/nonexistent/denoload-test/deno",
        ])
        .output()
        .expect("Failed to run resolve command");

    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "DENOLOAD_SPAWN_FAILED");
}

#[test]
fn test_load_untagged_id_is_not_handled() {
    let project = tempfile::tempdir().unwrap();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(project.path())
        .args(["load", "/proj/src/main.ts"])
        .output()
        .expect("Failed to run load command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], true);
    assert_eq!(json["handled"], false);
    assert!(json["code"].is_null());
}

#[test]
fn test_load_tagged_id_transpiles() {
    let cache = tempfile::tempdir().unwrap();
    let file = cache.path().join("mod.ts");
    std::fs::write(&file, "export const a = 1 as number;\n").unwrap();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(cache.path())
        .arg("load")
        .arg(format!("\\0deno:{}", file.display()))
        .output()
        .expect("Failed to run load command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["handled"], true);

    let code = json["code"].as_str().unwrap();
    assert!(code.contains("export const a = 1;"));
    assert!(code.contains("//# sourceMappingURL=data:application/json;base64,"));
    assert!(!json["map"].as_str().unwrap().is_empty());
}

#[test]
fn test_load_missing_file_fails() {
    let output = cargo_bin()
        .args(["--json", "load", "\\0deno:/nonexistent/denoload-test/mod.ts"])
        .output()
        .expect("Failed to run load command");

    assert!(!output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "DENOLOAD_READ_FAILED");
}

#[test]
fn test_load_honors_jsx_import_source() {
    let cache = tempfile::tempdir().unwrap();
    let file = cache.path().join("App.tsx");
    std::fs::write(&file, "export const App = () => <p>hi</p>;\n").unwrap();

    let output = cargo_bin()
        .args(["--json", "--cwd"])
        .arg(cache.path())
        .arg("load")
        .arg(format!("\\0deno:{}", file.display()))
        .args(["--jsx-import-source", "preact"])
        .output()
        .expect("Failed to run load command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert!(json["code"].as_str().unwrap().contains("preact/jsx-runtime"));
}
