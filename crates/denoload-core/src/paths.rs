use std::path::{Component, Path, PathBuf};

/// Files that mark the root of a Deno (or Node) project.
const ROOT_MARKERS: &[&str] = &["deno.json", "deno.jsonc", "package.json", ".git"];

/// Find the project root by walking up from `cwd` looking for a root marker.
///
/// Returns the first directory containing `deno.json`, `deno.jsonc`,
/// `package.json` or `.git`, or `None` if none is found.
#[must_use]
pub fn project_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = dunce::canonicalize(cwd).unwrap_or_else(|_| cwd.to_path_buf());

    loop {
        if ROOT_MARKERS.iter().any(|marker| current.join(marker).exists()) {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Lexically normalize a path, folding `.` and `..` components.
///
/// Does not touch the filesystem, so symlinks are not resolved.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    // `..` above `/` is `/`; relative paths keep it
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Make `path` absolute against the process working directory and fold
/// its dots. Still lexical: symlinks are not resolved.
#[must_use]
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize(&cwd.join(path)),
        Err(_) => normalize(path),
    }
}

/// Whether `path` lies outside `root`, i.e. a relative path from `root`
/// to `path` would start with `..`.
///
/// Relative inputs are taken against the process working directory.
/// `path == root` is inside.
#[must_use]
pub fn is_outside_root(root: &Path, path: &Path) -> bool {
    let root = absolute(root);
    let path = absolute(path);
    !path.starts_with(&root)
}
