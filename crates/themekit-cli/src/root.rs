use std::path::{Path, PathBuf};

/// Markers that identify a project root, in priority order.
const ROOT_MARKERS: &[&str] = &[".themekit", "package.json", ".git"];

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `THEMEKIT_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.themekit/`
/// 3. Walk upward from `cwd` looking for `package.json`
/// 4. Walk upward from `cwd` looking for `.git/`
/// 5. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_root_from(&cwd).unwrap_or(cwd)
}

fn find_root_from(start: &Path) -> Option<PathBuf> {
    ROOT_MARKERS.iter().find_map(|marker| {
        start
            .ancestors()
            .find(|dir| dir.join(marker).exists())
            .map(Path::to_path_buf)
    })
}
