use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting theme artifacts and source files.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Copy `src` to `dest`, creating the destination's parent directories.
pub fn copy_file(src: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(src, dest)?;
    Ok(())
}

/// Replace content between `start_marker` and `end_marker` (inclusive).
///
/// Replaces everything from the first character of `start_marker` through the last
/// character of `end_marker` with `replacement`. Returns `None` when either marker
/// is missing.
pub fn replace_between_markers(
    content: &str,
    start_marker: &str,
    end_marker: &str,
    replacement: &str,
) -> Option<String> {
    let start_pos = content.find(start_marker)?;
    let search_from = start_pos + start_marker.len();
    let end_offset = content[search_from..].find(end_marker)?;
    let end_pos = search_from + end_offset + end_marker.len();

    let mut updated = String::with_capacity(content.len() + replacement.len());
    updated.push_str(&content[..start_pos]);
    updated.push_str(replacement);
    updated.push_str(&content[end_pos..]);
    Some(updated)
}

/// Prepend `line` to `content` unless an identical line already exists.
///
/// Returns `None` when the line is already present.
pub fn prepend_line_if_missing(content: &str, line: &str) -> Option<String> {
    // Whole-line comparison, so a commented-out import still counts as missing.
    if content.lines().any(|l| l.trim() == line) {
        return None;
    }
    let mut updated = String::with_capacity(content.len() + line.len() + 1);
    updated.push_str(line);
    updated.push('\n');
    updated.push_str(content);
    Some(updated)
}
