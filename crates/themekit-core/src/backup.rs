//! Snapshots of live theme artifacts, with list and rollback.
//!
//! Each snapshot lives in `.themekit/backups/<id>/` and consists of a
//! `manifest.json` plus a `files/` tree mirroring the captured project paths.
//! A manifest is written once, before anything in the project is modified.

use crate::error::{Result, ThemeError};
use crate::io::{atomic_write, copy_file};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Theme id recorded when no palette existed at snapshot time.
pub const NO_THEME: &str = "none";

const FILES_DIR: &str = "files";
const ROLLBACK_TAG: &str = "rollback";

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupOrigin {
    #[default]
    Apply,
    Rollback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedFile {
    /// Project-relative path of the live file.
    pub path: String,
    /// Path of the copy, relative to the backup directory.
    pub backup: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupManifest {
    pub id: String,
    pub previous_theme: String,
    pub new_theme: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub origin: BackupOrigin,
    #[serde(default)]
    pub changed_files: Vec<CapturedFile>,
}

impl BackupManifest {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.changed_files.iter().map(|f| f.path.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub restored_files: Vec<String>,
    pub removed_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackOutcome {
    pub backup_id: String,
    pub restored_theme: String,
    pub restored_files: Vec<String>,
    pub removed_files: Vec<String>,
    /// Id of the snapshot taken just before restoring.
    pub safety_backup: String,
}

// ---------------------------------------------------------------------------
// BackupManager
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BackupManager {
    root: PathBuf,
    stylesheet: String,
}

impl BackupManager {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            stylesheet: paths::DEFAULT_STYLESHEET.to_string(),
        }
    }

    /// Use a non-default generated stylesheet location.
    pub fn with_stylesheet(mut self, stylesheet: impl Into<String>) -> Self {
        self.stylesheet = stylesheet.into();
        self
    }

    /// Every file a theme apply may create or overwrite wholesale.
    pub fn managed_artifacts(&self) -> Vec<String> {
        let mut out = vec![paths::PALETTE_FILE.to_string(), self.stylesheet.clone()];
        out.extend(paths::BUILD_CONFIG_FILES.iter().map(|s| s.to_string()));
        out
    }

    /// Snapshot the live artifacts ahead of applying `new_theme`.
    pub fn backup(&self, new_theme: &str) -> Result<BackupManifest> {
        self.backup_files(new_theme, BackupOrigin::Apply, &[])
    }

    /// Snapshot the managed artifacts plus `extra` project-relative files.
    ///
    /// Only files that currently exist are captured.
    pub fn backup_files(
        &self,
        new_theme: &str,
        origin: BackupOrigin,
        extra: &[String],
    ) -> Result<BackupManifest> {
        self.backup_at(Utc::now(), new_theme, origin, extra)
    }

    fn backup_at(
        &self,
        now: DateTime<Utc>,
        new_theme: &str,
        origin: BackupOrigin,
        extra: &[String],
    ) -> Result<BackupManifest> {
        let tag = match origin {
            BackupOrigin::Apply => {
                paths::validate_theme_id(new_theme)?;
                new_theme
            }
            BackupOrigin::Rollback => ROLLBACK_TAG,
        };

        let (id, dir) = self.claim_dir(now, tag)?;

        let mut candidates: BTreeSet<String> = self.managed_artifacts().into_iter().collect();
        candidates.extend(extra.iter().cloned());

        let mut changed_files = Vec::new();
        for rel in candidates {
            let live = self.root.join(&rel);
            if !live.is_file() {
                continue;
            }
            let backup = format!("{FILES_DIR}/{rel}");
            let dest = dir.join(&backup);
            copy_file(&live, &dest).map_err(|e| ThemeError::backup_io(&dest, e))?;
            changed_files.push(CapturedFile { path: rel, backup });
        }

        let manifest = BackupManifest {
            id,
            previous_theme: read_palette_id(&self.root).unwrap_or_else(|| NO_THEME.to_string()),
            new_theme: new_theme.to_string(),
            timestamp: now,
            origin,
            changed_files,
        };

        let manifest_path = dir.join(paths::MANIFEST_FILE);
        let data = serde_json::to_string_pretty(&manifest)?;
        atomic_write(&manifest_path, data.as_bytes()).map_err(|e| match e {
            ThemeError::Io(source) => ThemeError::backup_io(&manifest_path, source),
            other => other,
        })?;

        tracing::info!(
            id = %manifest.id,
            files = manifest.changed_files.len(),
            "backup created"
        );
        Ok(manifest)
    }

    /// Create a fresh snapshot directory. Seconds first, then milliseconds,
    /// then a numeric suffix.
    fn claim_dir(&self, now: DateTime<Utc>, tag: &str) -> Result<(String, PathBuf)> {
        let backups = paths::backups_dir(&self.root);
        std::fs::create_dir_all(&backups).map_err(|e| ThemeError::backup_io(&backups, e))?;

        let seconds = format!("{}-{tag}", now.format("%Y%m%d-%H%M%S"));
        let millis = format!("{}-{tag}", now.format("%Y%m%d-%H%M%S-%3f"));

        let mut attempt = 0u32;
        loop {
            let id = match attempt {
                0 => seconds.clone(),
                1 => millis.clone(),
                n => format!("{millis}-{n}"),
            };
            let dir = backups.join(&id);
            match std::fs::create_dir(&dir) {
                Ok(()) => return Ok((id, dir)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(ThemeError::backup_io(&dir, e)),
            }
        }
    }

    /// All readable manifests, newest first.
    pub fn list(&self) -> Result<Vec<BackupManifest>> {
        let backups = paths::backups_dir(&self.root);
        if !backups.is_dir() {
            return Ok(Vec::new());
        }

        let mut manifests = Vec::new();
        for entry in std::fs::read_dir(&backups)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path().join(paths::MANIFEST_FILE);
            match read_manifest(&path) {
                Ok(m) => manifests.push(m),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable manifest");
                }
            }
        }

        manifests.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        Ok(manifests)
    }

    pub fn find(&self, id: &str) -> Result<BackupManifest> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(ThemeError::BackupNotFound(id.to_string()));
        }
        let path = paths::backup_manifest(&self.root, id);
        if !path.is_file() {
            return Err(ThemeError::BackupNotFound(id.to_string()));
        }
        read_manifest(&path)
    }

    /// Restore `id`, or the newest snapshot when `id` is `None`.
    ///
    /// A rollback-origin safety snapshot of the current state is always taken
    /// first, so the rollback itself can be rolled back.
    pub fn rollback(&self, id: Option<&str>) -> Result<RollbackOutcome> {
        let target = match id {
            Some(id) => self.find(id)?,
            None => self.list()?.into_iter().next().ok_or(ThemeError::NoBackups)?,
        };

        let extra: Vec<String> = target.paths().map(str::to_string).collect();
        let safety = self.backup_files(&target.previous_theme, BackupOrigin::Rollback, &extra)?;

        let summary = self.restore(&target)?;
        tracing::info!(
            backup = %target.id,
            safety = %safety.id,
            restored = summary.restored_files.len(),
            removed = summary.removed_files.len(),
            "rollback complete"
        );

        Ok(RollbackOutcome {
            backup_id: target.id,
            restored_theme: target.previous_theme,
            restored_files: summary.restored_files,
            removed_files: summary.removed_files,
            safety_backup: safety.id,
        })
    }

    /// Copy every captured file back and remove managed artifacts that did
    /// not exist when the snapshot was taken. No safety snapshot.
    pub fn restore(&self, manifest: &BackupManifest) -> Result<RestoreSummary> {
        let dir = paths::backup_dir(&self.root, &manifest.id);

        let mut restored_files = Vec::new();
        for file in &manifest.changed_files {
            let src = dir.join(&file.backup);
            let dest = self.root.join(&file.path);
            copy_file(&src, &dest).map_err(|e| ThemeError::backup_io(&src, e))?;
            restored_files.push(file.path.clone());
        }

        let captured: BTreeSet<&str> = manifest.paths().collect();
        let mut removed_files = Vec::new();
        for rel in self.managed_artifacts() {
            if captured.contains(rel.as_str()) {
                continue;
            }
            let live = self.root.join(&rel);
            if live.is_file() {
                std::fs::remove_file(&live).map_err(|e| ThemeError::backup_io(&live, e))?;
                removed_files.push(rel);
            }
        }

        Ok(RestoreSummary {
            restored_files,
            removed_files,
        })
    }
}

fn read_manifest(path: &Path) -> Result<BackupManifest> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// The `id` of the live palette, if one exists and parses.
pub fn read_palette_id(root: &Path) -> Option<String> {
    let data = std::fs::read_to_string(paths::palette_path(root)).ok()?;
    let value: serde_json::Value = serde_json::from_str(&data).ok()?;
    value.get("id")?.as_str().map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn read(root: &Path, rel: &str) -> String {
        std::fs::read_to_string(root.join(rel)).unwrap()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
            + chrono::Duration::milliseconds(589)
    }

    #[test]
    fn backup_captures_existing_artifacts_only() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".themekit/theme.json", r#"{"id":"slate-minimal"}"#);
        write(dir.path(), "tailwind.config.ts", "export default {}");

        let manifest = BackupManager::new(dir.path()).backup("neo-tokyo").unwrap();
        assert_eq!(manifest.previous_theme, "slate-minimal");
        assert_eq!(manifest.new_theme, "neo-tokyo");
        assert_eq!(manifest.origin, BackupOrigin::Apply);
        let captured: Vec<&str> = manifest.paths().collect();
        assert_eq!(captured, vec![".themekit/theme.json", "tailwind.config.ts"]);
        assert!(manifest.id.ends_with("-neo-tokyo"));
        assert!(paths::backup_manifest(dir.path(), &manifest.id).is_file());
    }

    #[test]
    fn previous_theme_defaults_to_none() {
        let dir = TempDir::new().unwrap();
        let manifest = BackupManager::new(dir.path()).backup("neo-tokyo").unwrap();
        assert_eq!(manifest.previous_theme, NO_THEME);
        assert!(manifest.changed_files.is_empty());
    }

    #[test]
    fn manifest_is_camel_case_on_disk() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/styles/theme.css", ":root {}");
        let manifest = BackupManager::new(dir.path()).backup("arcade").unwrap();
        let raw = std::fs::read_to_string(paths::backup_manifest(dir.path(), &manifest.id)).unwrap();
        assert!(raw.contains("\"previousTheme\""));
        assert!(raw.contains("\"changedFiles\""));
        assert!(raw.contains("\"backup\": \"files/src/styles/theme.css\""));
    }

    #[test]
    fn colliding_ids_get_millis_then_suffix() {
        let dir = TempDir::new().unwrap();
        let mgr = BackupManager::new(dir.path());
        let now = fixed_time();
        let a = mgr.backup_at(now, "arcade", BackupOrigin::Apply, &[]).unwrap();
        let b = mgr.backup_at(now, "arcade", BackupOrigin::Apply, &[]).unwrap();
        let c = mgr.backup_at(now, "arcade", BackupOrigin::Apply, &[]).unwrap();
        assert_eq!(a.id, "20250314-092653-arcade");
        assert_eq!(b.id, "20250314-092653-589-arcade");
        assert_eq!(c.id, "20250314-092653-589-arcade-2");
    }

    #[test]
    fn list_is_newest_first_and_skips_garbage() {
        let dir = TempDir::new().unwrap();
        let mgr = BackupManager::new(dir.path());
        let t0 = fixed_time();
        let older = mgr.backup_at(t0, "arcade", BackupOrigin::Apply, &[]).unwrap();
        let newer = mgr
            .backup_at(t0 + chrono::Duration::seconds(5), "harbor", BackupOrigin::Apply, &[])
            .unwrap();
        write(dir.path(), ".themekit/backups/broken/manifest.json", "{oops");

        let ids: Vec<String> = mgr.list().unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn list_without_backups_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(BackupManager::new(dir.path()).list().unwrap().is_empty());
    }

    #[test]
    fn rollback_restores_bytes_and_takes_safety_backup() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, ".themekit/theme.json", r#"{"id":"slate-minimal"}"#);
        write(root, "src/styles/theme.css", "old css\r\n");
        let mgr = BackupManager::new(root);
        let snapshot = mgr.backup("neo-tokyo").unwrap();

        write(root, ".themekit/theme.json", r#"{"id":"neo-tokyo"}"#);
        write(root, "src/styles/theme.css", "new css");
        write(root, "tailwind.config.js", "module.exports = {}");

        let outcome = mgr.rollback(None).unwrap();
        assert_eq!(outcome.backup_id, snapshot.id);
        assert_eq!(outcome.restored_theme, "slate-minimal");
        assert_eq!(read(root, "src/styles/theme.css"), "old css\r\n");
        assert_eq!(read(root, ".themekit/theme.json"), r#"{"id":"slate-minimal"}"#);
        assert_eq!(outcome.removed_files, vec!["tailwind.config.js"]);
        assert!(!root.join("tailwind.config.js").exists());

        let safety = mgr.find(&outcome.safety_backup).unwrap();
        assert_eq!(safety.origin, BackupOrigin::Rollback);
        assert_eq!(safety.previous_theme, "neo-tokyo");
        assert!(safety.paths().any(|p| p == "tailwind.config.js"));
    }

    #[test]
    fn rollback_is_reversible() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/styles/theme.css", "v1");
        let mgr = BackupManager::new(root);
        let first = mgr.backup("arcade").unwrap();
        write(root, "src/styles/theme.css", "v2");

        let outcome = mgr.rollback(Some(&first.id)).unwrap();
        assert_eq!(read(root, "src/styles/theme.css"), "v1");
        mgr.rollback(Some(&outcome.safety_backup)).unwrap();
        assert_eq!(read(root, "src/styles/theme.css"), "v2");
    }

    #[test]
    fn extra_files_are_captured_and_restored() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/App.tsx", "bg-blue-500");
        let mgr = BackupManager::new(root);
        mgr.backup_files("arcade", BackupOrigin::Apply, &["src/App.tsx".to_string()])
            .unwrap();
        write(root, "src/App.tsx", "bg-primary");
        mgr.rollback(None).unwrap();
        assert_eq!(read(root, "src/App.tsx"), "bg-blue-500");
    }

    #[test]
    fn rollback_errors() {
        let dir = TempDir::new().unwrap();
        let mgr = BackupManager::new(dir.path());
        assert!(matches!(mgr.rollback(None).unwrap_err(), ThemeError::NoBackups));
        let err = mgr.rollback(Some("20990101-000000-nope")).unwrap_err();
        assert_eq!(err.code(), "BACKUP_NOT_FOUND");
        let err = mgr.rollback(Some("../../etc")).unwrap_err();
        assert!(matches!(err, ThemeError::BackupNotFound(_)));
    }

    #[test]
    fn custom_stylesheet_is_managed() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "app/theme.css", "x");
        let mgr = BackupManager::new(dir.path()).with_stylesheet("app/theme.css");
        let manifest = mgr.backup("arcade").unwrap();
        assert_eq!(manifest.paths().collect::<Vec<_>>(), vec!["app/theme.css"]);
    }
}
