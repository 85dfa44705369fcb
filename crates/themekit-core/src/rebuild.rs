//! Applying a theme to a project end to end.
//!
//! validate → backup → write artifacts → wire import → scan → rewrite.
//! A dry run computes the same report and skips the backup and every write.

use crate::backup::{BackupManager, BackupOrigin};
use crate::config::Config;
use crate::error::{Result, ThemeError};
use crate::io::atomic_write;
use crate::lock::ProjectLock;
use crate::mapping::ScanMode;
use crate::paths;
use crate::render::{self, PlannedWrite, WriteAction};
use crate::rewrite::{ColorMap, Replacement, Rewriter};
use crate::scanner::{ScanResult, Scanner};
use crate::store::ThemeStore;
use crate::theme::{Theme, ThemeDocument};
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Options and report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildOptions {
    pub mode: ScanMode,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactChange {
    pub path: String,
    pub action: WriteAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    pub replacements: Vec<Replacement>,
}

impl FileChange {
    pub fn total(&self) -> usize {
        self.replacements.iter().map(|r| r.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub total_references: usize,
    pub non_compliant_count: usize,
    pub compliant_count: usize,
    pub fixable_count: usize,
}

impl From<&ScanResult> for ScanSummary {
    fn from(scan: &ScanResult) -> Self {
        Self {
            files_scanned: scan.files_scanned,
            total_references: scan.total_references,
            non_compliant_count: scan.non_compliant_count,
            compliant_count: scan.compliant_count,
            fixable_count: scan.fixable_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    pub theme_id: String,
    pub mode: ScanMode,
    pub dry_run: bool,
    /// Id of the pre-apply snapshot. Always `None` for a dry run.
    pub backup: Option<String>,
    pub artifacts: Vec<ArtifactChange>,
    pub config_updated: bool,
    /// Global stylesheet that imports the generated stylesheet.
    pub import_wired: Option<String>,
    pub files_changed: Vec<FileChange>,
    pub warnings: Vec<String>,
    pub scan: ScanSummary,
}

// ---------------------------------------------------------------------------
// Rebuild
// ---------------------------------------------------------------------------

pub struct Rebuild {
    root: PathBuf,
    config: Config,
    store: ThemeStore,
}

/// Everything a run would write, computed without touching the disk.
struct Plan {
    artifacts: Vec<PlannedWrite>,
    rewrites: Vec<(PlannedWrite, Vec<Replacement>)>,
    config_updated: bool,
    import_wired: Option<String>,
    warnings: Vec<String>,
    scan: ScanSummary,
}

impl Rebuild {
    /// Load the project config and theme library for `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;
        let store = ThemeStore::with_library(config.theme_library_dir(root).as_deref());
        Ok(Self::new(root, config, store))
    }

    pub fn new(root: &Path, config: Config, store: ThemeStore) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
            store,
        }
    }

    fn backups(&self) -> BackupManager {
        BackupManager::new(&self.root).with_stylesheet(self.config.stylesheet.clone())
    }

    pub fn run(&self, theme_id: &str, opts: RebuildOptions) -> Result<RebuildReport> {
        let theme = self.store.get_by_id(theme_id)?;
        tracing::info!(theme = %theme.id, mode = %opts.mode, dry_run = opts.dry_run, "rebuild");

        let _lock = if opts.dry_run {
            None
        } else {
            Some(ProjectLock::acquire(&self.root)?)
        };

        let plan = self.plan(&theme, opts.mode)?;

        let backup = if opts.dry_run {
            None
        } else {
            Some(self.execute(&theme, &plan)?)
        };

        let mut warnings = plan.warnings;
        let files_changed = self.write_rewrites(plan.rewrites, opts.dry_run, &mut warnings);

        Ok(RebuildReport {
            theme_id: theme.id,
            mode: opts.mode,
            dry_run: opts.dry_run,
            backup,
            artifacts: plan
                .artifacts
                .iter()
                .map(|w| ArtifactChange {
                    path: w.path.clone(),
                    action: w.action,
                })
                .collect(),
            config_updated: plan.config_updated,
            import_wired: plan.import_wired,
            files_changed,
            warnings,
            scan: plan.scan,
        })
    }

    fn plan(&self, theme: &Theme, mode: ScanMode) -> Result<Plan> {
        let artifact_plan = render::plan_artifacts(&self.root, theme, &self.config.stylesheet)?;
        let mut artifacts = artifact_plan.writes;
        let mut warnings = artifact_plan.warnings;

        // Scan and rewrite in memory. The generated stylesheet is never scanned.
        let scanner = Scanner::new(&self.config);
        let scan = scanner.scan(&self.root, mode)?;
        let rewriter = Rewriter::new(scanner.policy().clone());

        let mut rewrites = Vec::new();
        for file in scan.files.iter().filter(|f| f.has_fixable()) {
            let map = ColorMap::from_file_matches(file);
            match rewriter.rewrite(&self.root, &file.path, &map, mode) {
                Ok(rw) if rw.changed => rewrites.push((
                    PlannedWrite {
                        path: file.path.clone(),
                        action: WriteAction::Update,
                        content: rw.new_content,
                    },
                    rw.replacements,
                )),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(file = %file.path, error = %e, "rewrite skipped");
                    warnings.push(format!("{}: rewrite skipped: {e}", file.path));
                }
            }
        }

        for (path, m) in scan.unfixable() {
            let reason = if m.protected {
                "left as-is on a test assertion line"
            } else {
                "has no semantic mapping"
            };
            warnings.push(format!("{path}:{}:{}: '{}' {reason}", m.line, m.column, m.text));
        }

        // The global stylesheet may also be rewritten; wire the import on top
        // of whatever content it will end up with.
        let mut import_wired = None;
        match paths::existing_global_stylesheet(&self.root) {
            None => warnings.push(format!(
                "no global stylesheet found; import {} manually",
                self.config.stylesheet
            )),
            Some(global) => {
                let pending = rewrites.iter_mut().find(|(w, _)| w.path == global);
                let current = match &pending {
                    Some((w, _)) => w.content.clone(),
                    None => std::fs::read_to_string(self.root.join(global))?,
                };
                if let Some(wired) = render::wire_import(global, &current, &self.config.stylesheet) {
                    match pending {
                        Some((w, _)) => w.content = wired,
                        None => artifacts.push(PlannedWrite {
                            path: global.to_string(),
                            action: WriteAction::Update,
                            content: wired,
                        }),
                    }
                }
                import_wired = Some(global.to_string());
            }
        }

        Ok(Plan {
            artifacts,
            rewrites,
            config_updated: artifact_plan.config_updated,
            import_wired,
            warnings,
            scan: ScanSummary::from(&scan),
        })
    }

    /// Back up, then write every artifact. Returns the backup id.
    ///
    /// An artifact write failure restores the backup before returning.
    fn execute(&self, theme: &Theme, plan: &Plan) -> Result<String> {
        let extra: Vec<String> = plan
            .artifacts
            .iter()
            .map(|w| w.path.clone())
            .chain(plan.rewrites.iter().map(|(w, _)| w.path.clone()))
            .collect();
        let manager = self.backups();
        let manifest = manager.backup_files(&theme.id, BackupOrigin::Apply, &extra)?;

        for write in plan.artifacts.iter().filter(|w| w.is_change()) {
            let path = self.root.join(&write.path);
            if let Err(e) = atomic_write(&path, write.content.as_bytes()) {
                tracing::error!(file = %write.path, error = %e, backup = %manifest.id, "apply failed, restoring");
                if let Err(restore_err) = manager.restore(&manifest) {
                    tracing::error!(error = %restore_err, "automatic restore failed");
                }
                return Err(e);
            }
        }
        Ok(manifest.id)
    }

    /// Write planned source rewrites. A failed file becomes a warning and the
    /// rest of the batch continues.
    fn write_rewrites(
        &self,
        rewrites: Vec<(PlannedWrite, Vec<Replacement>)>,
        dry_run: bool,
        warnings: &mut Vec<String>,
    ) -> Vec<FileChange> {
        let mut files_changed = Vec::new();
        for (write, replacements) in rewrites {
            if !dry_run {
                if let Err(e) = atomic_write(&self.root.join(&write.path), write.content.as_bytes()) {
                    tracing::warn!(file = %write.path, error = %e, "rewrite failed");
                    warnings.push(format!("{}: rewrite failed: {e}", write.path));
                    continue;
                }
            }
            files_changed.push(FileChange {
                path: write.path,
                replacements,
            });
        }
        files_changed
    }
}

/// Apply `theme_id` to the project at `root` using its own config.
pub fn rebuild_project_theme(root: &Path, theme_id: &str, opts: RebuildOptions) -> Result<RebuildReport> {
    Rebuild::open(root)?.run(theme_id, opts)
}

/// The theme currently applied to `root`, read from the live palette.
pub fn project_theme(root: &Path) -> Result<Theme> {
    let path = paths::palette_path(root);
    if !path.is_file() {
        return Err(ThemeError::ProjectThemeNotFound);
    }
    let data = std::fs::read_to_string(&path)?;
    let doc: ThemeDocument = serde_json::from_str(&data)?;
    Theme::try_from(doc)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn read(root: &Path, rel: &str) -> String {
        std::fs::read_to_string(root.join(rel)).unwrap()
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "package.json", "{}");
        write(
            dir.path(),
            "src/components/Button.tsx",
            "export const Button = () => <button className=\"bg-blue-500 hover:bg-blue-600\" />;\n",
        );
        write(dir.path(), "src/index.css", "@tailwind base;\n");
        dir
    }

    fn opts(dry_run: bool) -> RebuildOptions {
        RebuildOptions {
            mode: ScanMode::Standard,
            dry_run,
        }
    }

    #[test]
    fn apply_writes_artifacts_and_rewrites_sources() {
        let dir = project();
        let root = dir.path();
        let report = rebuild_project_theme(root, "neo-tokyo", opts(false)).unwrap();

        assert_eq!(
            read(root, "src/components/Button.tsx"),
            "export const Button = () => <button className=\"bg-primary hover:bg-primary/90\" />;\n"
        );
        assert!(read(root, "src/styles/theme.css").contains("--primary: 346.8 77.2% 49.8%;"));
        assert!(read(root, "tailwind.config.js").contains(render::COLORS_START));
        assert!(read(root, "src/index.css").starts_with("@import \"./styles/theme.css\";\n"));
        assert_eq!(report.import_wired.as_deref(), Some("src/index.css"));
        assert!(report.config_updated);
        assert!(report.backup.is_some());
        assert_eq!(report.files_changed.len(), 1);
        assert_eq!(report.files_changed[0].total(), 2);
        assert!(!paths::lock_path(root).exists());

        let applied = project_theme(root).unwrap();
        assert_eq!(applied, ThemeStore::builtin().get_by_id("neo-tokyo").unwrap());
    }

    #[test]
    fn dry_run_reports_the_same_and_writes_nothing() {
        let dry_dir = project();
        let real_dir = project();

        let dry = rebuild_project_theme(dry_dir.path(), "neo-tokyo", opts(true)).unwrap();
        assert!(dry.backup.is_none());
        assert!(!dry_dir.path().join(".themekit").exists());
        assert!(!dry_dir.path().join("tailwind.config.js").exists());
        assert_eq!(read(dry_dir.path(), "src/index.css"), "@tailwind base;\n");

        let real = rebuild_project_theme(real_dir.path(), "neo-tokyo", opts(false)).unwrap();
        assert_eq!(dry.artifacts, real.artifacts);
        assert_eq!(dry.files_changed, real.files_changed);
        assert_eq!(dry.warnings, real.warnings);
        assert_eq!(dry.scan, real.scan);
    }

    #[test]
    fn invalid_theme_aborts_before_any_write() {
        let dir = project();
        let lib = dir.path().join("themes");
        write(&lib, "broken.json", r#"{"id":"broken","name":"Broken","category":"retro"}"#);
        let mut config = Config::default();
        config.theme_library = Some(PathBuf::from("themes"));
        config.save(dir.path()).unwrap();

        let err = rebuild_project_theme(dir.path(), "broken", opts(false)).unwrap_err();
        assert!(matches!(err, ThemeError::ValidationFailed { .. }));
        assert!(!paths::backups_dir(dir.path()).exists());
        assert!(!paths::palette_path(dir.path()).exists());
    }

    #[test]
    fn rollback_after_apply_restores_everything() {
        let dir = project();
        let root = dir.path();
        let before_button = read(root, "src/components/Button.tsx");
        rebuild_project_theme(root, "neo-tokyo", opts(false)).unwrap();

        BackupManager::new(root).rollback(None).unwrap();
        assert_eq!(read(root, "src/components/Button.tsx"), before_button);
        assert_eq!(read(root, "src/index.css"), "@tailwind base;\n");
        assert!(!root.join("tailwind.config.js").exists());
        assert!(!paths::palette_path(root).exists());
        assert!(matches!(project_theme(root).unwrap_err(), ThemeError::ProjectThemeNotFound));
    }

    #[test]
    fn unfixable_matches_become_warnings() {
        let dir = project();
        write(dir.path(), "src/Odd.tsx", "<p className=\"text-emerald-700\" />\n");
        let report = rebuild_project_theme(dir.path(), "neo-tokyo", opts(true)).unwrap();
        assert!(report
            .warnings
            .iter()
            .any(|w| w == "src/Odd.tsx:1:15: 'text-emerald-700' has no semantic mapping"));
    }

    #[test]
    fn held_lock_blocks_apply() {
        let dir = project();
        let _held = ProjectLock::acquire(dir.path()).unwrap();
        let err = rebuild_project_theme(dir.path(), "neo-tokyo", opts(false)).unwrap_err();
        assert!(matches!(err, ThemeError::Locked(_)));
    }

    #[test]
    fn backup_failure_aborts_before_any_write() {
        let dir = project();
        let root = dir.path();
        let button = read(root, "src/components/Button.tsx");
        write(root, ".themekit/backups", "not a directory");

        let err = rebuild_project_theme(root, "neo-tokyo", opts(false)).unwrap_err();
        assert_eq!(err.code(), "BACKUP_IO_ERROR");
        assert_eq!(read(root, "src/components/Button.tsx"), button);
        assert_eq!(read(root, "src/index.css"), "@tailwind base;\n");
        assert!(!paths::palette_path(root).exists());
        assert!(!root.join("tailwind.config.js").exists());
        assert!(!paths::lock_path(root).exists());
    }

    #[test]
    fn artifact_write_failure_restores_backup() {
        let dir = project();
        let root = dir.path();
        let button = read(root, "src/components/Button.tsx");
        // The stylesheet's parent directory cannot be created.
        write(root, "src/styles", "");

        rebuild_project_theme(root, "neo-tokyo", opts(false)).unwrap_err();
        assert!(!paths::palette_path(root).exists());
        assert!(!root.join("tailwind.config.js").exists());
        assert_eq!(read(root, "src/components/Button.tsx"), button);
        assert_eq!(read(root, "src/index.css"), "@tailwind base;\n");
        assert!(!paths::lock_path(root).exists());
        assert_eq!(BackupManager::new(root).list().unwrap().len(), 1);
    }

    #[test]
    fn rewrite_failure_is_a_warning_and_batch_continues() {
        let dir = project();
        let root = dir.path();
        write(root, "src/Card.tsx", "<div className=\"bg-red-500\" />\n");

        let rebuild = Rebuild::open(root).unwrap();
        let theme = rebuild.store.get_by_id("neo-tokyo").unwrap();
        let plan = rebuild.plan(&theme, ScanMode::Standard).unwrap();
        assert_eq!(plan.rewrites.len(), 2);
        rebuild.execute(&theme, &plan).unwrap();

        // One target turns into a directory between planning and writing.
        std::fs::remove_file(root.join("src/components/Button.tsx")).unwrap();
        std::fs::create_dir(root.join("src/components/Button.tsx")).unwrap();

        let mut warnings = Vec::new();
        let changed = rebuild.write_rewrites(plan.rewrites, false, &mut warnings);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].path, "src/Card.tsx");
        assert_eq!(read(root, "src/Card.tsx"), "<div className=\"bg-destructive\" />\n");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("src/components/Button.tsx: rewrite failed"));
    }

    #[test]
    fn project_theme_missing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(project_theme(dir.path()).unwrap_err().code(), "PROJECT_THEME_NOT_FOUND");
    }
}
