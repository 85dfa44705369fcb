use std::path::Path;
use tempfile::TempDir;
use themekit_core::backup::BackupManager;
use themekit_core::config::Config;
use themekit_core::mapping::ScanMode;
use themekit_core::rebuild::{project_theme, rebuild_project_theme, RebuildOptions};
use themekit_core::scanner::{scan_project_colors, Scanner};
use themekit_core::store::ThemeStore;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}

fn apply(root: &Path, theme: &str, mode: ScanMode) {
    rebuild_project_theme(
        root,
        theme,
        RebuildOptions {
            mode,
            dry_run: false,
        },
    )
    .unwrap();
}

#[test]
fn neo_tokyo_end_to_end() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "src/components/Cta.tsx",
        "export const Cta = () => (\n  <a className=\"bg-blue-500 hover:bg-blue-600 text-white\">Go</a>\n);\n",
    );
    write(root, "src/app/globals.css", "@tailwind base;\n@tailwind components;\n");

    apply(root, "neo-tokyo", ScanMode::Full);

    let cta = read(root, "src/components/Cta.tsx");
    assert!(cta.contains("className=\"bg-primary hover:bg-primary/90 text-primary-foreground\""));
    assert!(read(root, "src/styles/theme.css").contains("--primary: 346.8 77.2% 49.8%;"));
    assert!(read(root, "src/app/globals.css").starts_with("@import \"../styles/theme.css\";\n"));
    assert!(read(root, "tailwind.config.js").contains("primary: \"hsl(var(--primary))\""));
}

#[test]
fn applied_theme_reads_back_equal() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "package.json", "{}");
    apply(dir.path(), "evergreen", ScanMode::Standard);

    let expected = ThemeStore::builtin().get_by_id("evergreen").unwrap();
    assert_eq!(project_theme(dir.path()).unwrap(), expected);
}

#[test]
fn rollback_restores_artifacts_byte_for_byte() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    apply(root, "slate-minimal", ScanMode::Standard);
    write(
        root,
        "tailwind.config.ts",
        "export default {\r\n  theme: { extend: {} },\r\n};\r\n",
    );
    std::fs::remove_file(root.join("tailwind.config.js")).unwrap();

    let palette = read(root, ".themekit/theme.json");
    let stylesheet = read(root, "src/styles/theme.css");
    let build = read(root, "tailwind.config.ts");

    apply(root, "arcade", ScanMode::Standard);
    assert_ne!(read(root, ".themekit/theme.json"), palette);
    assert_ne!(read(root, "tailwind.config.ts"), build);

    let outcome = BackupManager::new(root).rollback(None).unwrap();
    assert_eq!(outcome.restored_theme, "slate-minimal");
    assert_eq!(read(root, ".themekit/theme.json"), palette);
    assert_eq!(read(root, "src/styles/theme.css"), stylesheet);
    assert_eq!(read(root, "tailwind.config.ts"), build);
    assert_eq!(project_theme(root).unwrap().id, "slate-minimal");
}

#[test]
fn scan_is_idempotent_and_consistent() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/a.tsx", "<div className=\"bg-red-500 text-slate-600 bg-card\" />\n");
    write(root, "components/b.vue", "<p style=\"color: #FFFFFF\" class=\"text-primary\" />\n");
    write(root, "node_modules/x/index.js", "bg-red-500\n");

    let first = scan_project_colors(root, ScanMode::Full).unwrap();
    let second = scan_project_colors(root, ScanMode::Full).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.compliant_count,
        first.total_references - first.non_compliant_count
    );
    let paths: Vec<&str> = first.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["components/b.vue", "src/a.tsx"]);
}

#[test]
fn test_assertions_survive_full_apply() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let content = "it('renders', () => {\n  render(<Alert className=\"bg-red-500\" />);\n  expect(el).toHaveClass('bg-red-500');\n});\n";
    write(root, "src/Alert.test.tsx", content);

    apply(root, "harbor", ScanMode::Full);

    assert_eq!(
        read(root, "src/Alert.test.tsx"),
        "it('renders', () => {\n  render(<Alert className=\"bg-destructive\" />);\n  expect(el).toHaveClass('bg-red-500');\n});\n"
    );

    let rescan = Scanner::new(&Config::default()).scan(root, ScanMode::Full).unwrap();
    assert_eq!(rescan.fixable_count(), 0);
    assert_eq!(rescan.non_compliant_count, 1);
}
