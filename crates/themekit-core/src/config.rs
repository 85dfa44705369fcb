use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ScanConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extra project-relative directories to scan.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Extra directory names never descended into.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Substrings that mark a line in a test file as an assertion.
    #[serde(default = "default_assertion_calls")]
    pub assertion_calls: Vec<String>,
}

pub fn default_assertion_calls() -> Vec<String> {
    ["expect(", "assert(", "assert.", "assertEquals(", "toHaveClass("]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            assertion_calls: default_assertion_calls(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Directory of additional theme templates, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_library: Option<PathBuf>,
    /// Where the generated stylesheet is written.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,
    #[serde(default)]
    pub scan: ScanConfig,
}

fn default_version() -> u32 {
    1
}

fn default_stylesheet() -> String {
    paths::DEFAULT_STYLESHEET.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            theme_library: None,
            stylesheet: default_stylesheet(),
            scan: ScanConfig::default(),
        }
    }
}

impl Config {
    /// Load `.themekit/config.yaml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Theme library directory resolved against `root`.
    pub fn theme_library_dir(&self, root: &Path) -> Option<PathBuf> {
        self.theme_library.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        })
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.scan.assertion_calls.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "scan.assertion_calls is empty: assertion lines in tests will be rewritten"
                    .to_string(),
            });
        }

        for include in &self.scan.include {
            if !paths::stays_inside(include) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("scan.include '{include}' must stay inside the project"),
                });
            }
        }

        if !self.stylesheet.ends_with(".css") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!("stylesheet '{}' does not end in .css", self.stylesheet),
            });
        }
        if !paths::stays_inside(&self.stylesheet) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("stylesheet '{}' must stay inside the project", self.stylesheet),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.stylesheet, "src/styles/theme.css");
        assert!(cfg.scan.assertion_calls.contains(&"expect(".to_string()));
    }

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.scan.include.push("packages/ui".to_string());
        cfg.theme_library = Some(PathBuf::from("design/themes"));
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(
            loaded.theme_library_dir(dir.path()).unwrap(),
            dir.path().join("design/themes")
        );
    }

    #[test]
    fn partial_yaml_backward_compat() {
        let yaml = "version: 1\nscan:\n  exclude: [storybook-static]\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.scan.exclude, vec!["storybook-static"]);
        assert_eq!(cfg.scan.assertion_calls, default_assertion_calls());
        assert_eq!(cfg.stylesheet, paths::DEFAULT_STYLESHEET);
    }

    #[test]
    fn custom_assertion_calls() {
        let yaml = "scan:\n  assertion_calls: ['assertThat(', 'should.']\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.scan.assertion_calls, vec!["assertThat(", "should."]);
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_escaping_paths_and_empty_assertions() {
        let mut cfg = Config::default();
        cfg.scan.assertion_calls.clear();
        cfg.scan.include.push("../outside".to_string());
        cfg.stylesheet = "/abs/theme.scss".to_string();
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.message.contains("assertion_calls is empty")));
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("../outside")));
        assert!(warnings.iter().any(|w| w.message.contains("does not end in .css")));
    }
}
