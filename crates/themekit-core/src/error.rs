use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("theme '{theme}' failed validation: {}", .errors.join("; "))]
    ValidationFailed { theme: String, errors: Vec<String> },

    #[error("theme not found: {0}")]
    ThemeNotFound(String),

    #[error("invalid theme id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidThemeId(String),

    #[error("no theme applied to this project: run 'themekit apply <theme>' first")]
    ProjectThemeNotFound,

    #[error("backup not found: {0}")]
    BackupNotFound(String),

    #[error("no backups found for this project")]
    NoBackups,

    #[error("backup failed at {}: {source}", .path.display())]
    BackupIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("another theme operation holds the project lock ({}); remove it if stale", .0.display())]
    Locked(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ThemeError {
    /// Stable machine-readable code for callers that report errors as data.
    pub fn code(&self) -> &'static str {
        match self {
            ThemeError::ValidationFailed { .. } => "VALIDATION_ERROR",
            ThemeError::ThemeNotFound(_) => "THEME_NOT_FOUND",
            ThemeError::InvalidThemeId(_) => "VALIDATION_ERROR",
            ThemeError::ProjectThemeNotFound => "PROJECT_THEME_NOT_FOUND",
            ThemeError::BackupNotFound(_) => "BACKUP_NOT_FOUND",
            ThemeError::NoBackups => "NO_BACKUPS",
            ThemeError::BackupIo { .. } => "BACKUP_IO_ERROR",
            ThemeError::Locked(_) => "LOCKED",
            ThemeError::Io(_) => "IO_ERROR",
            ThemeError::Yaml(_) | ThemeError::Json(_) => "PARSE_ERROR",
        }
    }

    pub(crate) fn backup_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ThemeError::BackupIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ThemeError>;
