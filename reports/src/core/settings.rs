//! Host-wide settings read by the reports add-on.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::format::{AdminLinks, LinkStyle};
use crate::error::{ReportError, Result};

pub const DEFAULT_BASE_FILENAME: &str = "badgeos-report";

/// Minimum role allowed to open report pages, stored as the host capability
/// string it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "manage_options")]
    Administrator,
    #[serde(rename = "delete_others_posts")]
    Editor,
    #[serde(rename = "publish_posts")]
    Author,
    #[serde(rename = "edit_posts")]
    Contributor,
    #[serde(rename = "read")]
    Subscriber,
}

impl Role {
    pub fn capability(self) -> &'static str {
        match self {
            Role::Administrator => "manage_options",
            Role::Editor => "delete_others_posts",
            Role::Author => "publish_posts",
            Role::Contributor => "edit_posts",
            Role::Subscriber => "read",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Host-wide minimum role; the fallback for `reports_minimum_role`.
    pub minimum_role: Role,
    pub reports_minimum_role: Option<Role>,
    /// Uploads root; CSV exports go to `<uploads_dir>/reports`.
    pub uploads_dir: PathBuf,
    /// Public URL of `uploads_dir`. Defaults to a `file://` URL.
    pub uploads_url: Option<String>,
    pub admin_url: String,
    /// `app` when the host routes `/report/{slug}` itself.
    pub link_style: LinkStyle,
    pub base_filename: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            minimum_role: Role::default(),
            reports_minimum_role: None,
            uploads_dir: default_uploads_dir(),
            uploads_url: None,
            admin_url: "/wp-admin/".to_string(),
            link_style: LinkStyle::default(),
            base_filename: DEFAULT_BASE_FILENAME.to_string(),
        }
    }
}

impl ReportSettings {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(raw) => {
                let settings: Self = serde_json::from_str(&raw)
                    .map_err(|err| ReportError::Settings(format!("{}: {err}", path.display())))?;
                debug!(path = %path.display(), "loaded report settings");
                Ok(settings)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn reports_role(&self) -> Role {
        self.reports_minimum_role.unwrap_or(self.minimum_role)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.uploads_dir.join("reports")
    }

    pub fn reports_url(&self) -> String {
        match &self.uploads_url {
            Some(url) => format!("{}/reports", url.trim_end_matches('/')),
            None => file_url(&self.reports_dir()),
        }
    }

    pub fn admin_links(&self) -> AdminLinks {
        match self.link_style {
            LinkStyle::Admin => AdminLinks::new(&self.admin_url),
            LinkStyle::App => AdminLinks::app(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "BadgeOS", "BadgeOS Reports")
}

fn default_uploads_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("uploads"))
        .unwrap_or_else(|| PathBuf::from("uploads"))
}

/// Per-user `settings.json` location.
pub fn default_settings_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("settings.json"))
}

/// Per-user activity snapshot read by the desktop shell.
pub fn default_snapshot_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("activity.json"))
        .unwrap_or_else(|| PathBuf::from("activity.json"))
}

/// Where the desktop shell delivers downloaded CSV exports.
pub fn default_exports_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("exports"))
        .unwrap_or_else(|| PathBuf::from("exports"))
}

fn file_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    if normalized.starts_with('/') {
        format!("file://{normalized}")
    } else {
        format!("file:///{normalized}")
    }
}
