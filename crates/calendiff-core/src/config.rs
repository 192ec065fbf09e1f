//! Dashboard configuration (`calendiff.toml`).
//!
//! Settings are read once by the caller and passed down as plain values;
//! nothing in the library reads configuration on its own.
//!
//! ```toml
//! event_base_dir = "exports"
//! event_folder = "V7900R-2025-09-15"
//! diff_folder = "V7800R-2025-09-01"
//! timezone = "JST"
//! filter_start_date = "2025-09-15"
//! filter_end_date = "2025-10-15"
//!
//! [reconcile]
//! duplicate_ids = "pair_in_order"
//!
//! [files]
//! rules = "data/type_mapping_rules.json"
//! ```

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::diff::model::ReconcileOptions;
use crate::display::time::Zone;
use crate::errors::CalendiffError;
use crate::loader::snapshot_path;

/// Top-level dashboard configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Directory holding one sub-folder per calendar export
    #[serde(default = "default_base_dir")]
    pub event_base_dir: PathBuf,

    /// Export folder of the current snapshot
    #[serde(default)]
    pub event_folder: Option<String>,

    /// Export folder of the previous snapshot; no diff when absent
    #[serde(default)]
    pub diff_folder: Option<String>,

    #[serde(default)]
    pub filter_start_date: Option<NaiveDate>,

    #[serde(default)]
    pub filter_end_date: Option<NaiveDate>,

    #[serde(default)]
    pub timezone: Zone,

    #[serde(default)]
    pub reconcile: ReconcileOptions,

    #[serde(default)]
    pub files: SideFiles,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            event_base_dir: default_base_dir(),
            event_folder: None,
            diff_folder: None,
            filter_start_date: None,
            filter_end_date: None,
            timezone: Zone::default(),
            reconcile: ReconcileOptions::default(),
            files: SideFiles::default(),
        }
    }
}

/// Paths of the rule, hero master and template files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SideFiles {
    #[serde(default = "default_rules")]
    pub rules: PathBuf,
    #[serde(default = "default_hero_master")]
    pub hero_master: PathBuf,
    #[serde(default = "default_forum_templates")]
    pub forum_templates: PathBuf,
    #[serde(default = "default_discord_templates")]
    pub discord_templates: PathBuf,
}

impl Default for SideFiles {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            hero_master: default_hero_master(),
            forum_templates: default_forum_templates(),
            discord_templates: default_discord_templates(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_rules() -> PathBuf {
    PathBuf::from("data/type_mapping_rules.json")
}

fn default_hero_master() -> PathBuf {
    PathBuf::from("data/hero_master.csv")
}

fn default_forum_templates() -> PathBuf {
    PathBuf::from("data/forum-template.txt")
}

fn default_discord_templates() -> PathBuf {
    PathBuf::from("data/discord-template.json")
}

impl DashboardConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on unreadable files, invalid TOML or unknown fields.
    pub fn load(path: &Path) -> Result<Self, CalendiffError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(CalendiffError::InvalidConfig {
                    reason: format!("{}: could not read file: {}", path.display(), e),
                })
            }
        };
        Self::parse(&contents).map_err(|e| match e {
            CalendiffError::InvalidConfig { reason } => CalendiffError::InvalidConfig {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` with a line number when the parser reports a span.
    pub fn parse(toml_str: &str) -> Result<Self, CalendiffError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            let mut reason = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start].matches('\n').count() + 1;
                reason = format!("line {}: {}", line, reason);
            }
            CalendiffError::InvalidConfig { reason }
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CalendiffError> {
        if let (Some(from), Some(to)) = (self.filter_start_date, self.filter_end_date) {
            if from > to {
                return Err(CalendiffError::InvalidConfig {
                    reason: format!("filter_start_date {} is after filter_end_date {}", from, to),
                });
            }
        }
        Ok(())
    }

    /// CSV path of the current snapshot, if a folder is configured.
    pub fn current_snapshot_path(&self) -> Option<PathBuf> {
        self.event_folder
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|f| snapshot_path(&self.event_base_dir, f))
    }

    /// CSV path of the previous snapshot, if a folder is configured.
    pub fn previous_snapshot_path(&self) -> Option<PathBuf> {
        self.diff_folder
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|f| snapshot_path(&self.event_base_dir, f))
    }
}
