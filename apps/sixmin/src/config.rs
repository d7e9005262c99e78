//! # Configuration
//!
//! Loaded once at startup and passed explicitly into the driver.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config`, or `sixmin.toml` in the working directory)
//! 3. Environment variables:
//!    - `NOTION_TOKEN`, `NOTION_DATABASE_ID`, `SIXMIN_NOTION_URL`
//!    - `LOG_LEVEL` (`error` | `warn` | `info` | `debug`)
//!    - `DRY_RUN` (`1` or `true`)
//! 4. CLI flags (`--dry-run`)
//!
//! ## Example
//!
//! ```toml
//! log_level = "debug"
//! anchor = "item-date"
//!
//! [notion]
//! database_id = "262e666ecf2c80a6a1f0e5d4c3b2a190"
//!
//! [fields]
//! target = "Goal"
//! ```

use crate::SixminError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "sixmin.toml";

/// Notion REST API root.
pub const DEFAULT_NOTION_URL: &str = "https://api.notion.com";

/// Items requested per query page (Notion's maximum).
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// =============================================================================
// CONFIG
// =============================================================================

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log_level: LogLevel,
    pub dry_run: bool,
    pub anchor: AnchorPolicy,
    pub notion: NotionConfig,
    pub fields: FieldNames,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, SixminError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from `path`, or from `sixmin.toml` if present, or use defaults.
    ///
    /// An explicit path must exist; the implicit one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, SixminError> {
        let candidate: Option<PathBuf> = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            }
        };

        match candidate {
            Some(p) => {
                let text = std::fs::read_to_string(&p).map_err(|e| {
                    SixminError::Config(format!("Cannot read config '{}': {}", p.display(), e))
                })?;
                Self::from_toml_str(&text)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("NOTION_TOKEN").filter(|v| !v.is_empty()) {
            self.notion.token = Some(token);
        }
        if let Some(id) = lookup("NOTION_DATABASE_ID").filter(|v| !v.is_empty()) {
            self.notion.database_id = Some(id);
        }
        if let Some(url) = lookup("SIXMIN_NOTION_URL").filter(|v| !v.is_empty()) {
            self.notion.base_url = url;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = LogLevel::parse(&level);
        }
        if let Some(flag) = lookup("DRY_RUN") {
            self.dry_run = matches!(flag.trim(), "1" | "true");
        }
    }
}

// =============================================================================
// LOG LEVEL
// =============================================================================

/// Verbosity of the sixmin crates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a level name. Unknown names fall back to `info`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "debug" | "trace" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// `tracing_subscriber::EnvFilter` directive for this level.
    #[must_use]
    pub fn filter_directive(self) -> String {
        format!("sixmin={0},sixmin_core={0}", self.as_str())
    }
}

// =============================================================================
// ANCHOR POLICY
// =============================================================================

/// Where the next-review interval is counted from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPolicy {
    /// Count from the day of the run.
    #[default]
    Today,
    /// Count from the item's own date field, falling back to the run day.
    ItemDate,
}

// =============================================================================
// NOTION
// =============================================================================

/// Connection settings for the Notion store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotionConfig {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub base_url: String,
    pub page_size: u32,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: None,
            database_id: None,
            base_url: DEFAULT_NOTION_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("database_id", &self.database_id)
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl NotionConfig {
    /// Token and database id, or a configuration error naming what is missing.
    pub fn credentials(&self) -> Result<(&str, &str), SixminError> {
        match (self.token.as_deref(), self.database_id.as_deref()) {
            (Some(token), Some(db)) => Ok((token, db)),
            _ => Err(SixminError::Config(
                "NOTION_TOKEN and NOTION_DATABASE_ID are required".to_string(),
            )),
        }
    }
}

// =============================================================================
// FIELD NAMES
// =============================================================================

/// Store property names for the logical fields.
///
/// Score field names come from the stage table and are not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldNames {
    pub title: String,
    pub anchor: String,
    pub stage: String,
    pub next_review: String,
    pub target: String,
    pub status: String,
    pub last_review: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            title: "Name".to_string(),
            anchor: "Date".to_string(),
            stage: "Review Stage".to_string(),
            next_review: "Next Review Date".to_string(),
            target: "Review Target".to_string(),
            status: "Status".to_string(),
            last_review: "Last Review Date".to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
