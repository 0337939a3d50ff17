//! Merge settings.
//!
//! Settings are loaded from `docmerge.toml` in the working directory:
//!
//! ```toml
//! name_column = "Candidate_Name"
//! missing_values = "empty"     # or "strict"
//! on_collision = "overwrite"   # or "suffix"
//! sheet = "Sheet1"
//!
//! [output]
//! schema_file = "placeholders.xlsx"
//! archive_file = "documents.zip"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use docmerge_ooxml::MissingValuePolicy;

use crate::error::Result;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "docmerge.toml";

/// Column whose value names each output document
pub const DEFAULT_NAME_COLUMN: &str = "Candidate_Name";

/// What happens when two rows produce the same output filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The later row replaces the earlier document
    #[default]
    Overwrite,
    /// The later document gets `_{row}` appended to its name
    Suffix,
}

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Column used to name output documents
    pub name_column: String,
    /// Handling of placeholders without a value
    pub missing_values: MissingValuePolicy,
    /// Handling of duplicate output filenames
    pub on_collision: CollisionPolicy,
    /// Workbook sheet to read; the first sheet when unset
    pub sheet: Option<String>,
    /// Output file names
    pub output: OutputSettings,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            missing_values: MissingValuePolicy::default(),
            on_collision: CollisionPolicy::default(),
            sheet: None,
            output: OutputSettings::default(),
        }
    }
}

impl MergeSettings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load `docmerge.toml` from `dir` if it exists, defaults otherwise
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading settings");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Output file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Schema workbook written by the extract step
    pub schema_file: String,
    /// Archive written by the generate step
    pub archive_file: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            schema_file: "placeholders.xlsx".to_string(),
            archive_file: "documents.zip".to_string(),
        }
    }
}
