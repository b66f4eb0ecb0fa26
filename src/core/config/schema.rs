//! core::config::schema
//!
//! Configuration schema types.
//!
//! Both scopes (global and repo) share one schema. Every key is optional so
//! a repo file can override a single value and inherit the rest.
//!
//! # Example
//!
//! ```toml
//! [export]
//! output_dir = "patches"
//! cover_letter = true
//!
//! [import]
//! signoff = false
//! start_point = "HEAD"
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Contents of one config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// `patchset export` defaults
    pub export: Option<ExportDefaults>,

    /// `patchset import` defaults
    pub import: Option<ImportDefaults>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(export) = &self.export {
            if export.output_dir.as_deref() == Some("") {
                return Err(ConfigError::InvalidValue(
                    "export.output_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Some(import) = &self.import {
            if import.start_point.as_deref().is_some_and(|s| s.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "import.start_point cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Export command defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExportDefaults {
    /// Base directory; the series lands in `<output_dir>/<name>`
    pub output_dir: Option<String>,

    /// Generate a cover letter from the cover tag
    pub cover_letter: Option<bool>,
}

/// Import command defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ImportDefaults {
    /// Add `Signed-off-by` when applying
    pub signoff: Option<bool>,

    /// Revision the imported branch starts from
    pub start_point: Option<String>,
}
