//! Persisted user settings.
//!
//! The settings object is stored as JSON with camelCase keys:
//!
//! ```json
//! {
//!   "markdown": { "headingStyle": "atx", "bulletListMarker": "-" },
//!   "content": { "defaultSelectors": ["article"], "excludeSelectors": ["nav"] },
//!   "file": { "filenameTemplate": "[title]", "promptFilename": true }
//! }
//! ```
//!
//! Every key is optional; missing ones take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::locator::{ContentLocator, DEFAULT_EXCLUDE_SELECTORS, DEFAULT_SELECTORS};
use crate::options::RuleConfig;
use crate::transformer::MarkdownTransformer;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub markdown: RuleConfig,
    pub content: ContentSettings,
    pub file: FileSettings,
}

/// Selectors used to find and clean the main content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentSettings {
    pub default_selectors: Vec<String>,
    pub exclude_selectors: Vec<String>,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            default_selectors: DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            exclude_selectors: DEFAULT_EXCLUDE_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileSettings {
    /// Download name; `[title]` and `[date]` are substituted
    pub filename_template: String,
    /// Ask for a name before saving
    pub prompt_filename: bool,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            filename_template: "[title]".to_string(),
            prompt_filename: true,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.content.drop_blank_selectors();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading settings from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn locator(&self) -> ContentLocator {
        ContentLocator::new(
            self.content.default_selectors.as_slice(),
            self.content.exclude_selectors.as_slice(),
        )
    }

    pub fn transformer(&self) -> MarkdownTransformer {
        MarkdownTransformer::with_config(self.markdown.clone())
    }
}

impl ContentSettings {
    fn drop_blank_selectors(&mut self) {
        self.default_selectors.retain(|s| !s.trim().is_empty());
        self.exclude_selectors.retain(|s| !s.trim().is_empty());
    }
}
