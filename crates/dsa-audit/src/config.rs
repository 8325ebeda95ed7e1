//! Audit configuration
//!
//! ```json
//! {
//!   "tracked_tags": ["x-button", "x-badge"],
//!   "native_patterns": { "native-button": "button", "bootstrap-button": "[class^=\"btn\"]" },
//!   "vocabulary": { "sizes": ["sm", "md", "lg"] },
//!   "control_class_prefix": "ds-",
//!   "sample_limit": 50,
//!   "catalog": "reference.json"
//! }
//! ```
//!
//! Every field is optional. `native_patterns` keeps the order it was written in.

use crate::extract::{DEFAULT_CLASS_PREFIX, ExtractorConfig, SelectorControlLocator};
use crate::native::{NativePattern, NativePatternConfig};
use crate::tokens::TokenVocabulary;
use dsa_dom::SelectorError;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid selector for {name:?}: {source}")]
    Selector {
        name: String,
        #[source]
        source: SelectorError,
    },
}

/// Everything the auditor needs besides the catalog itself
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Component tags to report on
    pub tracked_tags: Vec<String>,
    /// Named selectors for hand-rolled native markup
    #[serde(deserialize_with = "pattern_map")]
    pub native_patterns: Vec<NativePatternConfig>,
    pub vocabulary: TokenVocabulary,
    /// Class prefix that marks a styled control inside a wrapper
    pub control_class_prefix: String,
    /// Replaces the whole control selector when set
    pub control_selector: Option<String>,
    pub class_attribute: String,
    pub sample_limit: Option<usize>,
    /// Reference catalog, relative to the config file
    pub catalog: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            tracked_tags: Vec::new(),
            native_patterns: default_patterns(),
            vocabulary: TokenVocabulary::default(),
            control_class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            control_selector: None,
            class_attribute: "class".to_string(),
            sample_limit: None,
            catalog: None,
        }
    }
}

fn default_patterns() -> Vec<NativePatternConfig> {
    [
        ("native-button", "button"),
        ("native-input", "input"),
        ("native-select", "select"),
        ("native-textarea", "textarea"),
    ]
    .into_iter()
    .map(|(name, selector)| NativePatternConfig {
        name: name.to_string(),
        selector: selector.to_string(),
    })
    .collect()
}

fn pattern_map<'de, D>(deserializer: D) -> Result<Vec<NativePatternConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(name, selector)| match selector {
            serde_json::Value::String(selector) => Ok(NativePatternConfig { name, selector }),
            other => Err(serde::de::Error::custom(format!(
                "selector for {name:?} must be a string, got {other}"
            ))),
        })
        .collect()
}

impl AuditConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from disk; a relative `catalog` path is resolved against the
    /// config file's directory
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_json_str(&json)?;

        if let Some(catalog) = config.catalog.take() {
            let resolved = match path.parent() {
                Some(dir) if catalog.is_relative() => dir.join(catalog),
                _ => catalog,
            };
            config.catalog = Some(resolved);
        }

        tracing::info!(
            "Loaded config {}: {} tracked tags, {} native patterns",
            path.display(),
            config.tracked_tags.len(),
            config.native_patterns.len()
        );
        Ok(config)
    }

    /// Compile native pattern selectors
    pub fn compile_patterns(&self) -> Result<Vec<NativePattern>, ConfigError> {
        self.native_patterns
            .iter()
            .map(|p| {
                NativePattern::new(&p.name, &p.selector).map_err(|source| ConfigError::Selector {
                    name: p.name.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Control locator for wrapper components
    pub fn control_locator(&self) -> Result<SelectorControlLocator, ConfigError> {
        let located = match &self.control_selector {
            Some(selector) => SelectorControlLocator::from_selector(selector),
            None => SelectorControlLocator::with_class_prefix(&self.control_class_prefix),
        };
        located.map_err(|source| ConfigError::Selector {
            name: "control_selector".to_string(),
            source,
        })
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            vocabulary: self.vocabulary.clone(),
            class_attribute: self.class_attribute.clone(),
            sample_limit: self.sample_limit,
        }
    }
}
