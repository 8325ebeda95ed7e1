//! Class-derived variant and size tokens
//!
//! A class token such as `-secondary` or `btn-primary-lg` is split at every
//! marker character; each segment after a marker is a candidate, kept only if
//! it belongs to the variant or size vocabulary.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Token reported when the class attribute is absent or empty
pub const DEFAULT_SENTINEL: &str = "default";

const DEFAULT_VARIANTS: &[&str] = &[
    "primary", "secondary", "tertiary", "ghost", "outline", "link", "text",
    "danger", "warning", "success", "info", "neutral", "inverse",
];

const DEFAULT_SIZES: &[&str] = &["xs", "sm", "md", "lg", "xl", "xxl", "small", "medium", "large"];

/// Recognized token vocabularies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenVocabulary {
    /// Character that introduces a token inside a class name
    pub marker: char,
    #[serde(deserialize_with = "lowercase_set")]
    pub variants: BTreeSet<String>,
    #[serde(deserialize_with = "lowercase_set")]
    pub sizes: BTreeSet<String>,
    /// Stand-in token for "no styling information"
    pub sentinel: String,
}

impl Default for TokenVocabulary {
    fn default() -> Self {
        Self {
            marker: '-',
            variants: DEFAULT_VARIANTS.iter().map(|s| s.to_string()).collect(),
            sizes: DEFAULT_SIZES.iter().map(|s| s.to_string()).collect(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

/// Vocabulary words are compared against lowercased candidates
fn lowercase_set<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
    let words = Vec::<String>::deserialize(deserializer)?;
    Ok(words.into_iter().map(|w| w.trim().to_ascii_lowercase()).filter(|w| !w.is_empty()).collect())
}

/// Tokens derived from one class attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedTokens {
    pub variants: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
}

impl TokenVocabulary {
    /// Derive variant and size tokens from a class attribute value
    pub fn derive(&self, class_attr: Option<&str>) -> DerivedTokens {
        let class_attr = class_attr.map(str::trim).unwrap_or_default();
        if class_attr.is_empty() {
            return DerivedTokens {
                variants: BTreeSet::from([self.sentinel.clone()]),
                sizes: BTreeSet::from([self.sentinel.clone()]),
            };
        }

        let mut tokens = DerivedTokens::default();
        for class in class_attr.split_whitespace() {
            for segment in class.split(self.marker).skip(1) {
                if segment.is_empty() {
                    continue;
                }
                let candidate = segment.to_ascii_lowercase();
                if self.variants.contains(&candidate) {
                    tokens.variants.insert(candidate.clone());
                }
                if self.sizes.contains(&candidate) {
                    tokens.sizes.insert(candidate);
                }
            }
        }
        tokens
    }
}
