//! Reference catalog
//!
//! Allowed variants, sizes and attribute values per tracked tag, loaded from
//! a JSON object keyed by tag name:
//!
//! ```json
//! {
//!   "x-button": {
//!     "variants": ["primary", "secondary"],
//!     "sizes": ["sm", "md", "lg"],
//!     "attributes": { "type": ["button", "submit"] }
//!   }
//! }
//! ```
//!
//! A missing `variants` or `sizes` key leaves that axis unconstrained, while
//! an explicit empty list allows nothing. Token values are lowercased on load
//! to match how tokens are derived from class names. An entry that does not
//! have this shape is dropped with a warning; the tag is then treated as
//! having no reference at all.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Allowed values for one named attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeConstraint {
    pub name: String,
    pub allowed: Vec<String>,
}

impl AttributeConstraint {
    pub fn new<I, S>(name: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_ascii_lowercase(),
            allowed: dedup(allowed.into_iter().map(Into::into)),
        }
    }
}

/// Reference for one tracked tag
///
/// `None` leaves a token axis unconstrained. An empty attribute list does the
/// same for that attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceSpec {
    pub allowed_variants: Option<Vec<String>>,
    pub allowed_sizes: Option<Vec<String>>,
    /// Checked in this order
    pub attributes: Vec<AttributeConstraint>,
}

impl ReferenceSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variants<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_variants = Some(token_values(allowed));
        self
    }

    pub fn sizes<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_sizes = Some(token_values(allowed));
        self
    }

    pub fn attribute<I, S>(mut self, name: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.push(AttributeConstraint::new(name, allowed));
        self
    }
}

fn token_values<I, S>(allowed: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    dedup(allowed.into_iter().map(|t| t.into().to_ascii_lowercase()))
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Catalog load errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog must be a JSON object keyed by tag name")]
    NotAnObject,
}

/// On-disk shape of one entry
#[derive(Debug, Deserialize)]
struct RawSpec {
    #[serde(default, alias = "allowedVariants", alias = "allowed_variants")]
    variants: Option<Vec<String>>,
    #[serde(default, alias = "allowedSizes", alias = "allowed_sizes")]
    sizes: Option<Vec<String>>,
    #[serde(default)]
    attributes: serde_json::Map<String, Value>,
}

impl RawSpec {
    fn into_spec(self) -> Result<ReferenceSpec, serde_json::Error> {
        let mut spec = ReferenceSpec::new();
        if let Some(variants) = self.variants {
            spec = spec.variants(variants);
        }
        if let Some(sizes) = self.sizes {
            spec = spec.sizes(sizes);
        }
        for (name, allowed) in self.attributes {
            let allowed: Vec<String> = serde_json::from_value(allowed)?;
            spec = spec.attribute(&name, allowed);
        }
        Ok(spec)
    }
}

/// Immutable map of tag name to reference spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceCatalog {
    specs: BTreeMap<String, ReferenceSpec>,
}

impl ReferenceCatalog {
    /// An empty catalog: every tag is unmapped
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-parsed specs (tags are lowercased)
    pub fn from_specs<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = (S, ReferenceSpec)>,
        S: AsRef<str>,
    {
        Self {
            specs: specs
                .into_iter()
                .map(|(tag, spec)| (tag.as_ref().to_ascii_lowercase(), spec))
                .collect(),
        }
    }

    /// Parse a JSON catalog, skipping malformed entries
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Load a JSON catalog from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!("Loaded {} reference specs from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    fn from_value(value: Value) -> Result<Self, CatalogError> {
        let Value::Object(entries) = value else {
            return Err(CatalogError::NotAnObject);
        };

        let mut specs = BTreeMap::new();
        for (tag, entry) in entries {
            let parsed = serde_json::from_value::<RawSpec>(entry).and_then(RawSpec::into_spec);
            match parsed {
                Ok(spec) => {
                    specs.insert(tag.to_ascii_lowercase(), spec);
                }
                Err(err) => tracing::warn!("Skipping malformed reference entry {:?}: {}", tag, err),
            }
        }
        Ok(Self { specs })
    }

    /// Reference for `tag`, if mapped
    pub fn get(&self, tag: &str) -> Option<&ReferenceSpec> {
        self.specs.get(&tag.to_ascii_lowercase())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReferenceSpec)> {
        self.specs.iter().map(|(tag, spec)| (tag.as_str(), spec))
    }
}
