//! Reference comparison
//!
//! Flags observed usage that falls outside a tag's reference. Tags without
//! a reference are skipped. Within one sample, variant findings come before
//! size findings, which come before attribute findings in declared order.

use crate::catalog::{ReferenceCatalog, ReferenceSpec};
use crate::extract::{ComponentReport, ElementMatch};
use crate::tokens::DEFAULT_SENTINEL;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What kind of value was out of range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "axis", content = "attribute", rename_all = "lowercase")]
pub enum ViolationKind {
    Variant,
    Size,
    Attribute(String),
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variant => f.write_str("variant"),
            Self::Size => f.write_str("size"),
            Self::Attribute(name) => write!(f, "attribute {name:?}"),
        }
    }
}

/// One out-of-reference usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub tag: String,
    /// Index of the offending sample in its report
    pub index: usize,
    pub kind: ViolationKind,
    /// Offending tokens or attribute value
    pub values: Vec<String>,
    /// The full allowed set, in declared order
    pub allowed: Vec<String>,
    pub message: String,
}

impl Violation {
    fn new(tag: &str, index: usize, kind: ViolationKind, values: Vec<String>, allowed: &[String]) -> Self {
        let message = format!(
            "{tag}[{index}]: {kind} {} not in allowed set [{}]",
            values.iter().map(|v| format!("{v:?}")).collect::<Vec<_>>().join(", "),
            allowed.join(", ")
        );
        Self {
            tag: tag.to_string(),
            index,
            kind,
            values,
            allowed: allowed.to_vec(),
            message,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Compares reports against a reference catalog
#[derive(Debug, Clone)]
pub struct Comparator {
    /// Token standing for "no styling information"; never flagged
    sentinel: String,
}

impl Comparator {
    pub fn new() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Violations per tag; tags without violations are omitted
    pub fn compare(
        &self,
        reports: &BTreeMap<String, ComponentReport>,
        catalog: &ReferenceCatalog,
    ) -> BTreeMap<String, Vec<Violation>> {
        let mut out = BTreeMap::new();
        for (tag, report) in reports {
            let Some(spec) = catalog.get(tag) else {
                tracing::debug!("{}: no reference, skipped", tag);
                continue;
            };
            let violations: Vec<Violation> = report
                .samples()
                .iter()
                .enumerate()
                .flat_map(|(index, sample)| self.check_sample(tag, index, sample, spec))
                .collect();
            if !violations.is_empty() {
                tracing::debug!("{}: {} violations", tag, violations.len());
                out.insert(tag.clone(), violations);
            }
        }
        out
    }

    fn check_sample(&self, tag: &str, index: usize, sample: &ElementMatch, spec: &ReferenceSpec) -> Vec<Violation> {
        let mut found = Vec::new();

        if let Some(allowed) = &spec.allowed_variants {
            if let Some(values) = self.outside(&sample.variants, allowed) {
                found.push(Violation::new(tag, index, ViolationKind::Variant, values, allowed));
            }
        }
        if let Some(allowed) = &spec.allowed_sizes {
            if let Some(values) = self.outside(&sample.sizes, allowed) {
                found.push(Violation::new(tag, index, ViolationKind::Size, values, allowed));
            }
        }
        for constraint in &spec.attributes {
            let Some(value) = sample.attribute(&constraint.name) else {
                continue;
            };
            if !constraint.allowed.is_empty() && !constraint.allowed.iter().any(|a| a == value) {
                found.push(Violation::new(
                    tag,
                    index,
                    ViolationKind::Attribute(constraint.name.clone()),
                    vec![value.to_string()],
                    &constraint.allowed,
                ));
            }
        }
        found
    }

    /// Observed tokens missing from the allowed list
    fn outside(&self, observed: &BTreeSet<String>, allowed: &[String]) -> Option<Vec<String>> {
        let values: Vec<String> = observed
            .iter()
            .filter(|t| **t != self.sentinel && !allowed.contains(*t))
            .cloned()
            .collect();
        (!values.is_empty()).then_some(values)
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare with the default sentinel
pub fn compare(
    reports: &BTreeMap<String, ComponentReport>,
    catalog: &ReferenceCatalog,
) -> BTreeMap<String, Vec<Violation>> {
    Comparator::new().compare(reports, catalog)
}
