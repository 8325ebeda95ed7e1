//! One-page audit pipeline: extract, compare, scan native markup

use crate::catalog::ReferenceCatalog;
use crate::compare::{Comparator, Violation};
use crate::config::{AuditConfig, ConfigError};
use crate::extract::{ComponentReport, Extractor, SelectorControlLocator};
use crate::native::{NativePattern, NativeUsage, scan_native};
use dsa_dom::{Document, NodeId, ShadowTree, TraversalError};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Audit errors
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Traversal failed: {0}")]
    Traversal(#[from] TraversalError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Page-level totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditSummary {
    pub component_total: usize,
    pub component_kinds: usize,
    pub violation_total: usize,
    pub native_total: usize,
    /// components / (components + natives), `None` when both are zero
    pub compliance_ratio: Option<f64>,
}

impl AuditSummary {
    fn new(
        components: &BTreeMap<String, ComponentReport>,
        violations: &BTreeMap<String, Vec<Violation>>,
        native: &[NativeUsage],
    ) -> Self {
        let component_total: usize = components.values().map(ComponentReport::count).sum();
        let native_total: usize = native.iter().map(|n| n.count).sum();
        let all = component_total + native_total;
        Self {
            component_total,
            component_kinds: components.len(),
            violation_total: violations.values().map(Vec::len).sum(),
            native_total,
            compliance_ratio: (all > 0).then(|| component_total as f64 / all as f64),
        }
    }
}

/// Everything found on one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageAudit {
    pub page: String,
    pub components: BTreeMap<String, ComponentReport>,
    pub violations: BTreeMap<String, Vec<Violation>>,
    pub native: Vec<NativeUsage>,
    pub summary: AuditSummary,
}

/// Runs the pipeline; cheap to share across pages
#[derive(Debug, Clone)]
pub struct Auditor {
    tracked: Vec<String>,
    tracked_set: HashSet<String>,
    extractor: Extractor<SelectorControlLocator>,
    comparator: Comparator,
    patterns: Vec<NativePattern>,
    catalog: Arc<ReferenceCatalog>,
}

impl Auditor {
    /// Compile selectors from `config`
    pub fn new(config: &AuditConfig, catalog: Arc<ReferenceCatalog>) -> Result<Self, AuditError> {
        let tracked: Vec<String> = config
            .tracked_tags
            .iter()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let extractor = Extractor::new(config.extractor_config()).with_locator(config.control_locator()?);

        Ok(Self {
            tracked_set: tracked.iter().cloned().collect(),
            tracked,
            extractor,
            comparator: Comparator::new().with_sentinel(config.vocabulary.sentinel.clone()),
            patterns: config.compile_patterns()?,
            catalog,
        })
    }

    /// Audit a parsed document from its root
    pub fn audit(&self, document: &Document, page: &str) -> Result<PageAudit, AuditError> {
        self.audit_tree(document.tree(), NodeId::ROOT, page)
    }

    /// Audit any shadow-aware tree under `root`
    pub fn audit_tree<T: ShadowTree + ?Sized>(&self, tree: &T, root: NodeId, page: &str) -> Result<PageAudit, AuditError> {
        let components = self.extractor.extract(tree, root, &self.tracked)?;
        let violations = self.comparator.compare(&components, &self.catalog);
        let native = scan_native(tree, root, &self.patterns, &self.tracked_set)?;
        let summary = AuditSummary::new(&components, &violations, &native);

        tracing::info!(
            "{}: {} components, {} violations, {} native elements",
            page,
            summary.component_total,
            summary.violation_total,
            summary.native_total
        );

        Ok(PageAudit {
            page: page.to_string(),
            components,
            violations,
            native,
            summary,
        })
    }
}
