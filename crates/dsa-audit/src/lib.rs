//! dsa Audit - design-system usage auditing
//!
//! Given a DOM snapshot with shadow roots, finds every tracked component
//! whether it sits in the document or deep inside other components, records
//! how each one is styled, and checks that styling against a reference
//! catalog.
//!
//! ```text
//! Document ──► Extractor ──► ComponentReport ─┐
//!     │                                       ├─► Comparator ──► Violation
//!     │                   ReferenceCatalog ───┘
//!     └──────► scan_native ──► NativeUsage
//! ```

mod audit;
mod catalog;
mod compare;
mod config;
mod extract;
mod native;
mod tokens;

pub use audit::{AuditError, AuditSummary, Auditor, PageAudit};
pub use catalog::{AttributeConstraint, CatalogError, ReferenceCatalog, ReferenceSpec};
pub use compare::{Comparator, Violation, ViolationKind, compare};
pub use config::{AuditConfig, ConfigError};
pub use extract::{
    ComponentReport, ControlLocator, DEFAULT_CLASS_PREFIX, ElementMatch, Extractor, ExtractorConfig, Location,
    SelectorControlLocator,
};
pub use native::{NativePattern, NativePatternConfig, NativeUsage, scan_native};
pub use tokens::{DEFAULT_SENTINEL, DerivedTokens, TokenVocabulary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
