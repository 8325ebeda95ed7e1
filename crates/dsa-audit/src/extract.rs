//! Component extraction
//!
//! For every tracked tag the extractor runs two queries against the same
//! root: the shadow-piercing [`find_all`] and the scope-bound [`query_open`].
//! Anything found by the first but not the second lives inside an
//! encapsulated sub-root. Each match becomes an [`ElementMatch`]; matches are
//! grouped into one [`ComponentReport`] per tag, and tags with no matches are
//! left out of the result.

use crate::tokens::{DerivedTokens, TokenVocabulary};
use dsa_dom::{
    Attribute, ClassList, NodeId, SelectorError, SelectorList, ShadowTree, TraversalError, find_all,
    query_first_in_scope, query_open,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Class prefix that marks an element as a design-system control
pub const DEFAULT_CLASS_PREFIX: &str = "ds-";

/// Where a match was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Reachable without crossing a shadow boundary
    Open,
    /// Only reachable through at least one shadow root
    Encapsulated,
}

/// One matched element and the usage facts derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementMatch {
    pub tag: String,
    pub location: Location,
    pub attributes: Vec<Attribute>,
    pub variants: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
    pub has_icon: bool,
    pub is_disabled: bool,
    /// Nearest element ancestor in the element's own tree scope
    pub parent_tag: Option<String>,
}

impl ElementMatch {
    /// Attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }
}

/// Aggregate usage of one tracked tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentReport {
    tag: String,
    count: usize,
    count_in_open: usize,
    count_in_encapsulated: usize,
    variants: BTreeSet<String>,
    sizes: BTreeSet<String>,
    samples: Vec<ElementMatch>,
}

impl ComponentReport {
    /// Aggregate matches; counts and token sets cover every match, the
    /// sample list keeps at most `sample_limit` of them in traversal order
    pub fn from_matches(tag: &str, matches: Vec<ElementMatch>, sample_limit: Option<usize>) -> Self {
        let count = matches.len();
        let count_in_open = matches.iter().filter(|m| m.location == Location::Open).count();
        let variants = matches.iter().flat_map(|m| m.variants.iter().cloned()).collect();
        let sizes = matches.iter().flat_map(|m| m.sizes.iter().cloned()).collect();

        let mut samples = matches;
        if let Some(limit) = sample_limit {
            samples.truncate(limit);
        }

        Self {
            tag: tag.to_ascii_lowercase(),
            count,
            count_in_open,
            count_in_encapsulated: count - count_in_open,
            variants,
            sizes,
            samples,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Total matches (`count_in_open + count_in_encapsulated`)
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn count_in_open(&self) -> usize {
        self.count_in_open
    }

    pub fn count_in_encapsulated(&self) -> usize {
        self.count_in_encapsulated
    }

    /// Distinct variant tokens across all matches
    pub fn variants(&self) -> &BTreeSet<String> {
        &self.variants
    }

    /// Distinct size tokens across all matches
    pub fn sizes(&self) -> &BTreeSet<String> {
        &self.sizes
    }

    pub fn samples(&self) -> &[ElementMatch] {
        &self.samples
    }
}

/// Picks the element inside a wrapper's shadow root that carries the real
/// styling classes
///
/// This is a heuristic: a wrapper rendering several native controls only
/// reports the first one the locator picks.
pub trait ControlLocator {
    fn locate<T: ShadowTree + ?Sized>(&self, tree: &T, host: NodeId) -> Option<NodeId>;
}

/// First element in the host's shadow root matching a selector list
#[derive(Debug, Clone)]
pub struct SelectorControlLocator {
    selector: SelectorList,
}

impl SelectorControlLocator {
    /// Native interactive tags plus anything classed with `class_prefix`
    pub fn with_class_prefix(class_prefix: &str) -> Result<Self, SelectorError> {
        let selector = format!(r#"button, input, select, textarea, a, [class^="{class_prefix}"]"#);
        Self::from_selector(&selector)
    }

    pub fn from_selector(selector: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            selector: SelectorList::parse(selector)?,
        })
    }

    pub fn selector(&self) -> &SelectorList {
        &self.selector
    }
}

impl Default for SelectorControlLocator {
    fn default() -> Self {
        Self::with_class_prefix(DEFAULT_CLASS_PREFIX).expect("built-in control selector parses")
    }
}

impl ControlLocator for SelectorControlLocator {
    fn locate<T: ShadowTree + ?Sized>(&self, tree: &T, host: NodeId) -> Option<NodeId> {
        let shadow = tree.shadow_root(host)?;
        query_first_in_scope(tree, shadow, &self.selector)
    }
}

/// Extraction settings
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub vocabulary: TokenVocabulary,
    /// Attribute tokens are derived from
    pub class_attribute: String,
    /// Maximum samples kept per report (`None` keeps all)
    pub sample_limit: Option<usize>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            vocabulary: TokenVocabulary::default(),
            class_attribute: "class".to_string(),
            sample_limit: None,
        }
    }
}

/// Component extractor
#[derive(Debug, Clone)]
pub struct Extractor<L = SelectorControlLocator> {
    config: ExtractorConfig,
    locator: L,
}

impl Extractor<SelectorControlLocator> {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            locator: SelectorControlLocator::default(),
        }
    }
}

impl Default for Extractor<SelectorControlLocator> {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl<L: ControlLocator> Extractor<L> {
    /// Use a different control-locating heuristic
    pub fn with_locator<M: ControlLocator>(self, locator: M) -> Extractor<M> {
        Extractor {
            config: self.config,
            locator,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Build one report per tracked tag found under `root`
    ///
    /// Duplicate tags are searched once. Tags with zero matches are absent
    /// from the result.
    pub fn extract<T, S>(&self, tree: &T, root: NodeId, tracked: &[S]) -> Result<BTreeMap<String, ComponentReport>, TraversalError>
    where
        T: ShadowTree + ?Sized,
        S: AsRef<str>,
    {
        let mut reports = BTreeMap::new();
        let mut seen = HashSet::new();

        for tag in tracked {
            let tag = tag.as_ref().trim().to_ascii_lowercase();
            if tag.is_empty() || !seen.insert(tag.clone()) {
                continue;
            }

            let all = find_all(tree, root, &tag)?;
            if all.is_empty() {
                tracing::debug!("{}: not found", tag);
                continue;
            }
            let open: HashSet<NodeId> = query_open(tree, root, &tag)?.into_iter().collect();

            let matches: Vec<ElementMatch> = all
                .iter()
                .map(|&node| {
                    let location = if open.contains(&node) {
                        Location::Open
                    } else {
                        Location::Encapsulated
                    };
                    self.build_match(tree, node, location)
                })
                .collect();

            let report = ComponentReport::from_matches(&tag, matches, self.config.sample_limit);
            tracing::debug!(
                "{}: {} total, {} open, {} encapsulated",
                tag,
                report.count(),
                report.count_in_open(),
                report.count_in_encapsulated()
            );
            reports.insert(tag, report);
        }

        Ok(reports)
    }

    /// Usage facts for a single element
    pub fn build_match<T: ShadowTree + ?Sized>(&self, tree: &T, node: NodeId, location: Location) -> ElementMatch {
        let control = self.locator.locate(tree, node);
        let tokens = self.derive_tokens(tree, node, control);

        ElementMatch {
            tag: tree.tag_name(node).unwrap_or_default().to_string(),
            location,
            attributes: tree.attributes(node).to_vec(),
            variants: tokens.variants,
            sizes: tokens.sizes,
            has_icon: has_icon(tree, node),
            is_disabled: is_disabled(tree, node) || control.is_some_and(|c| is_disabled(tree, c)),
            parent_tag: tree
                .element_parent(node)
                .and_then(|p| tree.tag_name(p))
                .map(str::to_string),
        }
    }

    /// The control's class wins when it has one; the host's own class otherwise
    fn derive_tokens<T: ShadowTree + ?Sized>(&self, tree: &T, node: NodeId, control: Option<NodeId>) -> DerivedTokens {
        let attr = self.config.class_attribute.as_str();
        let class = control
            .and_then(|c| tree.attribute(c, attr))
            .filter(|value| !ClassList::from_string(value).is_empty())
            .or_else(|| tree.attribute(node, attr));
        self.config.vocabulary.derive(class)
    }
}

/// Icon attribute on the element, or an icon element in its light subtree
/// or its own shadow root
fn has_icon<T: ShadowTree + ?Sized>(tree: &T, node: NodeId) -> bool {
    if tree.attributes(node).iter().any(|a| a.name.contains("icon")) {
        return true;
    }
    let is_icon = |n: NodeId| tree.tag_name(n).is_some_and(|t| t == "svg" || t.ends_with("-icon"));
    if tree.descendant_elements(node).into_iter().any(is_icon) {
        return true;
    }
    tree.shadow_root(node)
        .is_some_and(|shadow| tree.descendant_elements(shadow).into_iter().any(is_icon))
}

fn is_disabled<T: ShadowTree + ?Sized>(tree: &T, node: NodeId) -> bool {
    let disabled = tree
        .attribute(node, "disabled")
        .is_some_and(|v| !v.eq_ignore_ascii_case("false"));
    let aria = tree
        .attribute(node, "aria-disabled")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    disabled || aria
}
