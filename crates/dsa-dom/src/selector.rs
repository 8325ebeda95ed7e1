//! Simple selector engine
//!
//! Comma-separated lists of compound selectors: tag or `*`, `.class`, `#id`,
//! attribute selectors and `:not(compound)`. No combinators; the auditor
//! only ever asks "does this element look like X".

use crate::{ClassList, NodeId, ShadowTree};

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,
    #[error("Unsupported selector syntax at {position} in {selector:?}")]
    Unsupported { selector: String, position: usize },
    #[error("Unclosed {delimiter:?} in {selector:?}")]
    Unclosed { selector: String, delimiter: char },
}

/// Attribute value matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        match (&self.matcher, value) {
            (None, Some(_)) => true,
            (_, None) => false,
            (Some(matcher), Some(val)) => match matcher {
                AttributeMatcher::Exact(expected) => val == expected,
                AttributeMatcher::Contains(expected) => val.split_whitespace().any(|w| w == expected),
                AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(expected.as_str()),
                AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(expected.as_str()),
                AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(expected.as_str()),
            },
        }
    }
}

/// One component of a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorComponent {
    /// Type selector (tag name, lowercased)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector
    Attribute(AttributeSelector),
    /// :not(compound)
    Not(Box<Compound>),
}

/// Compound selector (all components must match)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub components: Vec<SelectorComponent>,
}

impl Compound {
    /// Check an element against every component
    pub fn matches<T: ShadowTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        self.components.iter().all(|component| match component {
            SelectorComponent::Type(t) => tag.eq_ignore_ascii_case(t),
            SelectorComponent::Id(id) => tree.attribute(node, "id") == Some(id.as_str()),
            SelectorComponent::Class(class) => ClassList::from_attr(tree.attribute(node, "class")).contains(class),
            SelectorComponent::Attribute(attr) => attr.matches(tree.attribute(node, &attr.name)),
            SelectorComponent::Not(inner) => !inner.matches(tree, node),
        })
    }
}

/// Comma-separated selector list (matches if any compound matches)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    compounds: Vec<Compound>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }

        let compounds = split_top_level(source)?
            .into_iter()
            .map(|part| parse_compound(part.trim(), source))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: source.to_string(),
            compounds,
        })
    }

    /// Check if an element matches any compound in the list
    pub fn matches<T: ShadowTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        self.compounds.iter().any(|c| c.matches(tree, node))
    }

    /// Selector text as parsed
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for SelectorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split on commas that are not inside brackets, parentheses or quotes
fn split_top_level(source: &str) -> Result<Vec<&str>, SelectorError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if let Some(q) = quote {
        return Err(SelectorError::Unclosed {
            selector: source.to_string(),
            delimiter: q,
        });
    }
    parts.push(&source[start..]);

    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(SelectorError::Empty);
    }
    Ok(parts)
}

fn parse_compound(input: &str, source: &str) -> Result<Compound, SelectorError> {
    let unsupported = |position: usize| SelectorError::Unsupported {
        selector: source.to_string(),
        position,
    };
    let unclosed = |delimiter: char| SelectorError::Unclosed {
        selector: source.to_string(),
        delimiter,
    };

    let mut components = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    // Leading type or universal selector
    if input.starts_with('*') {
        i = 1;
    } else {
        let end = ident_end(input, 0);
        if end > 0 {
            components.push(SelectorComponent::Type(input[..end].to_ascii_lowercase()));
            i = end;
        }
    }

    while i < bytes.len() {
        match bytes[i] {
            b'.' | b'#' => {
                let end = ident_end(input, i + 1);
                if end == i + 1 {
                    return Err(unsupported(i));
                }
                let name = input[i + 1..end].to_string();
                components.push(if bytes[i] == b'.' {
                    SelectorComponent::Class(name)
                } else {
                    SelectorComponent::Id(name)
                });
                i = end;
            }
            b'[' => {
                let close = find_closing(input, i, b']').ok_or_else(|| unclosed('['))?;
                let attr = parse_attribute_selector(&input[i + 1..close]).ok_or_else(|| unsupported(i))?;
                components.push(SelectorComponent::Attribute(attr));
                i = close + 1;
            }
            b':' if input[i..].starts_with(":not(") => {
                let open = i + 4;
                let close = find_closing(input, open, b')').ok_or_else(|| unclosed('('))?;
                let inner = parse_compound(input[open + 1..close].trim(), source)?;
                components.push(SelectorComponent::Not(Box::new(inner)));
                i = close + 1;
            }
            _ => return Err(unsupported(i)),
        }
    }

    Ok(Compound { components })
}

/// End index of a CSS identifier starting at `start`
fn ident_end(input: &str, start: usize) -> usize {
    input[start..]
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .map(|(offset, _)| start + offset)
        .unwrap_or(input.len())
}

/// Index of the delimiter closing the group opened at `open`, skipping quotes
fn find_closing(input: &str, open: usize, close: u8) -> Option<usize> {
    let opener = input.as_bytes()[open];
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    for (i, &b) in input.as_bytes().iter().enumerate().skip(open) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == opener => depth += 1,
            None if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            None => {}
        }
    }
    None
}

/// Parse attribute selector content (without brackets)
fn parse_attribute_selector(content: &str) -> Option<AttributeSelector> {
    let content = content.trim();
    // Operators can only appear before the quoted value.
    let head = &content[..content.find(['"', '\'']).unwrap_or(content.len())];

    for (op, matcher_fn) in [
        ("~=", AttributeMatcher::Contains as fn(String) -> AttributeMatcher),
        ("^=", AttributeMatcher::Prefix as fn(String) -> AttributeMatcher),
        ("$=", AttributeMatcher::Suffix as fn(String) -> AttributeMatcher),
        ("*=", AttributeMatcher::Substring as fn(String) -> AttributeMatcher),
        ("=", AttributeMatcher::Exact as fn(String) -> AttributeMatcher),
    ] {
        if let Some(pos) = head.find(op) {
            let name = content[..pos].trim();
            if name.is_empty() || ident_end(name, 0) != name.len() {
                return None;
            }
            let value = unquote(content[pos + op.len()..].trim());
            return Some(AttributeSelector {
                name: name.to_ascii_lowercase(),
                matcher: Some(matcher_fn(value.to_string())),
            });
        }
    }

    if content.is_empty() || ident_end(content, 0) != content.len() {
        return None;
    }
    Some(AttributeSelector {
        name: content.to_ascii_lowercase(),
        matcher: None,
    })
}

fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
