//! DOMTokenList (classList)
//!
//! Read-only view over a space-separated `class` attribute.

/// Space-separated token list, in source order, duplicates dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    /// Parse from space-separated string
    pub fn from_string(s: &str) -> Self {
        let mut tokens: Vec<String> = Vec::new();
        for token in s.split_whitespace() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }
        Self { tokens }
    }

    /// Parse an optional attribute value; absent means empty
    pub fn from_attr(value: Option<&str>) -> Self {
        value.map(Self::from_string).unwrap_or_default()
    }

    /// Get number of tokens
    pub fn length(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get token at index
    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|s| s.as_str())
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}
