//! Shadow DOM
//!
//! Encapsulated sub-roots. The auditor reads closed roots as well as open
//! ones; the mode is kept so reports can say which kind was crossed.

use crate::NodeId;
use std::fmt;
use std::str::FromStr;

/// Shadow root mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

impl ShadowRootMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ShadowRootMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShadowRootMode {
    type Err = ();

    /// Parses the `shadowrootmode` attribute value (ASCII case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("open") {
            Ok(Self::Open)
        } else if s.eq_ignore_ascii_case("closed") {
            Ok(Self::Closed)
        } else {
            Err(())
        }
    }
}

/// Data stored on a shadow root node
#[derive(Debug, Clone)]
pub struct ShadowRootData {
    /// Host element
    pub host: NodeId,
    /// Mode (open/closed)
    pub mode: ShadowRootMode,
}

impl ShadowRootData {
    /// Create a new shadow root record
    pub fn new(host: NodeId, mode: ShadowRootMode) -> Self {
        Self { host, mode }
    }
}
