//! dsa HTML Loader
//!
//! HTML5 parsing built on html5ever. Produces a [`dsa_dom::Document`] whose
//! declarative shadow roots (`<template shadowrootmode="...">`) are attached
//! to their hosts as real encapsulated sub-roots, the way a browser would
//! hand them to the auditor.

mod parser;

pub use dsa_dom::Document;
pub use parser::HtmlParser;

/// Parse an HTML string into a document
pub fn parse(html: &str) -> Result<Document, ParseError> {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed tree while building DOM: {0}")]
    Dom(#[from] dsa_dom::DomError),
}
