//! ds-audit - Main Entry Point
//!
//! Audits saved HTML pages against a design-system reference and prints one
//! JSON document with every page's result. A page that cannot be read,
//! parsed or audited is logged and skipped; the exit code is 1 if that
//! happened to any page.

#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use anyhow::{Context, Result, bail};
use dsa_audit::{AuditConfig, Auditor, PageAudit, ReferenceCatalog};
use dsa_html::HtmlParser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: ds-audit <config.json> <page.html>...";

/// Exit code for bad arguments or an unusable config/catalog
const EXIT_FATAL: u8 = 2;

#[derive(Debug, PartialEq)]
struct Args {
    config: PathBuf,
    pages: Vec<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = args.into_iter();
    let Some(config) = args.next() else {
        bail!("missing config path\n{USAGE}");
    };
    let pages: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if pages.is_empty() {
        bail!("no pages given\n{USAGE}");
    }
    Ok(Args {
        config: PathBuf::from(config),
        pages,
    })
}

#[derive(Debug, Serialize)]
struct PageFailure {
    page: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct RunReport {
    pages: Vec<PageAudit>,
    failures: Vec<PageFailure>,
}

fn build_auditor(config_path: &Path) -> Result<Auditor> {
    let config = AuditConfig::load(config_path)?;
    let catalog = match &config.catalog {
        Some(path) => ReferenceCatalog::load(path)?,
        None => {
            tracing::warn!("No catalog configured; usage is reported without violations");
            ReferenceCatalog::new()
        }
    };
    Ok(Auditor::new(&config, Arc::new(catalog))?)
}

fn audit_page(parser: &HtmlParser, auditor: &Auditor, path: &Path) -> Result<PageAudit> {
    let page = path.display().to_string();
    let html = std::fs::read_to_string(path).with_context(|| format!("failed to read {page}"))?;
    let document = parser
        .parse_with_url(&html, &page)
        .with_context(|| format!("failed to parse {page}"))?;
    let audit = auditor
        .audit(&document, &page)
        .with_context(|| format!("failed to audit {page}"))?;
    Ok(audit)
}

fn run(args: &Args) -> Result<RunReport> {
    let auditor = build_auditor(&args.config)?;
    let parser = HtmlParser::new();

    let mut report = RunReport {
        pages: Vec::with_capacity(args.pages.len()),
        failures: Vec::new(),
    };
    for path in &args.pages {
        match audit_page(&parser, &auditor, path) {
            Ok(audit) => report.pages.push(audit),
            Err(err) => {
                tracing::error!("{:#}", err);
                report.failures.push(PageFailure {
                    page: path.display().to_string(),
                    error: format!("{err:#}"),
                });
            }
        }
    }
    Ok(report)
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let report = match run(&args) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!("{:#}", err);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            tracing::error!("failed to serialize report: {}", err);
            return ExitCode::from(EXIT_FATAL);
        }
    }

    tracing::info!(
        "Audited {} pages, {} failed",
        report.pages.len() + report.failures.len(),
        report.failures.len()
    );
    if report.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
