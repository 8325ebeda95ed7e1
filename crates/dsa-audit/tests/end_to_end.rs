//! End-to-end audits over parsed HTML
//!
//! Pages use declarative shadow roots so the encapsulated structure is
//! visible in the fixture itself.

use dsa_audit::{
    AuditConfig, Auditor, Extractor, ExtractorConfig, Location, ReferenceCatalog, ViolationKind, compare,
};
use dsa_dom::NodeId;
use std::sync::Arc;

const NESTED_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <x-panel>
    <template shadowrootmode="open">
      <x-button class="-secondary -lg">Save</x-button>
      <x-button class="-secondary -lg">Cancel</x-button>
    </template>
  </x-panel>
</body></html>"#;

const MIXED_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <header>
    <x-button class="-primary -md">Sign in</x-button>
    <button class="btn btn-primary">Legacy</button>
  </header>
  <x-dialog>
    <template shadowrootmode="closed">
      <x-button class="-ghost -xl">Close</x-button>
      <x-card>
        <template shadowrootmode="open">
          <x-button type="reset">Reset</x-button>
          <x-badge class="-info">New</x-badge>
        </template>
      </x-card>
    </template>
  </x-dialog>
  <x-button class="-tertiary -sm" type="submit"></x-button>
</body></html>"#;

const CATALOG: &str = r#"{
  "x-button": {
    "variants": ["primary", "secondary", "tertiary"],
    "sizes": ["sm", "md", "lg"],
    "attributes": { "type": ["button", "submit"] }
  },
  "x-badge": { "variants": ["info", "warning"] }
}"#;

fn tracked(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_buttons_inside_untracked_panel() {
    let doc = dsa_html::parse(NESTED_PAGE).unwrap();
    let reports = Extractor::new(ExtractorConfig::default())
        .extract(doc.tree(), NodeId::ROOT, &["x-button"])
        .unwrap();

    assert!(!reports.contains_key("x-panel"));
    let button = &reports["x-button"];
    assert_eq!(button.count(), 2);
    assert_eq!(button.count_in_open(), 0);
    assert_eq!(button.count_in_encapsulated(), 2);
    assert_eq!(button.variants().iter().collect::<Vec<_>>(), vec!["secondary"]);
    assert_eq!(button.sizes().iter().collect::<Vec<_>>(), vec!["lg"]);
}

#[test]
fn test_tracked_host_reported_alongside_its_children() {
    let doc = dsa_html::parse(NESTED_PAGE).unwrap();
    let reports = Extractor::new(ExtractorConfig::default())
        .extract(doc.tree(), NodeId::ROOT, &["x-panel", "x-button"])
        .unwrap();

    assert_eq!(reports["x-panel"].count_in_open(), 1);
    assert_eq!(reports["x-panel"].variants().iter().collect::<Vec<_>>(), vec!["default"]);
    assert_eq!(reports["x-button"].count(), 2);
}

#[test]
fn test_partition_and_document_order() {
    let doc = dsa_html::parse(MIXED_PAGE).unwrap();
    let reports = Extractor::new(ExtractorConfig::default())
        .extract(doc.tree(), NodeId::ROOT, &["x-button"])
        .unwrap();
    let button = &reports["x-button"];

    assert_eq!(button.count(), 4);
    assert_eq!(button.count_in_open() + button.count_in_encapsulated(), button.count());
    assert_eq!(button.count_in_open(), 2);

    let locations: Vec<Location> = button.samples().iter().map(|s| s.location).collect();
    assert_eq!(
        locations,
        vec![Location::Open, Location::Open, Location::Encapsulated, Location::Encapsulated]
    );
    // open matches first, then dialog's shadow, then the card nested inside it
    let variants: Vec<Vec<&String>> = button.samples().iter().map(|s| s.variants.iter().collect()).collect();
    assert_eq!(variants[0], vec!["primary"]);
    assert_eq!(variants[1], vec!["tertiary"]);
    assert_eq!(variants[2], vec!["ghost"]);
    assert_eq!(variants[3], vec!["default"]);
}

#[test]
fn test_catalog_violations() {
    let doc = dsa_html::parse(MIXED_PAGE).unwrap();
    let catalog = ReferenceCatalog::from_json_str(CATALOG).unwrap();
    let reports = Extractor::new(ExtractorConfig::default())
        .extract(doc.tree(), NodeId::ROOT, &["x-button", "x-badge"])
        .unwrap();

    let violations = compare(&reports, &catalog);
    assert!(!violations.contains_key("x-badge"));

    let found: Vec<(usize, ViolationKind, Vec<String>)> = violations["x-button"]
        .iter()
        .map(|v| (v.index, v.kind.clone(), v.values.clone()))
        .collect();
    assert_eq!(
        found,
        vec![
            (2, ViolationKind::Variant, vec!["ghost".to_string()]),
            (2, ViolationKind::Size, vec!["xl".to_string()]),
            (3, ViolationKind::Attribute("type".to_string()), vec!["reset".to_string()]),
        ]
    );
}

#[test]
fn test_full_audit_is_idempotent() {
    let doc = dsa_html::parse(MIXED_PAGE).unwrap();
    let config = AuditConfig::from_json_str(
        r#"{
            "tracked_tags": ["x-button", "x-badge", "x-card", "x-dialog"],
            "native_patterns": { "native-button": "button", "bootstrap-button": "[class^=\"btn\"]" }
        }"#,
    )
    .unwrap();
    let catalog = Arc::new(ReferenceCatalog::from_json_str(CATALOG).unwrap());
    let auditor = Auditor::new(&config, catalog).unwrap();

    let first = auditor.audit(&doc, "mixed.html").unwrap();
    let second = auditor.audit(&doc, "mixed.html").unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    assert_eq!(first.summary.component_total, 7);
    assert_eq!(first.summary.native_total, 2);
    let names: Vec<&str> = first.native.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["native-button", "bootstrap-button"]);
}

#[test]
fn test_page_audit_json_shape() {
    let doc = dsa_html::parse(NESTED_PAGE).unwrap();
    let config = AuditConfig {
        tracked_tags: tracked(&["x-button"]),
        ..AuditConfig::default()
    };
    let auditor = Auditor::new(&config, Arc::new(ReferenceCatalog::new())).unwrap();
    let audit = auditor.audit(&doc, "nested.html").unwrap();

    let json = serde_json::to_value(&audit).unwrap();
    assert_eq!(json["page"], "nested.html");
    assert_eq!(json["components"]["x-button"]["count_in_encapsulated"], 2);
    assert_eq!(json["components"]["x-button"]["samples"][0]["location"], "encapsulated");
    assert_eq!(json["summary"]["compliance_ratio"], 1.0);
}
