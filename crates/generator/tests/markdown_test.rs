//! Integration tests for the Markdown document

use azdoc_analyzer::{AnalysisReport, SubscriptionAnalyzer};
use azdoc_common::{DocError, ResourceStore};
use azdoc_generator::{MarkdownRenderer, Narrative};
use azdoc_insight::{ArchitectureDescription, CostInsight, SecurityInsight};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::BTreeMap;

fn vm(name: &str) -> serde_json::Value {
    json!({
        "id": format!("/subscriptions/s/resourceGroups/rg-app/providers/Microsoft.Compute/virtualMachines/{}", name),
        "name": name,
        "type": "Microsoft.Compute/virtualMachines",
        "resourceGroup": "rg-app",
        "properties": {"hardwareProfile": {"vmSize": "Standard_B2s"}}
    })
}

fn sample_store() -> ResourceStore {
    ResourceStore::from_values(vec![
        vm("vm-web"),
        json!({
            "id": "/subscriptions/s/resourceGroups/rg-app/providers/Microsoft.Compute/disks/disk|a",
            "name": "disk|a",
            "type": "Microsoft.Compute/disks",
            "resourceGroup": "rg-app",
            "properties": {"diskSizeGB": 128}
        }),
        json!({
            "name": "nsg-open",
            "type": "Microsoft.Network/networkSecurityGroups",
            "resourceGroup": "rg-net",
            "tags": {"environment": "prod"},
            "properties": {"securityRules": []}
        }),
    ])
}

fn render(store: &ResourceStore, narrative: Option<&Narrative>) -> String {
    let report = SubscriptionAnalyzer::default().analyze(store);
    render_report(store, &report, narrative)
}

fn render_report(store: &ResourceStore, report: &AnalysisReport, narrative: Option<&Narrative>) -> String {
    let generated_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    MarkdownRenderer::new("Contoso Production")
        .unwrap()
        .render_at(store, report, narrative, generated_at)
        .unwrap()
}

fn narrative() -> Narrative {
    let mut groups = BTreeMap::new();
    groups.insert("rg-app".to_string(), "Hosts the web tier".to_string());

    Narrative {
        architecture: Some(ArchitectureDescription {
            overview: "A single web VM behind an NSG.".to_string(),
            resource_group_insights: groups,
            key_findings: vec!["No backup is configured".to_string()],
        }),
        security_insights: vec![SecurityInsight {
            category: "Network".to_string(),
            severity: "High".to_string(),
            title: "Restrict management ports".to_string(),
            description: "The VM is reachable from the internet.".to_string(),
            risk_level: "High".to_string(),
            impact: "Brute-force attempts".to_string(),
            recommendations: vec!["Deploy Azure Bastion".to_string()],
            priority: 1,
        }],
        cost_insights: vec![CostInsight {
            category: "Storage".to_string(),
            title: "Remove unattached disks".to_string(),
            description: "One disk is unused.".to_string(),
            estimated_savings: 19.2,
            effort: "Low".to_string(),
            recommendations: vec![],
            priority: 1,
        }],
    }
}

fn position(document: &str, heading: &str) -> usize {
    document
        .find(heading)
        .unwrap_or_else(|| panic!("missing heading {}", heading))
}

#[test]
fn test_sections_appear_in_fixed_order() {
    let document = render(&sample_store(), Some(&narrative()));

    let headings = [
        "# Contoso Production - Azure Documentation",
        "## 📊 Scorecard",
        "## 📦 Resource Inventory",
        "## 🏗️ Architecture Overview",
        "## 🎯 Priority Actions",
        "## 🔒 Security Analysis",
        "### 🤖 AI-Powered Security Insights",
        "## 💰 Cost Optimization",
        "### 🤖 AI-Powered Cost Optimization Insights",
        "## 🏷️ Tagging Compliance",
        "## ✅ Compliance & Governance",
    ];
    let positions: Vec<usize> = headings.iter().map(|h| position(&document, h)).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);

    assert!(document.contains("- **Generated:** 2024-03-01 12:30:00 UTC"));
    assert!(document.contains("- **Total Resources:** 3"));
    assert!(document.contains("- **Resource Groups:** 2"));
    assert!(document.contains("- **rg-app**: Hosts the web tier"));
    assert!(document.contains("**💡 Total Estimated Additional Savings:** $19.20/month"));
}

#[test]
fn test_narrative_only_adds_content() {
    let store = sample_store();
    let plain = render(&store, None);
    let enriched = render(&store, Some(&narrative()));

    assert!(!plain.contains("AI-Powered"));
    assert!(!plain.contains("Architecture Overview"));
    for line in plain.lines() {
        assert!(enriched.contains(line), "narrative render lost line: {}", line);
    }

    // an empty narrative is the same as none
    assert_eq!(render(&store, Some(&Narrative::default())), plain);
}

#[test]
fn test_empty_inventory_renders_every_section() {
    let document = render(&ResourceStore::default(), None);

    assert!(document.contains("- **Total Resources:** 0"));
    assert!(document.contains("No resources were found in this subscription."));
    assert!(document.contains("✅ No critical or high-priority issues found."));
    assert!(document.contains("✅ No security issues detected. Excellent security posture!"));
    assert!(document.contains("**Potential Monthly Savings:** $0.00 (0%)"));
    assert!(document.contains("✅ Excellent tagging compliance!"));
    assert!(document.contains("✅ No compliance issues detected."));
    assert!(document.contains("**Security Score:** 100/100"));
    assert!(!document.contains("\n\n\n"));
}

#[test]
fn test_long_lists_are_capped() {
    let values = (0..12).map(|i| vm(&format!("vm-{:02}", i))).collect();
    let document = render(&ResourceStore::from_values(values), None);

    assert!(document.contains("12 resources missing 'owner' tag"));
    assert!(document.contains("**Affected Resources:** 12 resources (first 10 shown)"));
    assert!(document.contains("- vm-09\n- *...and 2 more*"));
    assert!(!document.contains("- vm-10\n"));

    assert!(document.contains("### PublicExposure Issues (12)"));
    assert!(document.contains("*...and 2 more PublicExposure issues*"));
    assert_eq!(document.matches("**Resource:** vm-").count(), 10);
}

#[test]
fn test_table_cells_are_escaped() {
    let document = render(&sample_store(), None);

    assert!(document.contains("| disk\\|a | Disk is not attached to any VM |"));
}

#[test]
fn test_write_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docs").join("nested").join("SUBSCRIPTION.md");
    let store = sample_store();
    let report = SubscriptionAnalyzer::default().analyze(&store);

    MarkdownRenderer::new("Contoso")
        .unwrap()
        .write(&path, &store, &report, None)
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# Contoso - Azure Documentation\n"));
}

#[test]
fn test_write_failure_names_the_artifact() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().join("SUBSCRIPTION.md");
    let store = ResourceStore::default();
    let report = SubscriptionAnalyzer::default().analyze(&store);

    let err = MarkdownRenderer::new("Contoso")
        .unwrap()
        .write(&path, &store, &report, None)
        .unwrap_err();

    match err {
        DocError::Artifact { artifact, .. } => assert_eq!(artifact, path),
        other => panic!("unexpected error: {}", other),
    }
}
