//! Integration tests for the four analyzers and the priority list

use azdoc_analyzer::{
    analyze, Analyzer, ComplianceAnalyzer, CostAnalyzer, ScoredAnalysis, SecurityAnalyzer,
    SubscriptionAnalyzer, TaggingAnalyzer,
};
use azdoc_common::{DocConfig, ResourceStore, Severity};
use serde_json::json;

fn vm(name: &str, os_disk: &str) -> serde_json::Value {
    json!({
        "id": format!("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/{}", name),
        "name": name,
        "type": "Microsoft.Compute/virtualMachines",
        "resourceGroup": "rg",
        "properties": {
            "hardwareProfile": {"vmSize": "Standard_B2s"},
            "storageProfile": {"osDisk": {"managedDisk": {"id": os_disk}}}
        }
    })
}

fn disk(name: &str, size_gb: u32) -> serde_json::Value {
    json!({
        "id": format!("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/disks/{}", name),
        "name": name,
        "type": "Microsoft.Compute/disks",
        "resourceGroup": "rg",
        "properties": {"diskSizeGB": size_gb, "encryption": {"type": "EncryptionAtRestWithPlatformKey"}}
    })
}

fn nsg_with_port(port: &str) -> ResourceStore {
    ResourceStore::from_values(vec![json!({
        "name": "nsg-edge",
        "type": "Microsoft.Network/networkSecurityGroups",
        "properties": {
            "securityRules": [{
                "name": "allow-from-anywhere",
                "properties": {
                    "direction": "Inbound",
                    "access": "Allow",
                    "sourceAddressPrefix": "*",
                    "destinationPortRange": port
                }
            }]
        }
    })])
}

#[test]
fn test_empty_store_scores_100_everywhere() {
    let store = ResourceStore::default();

    let security = SecurityAnalyzer.analyze(&store);
    let cost = CostAnalyzer::default().analyze(&store);
    let compliance = ComplianceAnalyzer.analyze(&store);
    let tagging = TaggingAnalyzer::default().analyze(&store);

    assert_eq!((security.score(), security.finding_count()), (100, 0));
    assert_eq!((cost.score(), cost.finding_count()), (100, 0));
    assert_eq!((compliance.score(), compliance.finding_count()), (100, 0));
    assert_eq!((tagging.score(), tagging.finding_count()), (100, 0));
    assert_eq!(cost.total_monthly_cost, 0.0);
    assert_eq!(tagging.compliance_rate, 100.0);
}

#[test]
fn test_scores_floor_at_zero() {
    let mut values = Vec::new();
    for i in 0..40 {
        values.push(json!({
            "name": format!("nsg-{}", i),
            "type": "Microsoft.Network/networkSecurityGroups",
            "properties": {"securityRules": [{
                "name": "ssh",
                "properties": {"direction": "Inbound", "access": "Allow",
                               "sourceAddressPrefix": "Internet", "destinationPortRange": "22"}
            }]}
        }));
        values.push(vm(&format!("vm-{}", i), "/missing"));
        values.push(json!({
            "name": format!("st{}", i),
            "type": "Microsoft.Storage/storageAccounts",
            "sku": {"name": "Standard_LRS"},
            "properties": {"networkAcls": {"defaultAction": "Allow"}, "accessTier": "Hot"}
        }));
    }
    let report = analyze(&ResourceStore::from_values(values), &DocConfig::default());

    assert_eq!(report.security.score, 0);
    assert!(report.compliance.score <= 100);
    assert_eq!(report.tagging.score, 0);
    for line in report.scorecard() {
        assert!(line.score <= 100);
    }
}

#[test]
fn test_records_without_properties_raise_no_encryption_findings() {
    let store = ResourceStore::from_values(vec![
        json!({"name": "st", "type": "Microsoft.Storage/storageAccounts"}),
        json!({"name": "st-scalar", "type": "Microsoft.Storage/storageAccounts", "properties": "n/a"}),
        json!({"name": "disk-bare", "type": "Microsoft.Compute/disks"}),
        json!({"name": "disk-null", "type": "Microsoft.Compute/disks", "properties": null}),
    ]);
    let security = SecurityAnalyzer.analyze(&store);

    assert!(security.findings.is_empty(), "{:?}", security.findings);
    assert_eq!(security.score, 100);
}

#[test]
fn test_analysis_is_idempotent() {
    let store = ResourceStore::from_values(vec![
        vm("vm-web", "/disks/os"),
        disk("disk-orphan", 64),
        json!({"name": "st-a", "type": "Microsoft.Storage/storageAccounts", "tags": {"Owner": "ops"}}),
        json!({"name": "st-b", "type": "Microsoft.Storage/storageAccounts", "tags": {"owner": "ops"}}),
    ]);
    let analyzer = SubscriptionAnalyzer::from_config(&DocConfig::default());

    let first = analyzer.analyze(&store);
    let second = analyzer.analyze(&store);
    assert_eq!(first, second);
}

#[test]
fn test_environment_casing_is_one_finding() {
    let store = ResourceStore::from_values(vec![
        json!({"name": "st-a", "type": "Microsoft.Storage/storageAccounts", "tags": {"Environment": "prod"}}),
        json!({"name": "st-b", "type": "Microsoft.Storage/storageAccounts", "tags": {"environment": "prod"}}),
    ]);
    let analysis = TaggingAnalyzer::default().analyze(&store);

    let casing: Vec<_> = analysis
        .findings
        .iter()
        .filter(|f| f.issue.starts_with("Tag key"))
        .collect();
    assert_eq!(casing.len(), 1);
    assert_eq!(casing[0].severity, Severity::Low);
    assert_eq!(casing[0].resources, vec!["st-a"]);
}

#[test]
fn test_orphaned_disk_cost() {
    let d1 = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Compute/disks/d1";
    let store = ResourceStore::from_values(vec![
        vm("vm-app", &d1.to_uppercase()),
        disk("d1", 128),
        disk("d2", 256),
    ]);
    let analysis = CostAnalyzer::default().analyze(&store);

    let orphaned: Vec<_> = analysis
        .findings
        .iter()
        .filter(|f| f.issue == "Disk is not attached to any VM")
        .collect();
    assert_eq!(orphaned.len(), 1);
    assert_eq!(orphaned[0].resources, vec!["d2"]);
    assert!((orphaned[0].current_cost - 30.72).abs() < 1e-9);
    assert!((orphaned[0].potential_savings - 30.72).abs() < 1e-9);
}

#[test]
fn test_nsg_port_escalation() {
    let ssh = SecurityAnalyzer.analyze(&nsg_with_port("22"));
    assert_eq!(ssh.findings.len(), 1);
    assert_eq!(ssh.findings[0].severity, Severity::Critical);

    let web = SecurityAnalyzer.analyze(&nsg_with_port("8080"));
    assert_eq!(web.findings.len(), 1);
    assert_eq!(web.findings[0].severity, Severity::Medium);
}

#[test]
fn test_priority_list_pulls_urgent_findings() {
    let store = ResourceStore::from_values(vec![
        json!({
            "name": "vm-big",
            "id": "/vm-big",
            "type": "Microsoft.Compute/virtualMachines",
            "properties": {"hardwareProfile": {"vmSize": "Standard_E4s_v3"}}
        }),
    ]);
    let report = analyze(&store, &DocConfig::default());

    // public exposure (security), backup (compliance), idle + oversized (cost)
    assert!(report.priorities.iter().any(|a| a.icon == "🔴"));
    assert!(report.priorities.iter().any(|a| a.icon == "⚠️"));
    assert_eq!(report.priorities.iter().filter(|a| a.icon == "💰").count(), 2);
    // the single resource lacks tags, but the tag findings affect only one resource
    assert!(report.priorities.iter().all(|a| a.icon != "🏷️"));
}
