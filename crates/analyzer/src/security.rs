//! Security posture analysis
//!
//! Four independent rule sets run over the store: NSG inbound exposure,
//! public exposure of virtual machines, encryption at rest, and storage
//! network isolation.

use crate::finding::{Finding, SecurityFinding};
use crate::scoring::{clamp_score, Analyzer, HealthLabels, ScoredAnalysis, SeverityPenalties};
use azdoc_common::resource_types::{DISK, NETWORK_SECURITY_GROUP, STORAGE_ACCOUNT, VIRTUAL_MACHINE};
use azdoc_common::{Field, ResourceStore, Severity};
use log::debug;
use serde::Serialize;

/// Remote shell, RDP, SQL Server, MySQL, PostgreSQL, MongoDB, Redis
pub const DANGEROUS_PORTS: [u16; 7] = [22, 3389, 1433, 3306, 5432, 27017, 6379];

const ANY_SOURCES: [&str; 4] = ["*", "0.0.0.0/0", "internet", "any"];

type Rule = fn(&ResourceStore, &mut Vec<SecurityFinding>);

const RULES: [(&str, Rule); 4] = [
    ("nsg-exposure", check_nsg_rules),
    ("public-exposure", check_public_exposure),
    ("encryption", check_encryption),
    ("network-isolation", check_network_isolation),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityAnalyzer;

impl SecurityAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for SecurityAnalyzer {
    type Output = SecurityAnalysis;

    fn analyze(&self, store: &ResourceStore) -> SecurityAnalysis {
        let mut findings = Vec::new();
        for (name, rule) in RULES {
            let before = findings.len();
            rule(store, &mut findings);
            debug!("security rule {}: {} findings", name, findings.len() - before);
        }
        SecurityAnalysis::from_findings(findings)
    }
}

/// Result of the security pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityAnalysis {
    pub score: u8,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub findings: Vec<SecurityFinding>,
}

impl SecurityAnalysis {
    pub fn from_findings(findings: Vec<SecurityFinding>) -> Self {
        let count = |severity: Severity| findings.iter().filter(|f| f.severity == severity).count();
        let penalty = SeverityPenalties::SECURITY.total(findings.iter().map(|f| f.severity));

        Self {
            score: clamp_score(100 - penalty),
            critical_count: count(Severity::Critical),
            high_count: count(Severity::High),
            medium_count: count(Severity::Medium),
            low_count: count(Severity::Low),
            findings,
        }
    }
}

impl ScoredAnalysis for SecurityAnalysis {
    fn name(&self) -> &'static str {
        "Security"
    }

    fn score(&self) -> u8 {
        self.score
    }

    fn finding_count(&self) -> usize {
        self.findings.len()
    }

    fn health_labels(&self) -> HealthLabels {
        HealthLabels {
            fair: "NEEDS ATTENTION",
            poor: "CRITICAL",
        }
    }
}

fn check_nsg_rules(store: &ResourceStore, findings: &mut Vec<SecurityFinding>) {
    for nsg in store.of_type(NETWORK_SECURITY_GROUP) {
        for rule in nsg.properties().get("securityRules").items() {
            let props = rule.get("properties");
            if !props.is_object() {
                continue;
            }

            let inbound = eq_ignore_case(props.get("direction"), "Inbound");
            let allow = eq_ignore_case(props.get("access"), "Allow");
            if !inbound || !allow {
                continue;
            }

            let Some(source) = open_source(props) else {
                continue;
            };

            let rule_name = rule.get("name").as_str().unwrap_or("unnamed");
            let ports = destination_ports(props);
            let finding = match ports.iter().find(|p| port_spec_is_dangerous(p)) {
                Some(port) => Finding::new(
                    Severity::Critical,
                    "NSG",
                    format!(
                        "NSG rule '{}' allows port {} from Internet ({})",
                        rule_name, port, source
                    ),
                ),
                None => Finding::new(
                    Severity::Medium,
                    "NSG",
                    format!(
                        "NSG rule '{}' allows inbound traffic from Internet ({})",
                        rule_name, source
                    ),
                ),
            };

            findings.push(
                finding
                    .resource(&nsg.name)
                    .impact("Resources may be exposed to attacks from the Internet")
                    .remediation(
                        "Restrict source IP ranges to known trusted networks. Use Azure Bastion for management access.",
                    ),
            );
        }
    }
}

/// Every VM is flagged: NIC and public IP association is not correlated
/// here, so this over-reports on private-only machines.
fn check_public_exposure(store: &ResourceStore, findings: &mut Vec<SecurityFinding>) {
    for vm in store.of_type(VIRTUAL_MACHINE) {
        findings.push(
            Finding::new(
                Severity::High,
                "PublicExposure",
                "Virtual Machine may have public IP exposure",
            )
            .resource(&vm.name)
            .impact("Direct internet exposure increases attack surface")
            .remediation("Use Azure Bastion for secure remote access instead of public IPs"),
        );
    }
}

fn check_encryption(store: &ResourceStore, findings: &mut Vec<SecurityFinding>) {
    for account in store.of_type(STORAGE_ACCOUNT) {
        let props = account.properties();
        if !props.is_object() {
            debug!("Skipping encryption check for {}: no properties", account.name);
            continue;
        }

        let encryption = props.get("encryption");
        if !encryption.is_present() {
            findings.push(
                Finding::new(
                    Severity::Medium,
                    "Encryption",
                    "Storage account encryption status unclear",
                )
                .resource(&account.name)
                .impact("Data at rest may not be encrypted")
                .remediation("Enable storage account encryption with customer-managed keys"),
            );
        } else if !encryption.get("services").is_present() {
            findings.push(
                Finding::new(
                    Severity::Low,
                    "Encryption",
                    "Storage encryption services not configured",
                )
                .resource(&account.name)
                .impact("Some storage services may not be encrypted")
                .remediation("Enable encryption for Blob, File, Table, and Queue services"),
            );
        }
    }

    for disk in store.of_type(DISK) {
        let props = disk.properties();
        if !props.is_object() {
            debug!("Skipping encryption check for {}: no properties", disk.name);
            continue;
        }
        let settings = props.get("encryptionSettingsCollection");
        let ade_enabled = settings.get("enabled").as_bool().unwrap_or(false);

        if !props.get("encryption").is_present() && !settings.is_present() {
            findings.push(
                Finding::new(Severity::Medium, "Encryption", "Disk encryption not configured")
                    .resource(&disk.name)
                    .impact("Disk data at rest has no identifiable encryption")
                    .remediation("Enable Azure Disk Encryption (ADE) or use encryption at host"),
            );
        } else if !ade_enabled {
            findings.push(
                Finding::new(
                    Severity::Low,
                    "Encryption",
                    "Disk relies on platform-managed keys only",
                )
                .resource(&disk.name)
                .impact("Disk data at rest is not encrypted with customer-managed keys")
                .remediation("Enable Azure Disk Encryption (ADE) or use encryption at host"),
            );
        }
    }
}

fn check_network_isolation(store: &ResourceStore, findings: &mut Vec<SecurityFinding>) {
    for account in store.of_type(STORAGE_ACCOUNT) {
        let default_action = account.properties().path(&["networkAcls", "defaultAction"]);
        if eq_ignore_case(default_action, "Allow") {
            findings.push(
                Finding::new(
                    Severity::Medium,
                    "NetworkIsolation",
                    "Storage account allows public network access",
                )
                .resource(&account.name)
                .impact("Data can be accessed from any network")
                .remediation("Configure network ACLs to deny by default and use private endpoints"),
            );
        }
    }
}

fn eq_ignore_case(field: Field<'_>, expected: &str) -> bool {
    field
        .as_str()
        .map(|v| v.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

/// The first internet-wide source prefix of a rule, if any
fn open_source<'a>(props: Field<'a>) -> Option<&'a str> {
    let mut sources: Vec<&str> = props.get("sourceAddressPrefix").as_str().into_iter().collect();
    sources.extend(props.get("sourceAddressPrefixes").strings());

    sources
        .into_iter()
        .find(|s| ANY_SOURCES.iter().any(|any| s.trim().eq_ignore_ascii_case(any)))
}

fn destination_ports<'a>(props: Field<'a>) -> Vec<&'a str> {
    let mut ports: Vec<&str> = props
        .get("destinationPortRange")
        .as_str()
        .into_iter()
        .collect();
    ports.extend(props.get("destinationPortRanges").strings());
    ports
}

/// True when a port spec (`22`, `20-25`, `*`) covers a dangerous port
pub fn port_spec_is_dangerous(spec: &str) -> bool {
    let spec = spec.trim();
    if spec == "*" {
        return true;
    }

    match spec.split_once('-') {
        Some((low, high)) => match (low.trim().parse::<u16>(), high.trim().parse::<u16>()) {
            (Ok(low), Ok(high)) => DANGEROUS_PORTS.iter().any(|p| (low..=high).contains(p)),
            _ => false,
        },
        None => spec
            .parse::<u16>()
            .map(|port| DANGEROUS_PORTS.contains(&port))
            .unwrap_or(false),
    }
}
