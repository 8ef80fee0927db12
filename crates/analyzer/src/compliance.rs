//! Backup, monitoring and disaster-recovery compliance

use crate::finding::{ComplianceFinding, Finding};
use crate::scoring::{clamp_score, truncate, Analyzer, ScoredAnalysis, SeverityPenalties};
use azdoc_common::resource_types::{
    APPLICATION_GATEWAY, BACKUP_PROTECTED_ITEM, DIAGNOSTIC_SETTING, LOAD_BALANCER, SQL_SERVER,
    STORAGE_ACCOUNT, VIRTUAL_MACHINE, WEB_SITE,
};
use azdoc_common::{Resource, ResourceStore, Severity};
use log::debug;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Types expected to ship diagnostics to a workspace
pub const MONITORABLE_TYPES: [&str; 6] = [
    VIRTUAL_MACHINE,
    STORAGE_ACCOUNT,
    APPLICATION_GATEWAY,
    LOAD_BALANCER,
    WEB_SITE,
    SQL_SERVER,
];

/// Monitoring findings list at most this many resources
pub const MONITORING_DISPLAY_CAP: usize = 5;

const DIAGNOSTICS_SEGMENT: &str = "/providers/microsoft.insights/diagnosticsettings/";

/// A coverage metric that may not be measurable from the inventory
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    Measured(f64),
    /// No eligible resources
    NotApplicable,
    /// The inventory lacks the records needed to measure it
    Unavailable,
}

impl Coverage {
    fn ratio(covered: usize, total: usize) -> Self {
        if total == 0 {
            Coverage::NotApplicable
        } else {
            Coverage::Measured(covered as f64 / total as f64 * 100.0)
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Coverage::Measured(value) => Some(*value),
            _ => None,
        }
    }

    /// Value used in scoring; unmeasured coverage costs nothing
    pub fn scoring_value(&self) -> f64 {
        self.percent().unwrap_or(100.0)
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coverage::Measured(value) => write!(f, "{:.1}%", value),
            Coverage::NotApplicable => f.write_str("not applicable"),
            Coverage::Unavailable => f.write_str("not available"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceAnalyzer;

impl ComplianceAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for ComplianceAnalyzer {
    type Output = ComplianceAnalysis;

    fn analyze(&self, store: &ResourceStore) -> ComplianceAnalysis {
        let mut findings = Vec::new();
        let backup_coverage = backup(store, &mut findings);
        let monitoring_coverage = monitoring(store, &mut findings);
        geo_redundancy(store, &mut findings);

        ComplianceAnalysis::new(backup_coverage, monitoring_coverage, findings)
    }
}

/// Result of the compliance pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceAnalysis {
    pub backup_coverage: Coverage,
    pub monitoring_coverage: Coverage,
    pub score: u8,
    pub findings: Vec<ComplianceFinding>,
}

impl ComplianceAnalysis {
    pub fn new(
        backup_coverage: Coverage,
        monitoring_coverage: Coverage,
        findings: Vec<ComplianceFinding>,
    ) -> Self {
        let raw = 100
            - truncate((100.0 - backup_coverage.scoring_value()) * 0.3)
            - truncate((100.0 - monitoring_coverage.scoring_value()) * 0.2)
            - SeverityPenalties::COMPLIANCE.total(findings.iter().map(|f| f.severity));

        Self {
            backup_coverage,
            monitoring_coverage,
            score: clamp_score(raw),
            findings,
        }
    }
}

impl ScoredAnalysis for ComplianceAnalysis {
    fn name(&self) -> &'static str {
        "Compliance"
    }

    fn score(&self) -> u8 {
        self.score
    }

    fn finding_count(&self) -> usize {
        self.findings.len()
    }
}

fn backup(store: &ResourceStore, findings: &mut Vec<ComplianceFinding>) -> Coverage {
    let protected: HashSet<String> = store
        .of_type(BACKUP_PROTECTED_ITEM)
        .into_iter()
        .filter_map(|item| {
            let props = item.properties();
            props
                .get("sourceResourceId")
                .as_str()
                .or_else(|| props.get("virtualMachineId").as_str())
        })
        .map(|id| id.to_ascii_lowercase())
        .collect();

    let vms = store.of_type(VIRTUAL_MACHINE);
    let unprotected: Vec<&str> = vms
        .iter()
        .filter(|vm| !protected.contains(&vm.id.to_ascii_lowercase()))
        .map(|vm| vm.name.as_str())
        .collect();

    if !unprotected.is_empty() {
        findings.push(
            Finding::new(
                Severity::High,
                "Backup",
                format!("{} VMs without Azure Backup configured", unprotected.len()),
            )
            .resources(unprotected.iter().copied())
            .impact("Risk of data loss if VM fails or is corrupted")
            .remediation(
                "Configure Azure Backup with appropriate retention policy (7-30 days recommended)",
            ),
        );
    }

    Coverage::ratio(vms.len() - unprotected.len(), vms.len())
}

fn monitoring(store: &ResourceStore, findings: &mut Vec<ComplianceFinding>) -> Coverage {
    let monitorable: Vec<&Resource> = store
        .iter()
        .filter(|r| MONITORABLE_TYPES.contains(&r.type_key().as_str()))
        .collect();
    if monitorable.is_empty() {
        return Coverage::NotApplicable;
    }

    let settings = store.of_type(DIAGNOSTIC_SETTING);
    if settings.is_empty() {
        debug!(
            "no diagnostic settings in inventory, monitoring coverage unavailable for {} resources",
            monitorable.len()
        );
        return Coverage::Unavailable;
    }

    let monitored: HashSet<String> = settings.iter().filter_map(|s| monitored_target(s)).collect();
    let missing: Vec<String> = monitorable
        .iter()
        .filter(|r| !monitored.contains(&r.id.to_ascii_lowercase()))
        .map(|r| format!("{} ({})", r.name, r.resource_type))
        .collect();

    if !missing.is_empty() {
        let issue = if missing.len() > MONITORING_DISPLAY_CAP {
            format!(
                "{} resources without diagnostic settings (showing first {})",
                missing.len(),
                MONITORING_DISPLAY_CAP
            )
        } else {
            format!("{} resources without diagnostic settings", missing.len())
        };

        findings.push(
            Finding::new(Severity::Medium, "Monitoring", issue)
                .resources(missing.iter().take(MONITORING_DISPLAY_CAP).cloned())
                .impact("Limited visibility into resource health and performance")
                .remediation("Enable diagnostic settings to send logs to Log Analytics workspace"),
        );
    }

    Coverage::ratio(monitorable.len() - missing.len(), monitorable.len())
}

/// Lower-cased ID of the resource a diagnostic setting is attached to
fn monitored_target(setting: &Resource) -> Option<String> {
    if let Some(id) = setting.properties().get("resourceId").as_str() {
        return Some(id.to_ascii_lowercase());
    }
    let id = setting.id.to_ascii_lowercase();
    id.find(DIAGNOSTICS_SEGMENT).map(|pos| id[..pos].to_string())
}

fn geo_redundancy(store: &ResourceStore, findings: &mut Vec<ComplianceFinding>) {
    let locally_redundant: Vec<&str> = store
        .of_type(STORAGE_ACCOUNT)
        .into_iter()
        .filter(|account| {
            account
                .sku()
                .get("name")
                .as_str()
                .map(|sku| sku.to_ascii_uppercase().contains("LRS"))
                .unwrap_or(false)
        })
        .map(|account| account.name.as_str())
        .collect();

    if !locally_redundant.is_empty() {
        findings.push(
            Finding::new(
                Severity::Medium,
                "DR",
                format!(
                    "{} storage accounts using LRS (locally redundant)",
                    locally_redundant.len()
                ),
            )
            .resources(locally_redundant)
            .impact("Data not protected against regional outages")
            .remediation("Consider GRS (Geo-Redundant Storage) or GZRS for critical data"),
        );
    }
}
