//! Cost optimization analysis
//!
//! Estimates are order-of-magnitude monthly figures from a static price
//! table, not billing data. No utilization metrics are consulted, so every
//! VM is reported as an idle candidate.

use crate::finding::{CostFinding, Finding};
use crate::scoring::{Analyzer, HealthLabels, ScoredAnalysis};
use azdoc_common::resource_types::{
    APPLICATION_GATEWAY, DISK, LOAD_BALANCER, NAT_GATEWAY, NETWORK_INTERFACE, PUBLIC_IP_ADDRESS,
    STORAGE_ACCOUNT, VIRTUAL_MACHINE,
};
use azdoc_common::{Resource, ResourceStore, Severity};
use log::debug;
use serde::Serialize;
use std::collections::HashSet;

/// Static monthly price assumptions
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub vm_prices: Vec<(String, f64)>,
    pub default_vm_size: String,
    pub unknown_vm_cost: f64,
    pub disk_cost_per_gb: f64,
    pub default_disk_gb: f64,
    pub public_ip_cost: f64,
    pub storage_account_cost: f64,
    pub nat_gateway_cost: f64,
    /// Saving from moving one account from Hot to Cool
    pub cool_tier_savings: f64,
    pub idle_savings_ratio: f64,
    pub oversized_savings_ratio: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        let vm_prices = [
            ("Standard_B1s", 7.5),
            ("Standard_B2s", 30.0),
            ("Standard_B2ms", 60.0),
            ("Standard_D2s_v3", 70.0),
            ("Standard_D4s_v3", 140.0),
            ("Standard_E2s_v3", 87.0),
            ("Standard_E4s_v3", 175.0),
        ]
        .iter()
        .map(|(size, cost)| (size.to_string(), *cost))
        .collect();

        Self {
            vm_prices,
            default_vm_size: "Standard_B2s".to_string(),
            unknown_vm_cost: 50.0,
            disk_cost_per_gb: 0.12,
            default_disk_gb: 128.0,
            public_ip_cost: 3.65,
            storage_account_cost: 50.0,
            nat_gateway_cost: 33.0,
            cool_tier_savings: 25.0,
            idle_savings_ratio: 0.7,
            oversized_savings_ratio: 0.4,
        }
    }
}

impl CostModel {
    /// Monthly cost of a VM size; unknown sizes get the fallback price
    pub fn vm_cost(&self, size: &str) -> f64 {
        self.vm_prices
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(size))
            .map(|(_, cost)| *cost)
            .unwrap_or(self.unknown_vm_cost)
    }

    fn vm_size<'a>(&'a self, vm: &'a Resource) -> &'a str {
        vm.properties()
            .path(&["hardwareProfile", "vmSize"])
            .as_str()
            .unwrap_or(&self.default_vm_size)
    }

    fn disk_cost(&self, disk: &Resource) -> f64 {
        let size = disk
            .properties()
            .get("diskSizeGB")
            .as_f64()
            .unwrap_or(self.default_disk_gb);
        size * self.disk_cost_per_gb
    }

    /// Estimated monthly cost of one resource, zero for unpriced types
    pub fn resource_cost(&self, resource: &Resource) -> f64 {
        match resource.type_key().as_str() {
            VIRTUAL_MACHINE => self.vm_cost(self.vm_size(resource)),
            STORAGE_ACCOUNT => self.storage_account_cost,
            NAT_GATEWAY => self.nat_gateway_cost,
            PUBLIC_IP_ADDRESS => self.public_ip_cost,
            DISK => self.disk_cost(resource),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CostAnalyzer {
    model: CostModel,
}

impl CostAnalyzer {
    pub fn new(model: CostModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &CostModel {
        &self.model
    }

    fn orphaned_disks(&self, store: &ResourceStore, findings: &mut Vec<CostFinding>) {
        let attached = attached_disk_ids(store);

        for disk in store.of_type(DISK) {
            if attached.contains(&disk.id.to_ascii_lowercase()) {
                continue;
            }
            let cost = self.model.disk_cost(disk);
            debug!("disk {} is not referenced by any VM", disk.name);
            findings.push(CostFinding::new(
                Finding::new(Severity::Medium, "Orphaned", "Disk is not attached to any VM")
                    .resource(&disk.name)
                    .impact("Paying for storage that no workload uses")
                    .remediation("Delete orphaned disk or attach to a VM if needed"),
                cost,
                cost,
            ));
        }
    }

    fn orphaned_public_ips(&self, store: &ResourceStore, findings: &mut Vec<CostFinding>) {
        let used = used_public_ip_ids(store);

        for ip in store.of_type(PUBLIC_IP_ADDRESS) {
            if used.contains(&ip.id.to_ascii_lowercase()) {
                continue;
            }
            let cost = self.model.public_ip_cost;
            findings.push(CostFinding::new(
                Finding::new(
                    Severity::Low,
                    "Orphaned",
                    "Public IP is not associated with any resource",
                )
                .resource(&ip.name)
                .impact("Static public IPs are billed while unassociated")
                .remediation("Delete unused public IP or associate with a resource"),
                cost,
                cost,
            ));
        }
    }

    fn idle_vms(&self, store: &ResourceStore, findings: &mut Vec<CostFinding>) {
        for vm in store.of_type(VIRTUAL_MACHINE) {
            let cost = self.model.vm_cost(self.model.vm_size(vm));
            findings.push(CostFinding::new(
                Finding::new(
                    Severity::Low,
                    "Idle",
                    "VM may be idle or underutilized (requires metrics analysis)",
                )
                .resource(&vm.name)
                .impact("Compute is billed whether or not it is used")
                .remediation(
                    "Review VM metrics. If CPU <5% avg, consider deallocating when not in use or downsizing",
                ),
                cost,
                cost * self.model.idle_savings_ratio,
            ));
        }
    }

    fn oversized_vms(&self, store: &ResourceStore, findings: &mut Vec<CostFinding>) {
        for vm in store.of_type(VIRTUAL_MACHINE) {
            let size = self.model.vm_size(vm);
            if !is_premium_family(size) {
                continue;
            }
            let cost = self.model.vm_cost(size);
            findings.push(CostFinding::new(
                Finding::new(
                    Severity::Medium,
                    "Oversized",
                    format!("VM using {} - may be oversized for workload", size),
                )
                .resource(&vm.name)
                .impact("General-purpose and memory-optimized sizes cost more than burstable ones")
                .remediation(
                    "Analyze CPU/Memory metrics. Consider B-series or smaller size if utilization <30%",
                ),
                cost,
                cost * self.model.oversized_savings_ratio,
            ));
        }
    }

    fn storage_tiers(&self, store: &ResourceStore, findings: &mut Vec<CostFinding>) {
        for account in store.of_type(STORAGE_ACCOUNT) {
            let hot = account
                .properties()
                .get("accessTier")
                .as_str()
                .map(|tier| tier.eq_ignore_ascii_case("Hot"))
                .unwrap_or(false);
            if !hot {
                continue;
            }
            findings.push(CostFinding::new(
                Finding::new(
                    Severity::Low,
                    "StorageTier",
                    "Storage account using Hot tier - review access patterns",
                )
                .resource(&account.name)
                .impact("Hot tier storage costs more for rarely accessed data")
                .remediation(
                    "If data is accessed <1x/month, move to Cool tier. For archival, use Archive tier",
                ),
                self.model.storage_account_cost,
                self.model.cool_tier_savings,
            ));
        }
    }
}

impl Analyzer for CostAnalyzer {
    type Output = CostAnalysis;

    fn analyze(&self, store: &ResourceStore) -> CostAnalysis {
        let mut findings = Vec::new();
        self.orphaned_disks(store, &mut findings);
        self.orphaned_public_ips(store, &mut findings);
        self.idle_vms(store, &mut findings);
        self.oversized_vms(store, &mut findings);
        self.storage_tiers(store, &mut findings);

        let total_monthly_cost = store.iter().map(|r| self.model.resource_cost(r)).sum();
        CostAnalysis::new(total_monthly_cost, findings)
    }
}

/// Result of the cost pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostAnalysis {
    pub total_monthly_cost: f64,
    pub potential_monthly_savings: f64,
    pub score: u8,
    pub findings: Vec<CostFinding>,
}

impl CostAnalysis {
    pub fn new(total_monthly_cost: f64, findings: Vec<CostFinding>) -> Self {
        let potential_monthly_savings = findings.iter().map(|f| f.potential_savings).sum();
        let score = score_for(total_monthly_cost, potential_monthly_savings);
        Self {
            total_monthly_cost,
            potential_monthly_savings,
            score,
            findings,
        }
    }

    /// Savings as a share of the total, 0 when nothing is priced
    pub fn savings_percentage(&self) -> f64 {
        if self.total_monthly_cost > 0.0 {
            self.potential_monthly_savings / self.total_monthly_cost * 100.0
        } else {
            0.0
        }
    }
}

fn score_for(total: f64, savings: f64) -> u8 {
    if total <= 0.0 {
        return 100;
    }
    match savings / total * 100.0 {
        pct if pct < 10.0 => 100,
        pct if pct < 25.0 => 80,
        pct if pct < 40.0 => 60,
        _ => 40,
    }
}

impl ScoredAnalysis for CostAnalysis {
    fn name(&self) -> &'static str {
        "Cost"
    }

    fn score(&self) -> u8 {
        self.score
    }

    fn finding_count(&self) -> usize {
        self.findings.len()
    }

    fn health_labels(&self) -> HealthLabels {
        HealthLabels {
            fair: "NEEDS OPTIMIZATION",
            poor: "HIGH WASTE",
        }
    }
}

/// D-series and E-series sizes
fn is_premium_family(size: &str) -> bool {
    let size = size.to_ascii_lowercase();
    size.contains("standard_d") || size.contains("standard_e")
}

/// Lower-cased IDs of OS and data disks referenced by any VM
fn attached_disk_ids(store: &ResourceStore) -> HashSet<String> {
    let mut ids = HashSet::new();
    for vm in store.of_type(VIRTUAL_MACHINE) {
        let profile = vm.properties().get("storageProfile");
        let os_disk = profile.path(&["osDisk", "managedDisk", "id"]).as_str();
        let data_disks = profile
            .get("dataDisks")
            .items()
            .into_iter()
            .filter_map(|disk| disk.path(&["managedDisk", "id"]).as_str());

        ids.extend(
            os_disk
                .into_iter()
                .chain(data_disks)
                .map(|id| id.to_ascii_lowercase()),
        );
    }
    ids
}

/// Lower-cased IDs of public IPs referenced by NICs, load balancers,
/// application gateways or NAT gateways
fn used_public_ip_ids(store: &ResourceStore) -> HashSet<String> {
    let mut ids = HashSet::new();

    for nic in store.of_type(NETWORK_INTERFACE) {
        for config in nic.properties().get("ipConfigurations").items() {
            if let Some(id) = config.path(&["properties", "publicIPAddress", "id"]).as_str() {
                ids.insert(id.to_ascii_lowercase());
            }
        }
    }

    for frontend_owner in store
        .of_type(LOAD_BALANCER)
        .into_iter()
        .chain(store.of_type(APPLICATION_GATEWAY))
    {
        for config in frontend_owner
            .properties()
            .get("frontendIPConfigurations")
            .items()
        {
            if let Some(id) = config.path(&["properties", "publicIPAddress", "id"]).as_str() {
                ids.insert(id.to_ascii_lowercase());
            }
        }
    }

    for nat in store.of_type(NAT_GATEWAY) {
        for ip in nat.properties().get("publicIpAddresses").items() {
            if let Some(id) = ip.get("id").as_str() {
                ids.insert(id.to_ascii_lowercase());
            }
        }
    }

    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vm_price_lookup() {
        let model = CostModel::default();
        assert_eq!(model.vm_cost("Standard_D4s_v3"), 140.0);
        assert_eq!(model.vm_cost("standard_b1s"), 7.5);
        assert_eq!(model.vm_cost("Standard_M128"), 50.0);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(score_for(0.0, 0.0), 100);
        assert_eq!(score_for(100.0, 9.9), 100);
        assert_eq!(score_for(100.0, 10.0), 80);
        assert_eq!(score_for(100.0, 30.0), 60);
        assert_eq!(score_for(100.0, 70.0), 40);
    }

    #[test]
    fn test_public_ip_referenced_by_nat_gateway_is_used() {
        let store = ResourceStore::from_values(vec![
            json!({"id": "/s/pip-nat", "name": "pip-nat", "type": "Microsoft.Network/publicIPAddresses"}),
            json!({"id": "/s/pip-lb", "name": "pip-lb", "type": "Microsoft.Network/publicIPAddresses"}),
            json!({"id": "/s/pip-free", "name": "pip-free", "type": "Microsoft.Network/publicIPAddresses"}),
            json!({"name": "nat", "type": "Microsoft.Network/natGateways",
                   "properties": {"publicIpAddresses": [{"id": "/S/PIP-NAT"}]}}),
            json!({"name": "lb", "type": "Microsoft.Network/loadBalancers",
                   "properties": {"frontendIPConfigurations": [
                       {"properties": {"publicIPAddress": {"id": "/s/pip-lb"}}}
                   ]}}),
        ]);
        let analysis = CostAnalyzer::default().analyze(&store);
        let orphaned: Vec<_> = analysis
            .findings
            .iter()
            .filter(|f| f.category == "Orphaned")
            .map(|f| f.resources[0].as_str())
            .collect();
        assert_eq!(orphaned, vec!["pip-free"]);
    }

    #[test]
    fn test_oversized_and_idle() {
        let store = ResourceStore::from_values(vec![json!({
            "name": "vm-big",
            "type": "Microsoft.Compute/virtualMachines",
            "properties": {"hardwareProfile": {"vmSize": "Standard_D4s_v3"}}
        })]);
        let analysis = CostAnalyzer::default().analyze(&store);

        let idle = analysis.findings.iter().find(|f| f.category == "Idle").unwrap();
        let oversized = analysis
            .findings
            .iter()
            .find(|f| f.category == "Oversized")
            .unwrap();
        assert!((idle.potential_savings - 98.0).abs() < 1e-9);
        assert!((oversized.potential_savings - 56.0).abs() < 1e-9);
        assert_eq!(oversized.severity, Severity::Medium);
        assert_eq!(analysis.total_monthly_cost, 140.0);
        assert_eq!(analysis.score, 40);
    }

    #[test]
    fn test_hot_tier() {
        let store = ResourceStore::from_values(vec![json!({
            "name": "stlogs",
            "type": "Microsoft.Storage/storageAccounts",
            "properties": {"accessTier": "Hot"}
        })]);
        let analysis = CostAnalyzer::default().analyze(&store);
        assert_eq!(analysis.findings.len(), 1);
        assert_eq!(analysis.findings[0].potential_savings, 25.0);
        assert_eq!(analysis.savings_percentage(), 50.0);
    }
}
