//! Lower-cased Azure resource type identifiers
//!
//! Resource types are compared case-insensitively everywhere; these
//! constants are the canonical lower-case spelling.

pub const VIRTUAL_MACHINE: &str = "microsoft.compute/virtualmachines";
pub const DISK: &str = "microsoft.compute/disks";

pub const VIRTUAL_NETWORK: &str = "microsoft.network/virtualnetworks";
pub const NETWORK_SECURITY_GROUP: &str = "microsoft.network/networksecuritygroups";
pub const NETWORK_INTERFACE: &str = "microsoft.network/networkinterfaces";
pub const PUBLIC_IP_ADDRESS: &str = "microsoft.network/publicipaddresses";
pub const ROUTE_TABLE: &str = "microsoft.network/routetables";
pub const LOAD_BALANCER: &str = "microsoft.network/loadbalancers";
pub const NAT_GATEWAY: &str = "microsoft.network/natgateways";
pub const APPLICATION_GATEWAY: &str = "microsoft.network/applicationgateways";
pub const NETWORK_WATCHER: &str = "microsoft.network/networkwatchers";

pub const STORAGE_ACCOUNT: &str = "microsoft.storage/storageaccounts";
pub const WEB_SITE: &str = "microsoft.web/sites";
pub const SQL_SERVER: &str = "microsoft.sql/servers";

pub const ACTION_GROUP: &str = "microsoft.insights/actiongroups";
pub const DIAGNOSTIC_SETTING: &str = "microsoft.insights/diagnosticsettings";
pub const LOG_ANALYTICS_WORKSPACE: &str = "microsoft.operationalinsights/workspaces";

pub const BACKUP_PROTECTED_ITEM: &str =
    "microsoft.recoveryservices/vaults/backupfabrics/protectioncontainers/protecteditems";

/// Human-readable plural label for a resource type
pub fn display_name(resource_type: &str) -> String {
    let lower = resource_type.to_ascii_lowercase();
    let label = match lower.as_str() {
        VIRTUAL_MACHINE => "Virtual Machines",
        DISK => "Managed Disks",
        VIRTUAL_NETWORK => "Virtual Networks",
        NETWORK_SECURITY_GROUP => "Network Security Groups",
        NETWORK_INTERFACE => "Network Interfaces",
        PUBLIC_IP_ADDRESS => "Public IP Addresses",
        ROUTE_TABLE => "Route Tables",
        LOAD_BALANCER => "Load Balancers",
        NAT_GATEWAY => "NAT Gateways",
        APPLICATION_GATEWAY => "Application Gateways",
        STORAGE_ACCOUNT => "Storage Accounts",
        WEB_SITE => "App Services / Function Apps",
        SQL_SERVER => "SQL Servers",
        _ => return resource_type.to_string(),
    };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_is_case_insensitive() {
        assert_eq!(
            display_name("Microsoft.Network/natGateways"),
            "NAT Gateways"
        );
        assert_eq!(display_name("microsoft.foo/bars"), "microsoft.foo/bars");
    }
}
