//! draw.io style strings for Azure diagrams

use azdoc_common::resource_types;

const ICON_PREFIX: &str = "aspect=fixed;html=1;points=[];align=center;image;fontSize=12;image=img/lib/azure2/";
const ICON_SUFFIX: &str = ";labelPosition=bottom;verticalLabelPosition=top;verticalAlign=bottom;";

/// Side length of every icon vertex
pub const ICON_SIZE: f64 = 50.0;

pub const TITLE: &str = "text;html=1;strokeColor=none;fillColor=none;align=center;verticalAlign=middle;whiteSpace=wrap;rounded=0;fontSize=20;fontStyle=1";

pub const SECTION_LABEL: &str = "text;html=1;strokeColor=none;fillColor=none;align=left;verticalAlign=middle;whiteSpace=wrap;rounded=0;fontSize=14;fontStyle=1";

/// Resource kinds that get an Azure icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    VirtualNetwork,
    NetworkSecurityGroup,
    RouteTable,
    LoadBalancer,
    NatGateway,
    PublicIp,
    VirtualMachine,
    NetworkInterface,
    FunctionApp,
    StorageAccount,
    Generic,
}

impl IconKind {
    /// Icon for a resource type, compared case-insensitively
    pub fn for_type(resource_type: &str) -> Self {
        match resource_type.to_ascii_lowercase().as_str() {
            resource_types::VIRTUAL_NETWORK => IconKind::VirtualNetwork,
            resource_types::NETWORK_SECURITY_GROUP => IconKind::NetworkSecurityGroup,
            resource_types::ROUTE_TABLE => IconKind::RouteTable,
            resource_types::LOAD_BALANCER => IconKind::LoadBalancer,
            resource_types::NAT_GATEWAY => IconKind::NatGateway,
            resource_types::PUBLIC_IP_ADDRESS => IconKind::PublicIp,
            resource_types::VIRTUAL_MACHINE => IconKind::VirtualMachine,
            resource_types::NETWORK_INTERFACE => IconKind::NetworkInterface,
            resource_types::WEB_SITE => IconKind::FunctionApp,
            resource_types::STORAGE_ACCOUNT => IconKind::StorageAccount,
            _ => IconKind::Generic,
        }
    }

    fn image(&self) -> &'static str {
        match self {
            IconKind::VirtualNetwork => "networking/Virtual_Networks.svg",
            IconKind::NetworkSecurityGroup => "networking/Network_Security_Groups.svg",
            IconKind::RouteTable => "networking/Route_Tables.svg",
            IconKind::LoadBalancer => "networking/Load_Balancers.svg",
            IconKind::NatGateway => "networking/NAT.svg",
            IconKind::PublicIp => "networking/Public_IP_Addresses.svg",
            IconKind::VirtualMachine => "compute/Virtual_Machine.svg",
            IconKind::NetworkInterface => "networking/Network_Interfaces.svg",
            IconKind::FunctionApp => "compute/Function_Apps.svg",
            IconKind::StorageAccount => "storage/Storage_Accounts.svg",
            IconKind::Generic => "general/Azure.svg",
        }
    }

    pub fn style(&self) -> String {
        format!("{}{}{}", ICON_PREFIX, self.image(), ICON_SUFFIX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    VirtualNetwork,
    Subnet,
}

impl ContainerKind {
    pub fn style(&self) -> &'static str {
        match self {
            ContainerKind::VirtualNetwork => "rounded=1;whiteSpace=wrap;html=1;fillColor=#dae8fc;strokeColor=#0078D4;strokeWidth=2;dashed=1;dashPattern=5 5;fontSize=14;fontStyle=1;",
            ContainerKind::Subnet => "rounded=0;whiteSpace=wrap;html=1;fillColor=#e1d5e7;strokeColor=#9673a6;strokeWidth=1;dashed=1;dashPattern=3 3;fontSize=12;",
        }
    }
}

/// Line styles for edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Peering,
    Association,
    Routing,
    NatGateway,
    Generic,
}

impl ConnectionKind {
    /// Map a free-form connection type, as returned by the insight service
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "peering" => ConnectionKind::Peering,
            "association" => ConnectionKind::Association,
            "routing" => ConnectionKind::Routing,
            "natgw" => ConnectionKind::NatGateway,
            _ => ConnectionKind::Generic,
        }
    }

    pub fn style(&self) -> &'static str {
        match self {
            ConnectionKind::Peering => "endArrow=classic;startArrow=classic;html=1;rounded=0;strokeWidth=2;strokeColor=#0078D4;dashed=1;dashPattern=5 5;",
            ConnectionKind::Association => "endArrow=classic;html=1;rounded=0;strokeWidth=1.5;strokeColor=#666666;",
            ConnectionKind::Routing => "endArrow=classic;html=1;rounded=0;strokeWidth=1.5;strokeColor=#9673a6;dashed=1;dashPattern=3 3;",
            ConnectionKind::NatGateway => "endArrow=classic;html=1;rounded=0;strokeWidth=1.5;strokeColor=#d79b00;",
            ConnectionKind::Generic => "endArrow=classic;html=1;rounded=0;strokeWidth=1;strokeColor=#666666;",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_style_embeds_image_path() {
        let style = IconKind::NatGateway.style();
        assert!(style.starts_with("aspect=fixed;"));
        assert!(style.contains("image=img/lib/azure2/networking/NAT.svg;"));
    }

    #[test]
    fn test_icon_for_type() {
        assert_eq!(
            IconKind::for_type("Microsoft.Network/natGateways"),
            IconKind::NatGateway
        );
        assert_eq!(
            IconKind::for_type("Microsoft.KeyVault/vaults").style(),
            IconKind::Generic.style()
        );
    }

    #[test]
    fn test_connection_kind_parse() {
        assert_eq!(ConnectionKind::parse("NatGW"), ConnectionKind::NatGateway);
        assert_eq!(ConnectionKind::parse(" peering "), ConnectionKind::Peering);
        assert_eq!(ConnectionKind::parse("dependency"), ConnectionKind::Generic);
    }
}
