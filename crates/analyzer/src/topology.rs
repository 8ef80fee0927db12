//! Network topology graph
//!
//! Nodes are created in a first pass over the store, then edges are derived
//! from the ID references inside resource properties. An edge is only kept
//! when both of its endpoints became nodes.

use azdoc_common::resource_types::{
    DISK, LOAD_BALANCER, NAT_GATEWAY, NETWORK_INTERFACE, NETWORK_SECURITY_GROUP,
    PUBLIC_IP_ADDRESS, ROUTE_TABLE, STORAGE_ACCOUNT, VIRTUAL_MACHINE, VIRTUAL_NETWORK, WEB_SITE,
};
use azdoc_common::{DocError, Field, Resource, ResourceStore, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    VirtualNetwork,
    Subnet,
    NetworkSecurityGroup,
    RouteTable,
    LoadBalancer,
    NatGateway,
    PublicIp,
    NetworkInterface,
    VirtualMachine,
    Disk,
    StorageAccount,
    WebSite,
}

impl NodeKind {
    /// Kind for a top-level resource type; subnets are never top-level
    pub fn for_type(resource_type: &str) -> Option<Self> {
        let kind = match resource_type.to_ascii_lowercase().as_str() {
            VIRTUAL_NETWORK => NodeKind::VirtualNetwork,
            NETWORK_SECURITY_GROUP => NodeKind::NetworkSecurityGroup,
            ROUTE_TABLE => NodeKind::RouteTable,
            LOAD_BALANCER => NodeKind::LoadBalancer,
            NAT_GATEWAY => NodeKind::NatGateway,
            PUBLIC_IP_ADDRESS => NodeKind::PublicIp,
            NETWORK_INTERFACE => NodeKind::NetworkInterface,
            VIRTUAL_MACHINE => NodeKind::VirtualMachine,
            DISK => NodeKind::Disk,
            STORAGE_ACCOUNT => NodeKind::StorageAccount,
            WEB_SITE => NodeKind::WebSite,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Contains,
    SecuredBy,
    RoutesVia,
    EgressVia,
    InSubnet,
    Exposes,
    AttachedTo,
    UsesDisk,
    PeeredWith,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub resource_group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

/// Node/edge graph of the network resources in a store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub nodes: Vec<TopologyNode>,
    pub edges: Vec<TopologyEdge>,
}

impl Topology {
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &TopologyNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn edges_of(&self, kind: EdgeKind) -> impl Iterator<Item = &TopologyEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    /// Write the graph as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DocError::artifact(path, e))?;
        }
        fs::write(path, json).map_err(|e| DocError::artifact(path, e))?;
        info!(
            "Wrote topology with {} nodes and {} edges to {:?}",
            self.nodes.len(),
            self.edges.len(),
            path
        );
        Ok(())
    }
}

/// Builds a [`Topology`] from a resource snapshot
pub struct TopologyBuilder<'a> {
    store: &'a ResourceStore,
    topology: Topology,
    /// Lower-cased IDs of every node
    known: HashSet<String>,
    seen_edges: HashSet<(String, String, EdgeKind)>,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(store: &'a ResourceStore) -> Self {
        Self {
            store,
            topology: Topology::default(),
            known: HashSet::new(),
            seen_edges: HashSet::new(),
        }
    }

    pub fn build(mut self) -> Topology {
        // First pass: nodes
        for resource in self.store {
            let Some(kind) = NodeKind::for_type(&resource.resource_type) else {
                continue;
            };
            self.add_node(&resource.id, kind, &resource.name, &resource.resource_group);

            if kind == NodeKind::VirtualNetwork {
                for subnet in resource.properties().get("subnets").items() {
                    if let Some((id, name)) = subnet_identity(resource, subnet) {
                        self.add_node(&id, NodeKind::Subnet, &name, &resource.resource_group);
                    }
                }
            }
        }

        // Second pass: edges
        for resource in self.store {
            match NodeKind::for_type(&resource.resource_type) {
                Some(NodeKind::VirtualNetwork) => self.vnet_edges(resource),
                Some(NodeKind::NetworkInterface) => self.nic_edges(resource),
                Some(NodeKind::VirtualMachine) => self.vm_edges(resource),
                _ => {}
            }
        }

        debug!(
            "topology: {} nodes, {} edges",
            self.topology.nodes.len(),
            self.topology.edges.len()
        );
        self.topology
    }

    fn add_node(&mut self, id: &str, kind: NodeKind, name: &str, resource_group: &str) {
        if id.is_empty() || !self.known.insert(id.to_ascii_lowercase()) {
            return;
        }
        self.topology.nodes.push(TopologyNode {
            id: id.to_string(),
            kind,
            name: name.to_string(),
            resource_group: resource_group.to_string(),
        });
    }

    fn add_edge(&mut self, from: &str, to: Option<&str>, kind: EdgeKind) {
        let Some(to) = to else {
            return;
        };
        let (from_key, to_key) = (from.to_ascii_lowercase(), to.to_ascii_lowercase());
        if !self.known.contains(&from_key) || !self.known.contains(&to_key) {
            debug!("dropping {:?} edge {} -> {}: endpoint not in graph", kind, from, to);
            return;
        }
        if !self.seen_edges.insert((from_key, to_key, kind)) {
            return;
        }
        let edge = TopologyEdge {
            from: self.canonical(from),
            to: self.canonical(to),
            kind,
        };
        self.topology.edges.push(edge);
    }

    /// The node ID as first recorded, so edge endpoints match node IDs exactly
    fn canonical(&self, id: &str) -> String {
        self.topology
            .nodes
            .iter()
            .find(|n| n.id.eq_ignore_ascii_case(id))
            .map(|n| n.id.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn vnet_edges(&mut self, vnet: &Resource) {
        for subnet in vnet.properties().get("subnets").items() {
            let Some((subnet_id, _)) = subnet_identity(vnet, subnet) else {
                continue;
            };
            let props = subnet.get("properties");
            self.add_edge(&vnet.id, Some(subnet_id.as_str()), EdgeKind::Contains);
            self.add_edge(
                &subnet_id,
                props.path(&["networkSecurityGroup", "id"]).as_str(),
                EdgeKind::SecuredBy,
            );
            self.add_edge(
                &subnet_id,
                props.path(&["routeTable", "id"]).as_str(),
                EdgeKind::RoutesVia,
            );
            self.add_edge(
                &subnet_id,
                props.path(&["natGateway", "id"]).as_str(),
                EdgeKind::EgressVia,
            );
        }

        for peering in vnet.properties().get("virtualNetworkPeerings").items() {
            let remote = peering
                .path(&["properties", "remoteVirtualNetwork", "id"])
                .as_str();
            self.add_edge(&vnet.id, remote, EdgeKind::PeeredWith);
        }
    }

    fn nic_edges(&mut self, nic: &Resource) {
        let props = nic.properties();
        for config in props.get("ipConfigurations").items() {
            let config_props = config.get("properties");
            self.add_edge(
                &nic.id,
                config_props.path(&["subnet", "id"]).as_str(),
                EdgeKind::InSubnet,
            );
            self.add_edge(
                &nic.id,
                config_props.path(&["publicIPAddress", "id"]).as_str(),
                EdgeKind::Exposes,
            );
        }
        self.add_edge(
            &nic.id,
            props.path(&["virtualMachine", "id"]).as_str(),
            EdgeKind::AttachedTo,
        );
        self.add_edge(
            &nic.id,
            props.path(&["networkSecurityGroup", "id"]).as_str(),
            EdgeKind::SecuredBy,
        );
    }

    fn vm_edges(&mut self, vm: &Resource) {
        let profile = vm.properties().get("storageProfile");
        self.add_edge(
            &vm.id,
            profile.path(&["osDisk", "managedDisk", "id"]).as_str(),
            EdgeKind::UsesDisk,
        );
        for disk in profile.get("dataDisks").items() {
            self.add_edge(
                &vm.id,
                disk.path(&["managedDisk", "id"]).as_str(),
                EdgeKind::UsesDisk,
            );
        }
    }
}

/// Subnet ID and name; the ID is synthesized from the VNet when absent
fn subnet_identity(vnet: &Resource, subnet: Field<'_>) -> Option<(String, String)> {
    let name = subnet.get("name").as_str()?;
    let id = subnet
        .get("id")
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/subnets/{}", vnet.id, name));
    Some((id, name.to_string()))
}
