//! Placement of resources into diagram documents
//!
//! Each virtual network becomes one diagram: a VNet container holding its
//! subnets, a lane per network-control resource type to the right of the
//! subnet column, a public IP lane, a storage row below the lanes, and
//! workloads (VMs, NICs, Function Apps) in the subnet picked by a naming
//! heuristic. Positions and container sizes are planned before any cell is
//! emitted: subnets grow with their workload rows, the VNet grows to hold
//! every child, and sibling boxes never overlap.

use crate::drawio::{Diagram, Geometry, LAYER_ID};
use crate::styles::{self, ConnectionKind, ContainerKind, IconKind, ICON_SIZE};
use azdoc_common::{resource_types, Resource, ResourceStore};
use azdoc_insight::{ConnectionSuggestion, LayoutSuggestion, SubnetSummary};
use log::debug;
use std::collections::HashMap;

const VNET_ORIGIN: (f64, f64) = (50.0, 50.0);
/// Smallest VNet container; it grows to fit its children
const VNET_MIN_SIZE: (f64, f64) = (1100.0, 600.0);
/// Space between the outermost child and a container's edge
const CONTAINER_PADDING: f64 = 30.0;

const SUBNET_X: f64 = 50.0;
const SUBNET_Y: f64 = 70.0;
const SUBNET_GAP: f64 = 20.0;
const SUBNET_WIDTH: f64 = 350.0;
const SUBNET_MIN_HEIGHT: f64 = 120.0;

const LANE_Y: f64 = 100.0;
const LANE_STEP: f64 = 100.0;

/// Network-control lanes to the right of the subnet column
const LANES: [(&str, &str, IconKind, f64); 4] = [
    (resource_types::NETWORK_SECURITY_GROUP, "nsg", IconKind::NetworkSecurityGroup, 470.0),
    (resource_types::ROUTE_TABLE, "rt", IconKind::RouteTable, 600.0),
    (resource_types::LOAD_BALANCER, "lb", IconKind::LoadBalancer, 730.0),
    (resource_types::NAT_GATEWAY, "nat", IconKind::NatGateway, 860.0),
];

const PUBLIC_IP_X: f64 = 990.0;
const PUBLIC_IP_Y: f64 = 350.0;
const PUBLIC_IP_STEP: f64 = 80.0;

const STORAGE_X: f64 = 470.0;
const STORAGE_MIN_Y: f64 = 520.0;
/// Vertical space between the tallest lane and the storage row
const STORAGE_GAP: f64 = 30.0;
const STORAGE_STEP: f64 = 80.0;
const STORAGE_ROW_STEP: f64 = 70.0;
const STORAGE_WRAP: usize = 7;

/// Workload slots inside a subnet
const SUBNET_GRID: Grid = Grid {
    x0: 20.0,
    y0: 40.0,
};
/// Left edge of the workload grid used when no subnet matches
const FALLBACK_X: f64 = 70.0;
const GRID_COLUMNS: usize = 4;
const GRID_STEP: (f64, f64) = (80.0, 60.0);

/// Subnet roles each workload type prefers, in order
const VM_ROLES: [&str; 2] = ["management", "services"];
const FUNCTION_ROLES: [&str; 2] = ["apps", "services"];

/// Storage account name marker used by the Function App fallback edge
const FUNCTION_STORAGE_MARKER: &str = "stfunc";
const FUNCTION_NAME_MARKER: &str = "func";

const OVERVIEW_TITLE: &str = "Azure Subscription Overview";
const OVERVIEW_X: f64 = 100.0;
const OVERVIEW_VNET_Y: f64 = 80.0;
const OVERVIEW_VNET_STEP: f64 = 100.0;
const OVERVIEW_ICON_STEP: f64 = 80.0;
const OVERVIEW_ROW_STEP: f64 = 70.0;
const OVERVIEW_WRAP: usize = 10;

/// Overview sections below the VNet row, in order
const OVERVIEW_SECTIONS: [(&str, &str); 9] = [
    (resource_types::NETWORK_SECURITY_GROUP, "nsg"),
    (resource_types::ROUTE_TABLE, "rt"),
    (resource_types::LOAD_BALANCER, "lb"),
    (resource_types::NAT_GATEWAY, "nat"),
    (resource_types::PUBLIC_IP_ADDRESS, "pip"),
    (resource_types::VIRTUAL_MACHINE, "vm"),
    (resource_types::NETWORK_INTERFACE, "nic"),
    (resource_types::STORAGE_ACCOUNT, "storage"),
    (resource_types::WEB_SITE, "func"),
];

#[derive(Debug, Clone, Copy)]
struct Grid {
    x0: f64,
    y0: f64,
}

impl Grid {
    fn slot(&self, index: usize) -> (f64, f64) {
        let column = (index % GRID_COLUMNS) as f64;
        let row = (index / GRID_COLUMNS) as f64;
        (self.x0 + column * GRID_STEP.0, self.y0 + row * GRID_STEP.1)
    }

    /// Lowest icon edge once `count` slots are filled
    fn bottom(&self, count: usize) -> f64 {
        match count {
            0 => self.y0,
            n => self.slot(n - 1).1 + ICON_SIZE,
        }
    }
}

/// Suggestions from the insight service for diagram building
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Augmentation {
    /// Edge suggestions; when non-empty they replace the naming-heuristic edges
    pub connections: Vec<ConnectionSuggestion>,
    /// Subnet choices per workload name
    pub layout: Vec<LayoutSuggestion>,
}

impl Augmentation {
    fn subnet_hint(&self, resource_name: &str) -> Option<&str> {
        self.layout
            .iter()
            .find(|hint| hint.resource_name == resource_name)
            .and_then(|hint| hint.subnet_name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Subnets declared in a VNet's properties
///
/// Anything missing or of the wrong shape yields no subnets.
pub fn extract_subnets(vnet: &Resource) -> Vec<SubnetSummary> {
    vnet.properties()
        .get("subnets")
        .items()
        .into_iter()
        .filter_map(|subnet| {
            let name = subnet.get("name").as_str()?;
            let props = subnet.get("properties");
            let address_prefix = props
                .get("addressPrefix")
                .as_str()
                .or_else(|| props.get("addressPrefixes").at(0).as_str())
                .map(str::to_string);
            Some(SubnetSummary {
                name: name.to_string(),
                address_prefix,
            })
        })
        .collect()
}

/// Workloads placed by the subnet heuristic, in placement order
pub fn workloads<'a>(group: &[&'a Resource]) -> Vec<&'a Resource> {
    [
        resource_types::VIRTUAL_MACHINE,
        resource_types::NETWORK_INTERFACE,
        resource_types::WEB_SITE,
    ]
    .iter()
    .flat_map(|resource_type| of_type(group, resource_type))
    .collect()
}

/// Lay out one VNet together with the resources of its resource group
pub fn vnet_diagram(vnet: &Resource, group: &[&Resource], augmentation: &Augmentation) -> Diagram {
    let subnets = extract_subnets(vnet);
    let plan = Plan::new(&subnets, group, augmentation);

    let mut layout = VnetLayout::new(vnet, plan.vnet_size);
    layout.place_subnets(&subnets, &plan.subnet_rows);
    layout.place_icons(&plan.icons);
    layout.place_workloads(&plan.workloads, plan.fallback);

    if augmentation.connections.is_empty() {
        layout.connect_by_naming();
    } else {
        layout.connect_suggested(&augmentation.connections);
    }
    layout.diagram
}

/// Where a workload is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Subnet(usize),
    Vnet,
}

/// Icon parented directly to the VNet container
struct VnetIcon<'a> {
    key: String,
    resource: &'a Resource,
    kind: IconKind,
    x: f64,
    y: f64,
}

struct Workload<'a> {
    key: String,
    resource: &'a Resource,
    kind: IconKind,
    container: Container,
}

/// Every position and container size of one VNet diagram
struct Plan<'a> {
    /// (y, height) per subnet, relative to the VNet
    subnet_rows: Vec<(f64, f64)>,
    /// Grid for workloads that match no subnet, below the subnet column
    fallback: Grid,
    icons: Vec<VnetIcon<'a>>,
    workloads: Vec<Workload<'a>>,
    vnet_size: (f64, f64),
}

impl<'a> Plan<'a> {
    fn new(subnets: &[SubnetSummary], group: &[&'a Resource], augmentation: &Augmentation) -> Self {
        let workloads = assign_workloads(subnets, group, augmentation);

        let mut per_subnet = vec![0usize; subnets.len()];
        let mut fallback_count = 0;
        for workload in &workloads {
            match workload.container {
                Container::Subnet(index) => per_subnet[index] += 1,
                Container::Vnet => fallback_count += 1,
            }
        }

        let mut y = SUBNET_Y;
        let mut subnet_rows = Vec::with_capacity(subnets.len());
        for count in per_subnet {
            let height = SUBNET_MIN_HEIGHT.max(SUBNET_GRID.bottom(count) + CONTAINER_PADDING);
            subnet_rows.push((y, height));
            y += height + SUBNET_GAP;
        }
        let fallback = Grid { x0: FALLBACK_X, y0: y };
        let left_bottom = if fallback_count > 0 {
            fallback.bottom(fallback_count)
        } else {
            y - SUBNET_GAP
        };

        let mut icons = Vec::new();
        for (resource_type, prefix, kind, x) in LANES {
            for (i, resource) in of_type(group, resource_type).into_iter().enumerate() {
                icons.push(VnetIcon {
                    key: format!("{}-{}", prefix, i),
                    resource,
                    kind,
                    x,
                    y: LANE_Y + i as f64 * LANE_STEP,
                });
            }
        }
        for (i, pip) in of_type(group, resource_types::PUBLIC_IP_ADDRESS).into_iter().enumerate() {
            icons.push(VnetIcon {
                key: format!("pip-{}", i),
                resource: pip,
                kind: IconKind::PublicIp,
                x: PUBLIC_IP_X,
                y: PUBLIC_IP_Y + i as f64 * PUBLIC_IP_STEP,
            });
        }

        let lanes_bottom = icons.iter().map(|icon| icon.y + ICON_SIZE).fold(0.0, f64::max);
        let storage_y = STORAGE_MIN_Y.max(lanes_bottom + STORAGE_GAP);
        for (i, account) in of_type(group, resource_types::STORAGE_ACCOUNT).into_iter().enumerate() {
            let column = (i % STORAGE_WRAP) as f64;
            let row = (i / STORAGE_WRAP) as f64;
            icons.push(VnetIcon {
                key: format!("storage-{}", i),
                resource: account,
                kind: IconKind::StorageAccount,
                x: STORAGE_X + column * STORAGE_STEP,
                y: storage_y + row * STORAGE_ROW_STEP,
            });
        }

        let right = icons
            .iter()
            .map(|icon| icon.x + ICON_SIZE)
            .fold(SUBNET_X + SUBNET_WIDTH, f64::max);
        let bottom = icons
            .iter()
            .map(|icon| icon.y + ICON_SIZE)
            .fold(left_bottom, f64::max);
        let vnet_size = (
            VNET_MIN_SIZE.0.max(right + CONTAINER_PADDING),
            VNET_MIN_SIZE.1.max(bottom + CONTAINER_PADDING),
        );

        Self {
            subnet_rows,
            fallback,
            icons,
            workloads,
            vnet_size,
        }
    }
}

fn assign_workloads<'a>(
    subnets: &[SubnetSummary],
    group: &[&'a Resource],
    augmentation: &Augmentation,
) -> Vec<Workload<'a>> {
    let kinds: [(&str, &str, IconKind, &[&str]); 3] = [
        (resource_types::VIRTUAL_MACHINE, "vm", IconKind::VirtualMachine, &VM_ROLES),
        (resource_types::NETWORK_INTERFACE, "nic", IconKind::NetworkInterface, &VM_ROLES),
        (resource_types::WEB_SITE, "func", IconKind::FunctionApp, &FUNCTION_ROLES),
    ];

    let mut workloads = Vec::new();
    for (resource_type, prefix, kind, roles) in kinds {
        for (i, resource) in of_type(group, resource_type).into_iter().enumerate() {
            workloads.push(Workload {
                key: format!("{}-{}", prefix, i),
                resource,
                kind,
                container: container_for(subnets, &resource.name, roles, augmentation),
            });
        }
    }
    workloads
}

/// Subnet for a workload: service hint, then role names, then the VNet itself
fn container_for(
    subnets: &[SubnetSummary],
    name: &str,
    roles: &[&str],
    augmentation: &Augmentation,
) -> Container {
    if let Some(hint) = augmentation.subnet_hint(name) {
        if let Some(index) = subnets
            .iter()
            .position(|subnet| subnet.name.eq_ignore_ascii_case(hint))
        {
            debug!("Placing {} in suggested subnet {}", name, hint);
            return Container::Subnet(index);
        }
    }

    roles
        .iter()
        .find_map(|role| {
            subnets
                .iter()
                .position(|subnet| subnet_has_role(&subnet.name, role))
        })
        .map_or(Container::Vnet, Container::Subnet)
}

struct Placed<'a> {
    name: &'a str,
    cell: String,
}

struct VnetLayout<'a> {
    diagram: Diagram,
    vnet_cell: String,
    subnet_cells: Vec<String>,
    vms: Vec<Placed<'a>>,
    nics: Vec<Placed<'a>>,
    functions: Vec<Placed<'a>>,
    storage: Vec<Placed<'a>>,
    /// Resource name to cell ID for suggested edges
    by_name: HashMap<&'a str, String>,
}

impl<'a> VnetLayout<'a> {
    fn new(vnet: &Resource, size: (f64, f64)) -> Self {
        let mut diagram = Diagram::new(vnet.name.clone());
        let vnet_cell = diagram.add_vertex(
            "vnet",
            format!(
                "Virtual Network: {}<br>Resource Group: {}",
                vnet.name, vnet.resource_group
            ),
            ContainerKind::VirtualNetwork.style(),
            LAYER_ID,
            Geometry::new(VNET_ORIGIN.0, VNET_ORIGIN.1, size.0, size.1),
        );

        Self {
            diagram,
            vnet_cell,
            subnet_cells: Vec::new(),
            vms: Vec::new(),
            nics: Vec::new(),
            functions: Vec::new(),
            storage: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    fn place_subnets(&mut self, subnets: &[SubnetSummary], rows: &[(f64, f64)]) {
        for (i, (subnet, (y, height))) in subnets.iter().zip(rows).enumerate() {
            let label = match &subnet.address_prefix {
                Some(prefix) => format!("Subnet: {}<br>{}", subnet.name, prefix),
                None => format!("Subnet: {}", subnet.name),
            };
            let cell = self.diagram.add_vertex(
                &format!("subnet-{}", i),
                label,
                ContainerKind::Subnet.style(),
                &self.vnet_cell,
                Geometry::new(SUBNET_X, *y, SUBNET_WIDTH, *height),
            );
            self.subnet_cells.push(cell);
        }
    }

    fn icon(&mut self, key: &str, resource: &'a Resource, kind: IconKind, parent: &str, x: f64, y: f64) -> String {
        let cell = self.diagram.add_vertex(
            key,
            resource.name.as_str(),
            kind.style(),
            parent,
            Geometry::new(x, y, ICON_SIZE, ICON_SIZE),
        );
        self.by_name.entry(resource.name.as_str()).or_insert_with(|| cell.clone());
        cell
    }

    fn place_icons(&mut self, icons: &[VnetIcon<'a>]) {
        let vnet_cell = self.vnet_cell.clone();
        for icon in icons {
            let cell = self.icon(&icon.key, icon.resource, icon.kind, &vnet_cell, icon.x, icon.y);
            if icon.kind == IconKind::StorageAccount {
                self.storage.push(Placed {
                    name: &icon.resource.name,
                    cell,
                });
            }
        }
    }

    fn place_workloads(&mut self, workloads: &[Workload<'a>], fallback: Grid) {
        let mut next = vec![0usize; self.subnet_cells.len()];
        let mut next_fallback = 0;

        for workload in workloads {
            let (parent, (x, y)) = match workload.container {
                Container::Subnet(index) => {
                    let slot = SUBNET_GRID.slot(next[index]);
                    next[index] += 1;
                    (self.subnet_cells[index].clone(), slot)
                }
                Container::Vnet => {
                    let slot = fallback.slot(next_fallback);
                    next_fallback += 1;
                    (self.vnet_cell.clone(), slot)
                }
            };
            let cell = self.icon(&workload.key, workload.resource, workload.kind, &parent, x, y);

            let placed = Placed {
                name: &workload.resource.name,
                cell,
            };
            match workload.kind {
                IconKind::VirtualMachine => self.vms.push(placed),
                IconKind::NetworkInterface => self.nics.push(placed),
                _ => self.functions.push(placed),
            }
        }
    }

    /// NIC to VM by name token, Function App to storage by name marker
    fn connect_by_naming(&mut self) {
        for (i, nic) in self.nics.iter().enumerate() {
            let vm = self.vms.iter().find(|vm| {
                let token = vm.name.split('-').next().unwrap_or_default();
                !token.is_empty() && nic.name.contains(token)
            });
            if let Some(vm) = vm {
                self.diagram.add_edge(
                    &format!("nic-vm-{}", i),
                    "attached to",
                    &nic.cell,
                    &vm.cell,
                    ConnectionKind::Association.style(),
                );
            }
        }

        for (i, function) in self.functions.iter().enumerate() {
            let account = self.storage.iter().find(|account| {
                account.name.contains(FUNCTION_STORAGE_MARKER)
                    || function.name.contains(FUNCTION_NAME_MARKER)
            });
            if let Some(account) = account {
                self.diagram.add_edge(
                    &format!("func-storage-{}", i),
                    "uses",
                    &function.cell,
                    &account.cell,
                    ConnectionKind::Association.style(),
                );
            }
        }
    }

    /// High-confidence suggestions whose ends are both in this diagram
    fn connect_suggested(&mut self, suggestions: &[ConnectionSuggestion]) {
        let mut applied = 0;
        for suggestion in suggestions.iter().filter(|s| s.is_high_confidence()) {
            let (Some(source), Some(target)) = (
                self.by_name.get(suggestion.source_resource.as_str()),
                self.by_name.get(suggestion.target_resource.as_str()),
            ) else {
                continue;
            };

            let edge = self.diagram.add_edge(
                &format!("ai-{}", applied),
                suggestion.label.as_str(),
                source,
                target,
                ConnectionKind::parse(&suggestion.connection_type).style(),
            );
            if edge.is_some() {
                applied += 1;
            }
        }
        debug!(
            "Applied {} suggested connections to {}",
            applied,
            self.diagram.name()
        );
    }
}

/// `management` matches subnets named `management` or `subnet-management`
fn subnet_has_role(subnet: &str, role: &str) -> bool {
    let name = subnet.to_ascii_lowercase();
    name == role || name.strip_prefix("subnet-") == Some(role)
}

fn of_type<'a>(group: &[&'a Resource], resource_type: &str) -> Vec<&'a Resource> {
    group
        .iter()
        .copied()
        .filter(|resource| resource.is_type(resource_type))
        .collect()
}

/// One icon per top-level resource, grouped by type in labelled sections
pub fn overview_diagram(store: &ResourceStore) -> Diagram {
    let mut diagram = Diagram::new("Azure-Overview");
    diagram.add_vertex(
        "title",
        OVERVIEW_TITLE,
        styles::TITLE,
        LAYER_ID,
        Geometry::new(50.0, 20.0, 1000.0, 40.0),
    );

    let vnets = store.of_type(resource_types::VIRTUAL_NETWORK);
    let mut y = place_icon_rows(
        &mut diagram,
        &vnets,
        "vnet",
        OVERVIEW_VNET_Y,
        OVERVIEW_VNET_STEP,
    );
    y += 120.0;

    for (resource_type, prefix) in OVERVIEW_SECTIONS {
        let resources = store.of_type(resource_type);
        if resources.is_empty() {
            continue;
        }

        diagram.add_vertex(
            &format!("label-{}", prefix),
            format!(
                "{} ({})",
                resource_types::display_name(resource_type),
                resources.len()
            ),
            styles::SECTION_LABEL,
            LAYER_ID,
            Geometry::new(OVERVIEW_X, y, 200.0, 30.0),
        );
        y += 40.0;
        y = place_icon_rows(&mut diagram, &resources, prefix, y, OVERVIEW_ICON_STEP) + 80.0;
    }

    // first two VNets only; actual peering data is not consulted
    if vnets.len() >= 2 {
        diagram.add_edge(
            "peering-0-1",
            "VNet Peering",
            "cell-vnet-0",
            "cell-vnet-1",
            ConnectionKind::Peering.style(),
        );
    }

    diagram
}

/// Place icons left to right, wrapping every ten; returns the last row's y
fn place_icon_rows(
    diagram: &mut Diagram,
    resources: &[&Resource],
    prefix: &str,
    y: f64,
    step: f64,
) -> f64 {
    let mut last_y = y;
    for (i, resource) in resources.iter().enumerate() {
        let column = (i % OVERVIEW_WRAP) as f64;
        let row = (i / OVERVIEW_WRAP) as f64;
        last_y = y + row * OVERVIEW_ROW_STEP;
        diagram.add_vertex(
            &format!("{}-{}", prefix, i),
            resource.name.as_str(),
            IconKind::for_type(&resource.resource_type).style(),
            LAYER_ID,
            Geometry::new(OVERVIEW_X + column * step, last_y, ICON_SIZE, ICON_SIZE),
        );
    }
    last_y
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vnet(subnets: serde_json::Value) -> Resource {
        Resource::from_value(json!({
            "name": "vnet-hub",
            "type": "Microsoft.Network/virtualNetworks",
            "resourceGroup": "rg-hub",
            "properties": { "subnets": subnets }
        }))
    }

    fn resource(name: &str, resource_type: &str) -> Resource {
        Resource::from_value(json!({
            "name": name,
            "type": resource_type,
            "resourceGroup": "rg-hub"
        }))
    }

    #[test]
    fn test_extract_subnets_tolerates_bad_shapes() {
        let subnets = extract_subnets(&vnet(json!([
            {"name": "apps", "properties": {"addressPrefix": "10.0.1.0/24"}},
            {"name": "data", "properties": {"addressPrefixes": ["10.0.2.0/24"]}},
            {"properties": {}},
            "garbage"
        ])));
        assert_eq!(subnets.len(), 2);
        assert_eq!(subnets[0].address_prefix.as_deref(), Some("10.0.1.0/24"));
        assert_eq!(subnets[1].address_prefix.as_deref(), Some("10.0.2.0/24"));

        assert!(extract_subnets(&vnet(json!("not-a-list"))).is_empty());
    }

    #[test]
    fn test_subnet_role_matching() {
        assert!(subnet_has_role("Management", "management"));
        assert!(subnet_has_role("subnet-apps", "apps"));
        assert!(!subnet_has_role("apps-tier", "apps"));
    }

    #[test]
    fn test_grid_slots_are_distinct() {
        let slots: Vec<(f64, f64)> = (0..9).map(|i| SUBNET_GRID.slot(i)).collect();
        for (i, a) in slots.iter().enumerate() {
            assert!(slots[i + 1..].iter().all(|b| b != a));
        }
        assert_eq!(slots[4], (20.0, 100.0));

        // four columns fit across a subnet
        assert!(SUBNET_GRID.slot(3).0 + ICON_SIZE <= SUBNET_WIDTH);
        assert_eq!(SUBNET_GRID.bottom(0), 40.0);
        assert_eq!(SUBNET_GRID.bottom(5), 150.0);
    }

    fn bounds(diagram: &Diagram, id: &str) -> (f64, f64, f64, f64) {
        let g = diagram.cell(id).and_then(|c| c.geometry()).unwrap();
        (g.x, g.y, g.x + g.width, g.y + g.height)
    }

    #[test]
    fn test_subnets_grow_with_their_workloads() {
        let hub = vnet(json!([{"name": "management"}, {"name": "dmz"}]));
        let vms: Vec<Resource> = (0..5)
            .map(|i| resource(&format!("vm-{}", i), "Microsoft.Compute/virtualMachines"))
            .collect();
        let mut group = vec![&hub];
        group.extend(vms.iter());

        let diagram = vnet_diagram(&hub, &group, &Augmentation::default());
        let management = bounds(&diagram, "cell-subnet-0");
        let dmz = bounds(&diagram, "cell-subnet-1");
        // second grid row ends at 150, so the subnet is taller than the minimum
        assert_eq!(management.3 - management.1, 180.0);
        assert!(dmz.1 >= management.3);
        assert_eq!(dmz.3 - dmz.1, SUBNET_MIN_HEIGHT);

        let last_vm = bounds(&diagram, "cell-vm-4");
        assert!(last_vm.3 <= management.3 - management.1);
    }

    #[test]
    fn test_storage_row_starts_below_the_tallest_lane() {
        let hub = vnet(json!([]));
        let nsgs: Vec<Resource> = (0..5)
            .map(|i| resource(&format!("nsg-{}", i), "Microsoft.Network/networkSecurityGroups"))
            .collect();
        let account = resource("stdata", "Microsoft.Storage/storageAccounts");
        let mut group = vec![&hub, &account];
        group.extend(nsgs.iter());

        let diagram = vnet_diagram(&hub, &group, &Augmentation::default());
        let last_nsg = bounds(&diagram, "cell-nsg-4");
        let storage = bounds(&diagram, "cell-storage-0");
        assert_eq!(last_nsg, (470.0, 500.0, 520.0, 550.0));
        assert!(storage.1 >= last_nsg.3);

        let vnet_box = bounds(&diagram, "cell-vnet");
        assert!(vnet_box.3 - vnet_box.1 >= storage.3);
    }

    #[test]
    fn test_workloads_prefer_role_subnets() {
        let hub = vnet(json!([{"name": "subnet-services"}, {"name": "apps"}]));
        let vm = resource("vm-web", "Microsoft.Compute/virtualMachines");
        let site = resource("func-orders", "Microsoft.Web/sites");
        let group = vec![&hub, &vm, &site];

        let diagram = vnet_diagram(&hub, &group, &Augmentation::default());
        let parent_of = |key: &str| {
            diagram
                .cell(&format!("cell-{}", key))
                .and_then(|c| c.parent.clone())
        };
        assert_eq!(parent_of("vm-0").as_deref(), Some("cell-subnet-0"));
        assert_eq!(parent_of("func-0").as_deref(), Some("cell-subnet-1"));
    }

    #[test]
    fn test_layout_hint_chooses_subnet() {
        let hub = vnet(json!([{"name": "management"}, {"name": "dmz"}]));
        let vm = resource("vm-jump", "Microsoft.Compute/virtualMachines");
        let group = vec![&hub, &vm];
        let augmentation = Augmentation {
            connections: Vec::new(),
            layout: vec![LayoutSuggestion {
                resource_name: "vm-jump".to_string(),
                x: 9999.0,
                y: -5.0,
                subnet_name: Some("DMZ".to_string()),
                grouping: "tier".to_string(),
                reason: String::new(),
            }],
        };

        let diagram = vnet_diagram(&hub, &group, &augmentation);
        let vm_cell = diagram.cell("cell-vm-0").unwrap();
        assert_eq!(vm_cell.parent.as_deref(), Some("cell-subnet-1"));
        // raw coordinates from the hint are ignored
        assert_eq!(vm_cell.geometry().map(|g| (g.x, g.y)), Some((20.0, 40.0)));
    }

    #[test]
    fn test_function_app_uses_one_storage_account() {
        let hub = vnet(json!([]));
        let site = resource("func-orders", "Microsoft.Web/sites");
        let logs = resource("stlogs", "Microsoft.Storage/storageAccounts");
        let data = resource("stdata", "Microsoft.Storage/storageAccounts");
        let group = vec![&hub, &site, &logs, &data];

        let diagram = vnet_diagram(&hub, &group, &Augmentation::default());
        let edges: Vec<_> = diagram.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].value, "uses");
    }

    #[test]
    fn test_overview_wraps_and_peers_first_two_vnets() {
        let mut values = vec![
            json!({"name": "vnet-a", "type": "Microsoft.Network/virtualNetworks"}),
            json!({"name": "vnet-b", "type": "Microsoft.Network/virtualNetworks"}),
        ];
        for i in 0..12 {
            values.push(json!({"name": format!("nsg-{}", i), "type": "Microsoft.Network/networkSecurityGroups"}));
        }
        let diagram = overview_diagram(&ResourceStore::from_values(values));

        let nsg_style = IconKind::NetworkSecurityGroup.style();
        let rows: Vec<f64> = diagram
            .vertices_styled(&nsg_style)
            .filter_map(|c| c.geometry().map(|g| g.y))
            .collect();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0], rows[9]);
        assert_eq!(rows[10], rows[0] + OVERVIEW_ROW_STEP);

        let edges: Vec<_> = diagram.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].value, "VNet Peering");
    }
}
