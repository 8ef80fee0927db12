//! Diagram document model and draw.io XML serialization
//!
//! A [`Diagram`] is an ordered cell list. Cells `0` and `1` form the page
//! root; every vertex has a parent (the page layer or a container vertex)
//! and geometry relative to that parent. Edges reference two existing
//! cells by ID and are rejected when either endpoint is missing, so a
//! serialized document never contains a dangling reference.

use azdoc_common::{DocError, Result};
use serde::Serialize;

/// Page layer that top-level vertices hang off
pub const LAYER_ID: &str = "1";
const ROOT_ID: &str = "0";

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// Page root or layer
    Root,
    Vertex(Geometry),
    Edge { source: String, target: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: String,
    pub value: String,
    pub style: String,
    pub parent: Option<String>,
    pub kind: CellKind,
}

impl Cell {
    pub fn is_vertex(&self) -> bool {
        matches!(self.kind, CellKind::Vertex(_))
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.kind, CellKind::Edge { .. })
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            CellKind::Vertex(geometry) => Some(geometry),
            _ => None,
        }
    }
}

/// One diagram document
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    name: String,
    cells: Vec<Cell>,
}

impl Diagram {
    pub fn new(name: impl Into<String>) -> Self {
        let root = |id: &str, parent: Option<&str>| Cell {
            id: id.to_string(),
            value: String::new(),
            style: String::new(),
            parent: parent.map(str::to_string),
            kind: CellKind::Root,
        };

        Self {
            name: name.into(),
            cells: vec![root(ROOT_ID, None), root(LAYER_ID, Some(ROOT_ID))],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cell(id).is_some()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| cell.is_vertex())
    }

    pub fn edges(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| cell.is_edge())
    }

    /// Vertices whose parent is `parent`
    pub fn children_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a Cell> + 'a {
        self.vertices()
            .filter(move |cell| cell.parent.as_deref() == Some(parent))
    }

    /// Vertices whose style matches `style` exactly
    pub fn vertices_styled<'a>(&'a self, style: &'a str) -> impl Iterator<Item = &'a Cell> + 'a {
        self.vertices().filter(move |cell| cell.style == style)
    }

    /// Add a vertex under `parent` and return its cell ID (`cell-<key>`)
    ///
    /// Falls back to the page layer when `parent` is unknown.
    pub fn add_vertex(
        &mut self,
        key: &str,
        value: impl Into<String>,
        style: impl Into<String>,
        parent: &str,
        geometry: Geometry,
    ) -> String {
        let id = format!("cell-{}", key);
        let parent = if self.contains(parent) {
            parent
        } else {
            log::debug!("Unknown parent {} for {}, using page layer", parent, id);
            LAYER_ID
        };

        self.cells.push(Cell {
            id: id.clone(),
            value: value.into(),
            style: style.into(),
            parent: Some(parent.to_string()),
            kind: CellKind::Vertex(geometry),
        });
        id
    }

    /// Add an edge between two existing cells (`cell-edge-<key>`)
    ///
    /// Returns `None`, adding nothing, when either endpoint is missing.
    pub fn add_edge(
        &mut self,
        key: &str,
        label: impl Into<String>,
        source: &str,
        target: &str,
        style: impl Into<String>,
    ) -> Option<String> {
        if !self.contains(source) || !self.contains(target) {
            log::debug!("Dropping edge {}: {} -> {} has a missing end", key, source, target);
            return None;
        }

        let id = format!("cell-edge-{}", key);
        self.cells.push(Cell {
            id: id.clone(),
            value: label.into(),
            style: style.into(),
            parent: Some(LAYER_ID.to_string()),
            kind: CellKind::Edge {
                source: source.to_string(),
                target: target.to_string(),
            },
        });
        Some(id)
    }

    /// Serialize to draw.io XML
    pub fn to_xml(&self) -> Result<String> {
        let file = MxFile {
            host: "app.diagrams.net",
            file_type: "device",
            version: "21.6.5",
            diagram: MxDiagram {
                name: &self.name,
                id: "diagram-1",
                model: MxGraphModel {
                    root: MxRoot {
                        cells: self.cells.iter().map(MxCell::from).collect(),
                    },
                },
            },
        };

        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 2);
        file.serialize(serializer).map_err(|e| {
            DocError::Render(format!("Failed to serialize diagram {}: {}", self.name, e))
        })?;

        Ok(format!("{}{}\n", XML_HEADER, body))
    }
}

#[derive(Serialize)]
#[serde(rename = "mxfile")]
struct MxFile<'a> {
    #[serde(rename = "@host")]
    host: &'static str,
    #[serde(rename = "@type")]
    file_type: &'static str,
    #[serde(rename = "@version")]
    version: &'static str,
    diagram: MxDiagram<'a>,
}

#[derive(Serialize)]
struct MxDiagram<'a> {
    #[serde(rename = "@name")]
    name: &'a str,
    #[serde(rename = "@id")]
    id: &'static str,
    #[serde(rename = "mxGraphModel")]
    model: MxGraphModel<'a>,
}

#[derive(Serialize)]
struct MxGraphModel<'a> {
    root: MxRoot<'a>,
}

#[derive(Serialize)]
struct MxRoot<'a> {
    #[serde(rename = "mxCell")]
    cells: Vec<MxCell<'a>>,
}

#[derive(Serialize)]
struct MxCell<'a> {
    #[serde(rename = "@id")]
    id: &'a str,
    #[serde(rename = "@value", skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(rename = "@style", skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
    #[serde(rename = "@vertex", skip_serializing_if = "Option::is_none")]
    vertex: Option<&'static str>,
    #[serde(rename = "@edge", skip_serializing_if = "Option::is_none")]
    edge: Option<&'static str>,
    #[serde(rename = "@source", skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    #[serde(rename = "@target", skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
    #[serde(rename = "@parent", skip_serializing_if = "Option::is_none")]
    parent: Option<&'a str>,
    #[serde(rename = "mxGeometry", skip_serializing_if = "Option::is_none")]
    geometry: Option<MxGeometry>,
}

#[derive(Serialize)]
struct MxGeometry {
    #[serde(rename = "@x", skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(rename = "@y", skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(rename = "@width", skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(rename = "@height", skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(rename = "@relative", skip_serializing_if = "Option::is_none")]
    relative: Option<&'static str>,
    #[serde(rename = "@as")]
    role: &'static str,
}

impl<'a> From<&'a Cell> for MxCell<'a> {
    fn from(cell: &'a Cell) -> Self {
        let non_empty = |text: &'a str| Some(text).filter(|t| !t.is_empty());
        let mut mx = MxCell {
            id: &cell.id,
            value: non_empty(cell.value.as_str()),
            style: non_empty(cell.style.as_str()),
            vertex: None,
            edge: None,
            source: None,
            target: None,
            parent: cell.parent.as_deref(),
            geometry: None,
        };

        match &cell.kind {
            CellKind::Root => {}
            CellKind::Vertex(geometry) => {
                mx.vertex = Some("1");
                mx.geometry = Some(MxGeometry {
                    x: Some(geometry.x),
                    y: Some(geometry.y),
                    width: Some(geometry.width),
                    height: Some(geometry.height),
                    relative: None,
                    role: "geometry",
                });
            }
            CellKind::Edge { source, target } => {
                mx.edge = Some("1");
                mx.source = Some(source.as_str());
                mx.target = Some(target.as_str());
                mx.geometry = Some(MxGeometry {
                    x: None,
                    y: None,
                    width: None,
                    height: None,
                    relative: Some("1"),
                    role: "geometry",
                });
            }
        }
        mx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_diagram_has_page_root() {
        let diagram = Diagram::new("hub");
        let ids: Vec<&str> = diagram.cells().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1"]);
        assert_eq!(diagram.vertices().count(), 0);
    }

    #[test]
    fn test_edge_with_missing_end_is_dropped() {
        let mut diagram = Diagram::new("hub");
        let vm = diagram.add_vertex("vm-0", "vm", "", LAYER_ID, Geometry::new(0.0, 0.0, 50.0, 50.0));

        assert!(diagram.add_edge("e", "x", &vm, "cell-missing", "").is_none());
        assert_eq!(
            diagram.add_edge("e", "self", &vm, &vm, "").as_deref(),
            Some("cell-edge-e")
        );
        assert_eq!(diagram.edges().count(), 1);
    }

    #[test]
    fn test_unknown_parent_falls_back_to_layer() {
        let mut diagram = Diagram::new("hub");
        let id = diagram.add_vertex("a", "a", "", "cell-nope", Geometry::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(diagram.cell(&id).and_then(|c| c.parent.as_deref()), Some(LAYER_ID));
    }

    #[test]
    fn test_xml_shape() {
        let mut diagram = Diagram::new("hub & spoke");
        let vnet = diagram.add_vertex(
            "vnet",
            "Virtual Network: hub",
            "rounded=1;",
            LAYER_ID,
            Geometry::new(50.0, 50.0, 1100.0, 600.0),
        );
        let subnet = diagram.add_vertex("subnet-0", "apps", "", &vnet, Geometry::new(50.0, 70.0, 350.0, 120.0));
        diagram.add_edge("0", "contains", &vnet, &subnet, "endArrow=classic;");

        let xml = diagram.to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<mxfile"));
        assert!(xml.contains("host=\"app.diagrams.net\""));
        assert!(xml.contains("name=\"hub &amp; spoke\""));
        assert!(xml.contains("<mxCell id=\"0\"/>"));
        assert!(xml.contains("<mxCell id=\"1\" parent=\"0\"/>"));
        assert!(xml.contains("id=\"cell-subnet-0\""));
        assert!(xml.contains("parent=\"cell-vnet\""));
        assert!(xml.contains("source=\"cell-vnet\""));
        assert!(xml.contains("as=\"geometry\""));
    }
}
