//! Diagram generation and file output

use crate::drawio::Diagram;
use crate::layout::{self, Augmentation};
use azdoc_common::{resource_types, DocError, Resource, ResourceStore, Result};
use azdoc_insight::InsightService;
use log::{info, warn};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const OVERVIEW_FILE: &str = "Overview.drawio";

/// Outcome of writing every diagram; one failure never stops the rest
#[derive(Debug, Default)]
pub struct DiagramReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<DocError>,
}

impl DiagramReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds one diagram per VNet plus an overview and writes them to disk
pub struct DiagramRenderer<'a> {
    output_dir: PathBuf,
    insight: Option<&'a InsightService>,
}

impl<'a> DiagramRenderer<'a> {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            insight: None,
        }
    }

    /// Use the insight service for connection and layout suggestions
    pub fn with_insight(mut self, service: &'a InsightService) -> Self {
        self.insight = Some(service);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Every diagram with its file name, VNets first, overview last
    pub fn build(&self, store: &ResourceStore) -> Vec<(String, Diagram)> {
        let connections = self.discover_connections(store);
        let mut used_names = HashSet::new();
        let mut diagrams = Vec::new();

        for vnet in store.of_type(resource_types::VIRTUAL_NETWORK) {
            let group = store.in_group(&vnet.resource_group);
            let augmentation = Augmentation {
                connections: connections.clone(),
                layout: self.suggest_layout(vnet, &group),
            };

            let diagram = layout::vnet_diagram(vnet, &group, &augmentation);
            let file_name = unique_file_name(&vnet.name, &mut used_names);
            diagrams.push((file_name, diagram));
        }

        diagrams.push((OVERVIEW_FILE.to_string(), layout::overview_diagram(store)));
        diagrams
    }

    /// Build and write every diagram, recording failures per file
    pub fn render(&self, store: &ResourceStore) -> DiagramReport {
        let mut report = DiagramReport::default();
        let diagrams = self.build(store);

        if let Err(e) = fs::create_dir_all(&self.output_dir) {
            warn!("Cannot create {}: {}", self.output_dir.display(), e);
            for (file_name, _) in &diagrams {
                report.failures.push(DocError::artifact(
                    self.output_dir.join(file_name),
                    io::Error::new(e.kind(), e.to_string()),
                ));
            }
            return report;
        }

        for (file_name, diagram) in &diagrams {
            let path = self.output_dir.join(file_name);
            match write_diagram(&path, diagram) {
                Ok(()) => {
                    info!("Wrote {}", path.display());
                    report.written.push(path);
                }
                Err(e) => {
                    warn!("{}", e);
                    report.failures.push(e);
                }
            }
        }

        report
    }

    fn discover_connections(&self, store: &ResourceStore) -> Vec<azdoc_insight::ConnectionSuggestion> {
        let Some(service) = self.insight else {
            return Vec::new();
        };

        let resources: Vec<&Resource> = store.iter().collect();
        match service.discover_connections(&resources) {
            Ok(connections) => {
                info!("Insight service suggested {} connections", connections.len());
                connections
            }
            Err(e) => {
                warn!("Connection discovery failed, using naming heuristics: {}", e);
                Vec::new()
            }
        }
    }

    fn suggest_layout(
        &self,
        vnet: &Resource,
        group: &[&Resource],
    ) -> Vec<azdoc_insight::LayoutSuggestion> {
        let Some(service) = self.insight else {
            return Vec::new();
        };

        let workloads = layout::workloads(group);
        if workloads.is_empty() {
            return Vec::new();
        }

        match service.suggest_layout(&workloads, &layout::extract_subnets(vnet)) {
            Ok(hints) => hints,
            Err(e) => {
                warn!("Layout suggestions for {} failed: {}", vnet.name, e);
                Vec::new()
            }
        }
    }
}

fn write_diagram(path: &Path, diagram: &Diagram) -> Result<()> {
    let xml = diagram.to_xml()?;
    fs::write(path, xml).map_err(|e| DocError::artifact(path, e))
}

/// File-system safe `<name>.drawio`, suffixed when a name repeats
fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = match sanitized.trim_matches('.') {
        "" => "vnet",
        trimmed => trimmed,
    };

    let mut candidate = format!("{}.drawio", stem);
    let mut counter = 2;
    while used.contains(&candidate.to_ascii_lowercase()) || candidate.eq_ignore_ascii_case(OVERVIEW_FILE) {
        candidate = format!("{}-{}.drawio", stem, counter);
        counter += 1;
    }
    used.insert(candidate.to_ascii_lowercase());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_file_name() {
        let mut used = HashSet::new();
        assert_eq!(unique_file_name("vnet-hub", &mut used), "vnet-hub.drawio");
        assert_eq!(unique_file_name("VNET-HUB", &mut used), "VNET-HUB-2.drawio");
        assert_eq!(unique_file_name("a/b c", &mut used), "a_b_c.drawio");
        assert_eq!(unique_file_name("..", &mut used), "vnet.drawio");
        assert_eq!(unique_file_name("Overview", &mut used), "Overview-2.drawio");
    }
}
