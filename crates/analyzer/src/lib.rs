//! Resource analysis for azdoc
//!
//! Scans a [`ResourceStore`](azdoc_common::ResourceStore) snapshot with four
//! independent analyzers (security, cost, compliance, tagging), merges their
//! urgent findings into a priority list, and builds the network topology
//! graph.
//!
//! # Examples
//!
//! ```no_run
//! use azdoc_analyzer::SubscriptionAnalyzer;
//! use azdoc_common::{DocConfig, ResourceStore};
//! use std::path::Path;
//!
//! let store = ResourceStore::load(Path::new("resources.json")).expect("Load failed");
//! let report = SubscriptionAnalyzer::from_config(&DocConfig::default()).analyze(&store);
//!
//! for line in report.scorecard() {
//!     println!("{}: {}/100 {} {}", line.name, line.score, line.icon, line.label);
//! }
//! ```

mod analyzer;
pub mod compliance;
pub mod cost;
pub mod finding;
pub mod priority;
pub mod scoring;
pub mod security;
pub mod tagging;
pub mod topology;

pub use analyzer::{analyze, AnalysisReport, SubscriptionAnalyzer};
pub use compliance::{ComplianceAnalysis, ComplianceAnalyzer, Coverage};
pub use cost::{CostAnalysis, CostAnalyzer, CostModel};
pub use finding::{ComplianceFinding, CostFinding, Finding, SecurityFinding, TagFinding};
pub use priority::{ActionSource, PriorityAction};
pub use scoring::{Analyzer, Health, HealthLevel, ScoreLine, ScoredAnalysis};
pub use security::{SecurityAnalysis, SecurityAnalyzer};
pub use tagging::{TaggingAnalysis, TaggingAnalyzer};
pub use topology::{EdgeKind, NodeKind, Topology, TopologyBuilder, TopologyEdge, TopologyNode};
