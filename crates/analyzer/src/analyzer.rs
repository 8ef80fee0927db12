//! Core analysis orchestration

use crate::compliance::{ComplianceAnalysis, ComplianceAnalyzer};
use crate::cost::{CostAnalysis, CostAnalyzer, CostModel};
use crate::priority::{self, PriorityAction};
use crate::scoring::{Analyzer, ScoreLine, ScoredAnalysis};
use crate::security::{SecurityAnalysis, SecurityAnalyzer};
use crate::tagging::{TaggingAnalysis, TaggingAnalyzer};
use azdoc_common::{DocConfig, DocError, ResourceStore, Result};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Runs all four analyzers with one set of options
#[derive(Debug, Clone, Default)]
pub struct SubscriptionAnalyzer {
    security: SecurityAnalyzer,
    cost: CostAnalyzer,
    compliance: ComplianceAnalyzer,
    tagging: TaggingAnalyzer,
}

impl SubscriptionAnalyzer {
    pub fn new(required_tags: Vec<String>, cost_model: CostModel) -> Self {
        Self {
            security: SecurityAnalyzer::new(),
            cost: CostAnalyzer::new(cost_model),
            compliance: ComplianceAnalyzer::new(),
            tagging: TaggingAnalyzer::new(required_tags),
        }
    }

    /// Analyzer configured from `azdoc.yaml` settings
    pub fn from_config(config: &DocConfig) -> Self {
        Self::new(config.required_tags.clone(), CostModel::default())
    }

    /// Run the full analysis pipeline
    pub fn analyze(&self, store: &ResourceStore) -> AnalysisReport {
        info!("Analyzing {} resources", store.len());

        let security = self.security.analyze(store);
        info!("Security: score {} with {} findings", security.score, security.findings.len());

        let cost = self.cost.analyze(store);
        info!(
            "Cost: ${:.2}/month, ${:.2} potential savings",
            cost.total_monthly_cost, cost.potential_monthly_savings
        );

        let compliance = self.compliance.analyze(store);
        info!(
            "Compliance: score {} (backup {}, monitoring {})",
            compliance.score, compliance.backup_coverage, compliance.monitoring_coverage
        );

        let tagging = self.tagging.analyze(store);
        info!("Tagging: {:.1}% compliant", tagging.compliance_rate);

        let priorities = priority::aggregate(&security, &cost, &tagging, &compliance);

        AnalysisReport {
            security,
            cost,
            compliance,
            tagging,
            priorities,
        }
    }
}

/// Complete analysis result for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub security: SecurityAnalysis,
    pub cost: CostAnalysis,
    pub compliance: ComplianceAnalysis,
    pub tagging: TaggingAnalysis,
    pub priorities: Vec<PriorityAction>,
}

impl AnalysisReport {
    /// Scorecard rows in document order
    pub fn scorecard(&self) -> Vec<ScoreLine> {
        vec![
            self.security.score_line(),
            self.cost.score_line(),
            self.tagging.score_line(),
            self.compliance.score_line(),
        ]
    }

    pub fn total_findings(&self) -> usize {
        self.scorecard().iter().map(|line| line.findings).sum()
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| DocError::artifact(path, e))
    }
}

/// Analyze a store with the given configuration
pub fn analyze(store: &ResourceStore, config: &DocConfig) -> AnalysisReport {
    SubscriptionAnalyzer::from_config(config).analyze(store)
}
