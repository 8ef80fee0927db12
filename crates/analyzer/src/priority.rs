//! Cross-analyzer priority action list

use crate::compliance::ComplianceAnalysis;
use crate::cost::CostAnalysis;
use crate::security::SecurityAnalysis;
use crate::tagging::TaggingAnalysis;
use azdoc_common::Severity;
use serde::Serialize;

/// Cost findings must save strictly more than this per month
pub const COST_SAVINGS_THRESHOLD: f64 = 20.0;

/// Tag findings must affect strictly more resources than this
pub const TAG_RESOURCE_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionSource {
    Security,
    Cost,
    Tagging,
    Compliance,
}

impl ActionSource {
    pub fn icon(&self) -> &'static str {
        match self {
            ActionSource::Security => "🔴",
            ActionSource::Cost => "💰",
            ActionSource::Tagging => "🏷️",
            ActionSource::Compliance => "⚠️",
        }
    }
}

/// One entry of the merged action list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityAction {
    pub source: ActionSource,
    pub icon: &'static str,
    pub severity: Severity,
    pub title: String,
    pub impact: String,
}

impl PriorityAction {
    fn new(source: ActionSource, severity: Severity, title: String, impact: String) -> Self {
        Self {
            source,
            icon: source.icon(),
            severity,
            title,
            impact,
        }
    }
}

/// Merge the qualifying findings of every analyzer, most severe first
pub fn aggregate(
    security: &SecurityAnalysis,
    cost: &CostAnalysis,
    tagging: &TaggingAnalysis,
    compliance: &ComplianceAnalysis,
) -> Vec<PriorityAction> {
    let mut actions = Vec::new();

    for finding in &security.findings {
        if finding.severity >= Severity::High {
            actions.push(PriorityAction::new(
                ActionSource::Security,
                finding.severity,
                format!("{} ({})", finding.issue, finding.resource_list()),
                finding.impact.clone(),
            ));
        }
    }

    for finding in &cost.findings {
        if finding.potential_savings > COST_SAVINGS_THRESHOLD {
            actions.push(PriorityAction::new(
                ActionSource::Cost,
                Severity::High,
                format!("{} ({})", finding.issue, finding.resource_list()),
                format!("Save ${:.0}/month", finding.potential_savings),
            ));
        }
    }

    for finding in &tagging.findings {
        if finding.severity == Severity::High && finding.resources.len() > TAG_RESOURCE_THRESHOLD {
            actions.push(PriorityAction::new(
                ActionSource::Tagging,
                finding.severity,
                finding.issue.clone(),
                finding.impact.clone(),
            ));
        }
    }

    for finding in &compliance.findings {
        if finding.severity == Severity::High {
            actions.push(PriorityAction::new(
                ActionSource::Compliance,
                finding.severity,
                finding.issue.clone(),
                finding.impact.clone(),
            ));
        }
    }

    // stable: ties keep analyzer order
    actions.sort_by(|a, b| b.severity.cmp(&a.severity));
    actions
}
