//! Markdown document rendering
//!
//! Section order is fixed: header and scorecard, optional architecture
//! narrative, priority actions, security (plus optional AI insights), cost
//! (plus optional AI insights), tagging, compliance. Narrative blocks are
//! purely additive; without them the deterministic content is identical.

use crate::templates::{self, DOCUMENT};
use azdoc_analyzer::{
    AnalysisReport, ComplianceFinding, CostFinding, Finding, ScoreLine, ScoredAnalysis,
    TagFinding,
};
use azdoc_common::{resource_types, DocError, ResourceStore, Result};
use azdoc_insight::{ArchitectureDescription, CostInsight, InsightService, SecurityInsight};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

/// Longest list rendered before a "...and N more" marker
pub const DISPLAY_CAP: usize = 10;

/// Optional text-generation output merged into the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Narrative {
    pub architecture: Option<ArchitectureDescription>,
    pub security_insights: Vec<SecurityInsight>,
    pub cost_insights: Vec<CostInsight>,
}

impl Narrative {
    /// Ask the service for every narrative section; failed sections stay empty
    pub fn gather(service: &InsightService, store: &ResourceStore, report: &AnalysisReport) -> Self {
        let mut narrative = Narrative::default();

        match service.describe_architecture(store) {
            Ok(description) => narrative.architecture = Some(description),
            Err(e) => warn!("Architecture narrative skipped: {}", e),
        }

        if !report.security.findings.is_empty() {
            match service.security_insights(&report.security.findings) {
                Ok(insights) => narrative.security_insights = insights,
                Err(e) => warn!("Security insights skipped: {}", e),
            }
        }

        if !report.cost.findings.is_empty() {
            match service.cost_insights(&report.cost.findings) {
                Ok(insights) => narrative.cost_insights = insights,
                Err(e) => warn!("Cost insights skipped: {}", e),
            }
        }

        narrative
    }

    pub fn is_empty(&self) -> bool {
        self.architecture.is_none()
            && self.security_insights.is_empty()
            && self.cost_insights.is_empty()
    }
}

/// Renders the subscription document through Tera templates
pub struct MarkdownRenderer {
    tera: Tera,
    subscription_name: String,
}

impl MarkdownRenderer {
    pub fn new(subscription_name: impl Into<String>) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self {
            tera,
            subscription_name: subscription_name.into(),
        })
    }

    /// Render with the current time in the header
    pub fn render(
        &self,
        store: &ResourceStore,
        report: &AnalysisReport,
        narrative: Option<&Narrative>,
    ) -> Result<String> {
        self.render_at(store, report, narrative, Utc::now())
    }

    pub fn render_at(
        &self,
        store: &ResourceStore,
        report: &AnalysisReport,
        narrative: Option<&Narrative>,
        generated_at: DateTime<Utc>,
    ) -> Result<String> {
        let empty = Narrative::default();
        let narrative = narrative.unwrap_or(&empty);
        let document = DocumentView::new(&self.subscription_name, store, report, narrative, generated_at);

        let context = Context::from_serialize(&document)
            .map_err(|e| DocError::Render(format!("Template context error: {}", e)))?;
        let rendered = self
            .tera
            .render(DOCUMENT, &context)
            .map_err(|e| DocError::Render(format!("Template error: {:?}", e)))?;

        Ok(collapse_blank_lines(&rendered))
    }

    /// Render and write the document to `path`, creating parent directories
    pub fn write(
        &self,
        path: &Path,
        store: &ResourceStore,
        report: &AnalysisReport,
        narrative: Option<&Narrative>,
    ) -> Result<()> {
        let rendered = self.render(store, report, narrative)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DocError::artifact(path, e))?;
        }
        fs::write(path, rendered).map_err(|e| DocError::artifact(path, e))?;

        info!("Wrote {}", path.display());
        Ok(())
    }
}

/// Squeeze runs of blank lines left by template control blocks
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }

    let trimmed = out.trim();
    format!("{}\n", trimmed)
}

#[derive(Serialize)]
struct DocumentView<'a> {
    title: String,
    subscription: &'a str,
    generated_at: String,
    total_resources: usize,
    resource_groups: usize,
    total_findings: usize,
    scorecard: Vec<ScoreLine>,
    inventory: Vec<InventoryRow>,
    architecture: Option<&'a ArchitectureDescription>,
    priorities: &'a [azdoc_analyzer::PriorityAction],
    security: SecurityView<'a>,
    security_insights: &'a [SecurityInsight],
    cost: CostView<'a>,
    cost_insights: &'a [CostInsight],
    cost_insight_savings: f64,
    tagging: TaggingView<'a>,
    compliance: ComplianceView<'a>,
}

#[derive(Serialize)]
struct InventoryRow {
    label: String,
    count: usize,
}

/// Findings of one category, capped for display
#[derive(Serialize)]
struct FindingGroup<'a, T> {
    category: &'a str,
    total: usize,
    shown: Vec<&'a T>,
    hidden: usize,
    savings: f64,
}

#[derive(Serialize)]
struct SecurityView<'a> {
    score: u8,
    health: String,
    critical: usize,
    high: usize,
    medium: usize,
    low: usize,
    groups: Vec<FindingGroup<'a, Finding>>,
}

#[derive(Serialize)]
struct CostView<'a> {
    score: u8,
    health: String,
    total: f64,
    savings: f64,
    savings_percentage: f64,
    groups: Vec<FindingGroup<'a, CostFinding>>,
}

#[derive(Serialize)]
struct TagFindingView<'a> {
    finding: &'a TagFinding,
    shown: &'a [String],
    hidden: usize,
}

#[derive(Serialize)]
struct TaggingView<'a> {
    score: u8,
    health: String,
    compliance_rate: f64,
    tagged: usize,
    total: usize,
    required_tags: &'a [String],
    findings: Vec<TagFindingView<'a>>,
}

#[derive(Serialize)]
struct ComplianceView<'a> {
    score: u8,
    health: String,
    backup: String,
    monitoring: String,
    groups: Vec<FindingGroup<'a, ComplianceFinding>>,
}

impl<'a> DocumentView<'a> {
    fn new(
        subscription: &'a str,
        store: &ResourceStore,
        report: &'a AnalysisReport,
        narrative: &'a Narrative,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let resource_groups = store
            .group_by_resource_group()
            .keys()
            .filter(|group| !group.is_empty())
            .count();

        let security = &report.security;
        let cost = &report.cost;
        let tagging = &report.tagging;
        let compliance = &report.compliance;

        Self {
            title: format!("{} - Azure Documentation", subscription),
            subscription,
            generated_at: generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            total_resources: store.len(),
            resource_groups,
            total_findings: report.total_findings(),
            scorecard: report.scorecard(),
            inventory: inventory(store),
            architecture: narrative.architecture.as_ref(),
            priorities: &report.priorities,
            security: SecurityView {
                score: security.score,
                health: security.health().to_string(),
                critical: security.critical_count,
                high: security.high_count,
                medium: security.medium_count,
                low: security.low_count,
                groups: group_by_category(&security.findings, |_| 0.0),
            },
            security_insights: &narrative.security_insights,
            cost: CostView {
                score: cost.score,
                health: cost.health().to_string(),
                total: cost.total_monthly_cost,
                savings: cost.potential_monthly_savings,
                savings_percentage: cost.savings_percentage(),
                groups: group_by_category(&cost.findings, |f| f.potential_savings),
            },
            cost_insights: &narrative.cost_insights,
            cost_insight_savings: narrative
                .cost_insights
                .iter()
                .map(|insight| insight.estimated_savings)
                .sum(),
            tagging: TaggingView {
                score: tagging.score,
                health: tagging.health().to_string(),
                compliance_rate: tagging.compliance_rate,
                tagged: tagging.tagged_resources,
                total: tagging.total_resources,
                required_tags: &tagging.required_tags,
                findings: tagging
                    .findings
                    .iter()
                    .map(|finding| {
                        let shown = &finding.resources[..finding.resources.len().min(DISPLAY_CAP)];
                        TagFindingView {
                            finding,
                            shown,
                            hidden: finding.resources.len() - shown.len(),
                        }
                    })
                    .collect(),
            },
            compliance: ComplianceView {
                score: compliance.score,
                health: compliance.health().to_string(),
                backup: compliance.backup_coverage.to_string(),
                monitoring: compliance.monitoring_coverage.to_string(),
                groups: group_by_category(&compliance.findings, |_| 0.0),
            },
        }
    }
}

/// Resource count per type, largest first
fn inventory(store: &ResourceStore) -> Vec<InventoryRow> {
    let mut rows: Vec<InventoryRow> = store
        .type_counts()
        .into_iter()
        .filter(|(resource_type, _)| !resource_type.is_empty())
        .map(|(resource_type, count)| InventoryRow {
            label: resource_types::display_name(&resource_type),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    rows
}

/// Anything grouped under a finding category
trait Categorized {
    fn category(&self) -> &str;
}

impl Categorized for Finding {
    fn category(&self) -> &str {
        &self.category
    }
}

impl Categorized for CostFinding {
    fn category(&self) -> &str {
        &self.finding.category
    }
}

/// Group findings by category in first-seen order
fn group_by_category<'a, T: Categorized>(
    findings: &'a [T],
    savings: impl Fn(&T) -> f64,
) -> Vec<FindingGroup<'a, T>> {
    let mut groups: Vec<(&'a str, Vec<&'a T>)> = Vec::new();
    for finding in findings {
        let category = finding.category();
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, members)) => members.push(finding),
            None => groups.push((category, vec![finding])),
        }
    }

    groups
        .into_iter()
        .map(|(category, members)| {
            let total = members.len();
            let group_savings: f64 = members.iter().map(|f| savings(f)).sum();
            FindingGroup {
                category,
                total,
                shown: members.into_iter().take(DISPLAY_CAP).collect(),
                hidden: total.saturating_sub(DISPLAY_CAP),
                savings: group_savings,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb  \n\n"), "a\n\nb\n");
        assert_eq!(collapse_blank_lines("\n\nx"), "x\n");
    }

    #[test]
    fn test_group_by_category_keeps_first_seen_order_and_caps() {
        use azdoc_common::Severity;

        let mut findings = vec![Finding::new(Severity::Low, "NSG", "first")];
        for i in 0..12 {
            findings.push(Finding::new(Severity::High, "Encryption", format!("e{}", i)));
        }
        findings.push(Finding::new(Severity::Low, "NSG", "second"));

        let groups = group_by_category(&findings, |_| 1.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "NSG");
        assert_eq!(groups[0].total, 2);
        assert_eq!(groups[1].shown.len(), DISPLAY_CAP);
        assert_eq!(groups[1].hidden, 2);
        assert_eq!(groups[1].savings, 12.0);
    }
}
