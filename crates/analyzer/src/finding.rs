//! Finding records produced by the analyzers

use azdoc_common::Severity;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// One detected issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    /// Analyzer-scoped classification, e.g. "NetworkSecurity"
    pub category: String,
    /// Affected resource names
    pub resources: Vec<String>,
    pub issue: String,
    pub impact: String,
    pub remediation: String,
}

pub type SecurityFinding = Finding;
pub type ComplianceFinding = Finding;
pub type TagFinding = Finding;

impl Finding {
    pub fn new(severity: Severity, category: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            resources: Vec::new(),
            issue: issue.into(),
            impact: String::new(),
            remediation: String::new(),
        }
    }

    pub fn resource(mut self, name: impl Into<String>) -> Self {
        self.resources.push(name.into());
        self
    }

    pub fn resources<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn impact(mut self, impact: impl Into<String>) -> Self {
        self.impact = impact.into();
        self
    }

    pub fn remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    /// Affected resources joined for display
    pub fn resource_list(&self) -> String {
        self.resources.join(", ")
    }
}

/// A cost finding with monthly estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostFinding {
    #[serde(flatten)]
    pub finding: Finding,
    pub current_cost: f64,
    pub potential_savings: f64,
}

impl CostFinding {
    pub fn new(finding: Finding, current_cost: f64, potential_savings: f64) -> Self {
        Self {
            finding,
            current_cost,
            potential_savings,
        }
    }
}

impl Deref for CostFinding {
    type Target = Finding;

    fn deref(&self) -> &Finding {
        &self.finding
    }
}
