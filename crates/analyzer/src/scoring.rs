//! Health scoring shared by every analyzer
//!
//! Each analyzer keeps its own scoring policy, but all of them report a
//! 0-100 score, a four-step health level, and a finding count through the
//! [`ScoredAnalysis`] trait so callers can render them uniformly.

use azdoc_common::{ResourceStore, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runs one concern's rules over a resource snapshot
pub trait Analyzer {
    type Output: ScoredAnalysis;

    /// Scan the store; never fails, malformed records yield no findings
    fn analyze(&self, store: &ResourceStore) -> Self::Output;
}

/// Common surface of every analysis result
pub trait ScoredAnalysis {
    /// Section name, e.g. "Security"
    fn name(&self) -> &'static str;

    /// Score in `0..=100`, higher is better
    fn score(&self) -> u8;

    fn finding_count(&self) -> usize;

    /// Vocabulary for the two lower health levels
    fn health_labels(&self) -> HealthLabels {
        HealthLabels::default()
    }

    fn health(&self) -> Health {
        Health::from_score(self.score(), self.health_labels())
    }

    /// One row of the scorecard
    fn score_line(&self) -> ScoreLine {
        let health = self.health();
        ScoreLine {
            name: self.name().to_string(),
            score: self.score(),
            level: health.level,
            label: health.label.to_string(),
            icon: health.icon().to_string(),
            findings: self.finding_count(),
        }
    }
}

/// Health buckets shared by every analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthLevel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthLevel {
    /// Thresholds: >=90 excellent, >=75 good, >=50 fair
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => HealthLevel::Excellent,
            75..=89 => HealthLevel::Good,
            50..=74 => HealthLevel::Fair,
            _ => HealthLevel::Poor,
        }
    }
}

/// Labels used for the fair and poor levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthLabels {
    pub fair: &'static str,
    pub poor: &'static str,
}

impl Default for HealthLabels {
    fn default() -> Self {
        Self {
            fair: "NEEDS ATTENTION",
            poor: "CRITICAL",
        }
    }
}

/// A health level with its display label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub level: HealthLevel,
    pub label: &'static str,
}

impl Health {
    pub fn from_score(score: u8, labels: HealthLabels) -> Self {
        let level = HealthLevel::from_score(score);
        let label = match level {
            HealthLevel::Excellent => "EXCELLENT",
            HealthLevel::Good => "GOOD",
            HealthLevel::Fair => labels.fair,
            HealthLevel::Poor => labels.poor,
        };
        Self { level, label }
    }

    pub fn icon(&self) -> &'static str {
        match self.level {
            HealthLevel::Excellent | HealthLevel::Good => "✅",
            HealthLevel::Fair => "⚠️",
            HealthLevel::Poor => "🔴",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.label)
    }
}

/// Rendered scorecard row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreLine {
    pub name: String,
    pub score: u8,
    pub level: HealthLevel,
    pub label: String,
    pub icon: String,
    pub findings: usize,
}

/// Points deducted per finding, by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityPenalties {
    pub critical: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

impl SeverityPenalties {
    pub const SECURITY: Self = Self {
        critical: 20,
        high: 10,
        medium: 5,
        low: 2,
    };

    pub const COMPLIANCE: Self = Self {
        critical: 15,
        high: 10,
        medium: 5,
        low: 2,
    };

    /// Tag findings are never critical; treated like high if one appears
    pub const TAGGING: Self = Self {
        critical: 10,
        high: 10,
        medium: 5,
        low: 2,
    };

    pub fn penalty(&self, severity: Severity) -> i64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self, severities: impl IntoIterator<Item = Severity>) -> i64 {
        severities.into_iter().map(|s| self.penalty(s)).sum()
    }
}

/// Clamp a raw score into `0..=100`
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Percentage truncated toward zero, as scores are integers
pub fn truncate(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc() as i64
    } else {
        0
    }
}
