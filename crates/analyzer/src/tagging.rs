//! Tag governance analysis

use crate::finding::{Finding, TagFinding};
use crate::scoring::{clamp_score, truncate, Analyzer, HealthLabels, ScoredAnalysis, SeverityPenalties};
use azdoc_common::config::default_required_tags;
use azdoc_common::resource_types::{ACTION_GROUP, LOG_ANALYTICS_WORKSPACE, NETWORK_WATCHER};
use azdoc_common::{Resource, ResourceStore, Severity};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Platform-managed types excluded from tag accounting
pub const SYSTEM_TYPES: [&str; 3] = [NETWORK_WATCHER, ACTION_GROUP, LOG_ANALYTICS_WORKSPACE];

/// More distinct environment values than this is a finding
pub const ENVIRONMENT_VALUE_LIMIT: usize = 5;

/// Logical tag keys whose absence is high severity
const CRITICAL_KEYS: [&str; 2] = ["owner", "costcenter"];

/// Collapse a tag key to its logical form: `Cost-Center` -> `costcenter`
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_system_resource(resource: &Resource) -> bool {
    SYSTEM_TYPES.contains(&resource.type_key().as_str())
}

#[derive(Debug, Clone)]
pub struct TaggingAnalyzer {
    required_tags: Vec<String>,
}

impl Default for TaggingAnalyzer {
    fn default() -> Self {
        Self::new(default_required_tags())
    }
}

impl TaggingAnalyzer {
    pub fn new(required_tags: Vec<String>) -> Self {
        Self { required_tags }
    }

    pub fn required_tags(&self) -> &[String] {
        &self.required_tags
    }

    fn missing_tags(&self, eligible: &[&Resource], findings: &mut Vec<TagFinding>) {
        let mut missing: Vec<Vec<&str>> = vec![Vec::new(); self.required_tags.len()];

        for resource in eligible {
            let tags = resource.tags();
            for (index, required) in self.required_tags.iter().enumerate() {
                let present = tags.iter().any(|(key, _)| key.eq_ignore_ascii_case(required));
                if !present {
                    missing[index].push(resource.name.as_str());
                }
            }
        }

        for (required, resources) in self.required_tags.iter().zip(missing) {
            if resources.is_empty() {
                continue;
            }
            let severity = if CRITICAL_KEYS.contains(&normalize_key(required).as_str()) {
                Severity::High
            } else {
                Severity::Medium
            };

            findings.push(
                Finding::new(
                    severity,
                    "Missing",
                    format!("{} resources missing '{}' tag", resources.len(), required),
                )
                .resources(resources)
                .impact("Cannot track ownership, cost allocation, or compliance")
                .remediation(format!(
                    "Add '{}' tag to all resources according to tagging policy",
                    required
                )),
            );
        }
    }

    /// Spelling to standardize on: the matching required tag, otherwise
    /// the most used variant
    fn recommended_spelling(&self, normalized: &str, variants: &BTreeMap<&str, Vec<&str>>) -> String {
        if let Some(required) = self
            .required_tags
            .iter()
            .find(|t| normalize_key(t) == normalized)
        {
            return required.clone();
        }

        let mut best: Option<(&str, usize)> = None;
        for (variant, resources) in variants {
            if best.map(|(_, count)| resources.len() > count).unwrap_or(true) {
                best = Some((*variant, resources.len()));
            }
        }
        best.map(|(variant, _)| variant.to_string())
            .unwrap_or_else(|| normalized.to_string())
    }

    fn key_consistency(&self, eligible: &[&Resource], findings: &mut Vec<TagFinding>) {
        // logical key -> spelling -> resources using it
        let mut spellings: BTreeMap<String, BTreeMap<&str, Vec<&str>>> = BTreeMap::new();
        for resource in eligible {
            for (key, _) in resource.tags() {
                spellings
                    .entry(normalize_key(key))
                    .or_default()
                    .entry(key)
                    .or_default()
                    .push(resource.name.as_str());
            }
        }

        for (normalized, variants) in &spellings {
            if variants.len() < 2 {
                continue;
            }
            let recommended = self.recommended_spelling(normalized, variants);
            let listed: Vec<&str> = variants.keys().copied().collect();

            let mut affected: Vec<&str> = variants
                .iter()
                .filter(|(variant, _)| **variant != recommended.as_str())
                .flat_map(|(_, resources)| resources.iter().copied())
                .collect();
            affected.sort_unstable();
            affected.dedup();

            findings.push(
                Finding::new(
                    Severity::Low,
                    "Inconsistent",
                    format!(
                        "Tag key '{}' has {} variations: {}",
                        normalized,
                        variants.len(),
                        listed.join(", ")
                    ),
                )
                .resources(affected)
                .impact("Makes filtering and cost reporting difficult")
                .remediation(format!(
                    "Standardize to single format (recommended: '{}')",
                    recommended
                )),
            );
        }
    }

    fn environment_values(&self, eligible: &[&Resource], findings: &mut Vec<TagFinding>) {
        let mut values: BTreeSet<String> = BTreeSet::new();
        for resource in eligible {
            for (key, value) in resource.tags() {
                let logical = normalize_key(key);
                if logical != "environment" && logical != "env" {
                    continue;
                }
                if let Some(value) = value {
                    values.insert(value.trim().to_lowercase());
                }
            }
        }

        if values.len() > ENVIRONMENT_VALUE_LIMIT {
            let listed: Vec<&str> = values.iter().map(String::as_str).collect();
            findings.push(
                Finding::new(
                    Severity::Medium,
                    "Inconsistent",
                    format!(
                        "Environment tag has {} different values: {}",
                        values.len(),
                        listed.join(", ")
                    ),
                )
                .impact("Difficult to filter resources by environment")
                .remediation("Standardize environment values to: production, staging, development, test"),
            );
        }
    }
}

impl Analyzer for TaggingAnalyzer {
    type Output = TaggingAnalysis;

    fn analyze(&self, store: &ResourceStore) -> TaggingAnalysis {
        let eligible: Vec<&Resource> = store.iter().filter(|r| !is_system_resource(r)).collect();
        let tagged_resources = eligible.iter().filter(|r| r.has_tags()).count();

        let mut findings = Vec::new();
        self.missing_tags(&eligible, &mut findings);
        self.key_consistency(&eligible, &mut findings);
        self.environment_values(&eligible, &mut findings);

        TaggingAnalysis::new(
            eligible.len(),
            tagged_resources,
            self.required_tags.clone(),
            findings,
        )
    }
}

/// Result of the tagging pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggingAnalysis {
    pub total_resources: usize,
    pub tagged_resources: usize,
    pub untagged_resources: usize,
    /// Tagged share of eligible resources; 100 when there are none
    pub compliance_rate: f64,
    pub required_tags: Vec<String>,
    pub score: u8,
    pub findings: Vec<TagFinding>,
}

impl TaggingAnalysis {
    pub fn new(
        total_resources: usize,
        tagged_resources: usize,
        required_tags: Vec<String>,
        findings: Vec<TagFinding>,
    ) -> Self {
        let compliance_rate = if total_resources == 0 {
            100.0
        } else {
            (tagged_resources as f64 / total_resources as f64 * 100.0).min(100.0)
        };
        let penalty = SeverityPenalties::TAGGING.total(findings.iter().map(|f| f.severity));

        Self {
            total_resources,
            tagged_resources,
            untagged_resources: total_resources.saturating_sub(tagged_resources),
            compliance_rate,
            required_tags,
            score: clamp_score(truncate(compliance_rate) - penalty),
            findings,
        }
    }
}

impl ScoredAnalysis for TaggingAnalysis {
    fn name(&self) -> &'static str {
        "Tagging"
    }

    fn score(&self) -> u8 {
        self.score
    }

    fn finding_count(&self) -> usize {
        self.findings.len()
    }

    fn health_labels(&self) -> HealthLabels {
        HealthLabels {
            fair: "NEEDS ATTENTION",
            poor: "POOR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tagged(name: &str, tags: serde_json::Value) -> serde_json::Value {
        json!({"name": name, "type": "Microsoft.Storage/storageAccounts", "tags": tags})
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Cost-Center"), "costcenter");
        assert_eq!(normalize_key("cost_center"), "costcenter");
        assert_eq!(normalize_key("Cost Center"), "costcenter");
    }

    #[test]
    fn test_missing_tags_in_required_order() {
        let store = ResourceStore::from_values(vec![
            tagged("st-a", json!({"environment": "prod"})),
            json!({"name": "st-b", "type": "Microsoft.Storage/storageAccounts"}),
        ]);
        let analysis = TaggingAnalyzer::default().analyze(&store);

        let missing: Vec<_> = analysis
            .findings
            .iter()
            .filter(|f| f.category == "Missing")
            .collect();
        assert_eq!(missing.len(), 4);
        assert_eq!(missing[0].issue, "1 resources missing 'environment' tag");
        assert_eq!(missing[1].severity, Severity::High);
        assert_eq!(missing[1].resources, vec!["st-a", "st-b"]);
        assert_eq!(missing[2].severity, Severity::High);
        assert_eq!(missing[3].severity, Severity::Medium);
        assert_eq!(analysis.compliance_rate, 50.0);
        // 50 - 5 - 10 - 10 - 5
        assert_eq!(analysis.score, 20);
    }

    #[test]
    fn test_system_resources_excluded() {
        let store = ResourceStore::from_values(vec![json!({
            "name": "NetworkWatcher_eastus",
            "type": "Microsoft.Network/networkWatchers"
        })]);
        let analysis = TaggingAnalyzer::default().analyze(&store);
        assert_eq!(analysis.total_resources, 0);
        assert_eq!(analysis.score, 100);
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn test_spelling_variants_recommend_required_form() {
        let store = ResourceStore::from_values(vec![
            tagged("st-a", json!({"CostCenter": "1"})),
            tagged("st-b", json!({"cost-center": "1"})),
        ]);
        let analysis = TaggingAnalyzer::default().analyze(&store);

        let inconsistent: Vec<_> = analysis
            .findings
            .iter()
            .filter(|f| f.category == "Inconsistent")
            .collect();
        assert_eq!(inconsistent.len(), 1);
        assert_eq!(inconsistent[0].resources, vec!["st-a"]);
        assert!(inconsistent[0].remediation.contains("'cost-center'"));
    }

    #[test]
    fn test_environment_value_sprawl() {
        let values = ["prod", "Production", "dev", "test", "qa", "uat"];
        let store = ResourceStore::from_values(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| tagged(&format!("st-{}", i), json!({"environment": v})))
                .collect(),
        );
        let analysis = TaggingAnalyzer::default().analyze(&store);

        let sprawl = analysis
            .findings
            .iter()
            .find(|f| f.issue.starts_with("Environment tag"))
            .unwrap();
        assert_eq!(sprawl.severity, Severity::Medium);
        assert!(sprawl.issue.contains("6 different values"));
    }

    #[test]
    fn test_custom_required_tags() {
        let store = ResourceStore::from_values(vec![tagged("st-a", json!({"Project": "x"}))]);
        let analysis = TaggingAnalyzer::new(vec!["project".to_string()]).analyze(&store);
        assert!(analysis.findings.is_empty());
        assert_eq!(analysis.score, 100);
    }

    #[test]
    fn test_tagged_count_above_total_does_not_underflow() {
        let analysis = TaggingAnalysis::new(2, 5, vec!["owner".to_string()], Vec::new());
        assert_eq!(analysis.untagged_resources, 0);
        assert_eq!(analysis.compliance_rate, 100.0);
        assert_eq!(analysis.score, 100);

        let empty = TaggingAnalysis::new(0, 0, Vec::new(), Vec::new());
        assert_eq!((empty.untagged_resources, empty.score), (0, 100));
    }
}
