//! Typed insight requests on top of a [`TextGenerator`]

use crate::client::{CompletionRequest, OpenAiClient, TextGenerator};
use crate::{prompts, InsightError, Result};
use azdoc_common::{InsightConfig, Resource, ResourceStore};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A suggested edge between two resources, by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSuggestion {
    pub source_resource: String,
    pub target_resource: String,
    /// association, peering, routing or natgw
    #[serde(default)]
    pub connection_type: String,
    #[serde(default)]
    pub label: String,
    /// high, medium or low
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub reason: String,
}

impl ConnectionSuggestion {
    pub fn is_high_confidence(&self) -> bool {
        self.confidence.trim().eq_ignore_ascii_case("high")
    }
}

/// A placement hint for one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSuggestion {
    pub resource_name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub subnet_name: Option<String>,
    #[serde(default)]
    pub grouping: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityInsight {
    pub category: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostInsight {
    pub category: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub estimated_savings: f64,
    #[serde(default)]
    pub effort: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub priority: i32,
}

/// Prose description of the whole subscription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureDescription {
    pub overview: String,
    #[serde(default)]
    pub resource_group_insights: BTreeMap<String, String>,
    #[serde(default)]
    pub key_findings: Vec<String>,
}

/// Subnet name and prefix sent with layout requests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnetSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
}

#[derive(Serialize)]
struct ResourceSummary<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    resource_type: &'a str,
    location: &'a str,
}

/// Builds prompts, calls the generator, and parses typed replies
pub struct InsightService {
    generator: Box<dyn TextGenerator>,
    max_tokens: u32,
}

impl InsightService {
    pub fn new(generator: Box<dyn TextGenerator>, max_tokens: u32) -> Self {
        Self {
            generator,
            max_tokens,
        }
    }

    /// OpenAI-backed service; `Disabled` when turned off or keyless
    pub fn from_config(config: &InsightConfig, api_key: Option<String>) -> Result<Self> {
        if !config.enabled {
            return Err(InsightError::Disabled("insight.enabled is false".to_string()));
        }
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                InsightError::Disabled(format!("no API key found in {}", config.api_key_env))
            })?;

        let client = OpenAiClient::new(config, api_key)?;
        info!("AI insights enabled with model {}", client.model());
        Ok(Self::new(Box::new(client), config.max_tokens))
    }

    /// Edges the deterministic heuristics may miss
    pub fn discover_connections(&self, resources: &[&Resource]) -> Result<Vec<ConnectionSuggestion>> {
        let payload = to_json("connections", &resources)?;
        self.request(
            "connections",
            prompts::CONNECTIONS_SYSTEM,
            prompts::connections(&payload),
            0.3,
        )
    }

    /// Subnet placement hints for one VNet's resources
    pub fn suggest_layout(
        &self,
        resources: &[&Resource],
        subnets: &[SubnetSummary],
    ) -> Result<Vec<LayoutSuggestion>> {
        let summaries: Vec<ResourceSummary<'_>> = resources.iter().map(|r| summarize(r)).collect();
        let resources_json = to_json("layout", &summaries)?;
        let subnets_json = to_json("layout", &subnets)?;
        self.request(
            "layout",
            prompts::LAYOUT_SYSTEM,
            prompts::layout(&resources_json, &subnets_json),
            0.2,
        )
    }

    pub fn security_insights<T: Serialize + ?Sized>(&self, findings: &T) -> Result<Vec<SecurityInsight>> {
        let payload = to_json("security", findings)?;
        self.request("security", prompts::SECURITY_SYSTEM, prompts::security(&payload), 0.3)
    }

    pub fn cost_insights<T: Serialize + ?Sized>(&self, findings: &T) -> Result<Vec<CostInsight>> {
        let payload = to_json("cost", findings)?;
        self.request("cost", prompts::COST_SYSTEM, prompts::cost(&payload), 0.3)
    }

    pub fn describe_architecture(&self, store: &ResourceStore) -> Result<ArchitectureDescription> {
        let groups: BTreeMap<&str, Vec<ResourceSummary<'_>>> = store
            .group_by_resource_group()
            .into_iter()
            .filter(|(group, _)| !group.is_empty())
            .map(|(group, resources)| (group, resources.into_iter().map(summarize).collect()))
            .collect();
        let payload = to_json("architecture", &groups)?;
        self.request(
            "architecture",
            prompts::ARCHITECTURE_SYSTEM,
            prompts::architecture(&payload),
            0.4,
        )
    }

    fn request<T: DeserializeOwned>(
        &self,
        section: &str,
        system: &str,
        prompt: String,
        temperature: f32,
    ) -> Result<T> {
        let request = CompletionRequest {
            system: system.to_string(),
            prompt,
            temperature,
            max_tokens: self.max_tokens,
        };
        let reply = self.generator.complete(&request)?;
        debug!("{} reply: {} bytes", section, reply.len());
        parse_reply(section, &reply)
    }
}

fn summarize(resource: &Resource) -> ResourceSummary<'_> {
    ResourceSummary {
        name: &resource.name,
        resource_type: &resource.resource_type,
        location: &resource.location,
    }
}

fn to_json<T: Serialize + ?Sized>(section: &str, value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| InsightError::Parse {
        section: section.to_string(),
        message: e.to_string(),
    })
}

/// Drop a surrounding Markdown code fence, if any
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // skip the info string (e.g. "json") on the opening line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a service reply into `T`
pub fn parse_reply<T: DeserializeOwned>(section: &str, reply: &str) -> Result<T> {
    serde_json::from_str(strip_code_fence(reply)).map_err(|e| InsightError::Parse {
        section: section.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTextGenerator;
    use serde_json::json;

    fn service_replying(reply: &'static str) -> InsightService {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_complete()
            .times(1)
            .returning(move |_| Ok(reply.to_string()));
        InsightService::new(Box::new(generator), 500)
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
        assert_eq!(strip_code_fence("  [3] "), "[3]");
    }

    #[test]
    fn test_discover_connections_parses_fenced_reply() {
        let service = service_replying(
            "```json\n[{\"source_resource\": \"nic-web\", \"target_resource\": \"vm-web\", \"connection_type\": \"association\", \"label\": \"attached\", \"confidence\": \"High\", \"reason\": \"naming\"}]\n```",
        );
        let vm = Resource::from_value(json!({"name": "vm-web"}));

        let suggestions = service.discover_connections(&[&vm]).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].is_high_confidence());
    }

    #[test]
    fn test_prompt_and_settings_reach_generator() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_complete()
            .withf(|request| {
                request.prompt.contains("\"rg-app\"")
                    && request.max_tokens == 750
                    && (request.temperature - 0.4).abs() < f32::EPSILON
            })
            .returning(|_| Ok(r#"{"overview": "A small app."}"#.to_string()));
        let service = InsightService::new(Box::new(generator), 750);
        let store = ResourceStore::from_values(vec![
            json!({"name": "app", "type": "Microsoft.Web/sites", "resourceGroup": "rg-app"}),
        ]);

        let description = service.describe_architecture(&store).unwrap();
        assert_eq!(description.overview, "A small app.");
        assert!(description.key_findings.is_empty());
    }

    #[test]
    fn test_unparseable_reply_is_parse_error() {
        let service = service_replying("Sorry, I cannot help with that.");
        let result = service.security_insights(&json!([]));
        assert!(matches!(result, Err(InsightError::Parse { ref section, .. }) if section == "security"));
    }

    #[test]
    fn test_generator_error_propagates() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_complete()
            .returning(|_| Err(InsightError::EmptyResponse));
        let service = InsightService::new(Box::new(generator), 100);

        assert!(matches!(
            service.cost_insights(&json!([])),
            Err(InsightError::EmptyResponse)
        ));
    }

    #[test]
    fn test_from_config_requires_enabled_and_key() {
        let mut config = InsightConfig::default();
        assert!(matches!(
            InsightService::from_config(&config, Some("sk".to_string())),
            Err(InsightError::Disabled(_))
        ));

        config.enabled = true;
        assert!(matches!(
            InsightService::from_config(&config, None),
            Err(InsightError::Disabled(_))
        ));
    }
}
