//! Integration tests for the insight service with a canned generator

use azdoc_common::Resource;
use azdoc_insight::{
    CompletionRequest, InsightError, InsightService, SubnetSummary, TextGenerator,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Replies with a fixed text and records every prompt it sees
struct CannedGenerator {
    reply: String,
    prompts: Rc<RefCell<Vec<String>>>,
}

impl TextGenerator for CannedGenerator {
    fn complete(&self, request: &CompletionRequest) -> Result<String, InsightError> {
        self.prompts.borrow_mut().push(request.prompt.clone());
        Ok(self.reply.clone())
    }
}

fn service(reply: &str) -> (InsightService, Rc<RefCell<Vec<String>>>) {
    let prompts = Rc::new(RefCell::new(Vec::new()));
    let generator = CannedGenerator {
        reply: reply.to_string(),
        prompts: Rc::clone(&prompts),
    };
    (InsightService::new(Box::new(generator), 1000), prompts)
}

#[test]
fn test_layout_suggestions() {
    let (service, prompts) = service(
        r#"[
            {"resource_name": "vm-api", "x": 120, "y": 90, "subnet_name": "services", "grouping": "tier", "reason": "backend"},
            {"resource_name": "nic-api", "grouping": "subnet"}
        ]"#,
    );
    let vm = Resource::from_value(json!({"name": "vm-api", "type": "Microsoft.Compute/virtualMachines"}));
    let subnets = vec![SubnetSummary {
        name: "services".to_string(),
        address_prefix: Some("10.0.2.0/24".to_string()),
    }];

    let hints = service.suggest_layout(&[&vm], &subnets).unwrap();
    assert_eq!(hints.len(), 2);
    assert_eq!(hints[0].subnet_name.as_deref(), Some("services"));
    assert_eq!(hints[1].subnet_name, None);
    assert!(prompts.borrow()[0].contains("10.0.2.0/24"));
}

#[test]
fn test_security_insights() {
    let (service, prompts) = service(
        r#"[{"category": "Network Security", "severity": "Critical", "title": "Close SSH",
             "description": "SSH is open", "risk_level": "High", "impact": "Compromise",
             "recommendations": ["Use Bastion"], "priority": 1}]"#,
    );
    let findings = json!([{"severity": "Critical", "issue": "NSG rule 'ssh' allows port 22"}]);

    let insights = service.security_insights(&findings).unwrap();
    assert_eq!(insights[0].recommendations, vec!["Use Bastion"]);
    assert!(prompts.borrow()[0].contains("allows port 22"));
}

#[test]
fn test_wrong_shape_is_recoverable_error() {
    let (service, _) = service(r#"{"not": "an array"}"#);
    let result = service.cost_insights(&json!([]));
    assert!(matches!(result, Err(InsightError::Parse { .. })));
}
