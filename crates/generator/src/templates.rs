//! Template loading and management

use azdoc_common::{DocError, Result, Severity};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Name of the top-level Markdown template
pub const DOCUMENT: &str = "document.md";

const TEMPLATES: [(&str, &str); 9] = [
    (DOCUMENT, include_str!("../templates/document.md.tera")),
    ("architecture.md", include_str!("../templates/architecture.md.tera")),
    ("priorities.md", include_str!("../templates/priorities.md.tera")),
    ("security.md", include_str!("../templates/security.md.tera")),
    ("security_insights.md", include_str!("../templates/security_insights.md.tera")),
    ("cost.md", include_str!("../templates/cost.md.tera")),
    ("cost_insights.md", include_str!("../templates/cost_insights.md.tera")),
    ("tagging.md", include_str!("../templates/tagging.md.tera")),
    ("compliance.md", include_str!("../templates/compliance.md.tera")),
];

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    // Register custom filters
    tera.register_filter("fixed", fixed_filter);
    tera.register_filter("cell", cell_filter);
    tera.register_filter("severity_icon", severity_icon_filter);
    tera.register_filter("effort_icon", effort_icon_filter);

    for (name, source) in TEMPLATES {
        tera.add_raw_template(name, source).map_err(|e| {
            DocError::Render(format!("Failed to load {} template: {}", name, e))
        })?;
    }

    Ok(tera)
}

/// Format a number with a fixed count of decimals (`decimals`, default 2)
fn fixed_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let number = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg("fixed filter expects a number"))?;
    let decimals = match args.get("decimals") {
        Some(arg) => arg
            .as_u64()
            .ok_or_else(|| tera::Error::msg("fixed filter `decimals` must be a positive integer"))?
            as usize,
        None => 2,
    };

    Ok(Value::String(format!("{:.*}", decimals, number)))
}

/// Make text safe inside a Markdown table cell
fn cell_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("cell filter expects a string"))?;

    Ok(Value::String(escape_cell(text)))
}

pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace('\n', " ")
}

/// Coloured marker for a severity label
fn severity_icon_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let label = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("severity_icon filter expects a string"))?;

    let icon = Severity::parse(label).map(|s| s.icon()).unwrap_or("⚪");
    Ok(Value::String(icon.to_string()))
}

/// Marker for a Low/Medium/High effort estimate
fn effort_icon_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let effort = value.as_str().unwrap_or_default();

    let icon = match effort.trim().to_ascii_lowercase().as_str() {
        "medium" => "🟡",
        "high" => "🔴",
        _ => "🟢",
    };
    Ok(Value::String(icon.to_string()))
}
