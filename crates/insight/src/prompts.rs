//! Prompt text for each insight section

pub const CONNECTIONS_SYSTEM: &str =
    "You are an Azure infrastructure analysis expert. You provide JSON responses only.";

pub const LAYOUT_SYSTEM: &str =
    "You are a diagram layout optimization expert. You provide JSON responses only.";

pub const SECURITY_SYSTEM: &str = "You are an Azure security expert. You provide JSON responses only with actionable security insights.";

pub const COST_SYSTEM: &str = "You are an Azure cost optimization expert. You provide JSON responses only with actionable cost-saving insights.";

pub const ARCHITECTURE_SYSTEM: &str = "You are an Azure architecture documentation expert. You provide JSON responses only with insightful, professional descriptions.";

pub fn connections(resources_json: &str) -> String {
    format!(
        r#"You are an Azure architecture expert. Analyze these Azure resources and identify all logical connections and relationships between them.

Resources:
{resources_json}

Instructions:
1. Identify relationships based on Azure properties (e.g., NICs attached to VMs, Function Apps using Storage Accounts, NSG associations, VNet peerings)
2. Look for subnet associations, VNet integrations, public IP attachments
3. Consider naming conventions (e.g., "vm-hub-jumpbox-nic" likely connects to "vm-hub-jumpbox")
4. Return ONLY valid JSON array of connections

Return format (valid JSON only, no markdown):
[
  {{
    "source_resource": "resource-name-1",
    "target_resource": "resource-name-2",
    "connection_type": "association|peering|routing|natgw",
    "label": "short description",
    "confidence": "high|medium|low",
    "reason": "why this connection exists"
  }}
]"#
    )
}

pub fn layout(resources_json: &str, subnets_json: &str) -> String {
    format!(
        r#"You are an Azure network diagram expert. Analyze these resources and decide which subnet each compute resource belongs in for a clear, professional diagram.

Resources:
{resources_json}

Subnets:
{subnets_json}

Diagram constraints:
- VNet container: 1100x600 pixels, starting at (50, 50)
- Subnet containers: 350x120 pixels each, stacked vertically
- Resources should be inside subnets when applicable

Instructions:
1. Place compute resources (VMs, NICs, Function Apps) INSIDE the most appropriate subnet
2. Network resources (NSGs, Route Tables, LBs, NAT GWs) stay outside subnets
3. Use exact resource and subnet names from the lists above

Return ONLY valid JSON array (no markdown):
[
  {{
    "resource_name": "exact-resource-name",
    "x": 100.0,
    "y": 150.0,
    "subnet_name": "subnet-name-if-inside",
    "grouping": "subnet|tier|function",
    "reason": "why positioned here"
  }}
]"#
    )
}

pub fn security(findings_json: &str) -> String {
    format!(
        r#"You are a cybersecurity expert specializing in Azure security. Analyze these security findings and provide actionable insights.

Security Findings:
{findings_json}

Instructions:
1. Identify the most critical security risks based on the findings
2. Group related findings into broader security themes
3. Provide specific, actionable recommendations
4. Prioritize based on risk level and ease of remediation
5. Consider Azure best practices and Well-Architected Framework

Return ONLY valid JSON array (no markdown):
[
  {{
    "category": "Network Security|Identity|Encryption|Compliance",
    "severity": "Critical|High|Medium|Low",
    "title": "concise insight title",
    "description": "detailed explanation of the security concern",
    "risk_level": "description of potential risk",
    "impact": "what could happen if not addressed",
    "recommendations": ["specific action 1", "specific action 2"],
    "priority": 1
  }}
]

Focus on the top 5-8 most important insights only."#
    )
}

pub fn cost(findings_json: &str) -> String {
    format!(
        r#"You are a cloud cost optimization expert specializing in Azure. Analyze these cost findings and provide strategic insights.

Cost Findings:
{findings_json}

Instructions:
1. Identify the highest-impact cost optimization opportunities
2. Group related findings into optimization themes
3. Provide specific, actionable recommendations
4. Estimate effort level (Low/Medium/High) for each recommendation
5. Consider Azure pricing models, reserved instances, and architectural improvements

Return ONLY valid JSON array (no markdown):
[
  {{
    "category": "Compute|Storage|Network|Database|Licensing",
    "title": "concise optimization opportunity",
    "description": "detailed explanation of the cost issue and opportunity",
    "estimated_savings": 123.45,
    "effort": "Low|Medium|High",
    "recommendations": ["specific action 1", "specific action 2"],
    "priority": 1
  }}
]

Focus on the top 5-8 most impactful insights only."#
    )
}

pub fn architecture(groups_json: &str) -> String {
    format!(
        r#"You are an Azure architecture expert. Analyze this Azure subscription and provide insightful descriptions.

Resources grouped by Resource Group:
{groups_json}

Instructions:
1. Provide a high-level overview of the entire architecture (2-3 sentences)
2. For each resource group, provide a 1-2 sentence description of its purpose and key resources
3. Identify 3-5 key findings or notable aspects of this architecture
4. Write in professional but friendly tone
5. Focus on the "why" and "what" rather than just listing resources

Return ONLY valid JSON (no markdown):
{{
  "overview": "High-level architecture summary",
  "resource_group_insights": {{
    "resource-group-name": "Description of this resource group's purpose and contents"
  }},
  "key_findings": [
    "Notable finding 1",
    "Notable finding 2"
  ]
}}"#
    )
}
