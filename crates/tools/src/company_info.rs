//! Company lookup tool — stub backed by an in-process company table.
//!
//! In production this would query an internal CRM. The stub knows a few
//! companies and produces a deterministic placeholder record for anything
//! else, so the agent loop can be exercised end-to-end offline.

use async_trait::async_trait;
use dossier_core::error::ToolError;
use dossier_core::tool::ScalarCapability;
use serde::Serialize;

pub struct CompanyInfoTool;

#[async_trait]
impl ScalarCapability for CompanyInfoTool {
    fn name(&self) -> &str {
        "get_company_info"
    }

    fn description(&self) -> &str {
        "Get company info from internal DB. Input: company_name (string). Example: Tesla"
    }

    async fn invoke(&self, input: &str) -> Result<serde_json::Value, ToolError> {
        if input.is_empty() {
            return Err(ToolError::InvalidArguments("Missing company name".into()));
        }
        let record = lookup_company(input);
        serde_json::to_value(&record).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyRecord {
    pub name: String,
    pub industry: String,
    pub founded: String,
    pub ceo: String,
    pub headquarters: String,
    pub products: Vec<String>,
    pub revenue: String,
    pub employees: String,
    pub risk_category: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Find a company by exact name, or synthesize a placeholder record.
pub fn lookup_company(name: &str) -> CompanyRecord {
    match name {
        "Tesla" => CompanyRecord {
            name: "Tesla".into(),
            industry: "Electric Vehicles & Clean Energy".into(),
            founded: "2003".into(),
            ceo: "Elon Musk".into(),
            headquarters: "Austin, Texas".into(),
            products: strings(&[
                "Model S",
                "Model 3",
                "Model X",
                "Model Y",
                "Cybertruck",
                "Powerwall",
            ]),
            revenue: "$96.8 billion (2023)".into(),
            employees: "140,000+".into(),
            risk_category: "Medium".into(),
        },
        "Apple" => CompanyRecord {
            name: "Apple".into(),
            industry: "Consumer Electronics & Software".into(),
            founded: "1976".into(),
            ceo: "Tim Cook".into(),
            headquarters: "Cupertino, California".into(),
            products: strings(&["iPhone", "iPad", "Mac", "Apple Watch", "AirPods"]),
            revenue: "$383 billion (2023)".into(),
            employees: "160,000+".into(),
            risk_category: "Low".into(),
        },
        _ => placeholder_record(name),
    }
}

/// Deterministic placeholder keyed on a simple name hash.
fn placeholder_record(name: &str) -> CompanyRecord {
    const INDUSTRIES: [&str; 4] = ["Automotive", "Tech", "Finance", "Healthcare"];
    const RISKS: [&str; 3] = ["Low", "Medium", "High"];

    let hash: u32 = name
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

    CompanyRecord {
        name: name.to_string(),
        industry: INDUSTRIES[hash as usize % INDUSTRIES.len()].into(),
        founded: "Unknown".into(),
        ceo: "Unknown".into(),
        headquarters: "Unknown".into(),
        products: strings(&["Product A", "Product B"]),
        revenue: "Unknown".into(),
        employees: "Unknown".into(),
        risk_category: RISKS[(hash / 7) as usize % RISKS.len()].into(),
    }
}
