use serde::{Deserialize, Serialize};

use super::financial::FinancialPerformance;

/// One year of CEO salary, as reported. Fields stay optional because the
/// upstream fact-filling step may only recover part of a table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryRecord {
    pub year: Option<i32>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub source: Option<String>,
}

/// A single incentive-plan performance metric with its weighting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncentiveMetric {
    pub name: Option<String>,
    pub category: Option<String>,
    pub weight_pct: Option<f64>,
}

/// Structured facts for one remuneration report. Created empty,
/// incrementally filled by the fact-filling step and the financial scanner,
/// finally enriched by postprocessing; not mutated after that.
///
/// Numeric fields extracted from text carry a sibling `*_source` snippet
/// where provenance is available.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactRecord {
    pub company_name: Option<String>,
    pub financial_year: Option<String>,
    pub currency: Option<String>,

    /// 1-based page numbers of the located remuneration section.
    pub rem_pages_start: Option<usize>,
    pub rem_pages_end: Option<usize>,

    pub ceo_salary_history: Vec<SalaryRecord>,
    pub ceo_salary_increase_pct: Option<f64>,
    pub ceo_salary_increase_pct_source: Option<String>,
    pub workforce_salary_increase_pct: Option<f64>,

    pub sti_metrics: Vec<IncentiveMetric>,
    pub ltip_metrics: Vec<IncentiveMetric>,
    pub sti_total_esg_weight_pct: Option<f64>,
    pub ltip_total_esg_weight_pct: Option<f64>,
    pub esg_metrics_incentives_present: Option<bool>,

    pub clawback_provision: Option<bool>,
    pub malus_provision: Option<bool>,

    pub financial_performance: FinancialPerformance,

    pub extraction_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_unknown_fields_ignored() {
        let json = r#"{
            "company_name": "Example plc",
            "ceo_salary_history": [{"year": 2024, "amount": 1000000.0}],
            "sti_metrics": [{"name": "TSR", "category": "financial", "weight_pct": 60.0}],
            "some_future_field": 42
        }"#;
        let facts: FactRecord = serde_json::from_str(json).unwrap();
        assert_eq!(facts.company_name.as_deref(), Some("Example plc"));
        assert_eq!(facts.ceo_salary_history[0].year, Some(2024));
        assert_eq!(facts.sti_metrics[0].weight_pct, Some(60.0));
        assert!(facts.esg_metrics_incentives_present.is_none());
    }
}
