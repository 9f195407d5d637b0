use super::facts::{FactRecord, IncentiveMetric, SalaryRecord};
use super::financial::percentage_change;

const ESG_CATEGORY: &str = "esg";

/// Fills fields computable purely from values already present in the
/// record. Each rule only fires when its target is absent, so explicitly
/// supplied values are never overridden and a second run is a no-op.
pub fn postprocess_facts(facts: &mut FactRecord) {
    if facts.ceo_salary_increase_pct.is_none() {
        if let Some(increase) = salary_increase_from_history(&facts.ceo_salary_history) {
            facts.ceo_salary_increase_pct = Some(increase);
            if facts.ceo_salary_increase_pct_source.is_none() {
                facts.ceo_salary_increase_pct_source = Some(
                    "Computed from ceo_salary_history as latest vs previous year.".to_string(),
                );
            }
        }
    }

    if facts.sti_total_esg_weight_pct.is_none() {
        facts.sti_total_esg_weight_pct = total_esg_weight(&facts.sti_metrics);
    }
    if facts.ltip_total_esg_weight_pct.is_none() {
        facts.ltip_total_esg_weight_pct = total_esg_weight(&facts.ltip_metrics);
    }

    // Always computable once both lists are known, even if empty.
    if facts.esg_metrics_incentives_present.is_none() {
        facts.esg_metrics_incentives_present = Some(has_any_esg_metric(
            &facts.sti_metrics,
            &facts.ltip_metrics,
        ));
    }

    // Change percentages for pairs the fact-filling step supplied without
    // computing the change itself.
    let perf = &mut facts.financial_performance;
    if perf.eps_change_pct.is_none() {
        perf.eps_change_pct = percentage_change(perf.eps_current, perf.eps_prior);
    }
    if perf.profit_attributable_change_pct.is_none() {
        perf.profit_attributable_change_pct = percentage_change(
            perf.profit_attributable_current,
            perf.profit_attributable_prior,
        );
    }
}

/// One-year salary increase, latest vs previous year, from a possibly
/// unsorted and partially filled history. Needs at least two entries with
/// both year and amount, and a positive previous amount.
fn salary_increase_from_history(history: &[SalaryRecord]) -> Option<f64> {
    let mut clean: Vec<(i32, f64)> = history
        .iter()
        .filter_map(|row| match (row.year, row.amount) {
            (Some(year), Some(amount)) if amount.is_finite() => Some((year, amount)),
            _ => None,
        })
        .collect();
    if clean.len() < 2 {
        return None;
    }

    clean.sort_by_key(|&(year, _)| year);
    let (_, latest) = clean[clean.len() - 1];
    let (_, previous) = clean[clean.len() - 2];
    if previous <= 0.0 {
        return None;
    }
    Some((latest - previous) / previous * 100.0)
}

/// Sum of ESG metric weights; `None` (not zero) when no metric qualifies,
/// so "known to be absent" stays distinct from "not evaluated".
fn total_esg_weight(metrics: &[IncentiveMetric]) -> Option<f64> {
    let weights: Vec<f64> = metrics
        .iter()
        .filter(|m| m.category.as_deref() == Some(ESG_CATEGORY))
        .filter_map(|m| m.weight_pct)
        .collect();
    if weights.is_empty() {
        return None;
    }
    Some(weights.iter().sum())
}

fn has_any_esg_metric(sti: &[IncentiveMetric], ltip: &[IncentiveMetric]) -> bool {
    sti.iter()
        .chain(ltip.iter())
        .any(|m| m.category.as_deref() == Some(ESG_CATEGORY))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(category: &str, weight_pct: Option<f64>) -> IncentiveMetric {
        IncentiveMetric {
            name: None,
            category: Some(category.to_string()),
            weight_pct,
        }
    }

    fn salary(year: i32, amount: f64) -> SalaryRecord {
        SalaryRecord {
            year: Some(year),
            amount: Some(amount),
            currency: None,
            source: None,
        }
    }

    #[test]
    fn test_salary_increase_from_history() {
        let mut facts = FactRecord {
            ceo_salary_history: vec![salary(2023, 900_000.0), salary(2024, 1_000_000.0)],
            ..FactRecord::default()
        };
        postprocess_facts(&mut facts);
        let increase = facts.ceo_salary_increase_pct.unwrap();
        assert!((increase - 11.111111111111).abs() < 1e-6);
        assert!(facts.ceo_salary_increase_pct_source.is_some());
    }

    #[test]
    fn test_salary_history_sorted_before_comparison() {
        let mut facts = FactRecord {
            ceo_salary_history: vec![
                salary(2024, 1_000_000.0),
                salary(2022, 500_000.0),
                salary(2023, 800_000.0),
            ],
            ..FactRecord::default()
        };
        postprocess_facts(&mut facts);
        assert!((facts.ceo_salary_increase_pct.unwrap() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_salary_increase_needs_two_clean_entries() {
        let mut facts = FactRecord {
            ceo_salary_history: vec![
                salary(2024, 1_000_000.0),
                SalaryRecord {
                    year: None,
                    amount: Some(900_000.0),
                    ..SalaryRecord::default()
                },
            ],
            ..FactRecord::default()
        };
        postprocess_facts(&mut facts);
        assert!(facts.ceo_salary_increase_pct.is_none());
    }

    #[test]
    fn test_salary_increase_requires_positive_previous() {
        let mut facts = FactRecord {
            ceo_salary_history: vec![salary(2023, 0.0), salary(2024, 1_000_000.0)],
            ..FactRecord::default()
        };
        postprocess_facts(&mut facts);
        assert!(facts.ceo_salary_increase_pct.is_none());
    }

    #[test]
    fn test_explicit_salary_increase_not_overridden() {
        let mut facts = FactRecord {
            ceo_salary_history: vec![salary(2023, 900_000.0), salary(2024, 1_000_000.0)],
            ceo_salary_increase_pct: Some(5.0),
            ..FactRecord::default()
        };
        postprocess_facts(&mut facts);
        assert_eq!(facts.ceo_salary_increase_pct, Some(5.0));
        assert!(facts.ceo_salary_increase_pct_source.is_none());
    }

    #[test]
    fn test_esg_weights_and_presence_flag() {
        let mut facts = FactRecord {
            sti_metrics: vec![
                metric("esg", Some(10.0)),
                metric("esg", Some(5.0)),
                metric("financial", Some(85.0)),
            ],
            ltip_metrics: vec![metric("financial", Some(100.0))],
            ..FactRecord::default()
        };
        postprocess_facts(&mut facts);
        assert_eq!(facts.sti_total_esg_weight_pct, Some(15.0));
        assert_eq!(facts.ltip_total_esg_weight_pct, None);
        assert_eq!(facts.esg_metrics_incentives_present, Some(true));
    }

    #[test]
    fn test_esg_weight_skips_missing_weights() {
        let mut facts = FactRecord {
            sti_metrics: vec![metric("esg", None), metric("esg", Some(7.5))],
            ..FactRecord::default()
        };
        postprocess_facts(&mut facts);
        assert_eq!(facts.sti_total_esg_weight_pct, Some(7.5));
    }

    #[test]
    fn test_presence_flag_false_when_both_lists_empty() {
        let mut facts = FactRecord::default();
        postprocess_facts(&mut facts);
        assert_eq!(facts.esg_metrics_incentives_present, Some(false));
    }

    #[test]
    fn test_postprocess_is_idempotent() {
        let mut facts = FactRecord {
            ceo_salary_history: vec![salary(2023, 900_000.0), salary(2024, 1_000_000.0)],
            sti_metrics: vec![metric("esg", Some(10.0))],
            ..FactRecord::default()
        };
        postprocess_facts(&mut facts);
        let once = facts.clone();
        postprocess_facts(&mut facts);
        assert_eq!(facts, once);
    }

    #[test]
    fn test_eps_change_filled_for_supplied_pair() {
        let mut facts = FactRecord::default();
        facts.financial_performance.eps_current = Some(0.45);
        facts.financial_performance.eps_prior = Some(0.39);
        postprocess_facts(&mut facts);
        let change = facts.financial_performance.eps_change_pct.unwrap();
        assert!((change - 15.384615384615385).abs() < 1e-6);
    }

    #[test]
    fn test_eps_change_absent_for_zero_prior() {
        let mut facts = FactRecord::default();
        facts.financial_performance.eps_current = Some(0.45);
        facts.financial_performance.eps_prior = Some(0.0);
        postprocess_facts(&mut facts);
        assert!(facts.financial_performance.eps_change_pct.is_none());
    }
}
