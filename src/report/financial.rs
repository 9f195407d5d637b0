use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::keywords::CompiledKeywords;
use super::section::SectionRange;
use crate::corpus::PageCorpus;

/// Window extent around a candidate page, in pages.
pub const WINDOW_BEFORE: usize = 10;
pub const WINDOW_AFTER: usize = 20;
/// Upper bound on provenance snippet length, in characters.
pub const SNIPPET_MAX_CHARS: usize = 250;

/// Paired current/prior financial metrics pulled from the document, with
/// provenance snippets and the page range they came from. Every field is
/// optional; a miss at any tier leaves fields absent rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialPerformance {
    pub eps_current: Option<f64>,
    pub eps_prior: Option<f64>,
    pub eps_change_pct: Option<f64>,
    pub profit_attributable_current: Option<f64>,
    pub profit_attributable_prior: Option<f64>,
    pub profit_attributable_change_pct: Option<f64>,
    pub eps_source_snippet: Option<String>,
    pub profit_source_snippet: Option<String>,
    /// 0-based page range the values were read from.
    pub source_pages: Option<SectionRange>,
}

/// Pages matching either candidate family (financial-statement headers,
/// EPS mentions), deduplicated and ascending.
pub fn find_candidate_pages(corpus: &PageCorpus, kw: &CompiledKeywords) -> Vec<usize> {
    let matching = |patterns: &[Regex]| -> Vec<usize> {
        corpus
            .pages()
            .iter()
            .filter(|page| patterns.iter().any(|re| re.is_match(&page.text)))
            .map(|page| page.index)
            .collect()
    };
    let headers = matching(&kw.statement_headers);
    let eps = matching(&kw.eps_mentions);
    headers.into_iter().chain(eps).sorted().dedup().collect()
}

/// Parses a matched numeric token, tolerating thousands separators and
/// stray whitespace. Unparseable tokens become `None`, never an error.
pub fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Percentage change from prior to current; absent when prior is missing
/// or zero (never zero, never infinite).
pub fn percentage_change(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    match (current, prior) {
        (Some(current), Some(prior)) if prior != 0.0 => {
            Some((current - prior) / prior * 100.0)
        }
        _ => None,
    }
}

/// Applies the EPS patterns (primary, then fallback) and the profit pattern
/// to one text blob. Returns the partial result and whether any EPS pattern
/// matched at all, which is what decides the windowed-scan winner.
fn extract_pairs(text: &str, kw: &CompiledKeywords) -> (FinancialPerformance, bool) {
    let mut perf = FinancialPerformance::default();

    let eps_caps = kw
        .eps_value
        .captures(text)
        .or_else(|| kw.eps_value_fallback.captures(text));
    let eps_matched = eps_caps.is_some();
    if let Some(caps) = eps_caps {
        perf.eps_current = caps.get(1).and_then(|m| parse_number(m.as_str()));
        perf.eps_prior = caps.get(2).and_then(|m| parse_number(m.as_str()));
        perf.eps_source_snippet = snippet_at_keyword(text, &kw.eps_mentions, SNIPPET_MAX_CHARS);
    }

    if let Some(caps) = kw.profit_value.captures(text) {
        perf.profit_attributable_current = caps.get(1).and_then(|m| parse_number(m.as_str()));
        perf.profit_attributable_prior = caps.get(2).and_then(|m| parse_number(m.as_str()));
        perf.profit_source_snippet =
            snippet_at_keyword(text, &kw.profit_mentions, SNIPPET_MAX_CHARS);
    }

    perf.eps_change_pct = percentage_change(perf.eps_current, perf.eps_prior);
    perf.profit_attributable_change_pct = percentage_change(
        perf.profit_attributable_current,
        perf.profit_attributable_prior,
    );

    (perf, eps_matched)
}

/// Bounded excerpt starting at the first occurrence of any defining
/// keyword; no keyword means no snippet.
fn snippet_at_keyword(text: &str, patterns: &[Regex], max_chars: usize) -> Option<String> {
    let pos = patterns
        .iter()
        .filter_map(|re| re.find(text).map(|m| m.start()))
        .min()?;
    Some(text[pos..].chars().take(max_chars).collect())
}

/// Scans the window `[idx - before, idx + after]`, clipped to the document.
pub fn scan_window(
    corpus: &PageCorpus,
    kw: &CompiledKeywords,
    idx: usize,
    before: usize,
    after: usize,
) -> (FinancialPerformance, bool) {
    let last = match corpus.last_index() {
        Some(last) => last,
        None => return (FinancialPerformance::default(), false),
    };
    let start = idx.saturating_sub(before);
    let end = idx.saturating_add(after).min(last);
    let text = corpus.join_range(start, end, "\n");
    let (mut perf, eps_matched) = extract_pairs(&text, kw);
    if eps_matched {
        perf.source_pages = Some(SectionRange { start, end });
    }
    (perf, eps_matched)
}

/// Windowed scan over the candidate pages, then a single whole-document
/// fallback. The first candidate window with an EPS match wins and scanning
/// stops there; this is a deliberate determinism/performance trade-off, so
/// do not upgrade it to best-of-all-candidates.
pub fn extract_financial_performance(
    corpus: &PageCorpus,
    kw: &CompiledKeywords,
) -> FinancialPerformance {
    for idx in find_candidate_pages(corpus, kw) {
        let (perf, eps_matched) = scan_window(corpus, kw, idx, WINDOW_BEFORE, WINDOW_AFTER);
        if eps_matched {
            log::debug!(
                "EPS pair found in window around page {}: current={:?}, prior={:?}",
                idx + 1,
                perf.eps_current,
                perf.eps_prior
            );
            return perf;
        }
    }

    // Whole-document fallback, attempted exactly once.
    let last = match corpus.last_index() {
        Some(last) => last,
        None => return FinancialPerformance::default(),
    };
    let text = corpus.join_all("\n");
    let (mut perf, eps_matched) = extract_pairs(&text, kw);
    if eps_matched {
        log::debug!("EPS pair found via whole-document fallback");
        perf.source_pages = Some(SectionRange { start: 0, end: last });
    }
    perf
}
