pub mod facts;
pub mod financial;
pub mod keywords;
pub mod postprocess;
pub mod section;

pub use facts::{FactRecord, IncentiveMetric, SalaryRecord};
pub use financial::{extract_financial_performance, FinancialPerformance};
pub use keywords::{CompiledKeywords, KeywordConfig};
pub use postprocess::postprocess_facts;
pub use section::{extract_section, SectionRange};

use anyhow::Result;

use crate::corpus::PageCorpus;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// No page anywhere matches a start-of-section pattern; the document
    /// cannot be processed further.
    #[error("no remuneration report section found in document")]
    SectionNotFound,
}

/// Seam for the external fact-filling collaborator (in production an LLM
/// call over the section text blob). The core never performs I/O here.
pub trait FactFiller {
    fn fill(&self, section_text: &str) -> Result<FactRecord>;
}

/// Filler that extracts nothing, leaving all narrative fields to the
/// deterministic stages.
pub struct NoopFiller;

impl FactFiller for NoopFiller {
    fn fill(&self, _section_text: &str) -> Result<FactRecord> {
        Ok(FactRecord::default())
    }
}

/// Full extraction pass over one document: locate the remuneration section
/// (the only hard-failure point), run the fact filler on its text, scan the
/// whole corpus for financial pairs, then fill derived values. The returned
/// record is complete; callers must not mutate it further.
pub fn extract_facts(
    corpus: &PageCorpus,
    kw: &CompiledKeywords,
    filler: &dyn FactFiller,
) -> Result<FactRecord> {
    let (range, section_text) = section::extract_section(corpus, kw)?;
    log::info!(
        "remuneration section pages {}-{}",
        range.start + 1,
        range.end + 1
    );

    let mut record = filler.fill(&section_text)?;
    if record.rem_pages_start.is_none() {
        record.rem_pages_start = Some(range.start + 1);
    }
    if record.rem_pages_end.is_none() {
        record.rem_pages_end = Some(range.end + 1);
    }

    let scanned = financial::extract_financial_performance(corpus, kw);
    merge_financial(&mut record.financial_performance, scanned);

    postprocess_facts(&mut record);
    Ok(record)
}

/// Fills absent financial fields from the scanner without overriding
/// values the filler already supplied.
fn merge_financial(into: &mut FinancialPerformance, from: FinancialPerformance) {
    macro_rules! fill {
        ($field:ident) => {
            if into.$field.is_none() {
                into.$field = from.$field;
            }
        };
    }
    fill!(eps_current);
    fill!(eps_prior);
    fill!(eps_change_pct);
    fill!(profit_attributable_current);
    fill!(profit_attributable_prior);
    fill!(profit_attributable_change_pct);
    fill!(eps_source_snippet);
    fill!(profit_source_snippet);
    fill!(source_pages);
}
