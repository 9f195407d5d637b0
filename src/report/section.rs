use serde::{Deserialize, Serialize};

use super::keywords::CompiledKeywords;
use super::ExtractError;
use crate::corpus::PageCorpus;

/// Lookahead used when scoring a candidate start page.
pub const SCORE_WINDOW: usize = 5;
/// Candidates earlier than this are treated as table-of-contents noise,
/// unless they are all we have.
pub const FRONT_MATTER_PAGES: usize = 5;
/// Hard bound on forward scanning for the section end.
pub const MAX_SECTION_PAGES: usize = 40;
/// The end scan never terminates before this many pages into the section.
pub const MIN_SECTION_PAGES: usize = 3;
/// Consecutive signal-free pages required before a break marker is trusted.
pub const MAX_GAP_WITHOUT_SIGNAL: usize = 3;

/// Inclusive, 0-based page range of the located section.
/// Invariant: `start <= end <= last page index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRange {
    pub start: usize,
    pub end: usize,
}

impl SectionRange {
    pub fn page_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Pages whose text matches any section-title pattern, in page order.
pub fn find_candidate_starts(corpus: &PageCorpus, kw: &CompiledKeywords) -> Vec<usize> {
    corpus
        .pages()
        .iter()
        .filter(|page| kw.start.iter().any(|re| re.is_match(&page.text)))
        .map(|page| page.index)
        .collect()
}

/// Scores a candidate start page over the lookahead window `[idx, idx+window)`:
/// occurrences of the core section keyword, and total word count as a
/// tie-breaker. A genuine section start is followed by keyword-dense text; a
/// stray contents entry is not.
pub fn score_candidate(
    corpus: &PageCorpus,
    kw: &CompiledKeywords,
    idx: usize,
    window: usize,
) -> (usize, usize) {
    let end = idx + window.max(1) - 1;
    let text = corpus.join_range(idx, end, "\n");
    let keyword_count = kw.section_keyword.find_iter(&text).count();
    let word_count = text.split_whitespace().count();
    (keyword_count, word_count)
}

/// Picks the best start page: candidates inside the front matter are dropped
/// unless that removes every candidate, then the maximum of
/// (keyword_count, word_count, page index) wins. Later pages win full ties
/// since repeat occurrences tend to be the section body, not an index entry.
pub fn choose_best_start(corpus: &PageCorpus, kw: &CompiledKeywords) -> Option<usize> {
    let all = find_candidate_starts(corpus, kw);
    if all.is_empty() {
        return None;
    }

    let late: Vec<usize> = all
        .iter()
        .copied()
        .filter(|&idx| idx >= FRONT_MATTER_PAGES)
        .collect();
    let candidates = if late.is_empty() { all } else { late };

    let scored: Vec<(usize, usize, usize)> = candidates
        .into_iter()
        .map(|idx| {
            let (keyword_count, word_count) = score_candidate(corpus, kw, idx, SCORE_WINDOW);
            (idx, keyword_count, word_count)
        })
        .collect();

    for (idx, keyword_count, word_count) in &scored {
        log::debug!(
            "section start candidate page {}: keyword_count={}, word_count={}",
            idx + 1,
            keyword_count,
            word_count
        );
    }

    let best = scored
        .into_iter()
        .max_by_key(|&(idx, keyword_count, word_count)| (keyword_count, word_count, idx))
        .map(|(idx, _, _)| idx)?;
    log::debug!("chosen section start page {}", best + 1);
    Some(best)
}

/// Forward-scans from `start` for the last page that still belongs to the
/// section, using the default bounds.
pub fn find_end_page(corpus: &PageCorpus, kw: &CompiledKeywords, start: usize) -> usize {
    find_end_page_with(
        corpus,
        kw,
        start,
        MAX_SECTION_PAGES,
        MIN_SECTION_PAGES,
        MAX_GAP_WITHOUT_SIGNAL,
    )
}

/// Two-signal decay scan. Each page contributes a signal score (in-section
/// keyword hits) and a break score (out-of-section marker hits). A signal
/// resets the gap counter and records the page; once past `min_pages`, a gap
/// of `max_gap` signal-free pages confirmed by a break marker on the current
/// page terminates the scan at the last signalling page. The gap alone is
/// never enough: a page of pure numeric tables must not truncate the
/// section. Reaching `start + max_pages` inside the document returns that
/// bound; running off the document end returns the last signalling page.
pub fn find_end_page_with(
    corpus: &PageCorpus,
    kw: &CompiledKeywords,
    start: usize,
    max_pages: usize,
    min_pages: usize,
    max_gap: usize,
) -> usize {
    let last = match corpus.last_index() {
        Some(last) => last,
        None => return start,
    };
    let bound = start.saturating_add(max_pages);
    let hard_stop = bound.min(last);

    let mut last_signal_idx = start;
    let mut gap_count = 0usize;

    for idx in start..=hard_stop {
        let text = corpus.text(idx);
        let signal_score = kw.signal.find_iter(text).count();
        let break_score = kw.breaks.find_iter(text).count();

        if signal_score > 0 {
            last_signal_idx = idx;
            gap_count = 0;
        } else {
            gap_count += 1;
        }

        if idx >= start + min_pages && gap_count >= max_gap && break_score > 0 {
            log::debug!(
                "section end: break marker on page {} after {} signal-free pages",
                idx + 1,
                gap_count
            );
            return last_signal_idx.max(start);
        }
    }

    if bound <= last {
        bound
    } else {
        last_signal_idx.max(start)
    }
}

/// Locates the section and returns its page range together with the
/// concatenated text blob for the downstream fact-filling step.
pub fn extract_section(
    corpus: &PageCorpus,
    kw: &CompiledKeywords,
) -> Result<(SectionRange, String), ExtractError> {
    let start = choose_best_start(corpus, kw).ok_or(ExtractError::SectionNotFound)?;
    let end = find_end_page(corpus, kw, start);
    let range = SectionRange { start, end };
    let text = corpus.join_range(start, end, "\n\n");
    Ok((range, text))
}
