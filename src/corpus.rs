use anyhow::{anyhow, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// A single page of extracted document text. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub text: String,
}

/// Ordered per-page texts for one document. Pages with failed upstream text
/// extraction are carried as empty strings, so downstream scoring can treat
/// every index uniformly.
#[derive(Debug, Clone, Default)]
pub struct PageCorpus {
    pages: Vec<Page>,
}

impl PageCorpus {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Page {
                index,
                text: text.into(),
            })
            .collect();
        Self { pages }
    }

    /// Builds a corpus from per-page extraction results. A failed page
    /// degrades to empty text instead of aborting the document.
    pub fn from_results<I, E>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, E>>,
        E: fmt::Display,
    {
        let pages = results
            .into_iter()
            .enumerate()
            .map(|(index, result)| {
                let text = match result {
                    Ok(text) => text,
                    Err(e) => {
                        log::warn!("page {}: text extraction failed: {}", index + 1, e);
                        String::new()
                    }
                };
                Page { index, text }
            })
            .collect();
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.pages.len().checked_sub(1)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Text of a page; out-of-range indices read as empty.
    pub fn text(&self, index: usize) -> &str {
        self.pages
            .get(index)
            .map(|p| p.text.as_str())
            .unwrap_or("")
    }

    /// Concatenates pages `[start, end]` inclusive, clipped to the document.
    pub fn join_range(&self, start: usize, end: usize, sep: &str) -> String {
        if self.pages.is_empty() || start > end {
            return String::new();
        }
        let end = end.min(self.pages.len() - 1);
        if start > end {
            return String::new();
        }
        self.pages[start..=end]
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(sep)
    }

    pub fn join_all(&self, sep: &str) -> String {
        match self.last_index() {
            Some(last) => self.join_range(0, last, sep),
            None => String::new(),
        }
    }
}

/// Loads page texts from a pages file: either a JSON array of strings
/// (extension `.json`) or plain text with form-feed page separators.
pub fn load_pages_from_file(path: &Path) -> Result<PageCorpus> {
    let raw = fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read pages file {}: {}", path.display(), e))?;
    let texts: Vec<String> = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid pages JSON in {}: {}", path.display(), e))?
    } else {
        raw.split('\u{000C}').map(str::to_string).collect()
    };
    Ok(PageCorpus::from_texts(texts))
}
