use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Keyword and pattern sets driving section detection and financial
/// scanning. Kept as plain data so a corpus-specific set can be loaded from
/// JSON without code changes; `Default` carries the built-in sets.
///
/// `start_patterns`, `statement_header_patterns`, `eps_mention_patterns`,
/// `profit_mention_patterns` and the `*_value_pattern` fields are regexes
/// (matched case-insensitively). `signal_terms` and `break_terms` are plain
/// phrases, matched literally and case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub start_patterns: Vec<String>,
    pub section_keyword: String,
    pub signal_terms: Vec<String>,
    pub break_terms: Vec<String>,
    pub statement_header_patterns: Vec<String>,
    pub eps_mention_patterns: Vec<String>,
    pub profit_mention_patterns: Vec<String>,
    pub eps_value_pattern: String,
    pub eps_value_fallback_pattern: String,
    pub profit_value_pattern: String,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            start_patterns: vec![
                r"remuneration report".to_string(),
                r"remuneration report of the remuneration committee".to_string(),
                r"directors'? remuneration report".to_string(),
            ],
            section_keyword: "remuneration".to_string(),
            signal_terms: vec![
                "remuneration".to_string(),
                "compensation".to_string(),
                "base salary".to_string(),
                "bonus".to_string(),
                "incentive".to_string(),
                "long-term incentive".to_string(),
                "short-term incentive".to_string(),
                "ltip".to_string(),
                "stip".to_string(),
                "vesting".to_string(),
                "clawback".to_string(),
                "malus".to_string(),
                "executive director".to_string(),
                "non-executive director".to_string(),
                "remuneration committee".to_string(),
                "pay policy".to_string(),
                "pension".to_string(),
                "shareholding requirement".to_string(),
            ],
            break_terms: vec![
                "financial statements".to_string(),
                "consolidated financial statements".to_string(),
                "notes to the consolidated financial statements".to_string(),
                "independent auditor".to_string(),
                "statement of financial position".to_string(),
                "statement of cash flows".to_string(),
                "principal risks".to_string(),
                "risk management report".to_string(),
                "sustainability report".to_string(),
            ],
            statement_header_patterns: vec![
                r"consolidated (income statement|statement of comprehensive income)".to_string(),
                r"statement of profit or loss".to_string(),
                r"\bfinancial statements\b".to_string(),
            ],
            eps_mention_patterns: vec![
                r"basic and diluted earnings per share".to_string(),
                r"\beps\b".to_string(),
                r"earnings per share".to_string(),
            ],
            profit_mention_patterns: vec![r"profit attributable".to_string()],
            // Two numeric captures, (current, prior) in that order.
            eps_value_pattern:
                r"basic and diluted earnings per share.*?\n.*?([0-9]+\.[0-9]+)\s+([0-9]+\.[0-9]+)"
                    .to_string(),
            eps_value_fallback_pattern:
                r"earnings per share.*?([0-9]+\.[0-9]+)\s+([0-9]+\.[0-9]+)".to_string(),
            profit_value_pattern:
                r"profit attributable.*?\n.*?([0-9]{1,3}(?:,[0-9]{3})*)\s+([0-9]{1,3}(?:,[0-9]{3})*)"
                    .to_string(),
        }
    }
}

impl KeywordConfig {
    pub fn compile(&self) -> Result<CompiledKeywords> {
        Ok(CompiledKeywords {
            start: compile_each(&self.start_patterns, "start_patterns")?,
            section_keyword: compile_one(&self.section_keyword, "section_keyword")?,
            signal: compile_terms(&self.signal_terms, "signal_terms")?,
            breaks: compile_terms(&self.break_terms, "break_terms")?,
            statement_headers: compile_each(
                &self.statement_header_patterns,
                "statement_header_patterns",
            )?,
            eps_mentions: compile_each(&self.eps_mention_patterns, "eps_mention_patterns")?,
            profit_mentions: compile_each(&self.profit_mention_patterns, "profit_mention_patterns")?,
            eps_value: compile_dotall(&self.eps_value_pattern, "eps_value_pattern")?,
            eps_value_fallback: compile_dotall(
                &self.eps_value_fallback_pattern,
                "eps_value_fallback_pattern",
            )?,
            profit_value: compile_dotall(&self.profit_value_pattern, "profit_value_pattern")?,
        })
    }
}

/// Compiled form of [`KeywordConfig`]; built once per corpus run.
#[derive(Debug)]
pub struct CompiledKeywords {
    pub start: Vec<Regex>,
    pub section_keyword: Regex,
    pub signal: Regex,
    pub breaks: Regex,
    pub statement_headers: Vec<Regex>,
    pub eps_mentions: Vec<Regex>,
    pub profit_mentions: Vec<Regex>,
    pub eps_value: Regex,
    pub eps_value_fallback: Regex,
    pub profit_value: Regex,
}

/// Compiled built-in keyword sets.
pub fn defaults() -> &'static CompiledKeywords {
    static DEFAULTS: Lazy<CompiledKeywords> = Lazy::new(|| {
        KeywordConfig::default()
            .compile()
            .expect("built-in keyword patterns compile")
    });
    &DEFAULTS
}

fn compile_one(pattern: &str, field: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){}", pattern))
        .with_context(|| format!("invalid regex in {}: {}", field, pattern))
}

fn compile_dotall(pattern: &str, field: &str) -> Result<Regex> {
    Regex::new(&format!("(?is){}", pattern))
        .with_context(|| format!("invalid regex in {}: {}", field, pattern))
}

fn compile_each(patterns: &[String], field: &str) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile_one(p, field)).collect()
}

/// Literal phrases become one case-insensitive alternation. An empty term
/// list compiles to a regex that matches nothing.
fn compile_terms(terms: &[String], field: &str) -> Result<Regex> {
    if terms.is_empty() {
        return Regex::new(r"\b\B").with_context(|| format!("invalid terms in {}", field));
    }
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{})", alternation))
        .with_context(|| format!("invalid terms in {}", field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_compile() {
        let kw = defaults();
        assert!(kw.start[0].is_match("Directors' Remuneration Report"));
        assert!(kw.breaks.is_match("Independent Auditor's Report"));
    }

    #[test]
    fn test_signal_terms_count_occurrences() {
        let kw = defaults();
        let text = "Remuneration of the CEO includes a bonus and an LTIP award.";
        assert!(kw.signal.find_iter(text).count() >= 3);
    }

    #[test]
    fn test_partial_json_override_keeps_defaults() {
        let cfg: KeywordConfig =
            serde_json::from_str(r#"{"section_keyword": "verg[uü]tung"}"#).unwrap();
        assert_eq!(cfg.section_keyword, "verg[uü]tung");
        // untouched fields fall back to the built-in sets
        assert!(!cfg.start_patterns.is_empty());
        assert!(cfg.compile().is_ok());
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let cfg = KeywordConfig {
            start_patterns: vec!["(unclosed".to_string()],
            ..KeywordConfig::default()
        };
        assert!(cfg.compile().is_err());
    }
}
