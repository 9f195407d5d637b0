pub mod corpus;
pub mod report;

// Re-exports
pub use corpus::{load_pages_from_file, Page, PageCorpus};
pub use report::{extract_facts, ExtractError, FactFiller, FactRecord, NoopFiller};
