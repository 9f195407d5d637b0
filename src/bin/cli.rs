use anyhow::Result;
use remrep::corpus::load_pages_from_file;
use remrep::report::{extract_facts, keywords::KeywordConfig, NoopFiller};
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "remrep-cli",
    about = "Locate the remuneration report in per-page document text and extract structured facts"
)]
struct Opt {
    /// Pages file: a JSON array of page strings, or plain text with
    /// form-feed page separators
    #[structopt(parse(from_os_str))]
    pages: PathBuf,

    /// Keyword configuration JSON overriding the built-in pattern sets
    #[structopt(long, parse(from_os_str))]
    keywords: Option<PathBuf>,

    /// Write the facts JSON here instead of stdout
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let corpus = load_pages_from_file(&opt.pages)?;
    log::info!("loaded {} pages from {}", corpus.len(), opt.pages.display());

    let config = match &opt.keywords {
        Some(path) => serde_json::from_str::<KeywordConfig>(&fs::read_to_string(path)?)?,
        None => KeywordConfig::default(),
    };
    let compiled = config.compile()?;

    let facts = extract_facts(&corpus, &compiled, &NoopFiller)?;
    let json = serde_json::to_string_pretty(&facts)?;
    match &opt.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}
