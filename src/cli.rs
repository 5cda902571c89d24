use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::favicon::resolver::AssetSource;

#[derive(Parser, Debug)]
#[command(
    name = "favhunt",
    about = "Favicon fingerprints and search-export triage for origin IP discovery",
    version
)]
pub struct Cli {
    /// Config file [default: ./.favhunt/config.toml, fallback ~/.config/favhunt/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the Shodan/FOFA/ZoomEye favicon hash of a site or icon file
    Hash(HashArgs),
    /// Label rows of a search-engine CSV export as CDN noise or origin candidates
    Triage(TriageArgs),
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
pub struct HashArgs {
    /// Site or icon URL (repeatable), e.g. https://example.com or https://example.com/favicon.ico
    #[arg(short, long, value_name = "URL", num_args = 1..)]
    pub url: Vec<String>,

    /// Local favicon file (repeatable)
    #[arg(short, long, value_name = "FILE", num_args = 1..)]
    pub file: Vec<PathBuf>,

    /// Do not try the default /favicon.ico path when the page declares no icon
    #[arg(long)]
    pub no_fallback: bool,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: HashFormat,

    /// Only print the fingerprint per target
    #[arg(short, long)]
    pub quiet: bool,
}

impl HashArgs {
    /// Targets in the order given: URLs first, then files.
    pub fn sources(&self) -> Vec<AssetSource> {
        self.url
            .iter()
            .cloned()
            .map(AssetSource::Url)
            .chain(self.file.iter().cloned().map(AssetSource::File))
            .collect()
    }
}

#[derive(Args, Debug)]
pub struct TriageArgs {
    /// CSV export (FOFA, Shodan, ...) with ip and org columns
    pub file: PathBuf,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: TriageFormat,

    /// Also list rows ignored as CDN noise
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum HashFormat {
    Terminal,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TriageFormat {
    Terminal,
    Json,
    Csv,
}
