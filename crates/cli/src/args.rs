//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shelfwatch")]
#[command(about = "Score and rank book releases against wanted books", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to $SHELFWATCH_CONFIG, then config.toml)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank releases for a book
    #[command(long_about = r#"
Read a JSON document of the form {"book": {...}, "releases": [...]} and
print the releases ranked best first, each with its score breakdown.
"#)]
    Rank(RankArgs),

    /// Match a downloaded filename against known titles
    MatchFile(MatchFileArgs),
}

#[derive(Args)]
pub struct RankArgs {
    /// Input file, `-` or omitted for stdin
    pub input: Option<PathBuf>,

    /// Also report which release would be downloaded automatically
    #[arg(long)]
    pub auto_download: bool,

    /// Pretty-print the output
    #[arg(long, short)]
    pub pretty: bool,
}

#[derive(Args)]
pub struct MatchFileArgs {
    /// Filename to match
    pub filename: String,

    /// Candidate title, repeatable
    #[arg(long = "title", short = 't', required = true)]
    pub titles: Vec<String>,

    /// Override the configured minimum similarity
    #[arg(long)]
    pub min_similarity: Option<f64>,
}
