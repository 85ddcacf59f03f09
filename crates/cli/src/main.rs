mod args;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfwatch_core::{
    load_config, select_auto_download, validate_config, BookMetadata, Config, FileMatch,
    FileMatcher, FileMatcherConfig, RankedRelease, Release, ReleaseMatcher,
};

use args::{Cli, Commands, MatchFileArgs, RankArgs};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Input document of `shelfwatch rank`.
#[derive(Debug, Deserialize)]
struct RankInput {
    book: BookMetadata,
    #[serde(default)]
    releases: Vec<Release>,
}

#[derive(Debug, Serialize)]
struct RankOutput<'a> {
    ranked: &'a [RankedRelease],
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_download: Option<Option<&'a RankedRelease>>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli) {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config)?;
    validate_config(&config).context("Configuration validation failed")?;

    match cli.command {
        Commands::Rank(args) => rank(&config, args),
        Commands::MatchFile(args) => match_file(&config, args),
    }
}

/// Explicit paths must exist; a missing default file means defaults.
fn resolve_config(flag: Option<PathBuf>) -> Result<Config> {
    let explicit = flag.or_else(|| std::env::var("SHELFWATCH_CONFIG").ok().map(PathBuf::from));
    let path = match explicit {
        Some(path) => path,
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !path.exists() {
                info!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
                return Ok(Config::default());
            }
            path
        }
    };

    info!("Loading configuration from {:?}", path);
    load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path)),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn parse_rank_input(raw: &str) -> Result<RankInput> {
    serde_json::from_str(raw).context("Invalid rank input, expected {\"book\": ..., \"releases\": [...]}")
}

fn rank(config: &Config, args: RankArgs) -> Result<()> {
    let input = parse_rank_input(&read_input(args.input.as_deref())?)?;

    let matcher = ReleaseMatcher::new(&config.release_scoring);
    let ranked = matcher.rank(&input.book, input.releases);

    let output = RankOutput {
        ranked: &ranked,
        auto_download: args
            .auto_download
            .then(|| select_auto_download(&ranked, &config.auto_download)),
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("Failed to serialize ranking")?;
    println!("{}", json);
    Ok(())
}

fn match_file(config: &Config, args: MatchFileArgs) -> Result<()> {
    let matcher_config = FileMatcherConfig {
        min_similarity: args
            .min_similarity
            .unwrap_or(config.file_matching.min_similarity),
    };
    let found: Option<FileMatch> =
        FileMatcher::with_config(matcher_config).best_match(&args.filename, &args.titles);
    println!(
        "{}",
        serde_json::to_string(&found).context("Failed to serialize match")?
    );
    Ok(())
}
