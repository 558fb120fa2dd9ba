// ABOUTME: CLI for running scanlation site sources from the terminal and printing JSON.
// ABOUTME: Hosts the sources on a blocking reqwest fetcher; exits 1 with the error on stderr.

mod fetch;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use scanlate_core::{Filter, Options, Source};
use scanlate_sources::{deeplink, source_by_id, SOURCE_IDS};
use serde_json::{json, Value};

use crate::fetch::{ReqwestFetcher, DEFAULT_USER_AGENT};

/// Browse Turkish scanlation sites and print the results as JSON.
#[derive(Parser, Debug)]
#[command(name = "scanlate")]
#[command(about = "Run scanlation site sources and print JSON", long_about = None)]
struct Args {
    /// Source id: sadscans, alucardscans, merlintoon or merlinscans.
    source: String,

    #[command(subcommand)]
    command: Command,

    /// Use a mirror instead of the source's built-in base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Cap on chapter-list pages fetched for one series.
    #[arg(long, global = true)]
    max_pages: Option<u32>,

    /// Output compact JSON instead of pretty.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output", global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the source's static info.
    Info,
    Popular {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Latest {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search by text, or by `slug:<slug>` for a single series.
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Apply a filter option, e.g. `--filter status=completed`. Repeatable.
        #[arg(long = "filter", value_name = "PARAM=VALUE")]
        filters: Vec<String>,
    },
    /// List the search filters the source accepts.
    Filters,
    Detail { url: String },
    Chapters { url: String },
    Pages { url: String },
    /// Turn a site link into a `slug:` search query.
    Resolve { link: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    match run(&args).and_then(|value| emit(&args, &value)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<Value> {
    let source = build_source(args)?;

    let value = match &args.command {
        Command::Info => json!(source.info()),
        Command::Popular { page } => json!(source.popular(*page)?),
        Command::Latest { page } => json!(source.latest(*page)?),
        Command::Search {
            query,
            page,
            filters,
        } => {
            let filters = apply_filters(source.filters(), filters)?;
            json!(source.search(*page, query, &filters)?)
        }
        Command::Filters => json!(source.filters()),
        Command::Detail { url } => json!(source.series_detail(url)?),
        Command::Chapters { url } => json!(source.chapters(url)?),
        Command::Pages { url } => json!(source.pages(url)?),
        Command::Resolve { link } => {
            let resolved = deeplink::resolve(link)
                .ok_or_else(|| anyhow!("not a series link: {}", link))?;
            json!(resolved)
        }
    };
    Ok(value)
}

fn build_source(args: &Args) -> Result<Box<dyn Source>> {
    let user_agent = args.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    let http = ReqwestFetcher::new(Duration::from_secs(args.timeout), user_agent)
        .context("building HTTP client")?;

    let mut opts = Options::builder();
    if let Some(base_url) = &args.base_url {
        opts = opts.base_url(base_url);
    }
    if let Some(ua) = &args.user_agent {
        opts = opts.user_agent(ua);
    }
    if let Some(max) = args.max_pages {
        opts = opts.max_chapter_pages(max);
    }

    source_by_id(&args.source, Arc::new(http), opts.build()).ok_or_else(|| {
        anyhow!(
            "unknown source '{}' (expected one of: {})",
            args.source,
            SOURCE_IDS.join(", ")
        )
    })
}

/// Select options on the source's filters from `param=value` arguments.
fn apply_filters(mut filters: Vec<Filter>, choices: &[String]) -> Result<Vec<Filter>> {
    for choice in choices {
        let Some((param, value)) = choice.split_once('=') else {
            bail!("filter '{}' is not in PARAM=VALUE form", choice);
        };
        let param = param.trim();
        let idx = filters
            .iter()
            .position(|f| f.param == param || f.name.to_lowercase() == param.to_lowercase())
            .ok_or_else(|| anyhow!("unknown filter '{}'", param))?;
        let chosen = filters[idx]
            .clone()
            .with_choice(value.trim())
            .ok_or_else(|| anyhow!("filter '{}' has no option '{}'", param, value.trim()))?;
        filters[idx] = chosen;
    }
    Ok(filters)
}

fn emit(args: &Args, value: &Value) -> Result<()> {
    let rendered = if args.compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };

    match &args.output {
        Some(path) => fs::write(path, rendered + "\n")
            .with_context(|| format!("writing {}", path.display())),
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}
