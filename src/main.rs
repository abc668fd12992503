//! page-trawl main entry point
//!
//! Command-line front end for the tool operations. Each subcommand builds a
//! request, runs it through the toolkit and prints the JSON response.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use page_trawl::config::{load_config, validate, Config};
use page_trawl::output::{format_batch_summary, format_crawl_summary};
use page_trawl::progress::ProgressReporter;
use page_trawl::tools::{
    CrawlSiteRequest, HtmlToMarkdownRequest, ListFilesRequest, SanitizeHtmlRequest,
    ScrapeBatchRequest, ScrapePageRequest, ToolOutput,
};
use page_trawl::Toolkit;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// page-trawl: HTML extraction and site inventory
///
/// Fetches pages, strips executable markup, converts what remains to
/// Markdown and walks a site's internal links within fixed bounds.
#[derive(Parser, Debug)]
#[command(name = "page-trawl")]
#[command(version)]
#[command(about = "HTML extraction and site inventory", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape one page and print it as Markdown
    Scrape {
        url: String,

        /// Include the sanitized HTML in the output
        #[arg(long)]
        html: bool,

        /// CSS selector whose matches are extracted
        #[arg(long)]
        selector: Option<String>,

        /// Save the Markdown under the output directory
        #[arg(long, value_name = "FILENAME", num_args = 0..=1, default_missing_value = "")]
        save: Option<String>,
    },

    /// Scrape several pages with bounded concurrency
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,

        /// URLs fetched at the same time
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// CSS selector applied to every page
        #[arg(long)]
        selector: Option<String>,

        /// Print a Markdown summary instead of JSON
        #[arg(long)]
        summary: bool,
    },

    /// Crawl a site breadth first from a seed URL
    Crawl {
        seed: String,

        /// Maximum link distance from the seed
        #[arg(long)]
        max_depth: Option<u32>,

        /// Maximum number of pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Keep links to other hosts in page records
        #[arg(long)]
        include_external: bool,

        /// Only follow links matching this wildcard pattern
        #[arg(long)]
        filter: Option<String>,

        /// Save the page inventory under the output directory
        #[arg(long)]
        save: bool,

        /// Print a Markdown summary instead of JSON
        #[arg(long)]
        summary: bool,
    },

    /// Sanitize an HTML file
    Sanitize { file: PathBuf },

    /// Convert an HTML file to Markdown
    Markdown {
        file: PathBuf,

        /// Save the Markdown under the output directory
        #[arg(long, value_name = "FILENAME", num_args = 0..=1, default_missing_value = "")]
        save: Option<String>,
    },

    /// List saved files
    List {
        /// Directory relative to the output directory
        dir: Option<String>,

        /// Wildcard filter on file names
        #[arg(long)]
        pattern: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => {
            let config = Config::default();
            validate(&config)?;
            config
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    let progress = if cli.quiet {
        ProgressReporter::silent()
    } else {
        ProgressReporter::new(|event| eprintln!("[{}] {}", event.stage, event.message))
    };

    let toolkit = Toolkit::from_config(&config);
    let succeeded = run(cli.command, &toolkit, &progress, &cancel).await?;

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_trawl=info,warn"),
            1 => EnvFilter::new("page_trawl=debug,info"),
            2 => EnvFilter::new("page_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs one subcommand; returns whether it succeeded
async fn run(
    command: Command,
    toolkit: &Toolkit,
    progress: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<bool> {
    match command {
        Command::Scrape {
            url,
            html,
            selector,
            save,
        } => {
            let request = ScrapePageRequest {
                url,
                include_html: html,
                selector,
                save_markdown: save.is_some(),
                filename: save.filter(|name| !name.is_empty()),
            };
            print_json(ToolOutput::from(
                toolkit.scrape_page(request, progress, cancel).await,
            ))
        }
        Command::Batch {
            urls,
            max_concurrent,
            selector,
            summary,
        } => {
            let request = ScrapeBatchRequest {
                urls,
                max_concurrent,
                include_html: false,
                selector,
            };
            let result = toolkit.scrape_batch(request, progress, cancel).await;
            match result {
                Ok(response) if summary => {
                    println!("{}", format_batch_summary(&response.report));
                    Ok(true)
                }
                other => print_json(ToolOutput::from(other)),
            }
        }
        Command::Crawl {
            seed,
            max_depth,
            max_pages,
            include_external,
            filter,
            save,
            summary,
        } => {
            let request = CrawlSiteRequest {
                url: seed,
                max_depth,
                max_pages,
                include_external: include_external.then_some(true),
                link_filter: filter,
                save_artifact: save,
            };
            let result = toolkit.crawl_site(request, progress, cancel).await;
            match result {
                Ok(response) if summary => {
                    println!("{}", format_crawl_summary(&response.report));
                    if let Some(path) = response.saved_path {
                        eprintln!("Saved crawl artifact to {}", path);
                    }
                    Ok(true)
                }
                other => print_json(ToolOutput::from(other)),
            }
        }
        Command::Sanitize { file } => {
            let html = read_html(&file).await?;
            let response = toolkit.sanitize_html(SanitizeHtmlRequest { html });
            print_json(ToolOutput::success(response))
        }
        Command::Markdown { file, save } => {
            let html = read_html(&file).await?;
            let request = HtmlToMarkdownRequest {
                html,
                save_markdown: save.is_some(),
                filename: save.filter(|name| !name.is_empty()),
            };
            print_json(ToolOutput::success(toolkit.html_to_markdown(request).await))
        }
        Command::List { dir, pattern } => {
            let request = ListFilesRequest {
                directory: dir,
                pattern,
            };
            print_json(ToolOutput::from(toolkit.list_files(request).await))
        }
    }
}

async fn read_html(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

fn print_json<T: Serialize>(output: ToolOutput<T>) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(output.is_success())
}
