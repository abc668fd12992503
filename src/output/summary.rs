//! Markdown summary generation
//!
//! Human-readable reports for finished crawls and batches, printed by the
//! CLI when `--summary` is passed.

use crate::crawler::{BatchReport, CrawlReport, PageOutcome};
use std::collections::BTreeMap;

/// Maximum number of external hosts listed in a crawl summary
const MAX_LISTED_HOSTS: usize = 50;

/// Formats a crawl report as Markdown
///
/// # Arguments
///
/// * `report` - The finished crawl
///
/// # Returns
///
/// A Markdown document with overall counts, a depth breakdown, the pages
/// visited and any URLs that failed.
pub fn format_crawl_summary(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Crawl Summary\n\n");
    md.push_str(&format!("- **Base URL**: {}\n", report.base_url));
    md.push_str(&format!("- **Pages Crawled**: {}\n", report.total_pages));
    md.push_str(&format!("- **Failed URLs**: {}\n", report.failed_urls.len()));

    let internal: usize = report.pages.iter().map(|p| p.internal_links.len()).sum();
    let external: usize = report.pages.iter().map(|p| p.external_links.len()).sum();
    md.push_str(&format!("- **Internal Links**: {}\n", internal));
    md.push_str(&format!("- **External Links**: {}\n\n", external));

    // Depth breakdown
    let mut depths: BTreeMap<u32, usize> = BTreeMap::new();
    for page in &report.pages {
        *depths.entry(page.depth).or_default() += 1;
    }
    if !depths.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &depths {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !report.pages.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| Depth | URL | Title |\n");
        md.push_str("|-------|-----|-------|\n");
        for page in &report.pages {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                page.depth,
                table_cell(&page.url),
                table_cell(page.title.as_deref().unwrap_or(""))
            ));
        }
        md.push('\n');
    }

    // External hosts
    let mut hosts: BTreeMap<String, usize> = BTreeMap::new();
    for link in report.pages.iter().flat_map(|p| &p.external_links) {
        if let Some(host) = url::Url::parse(link)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        {
            *hosts.entry(host).or_default() += 1;
        }
    }
    if !hosts.is_empty() {
        md.push_str("## External Hosts\n\n");
        md.push_str(&format!("Total: {}\n\n", hosts.len()));
        for (host, count) in hosts.iter().take(MAX_LISTED_HOSTS) {
            md.push_str(&format!("- {} ({})\n", host, count));
        }
        if hosts.len() > MAX_LISTED_HOSTS {
            md.push_str(&format!(
                "\n... and {} more\n",
                hosts.len() - MAX_LISTED_HOSTS
            ));
        }
        md.push('\n');
    }

    if !report.failed_urls.is_empty() {
        md.push_str("## Failed URLs\n\n");
        for url in &report.failed_urls {
            md.push_str(&format!("- {}\n", url));
        }
        md.push('\n');
    }

    md
}

/// Formats a batch report as Markdown
pub fn format_batch_summary(report: &BatchReport) -> String {
    let mut md = String::new();

    md.push_str("# Batch Summary\n\n");
    md.push_str(&format!("- **Total URLs**: {}\n", report.results.len()));
    md.push_str(&format!("- **Successful**: {}\n", report.successful));
    md.push_str(&format!("- **Failed**: {}\n\n", report.failed));

    if !report.results.is_empty() {
        md.push_str("| Outcome | URL | Detail |\n");
        md.push_str("|---------|-----|--------|\n");
        for result in &report.results {
            let (outcome, detail) = match result {
                PageOutcome::Success { page, .. } => {
                    ("ok", page.title.clone().unwrap_or_default())
                }
                PageOutcome::Failure { message, .. } => ("failed", message.clone()),
            };
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                outcome,
                table_cell(result.url()),
                table_cell(&detail)
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps a value from breaking out of its table cell
fn table_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\n', '\r'], " ")
}
