pub mod cli;
pub mod config;
pub mod crawler;
pub mod detector;
pub mod fetcher;
pub mod http_client;
pub mod issues;
pub mod models;
pub mod parser;
pub mod quality;
pub mod reporter;
pub mod site_checks;
pub mod status_resolver;

use anyhow::Result;
use cli::Cli;
use colored::*;
use config::AuditConfig;
use crawler::Crawler;
use issues::{AuditInput, IssueAggregator};
use models::AuditReport;
use reporter::Reporter;
use status_resolver::StatusResolver;

pub async fn run(args: Cli) -> Result<()> {
    println!("{}", "Site Auditor - Health & Content Quality".bright_cyan().bold());
    println!("{}", "=".repeat(50).bright_blue());
    println!();

    let config = AuditConfig::from_cli(&args)?;

    println!("{} {}", "Starting crawl:".bright_white().bold(), config.start_url);
    println!("{} {}", "Max pages:".bright_white().bold(), config.max_pages);
    println!("{} {}", "Workers:".bright_white().bold(), config.worker_count);
    println!();

    let report = audit(&config, !args.verbose).await?;

    let files = Reporter::write_artifacts(&report, &config.output_dir)?;

    if let Some(filename) = args.save {
        Reporter::save_json_report(&report, &filename)?;
    }

    Reporter::print_console_summary(&report, &files);

    Ok(())
}

/// Crawls, resolves statuses, runs the side checks and folds everything into
/// a report. Writes nothing to disk.
pub async fn audit(config: &AuditConfig, show_progress: bool) -> Result<AuditReport> {
    let mut crawler = Crawler::new(config)?;
    if show_progress {
        crawler.enable_progress_bar();
    }
    crawler.crawl().await?;

    println!(
        "{} {} pages crawled",
        "Success:".bright_green().bold(),
        crawler.pages.len()
    );

    println!("{}", "Checking link and image statuses...".bright_yellow());
    let resolver = StatusResolver::new(config)?;
    let link_statuses = resolver
        .resolve_all(&detector::all_links(&crawler.pages))
        .await;
    let image_statuses = resolver
        .resolve_all(&detector::all_images(&crawler.pages))
        .await;
    tracing::info!(
        links = link_statuses.len(),
        images = image_statuses.len(),
        "Statuses resolved"
    );

    println!("{}", "Analyzing content quality issues...".bright_yellow());
    let start_url = config.start_url.to_string();
    let findings = detector::analyze(&crawler.pages, &start_url);
    let issues = IssueAggregator::aggregate(&AuditInput {
        start_url: &start_url,
        pages: &crawler.pages,
        link_statuses: &link_statuses,
        image_statuses: &image_statuses,
        findings: &findings,
    });

    println!("{}", "Checking robots.txt and sitemap...".bright_yellow());
    let client = http_client::client_for(config)?;
    let site_checks = site_checks::check_site(&client, &config.start_url).await;

    Ok(Reporter::generate_report(
        &start_url,
        &crawler.pages,
        &link_statuses,
        &image_statuses,
        &issues,
        &site_checks,
    ))
}
