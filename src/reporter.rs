use crate::detector;
use crate::models::{
    AuditReport, AuditSummary, Issue, IssueType, PageRecord, Severity, SiteChecks, UrlStatus,
};
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use colored::*;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const PAGES_CSV: &str = "pages_detailed.csv";
pub const IMAGES_CSV: &str = "images_detailed.csv";
pub const LINKS_CSV: &str = "links.csv";
pub const ISSUES_CSV: &str = "issues_prioritized.csv";
pub const MARKDOWN_REPORT: &str = "comprehensive_audit_report.md";

const PAGES_HEADERS: [&str; 22] = [
    "url",
    "status",
    "title",
    "title_length",
    "meta_desc",
    "meta_desc_len",
    "canonical",
    "h1",
    "word_count",
    "headings_count",
    "has_featured_image",
    "internal_links",
    "external_links",
    "images",
    "images_with_alt",
    "mixed_content",
    "publish_date",
    "categories",
    "content_quality_score",
    "readability_score",
    "has_og_image",
    "has_schema_markup",
];
const IMAGES_HEADERS: [&str; 6] = ["page", "src", "alt", "has_alt", "alt_length", "status"];
const LINKS_HEADERS: [&str; 3] = ["from", "to", "type"];
const ISSUES_HEADERS: [&str; 4] = ["url", "type", "severity", "detail"];

/// Pages scoring below this are listed as lowest quality.
pub const LOWEST_QUALITY_THRESHOLD: f64 = 60.0;
pub const RECENT_POST_DAYS: i64 = 30;
const LIST_LIMIT: usize = 10;

const PRIORITY_ACTIONS: [&str; 6] = [
    "**Fix Broken Content:** address broken links and images first",
    "**Add Missing Images:** give every post a relevant image and a featured image",
    "**Improve Alt Text:** describe every image for screen readers",
    "**Enhance Content Quality:** start with pages scoring below 70",
    "**SEO Optimization:** fill in titles, meta descriptions and social tags",
    "**Content Structure:** add subheadings and simplify long sentences",
];

/// Counts behind the console alerts and the critical-issues section.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Alerts {
    pub without_images: usize,
    pub without_featured_image: usize,
    pub low_quality: usize,
}

impl Alerts {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut alerts = Self::default();
        for issue in issues {
            match issue.issue_type {
                IssueType::Images if issue.detail.contains("No images found") => {
                    alerts.without_images += 1
                }
                IssueType::Images if issue.detail.contains("featured image") => {
                    alerts.without_featured_image += 1
                }
                IssueType::ContentQuality if issue.severity == Severity::High => {
                    alerts.low_quality += 1
                }
                _ => {}
            }
        }
        alerts
    }
}

pub struct Reporter;

impl Reporter {
    pub fn generate_report(
        start_url: &str,
        pages: &BTreeMap<String, PageRecord>,
        link_statuses: &BTreeMap<String, UrlStatus>,
        image_statuses: &BTreeMap<String, UrlStatus>,
        issues: &[Issue],
        site_checks: &SiteChecks,
    ) -> AuditReport {
        let summary = Self::calculate_summary(pages, link_statuses, image_statuses, issues);

        AuditReport {
            start_url: start_url.to_string(),
            generated_at: Utc::now(),
            pages: pages.clone(),
            link_statuses: link_statuses.clone(),
            image_statuses: image_statuses.clone(),
            issues: issues.to_vec(),
            site_checks: site_checks.clone(),
            summary,
        }
    }

    pub fn calculate_summary(
        pages: &BTreeMap<String, PageRecord>,
        link_statuses: &BTreeMap<String, UrlStatus>,
        image_statuses: &BTreeMap<String, UrlStatus>,
        issues: &[Issue],
    ) -> AuditSummary {
        let mut summary = AuditSummary {
            total_pages: pages.len(),
            total_links: link_statuses.len(),
            total_images: image_statuses.len(),
            total_issues: issues.len(),
            ..Default::default()
        };

        for issue in issues {
            match issue.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
        }

        summary.broken_links = link_statuses.values().filter(|s| s.is_broken()).count();
        summary.broken_images = image_statuses.values().filter(|s| s.is_broken()).count();
        summary.pages_with_images = pages.values().filter(|p| !p.images.is_empty()).count();
        summary.pages_with_featured_images =
            pages.values().filter(|p| p.has_featured_image).count();

        if !pages.is_empty() {
            let n = pages.len() as f64;
            summary.average_word_count =
                pages.values().map(|p| p.word_count as f64).sum::<f64>() / n;
            summary.average_quality_score =
                pages.values().map(|p| p.quality_score).sum::<f64>() / n;
        }

        summary
    }

    /// Writes the four CSVs and the markdown report into `dir`, replacing
    /// any previous run's files.
    pub fn write_artifacts(report: &AuditReport, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let pages_path = dir.join(PAGES_CSV);
        Self::write_pages_csv(Self::create(&pages_path)?, report)?;

        let images_path = dir.join(IMAGES_CSV);
        Self::write_images_csv(Self::create(&images_path)?, report)?;

        let links_path = dir.join(LINKS_CSV);
        Self::write_links_csv(Self::create(&links_path)?, report)?;

        let issues_path = dir.join(ISSUES_CSV);
        Self::write_issues_csv(Self::create(&issues_path)?, &report.issues)?;

        let markdown_path = dir.join(MARKDOWN_REPORT);
        fs::write(&markdown_path, Self::render_markdown(report))
            .with_context(|| format!("Failed to write {}", markdown_path.display()))?;

        Ok(vec![
            markdown_path,
            pages_path,
            images_path,
            issues_path,
            links_path,
        ])
    }

    fn create(path: &Path) -> Result<File> {
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))
    }

    pub fn write_pages_csv<W: Write>(out: W, report: &AuditReport) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(PAGES_HEADERS)?;

        for page in report.pages.values() {
            writer.write_record([
                page.url.clone(),
                page.status.to_string(),
                page.title.clone(),
                page.title.chars().count().to_string(),
                page.meta_description.clone(),
                page.meta_description.chars().count().to_string(),
                page.canonical_url.clone(),
                page.h1.clone(),
                page.word_count.to_string(),
                page.headings.len().to_string(),
                yes_no(page.has_featured_image),
                page.internal_links.len().to_string(),
                page.external_links.len().to_string(),
                page.images.len().to_string(),
                page.images_with_alt().to_string(),
                yes_no(page.mixed_content),
                page.publish_date.clone().unwrap_or_default(),
                page.categories.join(", "),
                format!("{:.1}", page.quality_score),
                page.readability.to_string(),
                yes_no(page.has_social("og:image")),
                yes_no(page.has_schema_markup),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_images_csv<W: Write>(out: W, report: &AuditReport) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(IMAGES_HEADERS)?;

        for image in detector::image_refs(&report.pages) {
            let status = report
                .image_statuses
                .get(&image.src)
                .map(|s| s.status.to_string())
                .unwrap_or_default();
            writer.write_record([
                image.page.clone(),
                image.src.clone(),
                image.alt.clone(),
                yes_no(!image.alt.trim().is_empty()),
                image.alt.chars().count().to_string(),
                status,
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_links_csv<W: Write>(out: W, report: &AuditReport) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(LINKS_HEADERS)?;

        for edge in detector::link_edges(&report.pages) {
            writer.write_record([edge.from, edge.to, edge.kind.to_string()])?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write_issues_csv<W: Write>(out: W, issues: &[Issue]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(ISSUES_HEADERS)?;

        for issue in issues {
            writer.write_record([
                issue.url.clone(),
                issue.issue_type.to_string(),
                issue.severity.to_string(),
                issue.detail.clone(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Narrative summary in markdown. Pure: "recent" is measured from the
    /// report's own timestamp.
    pub fn render_markdown(report: &AuditReport) -> String {
        let s = &report.summary;
        let checks = &report.site_checks;
        let count = |issue_type: IssueType| {
            report
                .issues
                .iter()
                .filter(|i| i.issue_type == issue_type)
                .count()
        };

        let mut lines: Vec<String> = vec![
            "# Comprehensive Site Health Audit Report".to_string(),
            String::new(),
            format!(
                "**Generated:** {}  ",
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            format!("**Start URL:** {}  ", report.start_url),
            format!("**Pages Analyzed:** {}  ", s.total_pages),
            format!("**robots.txt:** {}  ", found_missing(checks.robots_txt)),
        ];
        lines.push(match &checks.sitemap {
            Some(url) => format!("**Sitemap:** Found ({})", url),
            None => "**Sitemap:** Missing".to_string(),
        });
        if !checks.declared_sitemaps.is_empty() {
            lines.push(String::new());
            lines.push("Sitemaps declared in robots.txt:".to_string());
            lines.extend(checks.declared_sitemaps.iter().map(|url| format!("- {}", url)));
        }
        lines.push(String::new());

        lines.push("## Content Quality Overview".to_string());
        lines.push(format!(
            "- **Average Word Count:** {:.0} words",
            s.average_word_count
        ));
        lines.push(format!(
            "- **Average Quality Score:** {:.1}/100",
            s.average_quality_score
        ));
        lines.push(format!(
            "- **Pages with Images:** {}/{} ({:.1}%)",
            s.pages_with_images,
            s.total_pages,
            percent(s.pages_with_images, s.total_pages)
        ));
        lines.push(format!(
            "- **Pages with Featured Images:** {}/{} ({:.1}%)",
            s.pages_with_featured_images,
            s.total_pages,
            percent(s.pages_with_featured_images, s.total_pages)
        ));
        lines.push(String::new());

        lines.push("## Issues by Type and Severity".to_string());
        lines.push("| type | high | medium | low | total |".to_string());
        lines.push("|---|---|---|---|---|".to_string());
        for issue_type in IssueType::ALL {
            let by_severity = Severity::ALL.map(|severity| {
                report
                    .issues
                    .iter()
                    .filter(|i| i.issue_type == issue_type && i.severity == severity)
                    .count()
            });
            let total: usize = by_severity.iter().sum();
            if total > 0 {
                lines.push(format!(
                    "| {} | {} | {} | {} | {} |",
                    issue_type, by_severity[0], by_severity[1], by_severity[2], total
                ));
            }
        }
        lines.push(format!(
            "| **all** | {} | {} | {} | {} |",
            s.high, s.medium, s.low, s.total_issues
        ));
        lines.push(String::new());

        let alerts = Alerts::from_issues(&report.issues);
        lines.push("## Critical Issues Summary".to_string());
        lines.push(format!("- **Broken Links:** {}", count(IssueType::BrokenLink)));
        lines.push(format!("- **Broken Images:** {}", count(IssueType::BrokenImage)));
        lines.push(format!("- **Pages Without Images:** {}", alerts.without_images));
        lines.push(format!(
            "- **Pages Without Featured Images:** {}",
            alerts.without_featured_image
        ));
        lines.push(format!("- **Low Quality Content:** {}", alerts.low_quality));
        lines.push(format!(
            "- **Missing Alt Text Issues:** {}",
            count(IssueType::Accessibility)
        ));
        lines.push(String::new());

        lines.push("## SEO & Social Media Issues".to_string());
        lines.push(format!("- **SEO Issues:** {}", count(IssueType::Seo)));
        lines.push(format!(
            "- **Social Media Issues:** {}",
            count(IssueType::SocialMedia)
        ));
        lines.push(format!(
            "- **Duplicate Titles:** {}",
            count(IssueType::DuplicateTitle)
        ));
        lines.push(format!(
            "- **Duplicate Canonicals:** {}",
            count(IssueType::DuplicateCanonical)
        ));
        lines.push(format!(
            "- **Orphaned Pages:** {}",
            count(IssueType::InternalLinking)
        ));
        lines.push(String::new());

        let recent = Self::recent_pages_without_images(report);
        if !recent.is_empty() {
            lines.push(format!(
                "## Recent Posts Without Images (Last {} Days)",
                RECENT_POST_DAYS
            ));
            lines.extend(recent.iter().take(LIST_LIMIT).map(|url| format!("- {}", url)));
            if recent.len() > LIST_LIMIT {
                lines.push(format!("- ... and {} more", recent.len() - LIST_LIMIT));
            }
            lines.push(String::new());
        }

        let lowest = Self::lowest_quality_pages(report);
        if !lowest.is_empty() {
            lines.push("## Lowest Quality Posts".to_string());
            lines.extend(
                lowest
                    .iter()
                    .map(|(url, score)| format!("- {} (Score: {:.1}/100)", url, score)),
            );
            lines.push(String::new());
        }

        lines.push("## Generated Files".to_string());
        lines.push(format!("- `{}`: page analysis with quality metrics", PAGES_CSV));
        lines.push(format!("- `{}`: image analysis with alt text status", IMAGES_CSV));
        lines.push(format!("- `{}`: all issues with severity levels", ISSUES_CSV));
        lines.push(format!("- `{}`: internal/external link mapping", LINKS_CSV));
        lines.push(String::new());

        lines.push("## Priority Action Items".to_string());
        lines.extend(
            PRIORITY_ACTIONS
                .iter()
                .enumerate()
                .map(|(i, action)| format!("{}. {}", i + 1, action)),
        );

        lines.join("\n") + "\n"
    }

    /// Parsed pages published within the last `RECENT_POST_DAYS` days of the
    /// report that have no images.
    pub fn recent_pages_without_images(report: &AuditReport) -> Vec<&str> {
        let cutoff = (report.generated_at - Duration::days(RECENT_POST_DAYS)).naive_utc();

        report
            .pages
            .values()
            .filter(|page| page.images.is_empty())
            .filter(|page| {
                page.publish_date
                    .as_deref()
                    .and_then(parse_publish_date)
                    .is_some_and(|published| published > cutoff)
            })
            .map(|page| page.url.as_str())
            .collect()
    }

    /// Up to ten parsed pages scoring below `LOWEST_QUALITY_THRESHOLD`,
    /// lowest first.
    pub fn lowest_quality_pages(report: &AuditReport) -> Vec<(&str, f64)> {
        let mut pages: Vec<(&str, f64)> = report
            .pages
            .values()
            .filter(|page| page.parsed && page.quality_score < LOWEST_QUALITY_THRESHOLD)
            .map(|page| (page.url.as_str(), page.quality_score))
            .collect();
        pages.sort_by(|a, b| a.1.total_cmp(&b.1));
        pages.truncate(LIST_LIMIT);
        pages
    }

    pub fn print_console_summary(report: &AuditReport, files: &[PathBuf]) {
        let s = &report.summary;

        println!();
        println!("{}", "Generated audit report:".bright_green().bold());
        for file in files {
            println!("  {}", file.display());
        }
        println!();

        println!(
            "{} {} pages analyzed, {} issues found",
            "Summary:".bright_white().bold(),
            s.total_pages.to_string().bright_green(),
            s.total_issues.to_string().yellow()
        );
        println!(
            "{} {} high-severity issues",
            "Priority:".bright_white().bold(),
            if s.high > 0 {
                s.high.to_string().bright_red()
            } else {
                s.high.to_string().bright_green()
            }
        );

        let alerts = Alerts::from_issues(&report.issues);

        if alerts.without_images > 0 {
            println!(
                "{} {} pages have no images",
                "Image Alert:".yellow().bold(),
                alerts.without_images
            );
        }
        if alerts.without_featured_image > 0 {
            println!(
                "{} {} pages missing featured images",
                "Featured Image Alert:".yellow().bold(),
                alerts.without_featured_image
            );
        }
        if alerts.low_quality > 0 {
            println!(
                "{} {} low content quality findings",
                "Content Alert:".yellow().bold(),
                alerts.low_quality
            );
        }
    }

    pub fn save_json_report(report: &AuditReport, filename: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(filename)
            .with_context(|| format!("Failed to create report file {}", filename))?;
        file.write_all(json.as_bytes())?;
        println!("Report saved to: {}", filename.bright_green());
        Ok(())
    }
}

fn yes_no(flag: bool) -> String {
    let value = if flag { "yes" } else { "no" };
    value.to_string()
}

fn found_missing(flag: bool) -> &'static str {
    if flag { "Found" } else { "Missing" }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Accepts `YYYY-MM-DD` and `YYYY-MM-DDTHH:MM:SS`, ignoring anything after
/// the seconds (fractions, offsets).
pub fn parse_publish_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let head: String = raw.chars().take(19).collect();

    if let Ok(dt) = NaiveDateTime::parse_from_str(&head, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }

    let day: String = raw.chars().take(10).collect();
    NaiveDate::parse_from_str(&day, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
