use crate::models::{Issue, IssueType, PageRecord, Severity, SiteFindings, UrlStatus};
use std::collections::BTreeMap;

pub const TITLE_MAX_CHARS: usize = 60;
pub const TITLE_MIN_CHARS: usize = 30;
pub const META_DESC_MAX_CHARS: usize = 160;
pub const META_DESC_MIN_CHARS: usize = 120;
pub const VERY_SHORT_CONTENT_WORDS: usize = 300;
pub const SHORT_CONTENT_WORDS: usize = 500;
pub const FEW_SUBHEADINGS: usize = 2;
pub const LOW_QUALITY_SCORE: f64 = 50.0;
pub const MEDIUM_QUALITY_SCORE: f64 = 70.0;

/// Everything the aggregator folds over. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct AuditInput<'a> {
    pub start_url: &'a str,
    pub pages: &'a BTreeMap<String, PageRecord>,
    pub link_statuses: &'a BTreeMap<String, UrlStatus>,
    pub image_statuses: &'a BTreeMap<String, UrlStatus>,
    pub findings: &'a SiteFindings,
}

pub struct IssueAggregator;

impl IssueAggregator {
    /// All issues, high severity first. Within a severity, page issues come
    /// in page order, followed by broken links, broken images and duplicates.
    pub fn aggregate(input: &AuditInput<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();

        for (url, page) in input.pages {
            Self::analyze_page(page, &mut issues);
            if input.findings.orphans.contains(url) && url != input.start_url {
                issues.push(Issue::new(
                    url,
                    IssueType::InternalLinking,
                    Severity::Medium,
                    "No internal inbound links (orphan risk)",
                ));
            }
        }

        Self::broken(input.link_statuses, IssueType::BrokenLink, &mut issues);
        Self::broken(input.image_statuses, IssueType::BrokenImage, &mut issues);

        for group in &input.findings.duplicate_titles {
            issues.push(Issue::new(
                group.urls.join(", "),
                IssueType::DuplicateTitle,
                Severity::Medium,
                format!("\"{}\" appears on {} pages", group.value, group.urls.len()),
            ));
        }

        for group in &input.findings.duplicate_canonicals {
            issues.push(Issue::new(
                group.urls.join(", "),
                IssueType::DuplicateCanonical,
                Severity::High,
                format!("Canonical {} used by {} pages", group.value, group.urls.len()),
            ));
        }

        issues.sort_by_key(|issue| issue.severity);
        issues
    }

    /// Per-page checks. Content checks only apply to pages parsed as HTML.
    pub fn analyze_page(page: &PageRecord, issues: &mut Vec<Issue>) {
        let url = page.url.as_str();
        let mut push = |issue_type, severity, detail: String| {
            issues.push(Issue::new(url, issue_type, severity, detail));
        };

        if page.status != 200 {
            push(
                IssueType::PageStatus,
                Severity::High,
                format!("HTTP {}", page.status),
            );
        }

        if !page.parsed {
            return;
        }

        // Title
        let title_len = page.title.chars().count();
        if page.title.is_empty() {
            push(IssueType::Seo, Severity::High, "Missing <title>".to_string());
        } else if title_len > TITLE_MAX_CHARS {
            push(
                IssueType::Seo,
                Severity::Medium,
                format!("Long <title> ({} chars)", title_len),
            );
        } else if title_len < TITLE_MIN_CHARS {
            push(
                IssueType::Seo,
                Severity::Medium,
                format!("Short <title> ({} chars)", title_len),
            );
        }

        // Meta description
        let desc_len = page.meta_description.chars().count();
        if page.meta_description.is_empty() {
            push(
                IssueType::Seo,
                Severity::High,
                "Missing meta description".to_string(),
            );
        } else if desc_len > META_DESC_MAX_CHARS {
            push(
                IssueType::Seo,
                Severity::Medium,
                format!("Long meta description ({} chars)", desc_len),
            );
        } else if desc_len < META_DESC_MIN_CHARS {
            push(
                IssueType::Seo,
                Severity::Low,
                format!("Short meta description ({} chars)", desc_len),
            );
        }

        // Content length
        if page.word_count < VERY_SHORT_CONTENT_WORDS {
            push(
                IssueType::ContentQuality,
                Severity::High,
                format!("Very short content ({} words)", page.word_count),
            );
        } else if page.word_count < SHORT_CONTENT_WORDS {
            push(
                IssueType::ContentQuality,
                Severity::Medium,
                format!("Short content ({} words)", page.word_count),
            );
        }

        // Subheadings
        if page.headings.is_empty() {
            push(
                IssueType::ContentStructure,
                Severity::Medium,
                "No subheadings (H2-H6)".to_string(),
            );
        } else if page.headings.len() < FEW_SUBHEADINGS {
            push(
                IssueType::ContentStructure,
                Severity::Low,
                format!("Few subheadings (less than {})", FEW_SUBHEADINGS),
            );
        }

        // Images
        if page.images.is_empty() {
            push(
                IssueType::Images,
                Severity::High,
                "No images found".to_string(),
            );
        } else {
            let missing_alt = page.images_without_alt();
            if missing_alt > 0 {
                push(
                    IssueType::Accessibility,
                    Severity::Medium,
                    format!("{} images missing alt text", missing_alt),
                );
            }
        }

        if !page.has_featured_image {
            push(
                IssueType::Images,
                Severity::Medium,
                "No featured image detected".to_string(),
            );
        }

        // Social
        if !page.has_social("og:image") {
            push(
                IssueType::SocialMedia,
                Severity::Medium,
                "Missing Open Graph image".to_string(),
            );
        }
        if !page.has_social("og:title") {
            push(
                IssueType::SocialMedia,
                Severity::Low,
                "Missing Open Graph title".to_string(),
            );
        }
        if !page.has_social("og:description") {
            push(
                IssueType::SocialMedia,
                Severity::Low,
                "Missing Open Graph description".to_string(),
            );
        }
        if !page.has_social("twitter:card") {
            push(
                IssueType::SocialMedia,
                Severity::Low,
                "Missing Twitter card".to_string(),
            );
        }

        // Technical
        if page.mixed_content {
            push(
                IssueType::Security,
                Severity::High,
                "Mixed content (HTTP assets on HTTPS page)".to_string(),
            );
        }

        if !page.has_schema_markup {
            push(
                IssueType::Seo,
                Severity::Low,
                "No structured data (schema markup)".to_string(),
            );
        }

        // Aggregate score
        if page.quality_score < LOW_QUALITY_SCORE {
            push(
                IssueType::ContentQuality,
                Severity::High,
                format!("Low content quality score ({:.1}/100)", page.quality_score),
            );
        } else if page.quality_score < MEDIUM_QUALITY_SCORE {
            push(
                IssueType::ContentQuality,
                Severity::Medium,
                format!(
                    "Medium content quality score ({:.1}/100)",
                    page.quality_score
                ),
            );
        }
    }

    fn broken(
        statuses: &BTreeMap<String, UrlStatus>,
        issue_type: IssueType,
        issues: &mut Vec<Issue>,
    ) {
        for (url, status) in statuses {
            if status.is_broken() {
                issues.push(Issue::new(
                    url,
                    issue_type,
                    Severity::High,
                    format!("HTTP {} (final: {})", status.status, status.final_url),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DuplicateGroup;
    use crate::parser::PageParser;
    use url::Url;

    fn parse_record(url: &str, html: &str) -> PageRecord {
        let base = Url::parse(url).unwrap();
        PageParser::parse(&base, html).into_record(url, 200, Some("text/html".to_string()))
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    const CONTENT_TYPES: [IssueType; 4] = [
        IssueType::ContentQuality,
        IssueType::ContentStructure,
        IssueType::Images,
        IssueType::Accessibility,
    ];

    fn base_page(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            status: 200,
            parsed: true,
            title: "A perfectly sized page title for tests".to_string(),
            meta_description: "x".repeat(130),
            word_count: 1000,
            headings: vec!["a".into(), "b".into(), "c".into()],
            has_featured_image: true,
            images: vec![crate::models::PageImage {
                src: "https://x/i.png".into(),
                alt: "alt".into(),
            }],
            quality_score: 90.0,
            has_schema_markup: true,
            social_meta: [
                ("og:image", "i"),
                ("og:title", "t"),
                ("og:description", "d"),
                ("twitter:card", "summary"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            ..Default::default()
        }
    }

    fn issues_for(page: &PageRecord) -> Vec<Issue> {
        let mut issues = Vec::new();
        IssueAggregator::analyze_page(page, &mut issues);
        issues
    }

    #[test]
    fn test_well_formed_page_has_no_issues() {
        assert!(issues_for(&base_page("https://x/")).is_empty());
    }

    #[test]
    fn test_title_and_description_lengths() {
        let mut page = base_page("https://x/");
        page.title = String::new();
        page.meta_description = "d".repeat(161);
        let issues = issues_for(&page);
        assert!(
            issues
                .iter()
                .any(|i| i.detail == "Missing <title>" && i.severity == Severity::High)
        );
        assert!(issues.iter().any(
            |i| i.detail == "Long meta description (161 chars)" && i.severity == Severity::Medium
        ));

        page.title = "é".repeat(61);
        page.meta_description = "d".repeat(50);
        let issues = issues_for(&page);
        assert!(issues.iter().any(|i| i.detail == "Long <title> (61 chars)"));
        assert!(issues.iter().any(
            |i| i.detail == "Short meta description (50 chars)" && i.severity == Severity::Low
        ));

        page.title = "Short".to_string();
        let issues = issues_for(&page);
        assert!(issues.iter().any(|i| i.detail == "Short <title> (5 chars)"));
    }

    #[test]
    fn test_failed_page_only_reports_status() {
        let page = PageRecord::unparsed("https://x/gone", 0, None);
        let issues = issues_for(&page);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::PageStatus);
        assert_eq!(issues[0].detail, "HTTP 0");
    }

    #[test]
    fn test_aggregate_orders_by_severity_and_reports_broken() {
        let mut pages = BTreeMap::new();
        let mut thin = base_page("https://x/thin");
        thin.social_meta.clear();
        pages.insert(thin.url.clone(), thin);

        let links: BTreeMap<String, UrlStatus> = [
            ("https://x/ok", 200),
            ("https://x/dead", 404),
            ("https://down.example/", 0),
        ]
        .into_iter()
        .map(|(u, s)| {
            (
                u.to_string(),
                UrlStatus {
                    status: s,
                    final_url: u.to_string(),
                },
            )
        })
        .collect();
        let findings = SiteFindings {
            duplicate_titles: vec![DuplicateGroup {
                value: "T".into(),
                urls: vec!["https://x/a".into(), "https://x/b".into()],
            }],
            ..Default::default()
        };

        let issues = IssueAggregator::aggregate(&AuditInput {
            start_url: "https://x/",
            pages: &pages,
            link_statuses: &links,
            image_statuses: &BTreeMap::new(),
            findings: &findings,
        });

        let broken: Vec<_> = issues
            .iter()
            .filter(|i| i.issue_type == IssueType::BrokenLink)
            .collect();
        assert_eq!(broken.len(), 2);
        assert!(broken.iter().any(|i| i.detail == "HTTP 404 (final: https://x/dead)"));

        let dup = issues
            .iter()
            .find(|i| i.issue_type == IssueType::DuplicateTitle)
            .unwrap();
        assert_eq!(dup.url, "https://x/a, https://x/b");
        assert_eq!(dup.detail, "\"T\" appears on 2 pages");

        let severities: Vec<_> = issues.iter().map(|i| i.severity).collect();
        let mut sorted = severities.clone();
        sorted.sort();
        assert_eq!(severities, sorted);
    }

    #[test]
    fn test_low_quality_page_scenario() {
        let html = format!(
            "<html><head><title>Thin</title></head><body><article><p>{}</p></article></body></html>",
            words(120)
        );
        let page = parse_record("https://example.com/thin", &html);
        assert_eq!(page.word_count, 120);
        assert!(page.quality_score <= 20.0);

        let issues = issues_for(&page);
        let has = |t: IssueType, s: Severity| {
            issues
                .iter()
                .any(|i| i.issue_type == t && i.severity == s)
        };
        assert!(has(IssueType::ContentQuality, Severity::High));
        assert!(has(IssueType::Images, Severity::High));
        assert!(has(IssueType::ContentStructure, Severity::Medium));
    }

    #[test]
    fn test_clean_page_scenario() {
        let paragraphs: String = (0..6)
            .map(|_| format!("<p>{}</p>", words(150)))
            .collect();
        let html = format!(
            r#"<html><head><title>A clean page</title></head><body><article>
            <div class="featured-image"><img src="/a.png" alt="A"></div>
            <img src="/b.png" alt="B"><img src="/c.png" alt="C">
            <h2>One</h2><h2>Two</h2><h3>Three</h3><h3>Four</h3>
            {paragraphs}
            <ul><li>x</li></ul><ol><li>y</li></ol>
            <a href="/p1">p</a><a href="/p2">p</a><a href="/p3">p</a><a href="/p4">p</a>
            </article></body></html>"#
        );
        let page = parse_record("https://example.com/clean", &html);

        assert!(page.word_count >= 900);
        assert_eq!(page.headings.len(), 4);
        assert_eq!(page.internal_links.len(), 4);
        assert_eq!(page.quality_score, 100.0);

        let issues = issues_for(&page);
        assert!(
            issues.iter().all(|i| !CONTENT_TYPES.contains(&i.issue_type)),
            "unexpected content issues: {:?}",
            issues
        );
    }

    #[test]
    fn test_mixed_content_scenario() {
        let html = r#"<html><body><main><p>Hello</p><img src="http://cdn.example/x.png" alt="x"></main></body></html>"#;
        let page = parse_record("https://example.com/", html);
        assert!(page.mixed_content);

        let issues = issues_for(&page);
        assert!(
            issues
                .iter()
                .any(|i| i.issue_type == IssueType::Security && i.severity == Severity::High)
        );
    }

    #[test]
    fn test_orphan_issue_excludes_start_url() {
        let pages: BTreeMap<String, PageRecord> = ["https://x/", "https://x/lonely"]
            .into_iter()
            .map(|u| (u.to_string(), base_page(u)))
            .collect();
        let findings = SiteFindings {
            orphans: ["https://x/", "https://x/lonely"]
                .into_iter()
                .map(String::from)
                .collect(),
            ..Default::default()
        };

        let issues = IssueAggregator::aggregate(&AuditInput {
            start_url: "https://x/",
            pages: &pages,
            link_statuses: &BTreeMap::new(),
            image_statuses: &BTreeMap::new(),
            findings: &findings,
        });

        let orphans: Vec<_> = issues
            .iter()
            .filter(|i| i.issue_type == IssueType::InternalLinking)
            .map(|i| i.url.as_str())
            .collect();
        assert_eq!(orphans, vec!["https://x/lonely"]);
    }
}
