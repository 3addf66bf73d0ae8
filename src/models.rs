use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The structured result of fetching and parsing one URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    /// HTTP status of the final response, 0 when the fetch failed.
    pub status: u16,
    pub content_type: Option<String>,
    /// False for failed fetches and non-HTML responses.
    pub parsed: bool,
    pub title: String,
    pub meta_description: String,
    pub canonical_url: String,
    pub h1: String,
    pub internal_links: BTreeSet<String>,
    pub external_links: BTreeSet<String>,
    pub images: Vec<PageImage>,
    pub mixed_content: bool,
    pub word_count: usize,
    /// H2-H6 texts in document order.
    pub headings: Vec<String>,
    pub paragraph_count: usize,
    pub list_count: usize,
    pub has_featured_image: bool,
    pub publish_date: Option<String>,
    pub categories: Vec<String>,
    pub quality_score: f64,
    pub readability: Readability,
    pub social_meta: BTreeMap<String, String>,
    pub has_schema_markup: bool,
}

impl PageRecord {
    /// A record for a URL that produced no parseable HTML.
    pub fn unparsed(url: &str, status: u16, content_type: Option<String>) -> Self {
        Self {
            url: url.to_string(),
            status,
            content_type,
            ..Default::default()
        }
    }

    pub fn images_with_alt(&self) -> usize {
        self.images.iter().filter(|image| image.has_alt()).count()
    }

    pub fn images_without_alt(&self) -> usize {
        self.images.len() - self.images_with_alt()
    }

    pub fn has_social(&self, key: &str) -> bool {
        self.social_meta
            .get(key)
            .is_some_and(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    pub src: String,
    pub alt: String,
}

impl PageImage {
    pub fn has_alt(&self) -> bool {
        !self.alt.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readability {
    Easy,
    Medium,
    Hard,
    #[default]
    Unknown,
}

impl fmt::Display for Readability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Readability::Easy => "Easy",
            Readability::Medium => "Medium",
            Readability::Hard => "Hard",
            Readability::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Internal,
    External,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Internal => f.write_str("internal"),
            LinkKind::External => f.write_str("external"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEdge {
    pub from: String,
    pub to: String,
    pub kind: LinkKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub page: String,
    pub src: String,
    pub alt: String,
}

/// Final status of a probed URL after redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlStatus {
    pub status: u16,
    pub final_url: String,
}

impl UrlStatus {
    pub fn is_broken(&self) -> bool {
        self.status == 0 || self.status >= 400
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    PageStatus,
    Seo,
    ContentQuality,
    ContentStructure,
    Images,
    Accessibility,
    SocialMedia,
    Security,
    InternalLinking,
    BrokenLink,
    BrokenImage,
    DuplicateTitle,
    DuplicateCanonical,
}

impl IssueType {
    pub const ALL: [IssueType; 13] = [
        IssueType::PageStatus,
        IssueType::Seo,
        IssueType::ContentQuality,
        IssueType::ContentStructure,
        IssueType::Images,
        IssueType::Accessibility,
        IssueType::SocialMedia,
        IssueType::Security,
        IssueType::InternalLinking,
        IssueType::BrokenLink,
        IssueType::BrokenImage,
        IssueType::DuplicateTitle,
        IssueType::DuplicateCanonical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::PageStatus => "page_status",
            IssueType::Seo => "seo",
            IssueType::ContentQuality => "content_quality",
            IssueType::ContentStructure => "content_structure",
            IssueType::Images => "images",
            IssueType::Accessibility => "accessibility",
            IssueType::SocialMedia => "social_media",
            IssueType::Security => "security",
            IssueType::InternalLinking => "internal_linking",
            IssueType::BrokenLink => "broken_link",
            IssueType::BrokenImage => "broken_image",
            IssueType::DuplicateTitle => "duplicate_title",
            IssueType::DuplicateCanonical => "duplicate_canonical",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub url: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub detail: String,
}

impl Issue {
    pub fn new(
        url: impl Into<String>,
        issue_type: IssueType,
        severity: Severity,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            issue_type,
            severity,
            detail: detail.into(),
        }
    }
}

/// Pages sharing the same title or canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub value: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteFindings {
    pub duplicate_titles: Vec<DuplicateGroup>,
    pub duplicate_canonicals: Vec<DuplicateGroup>,
    pub orphans: BTreeSet<String>,
}

/// Outcome of the robots.txt and sitemap probes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteChecks {
    pub robots_txt: bool,
    /// First common sitemap location that answered with sitemap XML.
    pub sitemap: Option<String>,
    /// `Sitemap:` entries declared in robots.txt.
    pub declared_sitemaps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub start_url: String,
    pub generated_at: DateTime<Utc>,
    pub pages: BTreeMap<String, PageRecord>,
    pub link_statuses: BTreeMap<String, UrlStatus>,
    pub image_statuses: BTreeMap<String, UrlStatus>,
    pub issues: Vec<Issue>,
    pub site_checks: SiteChecks,
    pub summary: AuditSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_pages: usize,
    pub total_links: usize,
    pub total_images: usize,
    pub total_issues: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub broken_links: usize,
    pub broken_images: usize,
    pub pages_with_images: usize,
    pub pages_with_featured_images: usize,
    pub average_word_count: f64,
    pub average_quality_score: f64,
}
