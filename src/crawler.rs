use crate::config::AuditConfig;
use crate::fetcher::PageFetcher;
use crate::models::PageRecord;
use crate::parser::{PageParser, is_same_host};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashSet, VecDeque};
use url::Url;

/// Breadth-first crawl over internal links, bounded by a page ceiling.
///
/// Pages are fetched one at a time because link discovery for the frontier
/// depends on the page just parsed. A URL becomes a record only once it has
/// been dequeued and fetched.
pub struct Crawler {
    fetcher: PageFetcher,
    start_url: Url,
    max_pages: usize,
    same_domain_only: bool,
    frontier: VecDeque<String>,
    queued: HashSet<String>,
    pub pages: BTreeMap<String, PageRecord>,
    progress_bar: Option<ProgressBar>,
}

impl Crawler {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        Ok(Self::with_fetcher(config, PageFetcher::new(config)?))
    }

    pub fn with_fetcher(config: &AuditConfig, fetcher: PageFetcher) -> Self {
        let start = config.start_url.to_string();

        Self {
            fetcher,
            start_url: config.start_url.clone(),
            max_pages: config.max_pages,
            same_domain_only: config.same_domain_only,
            frontier: VecDeque::from([start.clone()]),
            queued: HashSet::from([start]),
            pages: BTreeMap::new(),
            progress_bar: None,
        }
    }

    /// Enable progress bar for crawling
    pub fn enable_progress_bar(&mut self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("[{elapsed_precise}] {spinner:.cyan} Crawling: {pos} pages {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        self.progress_bar = Some(pb);
    }

    pub async fn crawl(&mut self) -> Result<()> {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(0);
        }

        while self.pages.len() < self.max_pages {
            let Some(url) = self.frontier.pop_front() else {
                break;
            };
            if self.pages.contains_key(&url) {
                continue;
            }

            if let Some(ref pb) = self.progress_bar {
                pb.set_message(url.clone());
            }

            let record = self.visit(&url).await;
            self.enqueue_links(&record);
            self.pages.insert(url, record);

            if let Some(ref pb) = self.progress_bar {
                pb.set_position(self.pages.len() as u64);
            }
        }

        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(format!("done, {} pages", self.pages.len()));
        }

        tracing::info!(
            pages = self.pages.len(),
            frontier = self.frontier.len(),
            "Crawl finished"
        );

        Ok(())
    }

    /// Fetch and, for HTML responses, parse one URL. Failures become records.
    async fn visit(&self, url: &str) -> PageRecord {
        let Some(page) = self.fetcher.fetch(url).await else {
            return PageRecord::unparsed(url, 0, None);
        };

        tracing::debug!(
            url = %url,
            final_url = %page.final_url,
            status = page.status,
            "Fetched page"
        );

        match (&page.body, Url::parse(url)) {
            (Some(body), Ok(base)) => {
                PageParser::parse(&base, body).into_record(url, page.status, page.content_type)
            }
            _ => PageRecord::unparsed(url, page.status, page.content_type),
        }
    }

    fn enqueue_links(&mut self, record: &PageRecord) {
        for link in &record.internal_links {
            if self.same_domain_only && !self.shares_start_host(link) {
                continue;
            }
            if self.pages.contains_key(link) || self.queued.contains(link) {
                continue;
            }
            // Admission control: the page being recorded counts as visited
            if self.pages.len() + 1 + self.frontier.len() >= self.max_pages {
                break;
            }
            self.queued.insert(link.clone());
            self.frontier.push_back(link.clone());
        }
    }

    fn shares_start_host(&self, link: &str) -> bool {
        Url::parse(link).is_ok_and(|url| is_same_host(&self.start_url, &url))
    }
}
