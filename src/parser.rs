use crate::models::{PageImage, PageRecord, Readability};
use crate::quality::{QualitySignals, quality_score, readability};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

// Cached selectors to avoid repeated parsing
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector should be valid"));
static META_DESC_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='description']").expect("meta description selector should be valid")
});
static CANONICAL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("link[rel~='canonical']").expect("canonical selector should be valid")
});
static H1_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1").expect("h1 selector should be valid"));
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("a[href] selector should be valid"));
static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[src]").expect("img[src] selector should be valid"));
static SUBRESOURCE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script[src], link[rel~='stylesheet'][href]")
        .expect("subresource selector should be valid")
});
static SUBHEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h2, h3, h4, h5, h6").expect("subheading selector should be valid")
});
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("p selector should be valid"));
static LIST_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul, ol").expect("list selector should be valid"));
static SCHEMA_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script[type='application/ld+json']").expect("schema selector should be valid")
});

/// Main-content containers, most specific first.
static CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article",
        ".entry-content",
        ".post-content",
        ".content",
        "main",
        "[role='main']",
    ]
    .iter()
    .map(|css| Selector::parse(css).expect("content selector should be valid"))
    .collect()
});

static FEATURED_IMAGE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        ".featured-image img",
        ".post-thumbnail img",
        ".entry-image img",
        "meta[property='og:image']",
        ".wp-post-image",
    ]
    .iter()
    .map(|css| Selector::parse(css).expect("featured image selector should be valid"))
    .collect()
});

static PUBLISH_DATE_EXTRACTORS: Lazy<Vec<FieldExtractor>> = Lazy::new(|| {
    vec![
        FieldExtractor::new("time[datetime]", ValueSource::AttrOrText("datetime")),
        FieldExtractor::new(
            "[data-testid='publish-date']",
            ValueSource::AttrOrText("datetime"),
        ),
        FieldExtractor::new(".entry-date", ValueSource::AttrOrText("datetime")),
        FieldExtractor::new(".post-date", ValueSource::AttrOrText("datetime")),
        FieldExtractor::new(".published", ValueSource::AttrOrText("datetime")),
        FieldExtractor::new(
            "meta[property='article:published_time']",
            ValueSource::Attr("content"),
        ),
    ]
});

static CATEGORY_EXTRACTORS: Lazy<Vec<FieldExtractor>> = Lazy::new(|| {
    vec![
        FieldExtractor::new(".entry-categories a", ValueSource::Text),
        FieldExtractor::new(".post-categories a", ValueSource::Text),
        FieldExtractor::new(".category a", ValueSource::Text),
        FieldExtractor::new("[rel='category tag']", ValueSource::Text),
        FieldExtractor::new("meta[property='article:section']", ValueSource::Attr("content")),
    ]
});

pub const SOCIAL_META_KEYS: [&str; 9] = [
    "og:title",
    "og:description",
    "og:image",
    "og:type",
    "og:url",
    "twitter:card",
    "twitter:title",
    "twitter:description",
    "twitter:image",
];

static SOCIAL_META_EXTRACTORS: Lazy<Vec<(&'static str, FieldExtractor)>> = Lazy::new(|| {
    SOCIAL_META_KEYS
        .iter()
        .map(|key| {
            let css = if key.starts_with("og:") {
                format!("meta[property='{key}']")
            } else {
                format!("meta[name='{key}'], meta[property='{key}']")
            };
            (*key, FieldExtractor::new(&css, ValueSource::Attr("content")))
        })
        .collect()
});

const IGNORED_SCHEMES: [&str; 3] = ["mailto:", "tel:", "javascript:"];

/// Text under these elements never counts as content.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Used when no content container is found: page chrome is dropped as well.
const PAGE_CHROME_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "nav", "header", "footer", "aside",
];

/// Elements whose boundaries separate words.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// Where a field value comes from on a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Text,
    Attr(&'static str),
    /// The attribute if present and non-empty, otherwise the element text
    AttrOrText(&'static str),
}

/// One selector plus how to read a value from its match.
#[derive(Debug)]
pub struct FieldExtractor {
    selector: Selector,
    source: ValueSource,
}

impl FieldExtractor {
    pub fn new(css: &str, source: ValueSource) -> Self {
        Self {
            selector: Selector::parse(css).expect("extractor selector should be valid"),
            source,
        }
    }

    fn value_of(&self, element: ElementRef<'_>) -> Option<String> {
        let attr = |name: &str| {
            element
                .value()
                .attr(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let value = match self.source {
            ValueSource::Text => Some(element_text(element)),
            ValueSource::Attr(name) => attr(name),
            ValueSource::AttrOrText(name) => attr(name).or_else(|| Some(element_text(element))),
        };

        value.filter(|value| !value.is_empty())
    }

    /// Value of the first matching element, if it has one.
    pub fn first(&self, document: &Html) -> Option<String> {
        document
            .select(&self.selector)
            .next()
            .and_then(|element| self.value_of(element))
    }

    /// Values of every matching element, `None` when there are none.
    pub fn all(&self, document: &Html) -> Option<Vec<String>> {
        let values: Vec<String> = document
            .select(&self.selector)
            .filter_map(|element| self.value_of(element))
            .collect();
        (!values.is_empty()).then_some(values)
    }
}

/// Resolves a field to the first extractor that yields `Some`.
fn first_some<T>(
    document: &Html,
    extractors: &[FieldExtractor],
    extract: impl Fn(&FieldExtractor, &Html) -> Option<T>,
) -> Option<T> {
    extractors
        .iter()
        .find_map(|extractor| extract(extractor, document))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoFields {
    pub title: String,
    pub meta_description: String,
    pub canonical_url: String,
    pub h1: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSignals {
    pub word_count: usize,
    pub headings: Vec<String>,
    pub paragraph_count: usize,
    pub list_count: usize,
    pub has_featured_image: bool,
    pub readability: Readability,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostMetadata {
    pub publish_date: Option<String>,
    pub categories: Vec<String>,
    pub social_meta: BTreeMap<String, String>,
    pub has_schema_markup: bool,
}

/// Everything extracted from one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub seo: SeoFields,
    pub internal_links: BTreeSet<String>,
    pub external_links: BTreeSet<String>,
    pub images: Vec<PageImage>,
    pub mixed_content: bool,
    pub content: ContentSignals,
    pub metadata: PostMetadata,
}

impl ParsedPage {
    /// Scores the page and flattens it into a record.
    pub fn into_record(self, url: &str, status: u16, content_type: Option<String>) -> PageRecord {
        let score = quality_score(&QualitySignals {
            word_count: self.content.word_count,
            images: &self.images,
            heading_count: self.content.headings.len(),
            paragraph_count: self.content.paragraph_count,
            list_count: self.content.list_count,
            internal_link_count: self.internal_links.len(),
        });

        PageRecord {
            url: url.to_string(),
            status,
            content_type,
            parsed: true,
            title: self.seo.title,
            meta_description: self.seo.meta_description,
            canonical_url: self.seo.canonical_url,
            h1: self.seo.h1,
            internal_links: self.internal_links,
            external_links: self.external_links,
            images: self.images,
            mixed_content: self.mixed_content,
            word_count: self.content.word_count,
            headings: self.content.headings,
            paragraph_count: self.content.paragraph_count,
            list_count: self.content.list_count,
            has_featured_image: self.content.has_featured_image,
            publish_date: self.metadata.publish_date,
            categories: self.metadata.categories,
            quality_score: score,
            readability: self.content.readability,
            social_meta: self.metadata.social_meta,
            has_schema_markup: self.metadata.has_schema_markup,
        }
    }
}

/// Resolves `raw` against `base` and drops the fragment. Returns `None` for
/// empty values, `mailto:`/`tel:`/`javascript:` and non-http(s) results.
pub fn normalize_link(base: &Url, raw: &str) -> Option<Url> {
    let href = raw.trim();
    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if IGNORED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);

    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Host and effective port match.
pub fn is_same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

pub struct PageParser;

impl PageParser {
    /// Pure function of `(base_url, html)`.
    pub fn parse(base_url: &Url, html: &str) -> ParsedPage {
        let document = Html::parse_document(html);

        let seo = Self::extract_seo(&document);
        let (internal_links, external_links) = Self::extract_links(&document, base_url);
        let images = Self::extract_images(&document, base_url);
        let mixed_content = Self::detect_mixed_content(&document, base_url, &images);
        let content = Self::extract_content(&document);
        let metadata = Self::extract_metadata(&document);

        ParsedPage {
            seo,
            internal_links,
            external_links,
            images,
            mixed_content,
            content,
            metadata,
        }
    }

    fn extract_seo(document: &Html) -> SeoFields {
        let first_text = |selector: &Selector| {
            document
                .select(selector)
                .next()
                .map(element_text)
                .unwrap_or_default()
        };
        let first_attr = |selector: &Selector, attr: &str| {
            document
                .select(selector)
                .next()
                .and_then(|el| el.value().attr(attr))
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };

        SeoFields {
            title: first_text(&TITLE_SELECTOR),
            meta_description: first_attr(&META_DESC_SELECTOR, "content"),
            canonical_url: first_attr(&CANONICAL_SELECTOR, "href"),
            h1: first_text(&H1_SELECTOR),
        }
    }

    fn extract_links(document: &Html, base_url: &Url) -> (BTreeSet<String>, BTreeSet<String>) {
        let mut internal = BTreeSet::new();
        let mut external = BTreeSet::new();

        for element in document.select(&ANCHOR_SELECTOR) {
            let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| normalize_link(base_url, href))
            else {
                continue;
            };

            if is_same_host(base_url, &url) {
                internal.insert(url.to_string());
            } else {
                external.insert(url.to_string());
            }
        }

        (internal, external)
    }

    fn extract_images(document: &Html, base_url: &Url) -> Vec<PageImage> {
        document
            .select(&IMG_SELECTOR)
            .filter_map(|element| {
                let src = normalize_link(base_url, element.value().attr("src")?)?;
                Some(PageImage {
                    src: src.to_string(),
                    alt: element.value().attr("alt").unwrap_or_default().to_string(),
                })
            })
            .collect()
    }

    fn detect_mixed_content(document: &Html, base_url: &Url, images: &[PageImage]) -> bool {
        if base_url.scheme() != "https" {
            return false;
        }

        if images.iter().any(|image| image.src.starts_with("http://")) {
            return true;
        }

        document.select(&SUBRESOURCE_SELECTOR).any(|element| {
            element
                .value()
                .attr("src")
                .or_else(|| element.value().attr("href"))
                .and_then(|value| normalize_link(base_url, value))
                .is_some_and(|url| url.scheme() == "http")
        })
    }

    fn extract_content(document: &Html) -> ContentSignals {
        let scope = ContentScope::locate(document);

        ContentSignals {
            word_count: scope.text.split_whitespace().count(),
            headings: scope.texts(&SUBHEADING_SELECTOR),
            paragraph_count: scope.count(&PARAGRAPH_SELECTOR),
            list_count: scope.count(&LIST_SELECTOR),
            has_featured_image: FEATURED_IMAGE_SELECTORS
                .iter()
                .any(|selector| document.select(selector).next().is_some()),
            readability: readability(&scope.text),
        }
    }

    fn extract_metadata(document: &Html) -> PostMetadata {
        let publish_date = first_some(document, &PUBLISH_DATE_EXTRACTORS, FieldExtractor::first);

        let mut categories: Vec<String> = Vec::new();
        for category in first_some(document, &CATEGORY_EXTRACTORS, FieldExtractor::all)
            .unwrap_or_default()
        {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        let social_meta = SOCIAL_META_EXTRACTORS
            .iter()
            .filter_map(|(key, extractor)| {
                extractor
                    .first(document)
                    .map(|value| (key.to_string(), value))
            })
            .collect();

        PostMetadata {
            publish_date,
            categories,
            social_meta,
            has_schema_markup: document.select(&SCHEMA_SELECTOR).next().is_some(),
        }
    }
}

/// The part of the document word count and structure are measured on.
struct ContentScope<'a> {
    root: ElementRef<'a>,
    skip: &'static [&'static str],
    text: String,
}

impl<'a> ContentScope<'a> {
    fn locate(document: &'a Html) -> Self {
        for selector in CONTENT_SELECTORS.iter() {
            if let Some(root) = document.select(selector).next() {
                let text = collect_text(root, NON_CONTENT_TAGS);
                if !text.trim().is_empty() {
                    return Self {
                        root,
                        skip: NON_CONTENT_TAGS,
                        text,
                    };
                }
            }
        }

        let root = document.root_element();
        Self {
            root,
            skip: PAGE_CHROME_TAGS,
            text: collect_text(root, PAGE_CHROME_TAGS),
        }
    }

    fn count(&self, selector: &Selector) -> usize {
        self.root
            .select(selector)
            .filter(|element| !is_inside(*element, self.skip))
            .count()
    }

    fn texts(&self, selector: &Selector) -> Vec<String> {
        self.root
            .select(selector)
            .filter(|element| !is_inside(*element, self.skip))
            .map(element_text)
            .collect()
    }
}

fn is_inside(element: ElementRef<'_>, tags: &[&str]) -> bool {
    element.ancestors().any(|ancestor| {
        ancestor
            .value()
            .as_element()
            .is_some_and(|el| tags.contains(&el.name()))
    })
}

/// Text under `root` in document order, skipping `skip` subtrees. Inline
/// siblings join directly; block elements are padded with a space.
fn collect_text(root: ElementRef<'_>, skip: &[&str]) -> String {
    let mut text = String::new();
    push_text(root, skip, &mut text);
    text
}

fn push_text(element: ElementRef<'_>, skip: &[&str], text: &mut String) {
    for child in element.children() {
        if let Some(fragment) = child.value().as_text() {
            text.push_str(fragment);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if skip.contains(&name) {
            continue;
        }
        let block = BLOCK_TAGS.contains(&name);
        if block {
            text.push(' ');
        }
        push_text(child, skip, text);
        if block {
            text.push(' ');
        }
    }
}

/// Element text with whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    collect_text(element, NON_CONTENT_TAGS)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
