use crate::models::{DuplicateGroup, ImageRef, LinkEdge, LinkKind, PageRecord, SiteFindings};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Every internal and external edge, in page order.
pub fn link_edges(pages: &BTreeMap<String, PageRecord>) -> Vec<LinkEdge> {
    let mut edges = Vec::new();
    for (url, page) in pages {
        for to in &page.internal_links {
            edges.push(LinkEdge {
                from: url.clone(),
                to: to.clone(),
                kind: LinkKind::Internal,
            });
        }
        for to in &page.external_links {
            edges.push(LinkEdge {
                from: url.clone(),
                to: to.clone(),
                kind: LinkKind::External,
            });
        }
    }
    edges
}

pub fn image_refs(pages: &BTreeMap<String, PageRecord>) -> Vec<ImageRef> {
    pages
        .iter()
        .flat_map(|(url, page)| {
            page.images.iter().map(move |image| ImageRef {
                page: url.clone(),
                src: image.src.clone(),
                alt: image.alt.clone(),
            })
        })
        .collect()
}

/// Union of all discovered link targets.
pub fn all_links(pages: &BTreeMap<String, PageRecord>) -> BTreeSet<String> {
    pages
        .values()
        .flat_map(|page| page.internal_links.iter().chain(&page.external_links))
        .cloned()
        .collect()
}

/// Union of all discovered image sources.
pub fn all_images(pages: &BTreeMap<String, PageRecord>) -> BTreeSet<String> {
    pages
        .values()
        .flat_map(|page| page.images.iter().map(|image| image.src.clone()))
        .collect()
}

/// Groups pages by a trimmed, non-empty key and keeps groups with more than
/// one member. Matching is case-sensitive.
fn duplicates_by<'a>(
    pages: &'a BTreeMap<String, PageRecord>,
    key: impl Fn(&'a PageRecord) -> &'a str,
) -> Vec<DuplicateGroup> {
    let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (url, page) in pages {
        let value = key(page).trim();
        if !value.is_empty() {
            groups.entry(value).or_default().push(url.clone());
        }
    }

    groups
        .into_iter()
        .filter(|(_, urls)| urls.len() > 1)
        .map(|(value, urls)| DuplicateGroup {
            value: value.to_string(),
            urls,
        })
        .collect()
}

pub fn duplicate_titles(pages: &BTreeMap<String, PageRecord>) -> Vec<DuplicateGroup> {
    duplicates_by(pages, |page| page.title.as_str())
}

pub fn duplicate_canonicals(pages: &BTreeMap<String, PageRecord>) -> Vec<DuplicateGroup> {
    duplicates_by(pages, |page| page.canonical_url.as_str())
}

/// Crawled pages other than `start_url` with no internal inbound link from a
/// different crawled page.
pub fn orphans(pages: &BTreeMap<String, PageRecord>, start_url: &str) -> BTreeSet<String> {
    let mut inbound: HashMap<&str, usize> = HashMap::new();
    for edge in link_edges(pages) {
        if edge.kind == LinkKind::Internal
            && edge.from != edge.to
            && let Some((url, _)) = pages.get_key_value(edge.to.as_str())
        {
            *inbound.entry(url.as_str()).or_default() += 1;
        }
    }

    pages
        .keys()
        .filter(|url| url.as_str() != start_url && !inbound.contains_key(url.as_str()))
        .cloned()
        .collect()
}

pub fn analyze(pages: &BTreeMap<String, PageRecord>, start_url: &str) -> SiteFindings {
    SiteFindings {
        duplicate_titles: duplicate_titles(pages),
        duplicate_canonicals: duplicate_canonicals(pages),
        orphans: orphans(pages, start_url),
    }
}
