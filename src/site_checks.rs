use crate::models::SiteChecks;
use reqwest::Client;
use url::Url;

/// Common sitemap locations, probed in order against the site origin.
pub const SITEMAP_PATHS: [&str; 4] = [
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap1.xml",
    "/wp-sitemap.xml",
];

/// Probes robots.txt and the common sitemap paths. Never fails; anything
/// unreachable is reported as missing.
pub async fn check_site(client: &Client, start_url: &Url) -> SiteChecks {
    let mut checks = SiteChecks::default();

    if let Some(robots_url) = origin_path(start_url, "/robots.txt") {
        if let Some(body) = fetch_ok(client, &robots_url).await {
            checks.robots_txt = true;
            checks.declared_sitemaps = parse_sitemap_directives(&body);
        } else {
            tracing::info!(url = %robots_url, "robots.txt not found");
        }
    }

    for path in SITEMAP_PATHS {
        let Some(sitemap_url) = origin_path(start_url, path) else {
            continue;
        };
        if let Some(body) = fetch_ok(client, &sitemap_url).await
            && is_sitemap_xml(&body)
        {
            tracing::debug!(url = %sitemap_url, "Found sitemap");
            checks.sitemap = Some(sitemap_url);
            break;
        }
    }

    checks
}

/// Body of a 200 response, or `None` for anything else.
async fn fetch_ok(client: &Client, url: &str) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Side check request failed");
            return None;
        }
    };

    if response.status().as_u16() != 200 {
        return None;
    }

    response.text().await.ok()
}

/// `path` on the origin of `base`, with query and fragment removed.
pub fn origin_path(base: &Url, path: &str) -> Option<String> {
    let mut url = base.clone();
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    if url.host_str().is_none() {
        return None;
    }
    Some(url.to_string())
}

pub fn is_sitemap_xml(body: &str) -> bool {
    body.contains("<urlset") || body.contains("<sitemapindex")
}

/// Values of `Sitemap:` lines, in file order. The field name is
/// case-insensitive; comments and blank values are skipped.
pub fn parse_sitemap_directives(content: &str) -> Vec<String> {
    let mut sitemaps = Vec::new();

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if field.trim().eq_ignore_ascii_case("sitemap")
            && !value.is_empty()
            && !sitemaps.iter().any(|s| s == value)
        {
            sitemaps.push(value.to_string());
        }
    }

    sitemaps
}
