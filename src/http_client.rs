use anyhow::Result;
use reqwest::{Client, ClientBuilder, header};
use std::time::Duration;

use crate::config::AuditConfig;

/// User agent sent when the configuration doesn't override it
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; SiteAuditor/",
    env!("CARGO_PKG_VERSION"),
    "; +https://github.com/site-auditor)"
);

const ACCEPT: &str = "text/html,application/xhtml+xml,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const MAX_REDIRECTS: usize = 10;

/// Creates a reqwest client that follows redirects and gives up after `timeout`
pub fn build_http_client(timeout: Duration, user_agent: &str) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static(ACCEPT_LANGUAGE),
    );

    let client = ClientBuilder::new()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()?;

    Ok(client)
}

/// Client configured from the audit settings
pub fn client_for(config: &AuditConfig) -> Result<Client> {
    build_http_client(config.timeout, &config.user_agent)
}
