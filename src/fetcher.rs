use anyhow::Result;
use reqwest::{Client, header};

use crate::config::AuditConfig;
use crate::http_client::client_for;

/// A completed GET. `body` is only read for HTML responses.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

impl FetchedPage {
    pub fn is_html(&self) -> bool {
        self.content_type.as_deref().is_some_and(is_html_content_type)
    }
}

pub fn is_html_content_type(content_type: &str) -> bool {
    let ct = content_type.trim().to_ascii_lowercase();
    ct.starts_with("text/html") || ct.starts_with("application/xhtml+xml")
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        Ok(Self {
            client: client_for(config)?,
        })
    }

    /// Single GET with redirects followed. Any transport failure, including a
    /// body that can't be read, yields `None`.
    pub async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Fetch failed");
                return None;
            }
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut page = FetchedPage {
            status,
            final_url,
            content_type,
            body: None,
        };

        if page.is_html() {
            match response.text().await {
                Ok(text) => page.body = Some(text),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Failed to read response body");
                    return None;
                }
            }
        } else {
            tracing::debug!(
                url = %url,
                content_type = ?page.content_type,
                "Non-HTML response, skipping body"
            );
        }

        Some(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=UTF-8"));
        assert!(is_html_content_type("TEXT/HTML"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(!is_html_content_type("application/pdf"));
        assert!(!is_html_content_type("image/png"));
        assert!(!is_html_content_type("application/json"));
    }
}
