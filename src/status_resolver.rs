use crate::config::AuditConfig;
use crate::http_client::client_for;
use crate::models::UrlStatus;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::{BTreeMap, BTreeSet};

/// Resolves the final status of many URLs with a bounded number in flight.
pub struct StatusResolver {
    client: Client,
    worker_count: usize,
}

impl StatusResolver {
    pub fn new(config: &AuditConfig) -> Result<Self> {
        Ok(Self::with_client(client_for(config)?, config.worker_count))
    }

    pub fn with_client(client: Client, worker_count: usize) -> Self {
        Self {
            client,
            worker_count: worker_count.max(1),
        }
    }

    /// Each probe owns its URL and returns its own result; results are
    /// joined into the map here, after the probes complete.
    pub async fn resolve_all(&self, urls: &BTreeSet<String>) -> BTreeMap<String, UrlStatus> {
        stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let status = self.resolve(&url).await;
                (url, status)
            })
            .buffer_unordered(self.worker_count)
            .collect::<BTreeMap<_, _>>()
            .await
    }

    /// HEAD first; GET when HEAD errors or doesn't answer 2xx.
    pub async fn resolve(&self, url: &str) -> UrlStatus {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => {
                return UrlStatus {
                    status: response.status().as_u16(),
                    final_url: response.url().to_string(),
                };
            }
            Ok(response) => {
                tracing::debug!(
                    url = %url,
                    status = %response.status(),
                    "HEAD not successful, retrying with GET"
                );
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "HEAD failed, retrying with GET");
            }
        }

        match self.client.get(url).send().await {
            Ok(response) => UrlStatus {
                status: response.status().as_u16(),
                final_url: response.url().to_string(),
            },
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "GET failed");
                UrlStatus {
                    status: 0,
                    final_url: url.to_string(),
                }
            }
        }
    }
}
