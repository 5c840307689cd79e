//! Response-time probing of registries.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::entry::RegistryEntry;
use crate::error::{RegistryError, Result};

/// Path requested under each registry. It does not exist anywhere; any HTTP
/// answer, 404 included, proves the registry is reachable.
pub const DEFAULT_PROBE_PATH: &str = "pedding";

/// Issues a single GET and reports the HTTP status.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn get(&self, url: &str) -> Result<u16>;
}

pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    /// A probe with the transport's default timeouts, or `timeout` if given.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| RegistryError::Probe {
            url: String::new(),
            message: format!("failed to build HTTP client: {e}"),
        })?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str) -> Result<u16> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RegistryError::Probe {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(response.status().as_u16())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub name: String,
    pub registry: String,
    pub elapsed_ms: u128,
    pub failed: bool,
}

pub struct Prober<P> {
    probe: P,
    path: String,
}

impl<P: HttpProbe> Prober<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            path: DEFAULT_PROBE_PATH.to_string(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Probe every entry concurrently. Results follow the order of `entries`.
    pub async fn run(&self, entries: &[RegistryEntry]) -> Vec<ProbeResult> {
        join_all(entries.iter().map(|entry| self.probe_one(entry))).await
    }

    async fn probe_one(&self, entry: &RegistryEntry) -> ProbeResult {
        let start = Instant::now();
        let outcome = match probe_url(&entry.registry, &self.path) {
            Ok(url) => self.probe.get(&url).await,
            Err(e) => Err(e),
        };
        let elapsed_ms = start.elapsed().as_millis();

        let failed = match outcome {
            Ok(status) => {
                debug!("{} answered {} in {}ms", entry.name, status, elapsed_ms);
                false
            }
            Err(e) => {
                warn!("{}", e);
                true
            }
        };

        ProbeResult {
            name: entry.name.clone(),
            registry: entry.registry.clone(),
            elapsed_ms,
            failed,
        }
    }
}

fn probe_url(registry: &str, path: &str) -> Result<String> {
    let base = Url::parse(registry).map_err(|source| RegistryError::InvalidUrl {
        url: registry.to_string(),
        source,
    })?;
    let url = base.join(path).map_err(|source| RegistryError::InvalidUrl {
        url: format!("{registry}{path}"),
        source,
    })?;
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_path_is_joined_under_registry() {
        assert_eq!(
            probe_url("https://npm.corp.example/repo/", "pedding").unwrap(),
            "https://npm.corp.example/repo/pedding"
        );
    }

    #[test]
    fn unparsable_registry_is_rejected() {
        assert!(probe_url("not a url", "pedding").is_err());
    }
}
