use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::domain::{Candidate, Interview, Panel};
use crate::config::UpstreamConfig;

/// One page of a collection endpoint: `{ data, hasNext, next? }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub next: Option<PageCursor>,
}

/// Opaque offset token handed back by the API. Some deployments send a
/// number, others a string; both are forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(pub String);

impl<'de> Deserialize<'de> for PageCursor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(value) => PageCursor(value),
            Raw::Number(value) => PageCursor(value.to_string()),
        })
    }
}

/// A single GET against a collection path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl PageRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Sets `key`, replacing an earlier value for the same key.
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.query.iter_mut().find(|(existing, _)| existing == key) {
            Some(slot) => slot.1 = value,
            None => self.query.push((key.to_string(), value)),
        }
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("received upstream HTTP {status} for {path}")]
    Status { status: u16, path: String },
    #[error("upstream transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned an undecodable payload for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("upstream reported more pages for {path} without a cursor")]
    MissingCursor { path: String },
}

/// Anything able to serve raw pages of a collection endpoint.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Value>, UpstreamError>;
}

/// Walks every page of `path`, following `next` until `hasNext` is false.
/// Any failing page aborts the walk; partial results are discarded.
pub async fn unpage<T, S>(
    source: &S,
    path: &str,
    initial_query: &[(String, String)],
    page_size: NonZeroUsize,
) -> Result<Vec<T>, UpstreamError>
where
    T: DeserializeOwned,
    S: PageSource + ?Sized,
{
    let mut request = initial_query
        .iter()
        .fold(PageRequest::new(path), |request, (key, value)| {
            request.with_param(key, value.clone())
        })
        .with_param("limit", page_size.get().to_string());

    let mut records = Vec::new();
    let mut pages = 0_usize;

    loop {
        let page = source.fetch_page(&request).await?;
        pages += 1;

        for raw in page.data {
            let record = serde_json::from_value(raw).map_err(|source| UpstreamError::Decode {
                path: path.to_string(),
                source,
            })?;
            records.push(record);
        }

        if !page.has_next {
            break;
        }

        let cursor = page.next.ok_or_else(|| UpstreamError::MissingCursor {
            path: path.to_string(),
        })?;
        request = request.with_param("offset", cursor.0);
    }

    debug!(path, pages, records = records.len(), "collection fetched");
    Ok(records)
}

/// Collects every interview across every candidate's panels. Candidates and
/// their panels are walked one at a time, in arrival order.
pub async fn fetch_interviews<S>(
    source: &S,
    page_size: NonZeroUsize,
) -> Result<Vec<Interview>, UpstreamError>
where
    S: PageSource + ?Sized,
{
    let candidates: Vec<Candidate> = unpage(source, "/candidates", &[], page_size).await?;

    let mut interviews = Vec::new();
    for candidate in &candidates {
        let path = format!("/candidates/{}/panels", candidate.id);
        let panels: Vec<Panel> = unpage(source, &path, &[], page_size).await?;
        for panel in panels {
            interviews.extend(panel.interviews);
        }
    }

    info!(
        candidates = candidates.len(),
        interviews = interviews.len(),
        "interview snapshot fetched"
    );
    Ok(interviews)
}

/// `reqwest`-backed client for the Lever API.
#[derive(Clone)]
pub struct LeverClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LeverClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            config.request_timeout,
        )
    }
}

impl std::fmt::Debug for LeverClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeverClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PageSource for LeverClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Value>, UpstreamError> {
        let url = format!("{}{}", self.base_url, request.path);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.api_key, Some(""))
            .query(&request.query)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() > 299 {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                path: request.path.clone(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| UpstreamError::Decode {
            path: request.path.clone(),
            source,
        })
    }
}
