mod cache;
mod error;
pub mod query;
mod repo;

pub use cache::DEFAULT_CAPACITY;
use cache::ResponseCache;
pub use error::CmsError;
pub use repo::auth::{AuthSession, FileUpload};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct CmsConfig {
    /// Base URL without the `/api` suffix, e.g. `http://localhost:1337`.
    pub url: String,
    /// Read token for collection endpoints. User-scoped calls never use it.
    pub api_token: Option<String>,
    pub revalidate: Duration,
    /// Upper bound on cached response URLs.
    pub cache_capacity: u64,
}

/// Whether a read may be served from the revalidation cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Revalidate,
    NoStore,
}

/// `{ "data": T }` or plain `T`; the comments plugin is not consistent.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum MaybeWrapped<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> MaybeWrapped<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            MaybeWrapped::Wrapped { data } | MaybeWrapped::Bare(data) => data,
        }
    }
}

#[derive(Clone)]
pub struct Cms {
    http: Client,
    base_url: String,
    api_token: Option<String>,
    cache: ResponseCache,
}

impl Cms {
    pub fn new(config: CmsConfig) -> Result<Self, CmsError> {
        let base_url = config.url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .user_agent(concat!("aperture/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| CmsError::Transport {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            api_token: config.api_token.filter(|t| !t.is_empty()),
            cache: ResponseCache::new(config.revalidate, config.cache_capacity),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, endpoint: &str, query: &Value) -> String {
        let qs = query::to_query_string(query);
        let mut url = format!("{}/api/{}", self.base_url, endpoint.trim_start_matches('/'));
        if !qs.is_empty() {
            url.push('?');
            url.push_str(&qs);
        }
        url
    }

    /// Reads a collection endpoint with the configured API token.
    pub async fn fetch_api<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &Value,
        freshness: Freshness,
    ) -> Result<T, CmsError> {
        let url = self.endpoint_url(endpoint, query);

        if freshness == Freshness::Revalidate {
            if let Some(cached) = self.cache.get(&url).await {
                debug!("[CMS] cache hit {}", url);
                return decode(&url, cached);
            }
        }

        let mut req = self.http.get(&url);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let json = self.send(req, &url).await.inspect_err(|e| {
            error!("[CMS] Error fetching {}: {}", url, e);
        })?;

        if json.get("data").map_or(true, Value::is_null) {
            warn!("[CMS] No data returned for {}", url);
        }

        if freshness == Freshness::Revalidate {
            self.cache.put(url.clone(), json.clone()).await;
        }

        decode(&url, json)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, url: &str, jwt: Option<&str>) -> RequestBuilder {
        with_user(self.http.get(url), jwt)
    }

    pub(crate) fn post(&self, url: &str, jwt: Option<&str>) -> RequestBuilder {
        with_user(self.http.post(url), jwt)
    }

    pub(crate) fn put(&self, url: &str, jwt: Option<&str>) -> RequestBuilder {
        with_user(self.http.put(url), jwt)
    }

    /// Sends, maps non-2xx to [`CmsError::Status`] and parses the body.
    /// An empty 2xx body comes back as `Value::Null`.
    pub(crate) async fn send(&self, req: RequestBuilder, url: &str) -> Result<Value, CmsError> {
        let transport = |source| CmsError::Transport {
            url: url.to_string(),
            source,
        };

        let resp = req.send().await.map_err(transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|source| CmsError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn with_user(req: RequestBuilder, jwt: Option<&str>) -> RequestBuilder {
    match jwt {
        Some(token) => req.bearer_auth(token),
        None => req,
    }
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, json: Value) -> Result<T, CmsError> {
    serde_json::from_value(json).map_err(|source| CmsError::Decode {
        url: url.to_string(),
        source,
    })
}
