// drupal.org HTTP client.
// Fetches resources over HTTP, backed by the write-once response cache.

use std::path::PathBuf;

use reqwest::{
    Client, StatusCode, Url,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use tracing::info;

use crate::cache::CacheStore;
use crate::error::{IssueError, Result};

/// Content returned by a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// Parsed body of a `.json` resource.
    Json(Value),
    /// Raw body of any other resource.
    Raw(Vec<u8>),
}

/// HTTP client for drupal.org with a local response cache.
pub struct DrupalClient {
    client: Client,
    cache: CacheStore,
    api_base: String,
}

impl DrupalClient {
    /// Create a client for the API at `api_base`, caching responses in the given store.
    pub fn new(cache: CacheStore, api_base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("drupal-issue/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(IssueError::Http)?;

        Ok(Self {
            client,
            cache,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the JSON representation of a node.
    pub fn node_url(&self, nid: u64) -> String {
        format!("{}/node/{}.json", self.api_base, nid)
    }

    /// The response cache.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Fetch a URL, parsing the body when the URL names a JSON resource.
    ///
    /// With `use_cache`, an existing cache entry is returned without touching the
    /// network, and a fresh response is stored if no entry exists yet.
    pub async fn fetch(&self, url: &str, use_cache: bool) -> Result<Fetched> {
        let is_json = is_json_url(url)?;

        if use_cache {
            if let Some(contents) = self.cache.read(url)? {
                return decode(contents, is_json);
            }
        }

        let contents = self.get(url).await?;

        // A JSON body is only worth keeping if it parses.
        let value = if is_json {
            Some(serde_json::from_slice::<Value>(&contents)?)
        } else {
            None
        };

        if use_cache {
            self.cache.write_once(url, &contents)?;
        }

        Ok(match value {
            Some(value) => Fetched::Json(value),
            None => Fetched::Raw(contents),
        })
    }

    /// Fetch a JSON resource and return the parsed value.
    pub async fn fetch_json(&self, url: &str, use_cache: bool) -> Result<Value> {
        match self.fetch(url, use_cache).await? {
            Fetched::Json(value) => Ok(value),
            Fetched::Raw(_) => Err(IssueError::NotJson(url.to_string())),
        }
    }

    /// Make sure a URL is cached and return the path of its cache file.
    pub async fn fetch_to_cache_file(&self, url: &str) -> Result<PathBuf> {
        self.fetch(url, true).await?;
        Ok(self.cache.entry_path(url))
    }

    /// Make a single GET request and return the body.
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        info!(url, "fetching");
        let response = self.client.get(url).send().await.map_err(IssueError::Http)?;

        match response.status() {
            status if status.is_success() => Ok(response.bytes().await?.to_vec()),
            StatusCode::NOT_FOUND => Err(IssueError::NotFound(url.to_string())),
            status => Err(IssueError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

/// Extension of the last segment of a URL's path, if any.
pub fn url_extension(url: &str) -> Result<Option<String>> {
    let parsed = Url::parse(url).map_err(|e| IssueError::InvalidUrl(format!("{}: {}", url, e)))?;
    let extension = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, extension)| extension.to_string());
    Ok(extension)
}

/// Turn a body into fetched content.
fn decode(contents: Vec<u8>, is_json: bool) -> Result<Fetched> {
    if is_json {
        Ok(Fetched::Json(serde_json::from_slice(&contents)?))
    } else {
        Ok(Fetched::Raw(contents))
    }
}

/// Whether a URL names a JSON resource.
fn is_json_url(url: &str) -> Result<bool> {
    Ok(url_extension(url)?.as_deref() == Some("json"))
}
