//! HTTP client for the Prismic REST API (v2)

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::{ApiPage, ContentError, ContentResult, ContentSource, RawRecord};
use crate::config::ApiConfig;

/// Repository metadata returned by the API root
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Content source backed by a Prismic repository
///
/// Constructed once per process; the inner `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: String,
}

impl PrismicClient {
    /// Create a client from the process-wide API configuration
    pub fn new(config: &ApiConfig) -> ContentResult<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|_| ContentError::InvalidUrl(config.endpoint.clone()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            access_token: config.access_token.clone(),
        })
    }

    /// Resolve the ref of the currently published content
    async fn master_ref(&self) -> ContentResult<String> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);

        let info: ApiInfo = self.get_json(url).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(ContentError::MissingMasterRef)
    }

    /// Run a search query against the current master ref
    async fn search(&self, query: &str, page_size: usize) -> ContentResult<ApiPage> {
        let master_ref = self.master_ref().await?;
        let url = search_url(
            &self.endpoint,
            &master_ref,
            query,
            page_size,
            &self.access_token,
        )?;
        self.get_json(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ContentResult<T> {
        // The access token travels in the query string; keep it out of logs.
        let target = format!("{}{}", url.origin().ascii_serialization(), url.path());
        tracing::debug!("GET {}", target);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ContentError::Transport {
                url: target.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
                url: target,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ContentError::Transport {
                url: target.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|e| ContentError::Decode {
            url: target,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn fetch_page(&self, content_type: &str, page_size: usize) -> ContentResult<ApiPage> {
        if page_size == 0 {
            return Err(ContentError::InvalidPageSize);
        }
        let page = self.search(&type_query(content_type), page_size).await?;
        tracing::debug!(
            "Fetched {} {} documents (page {} of {})",
            page.results.len(),
            content_type,
            page.page,
            page.total_pages
        );
        Ok(page)
    }

    async fn fetch_next(&self, cursor: &str) -> ContentResult<ApiPage> {
        let url = cursor_url(cursor, &self.access_token)?;
        self.get_json(url).await
    }

    async fn fetch_by_uid(&self, content_type: &str, uid: &str) -> ContentResult<RawRecord> {
        let page = self.search(&uid_query(content_type, uid), 1).await?;
        page.results
            .into_iter()
            .next()
            .ok_or_else(|| ContentError::NotFound {
                content_type: content_type.to_string(),
                uid: uid.to_string(),
            })
    }
}

/// Predicate matching every document of a type
fn type_query(content_type: &str) -> String {
    format!(r#"[[at(document.type, "{}")]]"#, escape_literal(content_type))
}

/// Predicate matching the document of a type with a given uid
fn uid_query(content_type: &str, uid: &str) -> String {
    format!(
        r#"[[at(my.{}.uid, "{}")]]"#,
        content_type,
        escape_literal(uid)
    )
}

fn escape_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn search_url(
    endpoint: &Url,
    master_ref: &str,
    query: &str,
    page_size: usize,
    access_token: &str,
) -> ContentResult<Url> {
    let base = format!(
        "{}/documents/search",
        endpoint.as_str().trim_end_matches('/')
    );
    let mut url = Url::parse(&base).map_err(|_| ContentError::InvalidUrl(base.clone()))?;
    url.query_pairs_mut()
        .append_pair("ref", master_ref)
        .append_pair("q", query)
        .append_pair("pageSize", &page_size.to_string())
        .append_pair("access_token", access_token);
    Ok(url)
}

/// Parse a pagination cursor, adding the access token when the cursor lacks one
fn cursor_url(cursor: &str, access_token: &str) -> ContentResult<Url> {
    let mut url = Url::parse(cursor).map_err(|_| ContentError::InvalidUrl(cursor.to_string()))?;
    let has_token = url.query_pairs().any(|(k, _)| k == "access_token");
    if !has_token {
        url.query_pairs_mut()
            .append_pair("access_token", access_token);
    }
    Ok(url)
}
