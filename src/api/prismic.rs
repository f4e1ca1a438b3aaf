//! HTTP client for the Prismic REST v2 API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, trace};

use super::error::FetchError;
use super::wire::{ApiRoot, SearchResponse};
use super::ContentSource;
use crate::config::ApiConfig;
use crate::content::{Cursor, PageResult, PostDetail};

/// Client for one Prismic repository
#[derive(Debug)]
pub struct PrismicClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
    document_type: String,
    page_size: usize,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    /// Create a client from the `api` section of the site configuration
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("prismic-blog/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            document_type: config.document_type.clone(),
            page_size: config.page_size.max(1),
            master_ref: OnceCell::new(),
        })
    }

    /// The API root URL this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve the master ref once per client
    async fn master_ref(&self) -> Result<&str, FetchError> {
        self.master_ref
            .get_or_try_init(|| async {
                let root: ApiRoot = self.get_json(self.client.get(&self.endpoint)).await?;
                root.master_ref()
                    .map(str::to_string)
                    .ok_or_else(|| FetchError::MissingMasterRef(self.endpoint.clone()))
            })
            .await
            .map(String::as_str)
    }

    /// Run a predicate query against the master ref
    async fn search(
        &self,
        predicate: &str,
        page_size: usize,
    ) -> Result<SearchResponse, FetchError> {
        let reference = self.master_ref().await?;
        let url = format!("{}/documents/search", self.endpoint);
        let query = format!("[{}]", predicate);
        debug!(%url, predicate, "Prismic search");

        let request = self.client.get(&url).query(&[
            ("ref", reference),
            ("q", query.as_str()),
            ("pageSize", page_size.to_string().as_str()),
        ]);
        self.get_json(request).await
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.query(&[("access_token", token)]),
            None => request,
        }
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<R, FetchError> {
        let response = self.with_token(request).send().await?;
        let status = response.status();
        let url = response.url().to_string();
        trace!(status = %status, %url, "Prismic response");

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_initial_page(&self) -> Result<PageResult, FetchError> {
        let predicate = format!(r#"[at(document.type,"{}")]"#, self.document_type);
        let response = self.search(&predicate, self.page_size).await?;
        Ok(response.into_page())
    }

    /// The cursor is the `next_page` URL handed out by the previous page
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_page(&self, cursor: &Cursor) -> Result<PageResult, FetchError> {
        let mut url = Url::parse(cursor.as_str())
            .map_err(|_| FetchError::InvalidCursor(cursor.to_string()))?;
        if self.access_token.is_some() {
            // Reapplied by get_json
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(key, _)| key != "access_token")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        debug!(%url, "Fetching next page");

        let response: SearchResponse = self.get_json(self.client.get(url)).await?;
        Ok(response.into_page())
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_post_by_uid(&self, uid: &str) -> Result<Option<PostDetail>, FetchError> {
        let predicate = format!(
            r#"[at(my.{}.uid,"{}")]"#,
            self.document_type,
            uid.replace('"', "")
        );
        let response = self.search(&predicate, 1).await?;
        Ok(response
            .results
            .into_iter()
            .next()
            .map(|document| document.into_detail()))
    }
}
