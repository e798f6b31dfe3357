//! Proxy to the remote forms service.
//!
//! A `form` query parameter on start-operation selects a form document to
//! fetch from the configured forms service; every other query parameter
//! passes through to it unchanged.

use axum::http::StatusCode;
use reqwest::Client;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FormsError {
    #[error("Invalid 'form' query parameter: {0}")]
    InvalidQuery(String),

    /// The forms service answered with a non-success status; its status
    /// and payload are passed through to the caller
    #[error("Forms service responded with status {status}")]
    Upstream { status: StatusCode, body: String },

    #[error("Forms service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
}

/// HTTP client for the forms service
pub struct FormsClient {
    http_client: Client,
    base_url: Url,
}

impl FormsClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
        }
    }

    /// Resolve the `form` query parameter against the forms service
    ///
    /// Returns `Ok(None)` when the raw query carries no `form` parameter.
    /// An empty or repeated `form` value is rejected before any request is
    /// made. Parameter names are matched case-insensitively.
    pub async fn resolve(&self, raw_query: Option<&str>) -> Result<Option<String>, FormsError> {
        let Some(query) = raw_query else {
            return Ok(None);
        };

        let mut form_name: Option<String> = None;
        let mut passthrough: Vec<(String, String)> = Vec::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let name = key.to_lowercase();
            if name == "form" {
                if form_name.is_some() {
                    return Err(FormsError::InvalidQuery(
                        "the parameter contains more than one value".to_string(),
                    ));
                }
                if value.is_empty() {
                    return Err(FormsError::InvalidQuery(
                        "the parameter is empty".to_string(),
                    ));
                }
                form_name = Some(value.into_owned());
            } else {
                passthrough.push((name, value.into_owned()));
            }
        }

        let Some(name) = form_name else {
            return Ok(None);
        };

        let document = self.fetch_form(&name, &passthrough).await?;
        Ok(Some(document))
    }

    async fn fetch_form(
        &self,
        name: &str,
        parameters: &[(String, String)],
    ) -> Result<String, FormsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FormsError::InvalidQuery("forms service URL cannot be a base".to_string()))?
            .push("forms")
            .push(name);
        if !parameters.is_empty() {
            url.query_pairs_mut().extend_pairs(parameters);
        }

        tracing::debug!(url = %url, "fetching form document");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(FormsError::Upstream { status, body })
        }
    }
}
