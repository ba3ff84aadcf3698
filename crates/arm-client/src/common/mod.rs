//! Common utilities for the Resource Manager client
//!
//! Provides the authenticated HTTP wrapper shared by every resource kind:
//! `api-version` handling, error body decoding, `nextLink` pagination and
//! long-running operation polling.

pub mod resource_id;

use crate::error::ArmError;
use crate::models::{ErrorResponse, ListResponse, OperationStatus};
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub use resource_id::{
    COMPUTE_PROVIDER, IDENTITY_PROVIDER, NETWORK_PROVIDER, ResourceId, resource_group_path,
    resource_name_from_id,
};

const ASYNC_OPERATION: &str = "Azure-AsyncOperation";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// HTTP client wrapper with bearer authentication
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
    poll_interval: Duration,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the fallback delay between long-running operation polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a resource path and API version
    pub fn build_url(&self, path: &str, api_version: &str) -> String {
        let base = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        };
        let separator = if base.contains('?') { '&' } else { '?' };
        format!(
            "{}{}api-version={}",
            base,
            separator,
            urlencoding::encode(api_version)
        )
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str, api_version: &str) -> Result<T, ArmError> {
        let url = self.build_url(path, api_version);
        debug!("GET {}", url);
        let response = self.send_get(&url).await?;
        decode(response).await
    }

    /// PUT a resource and wait for the operation to finish.
    ///
    /// Returns the converged resource as reported by the provider.
    pub async fn put<B, T>(&self, path: &str, api_version: &str, body: &B) -> Result<T, ArmError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.build_url(path, api_version);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        match header_str(response.headers(), ASYNC_OPERATION) {
            Some(operation) => {
                let retry_after = self.retry_after(response.headers());
                self.wait_for_async_operation(&operation, retry_after).await?;
                self.get(path, api_version).await
            }
            None if status == StatusCode::ACCEPTED => {
                let location = header_str(response.headers(), LOCATION.as_str());
                let retry_after = self.retry_after(response.headers());
                if let Some(location) = location {
                    self.wait_for_location(&location, retry_after).await?;
                }
                self.get(path, api_version).await
            }
            None => decode(response).await,
        }
    }

    /// DELETE a resource and wait for the operation to finish.
    ///
    /// A 404 surfaces as a NotFound-classified [`ArmError`]; callers decide
    /// whether that counts as success.
    pub async fn delete(&self, path: &str, api_version: &str) -> Result<(), ArmError> {
        let url = self.build_url(path, api_version);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let retry_after = self.retry_after(response.headers());
        if let Some(operation) = header_str(response.headers(), ASYNC_OPERATION) {
            self.wait_for_async_operation(&operation, retry_after).await
        } else if status == StatusCode::ACCEPTED {
            match header_str(response.headers(), LOCATION.as_str()) {
                Some(location) => self.wait_for_location(&location, retry_after).await,
                None => Ok(()),
            }
        } else {
            Ok(())
        }
    }

    /// Fetch all pages of a list response, following `nextLink`
    pub async fn fetch_all_pages<T: DeserializeOwned>(&self, mut url: String) -> Result<Vec<T>, ArmError> {
        let mut all_results = Vec::new();

        loop {
            debug!("Fetching page: {}", url);
            let response = self.send_get(&url).await?;
            let page: ListResponse<T> = decode(response).await?;
            all_results.extend(page.value);

            match page.next_link {
                Some(next_link) if !next_link.is_empty() => url = next_link,
                _ => break,
            }
        }

        Ok(all_results)
    }

    async fn send_get(&self, url: &str) -> Result<Response, ArmError> {
        Ok(self
            .client
            .get(url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?)
    }

    /// Poll an `Azure-AsyncOperation` URL until the operation reaches a
    /// terminal state.
    async fn wait_for_async_operation(&self, operation: &str, mut delay: Duration) -> Result<(), ArmError> {
        loop {
            tokio::time::sleep(delay).await;
            debug!("Polling operation {}", operation);

            let response = self.send_get(operation).await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }
            delay = self.retry_after(response.headers());
            let status: OperationStatus = decode(response).await?;

            match status.status.as_str() {
                "Succeeded" => return Ok(()),
                "Failed" | "Canceled" | "Cancelled" => {
                    return Err(match status.error {
                        Some(detail) if !detail.message.is_empty() => ArmError::Api {
                            status: 200,
                            code: Some(detail.code),
                            message: detail.message,
                        },
                        _ => ArmError::Operation {
                            operation: operation.to_string(),
                            status: status.status,
                        },
                    });
                }
                _ => {}
            }
        }
    }

    /// Poll a `Location` URL: 202 means still running, any other success is done.
    async fn wait_for_location(&self, location: &str, mut delay: Duration) -> Result<(), ArmError> {
        loop {
            tokio::time::sleep(delay).await;
            debug!("Polling location {}", location);

            let response = self.send_get(location).await?;
            let status = response.status();
            if !status.is_success() {
                return Err(error_from_response(response).await);
            }
            if status != StatusCode::ACCEPTED {
                return Ok(());
            }
            delay = self.retry_after(response.headers());
        }
    }

    fn retry_after(&self, headers: &HeaderMap) -> Duration {
        header_str(headers, RETRY_AFTER.as_str())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.poll_interval)
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Decode a successful response body, or turn a failed one into an [`ArmError`]
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ArmError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Build an [`ArmError::Api`] from a failed response, using the provider's
/// `{"error": {"code", "message"}}` envelope when present.
pub async fn error_from_response(response: Response) -> ArmError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    api_error(status, &body)
}

/// Build an [`ArmError::Api`] from a status code and raw body
pub fn api_error(status: StatusCode, body: &str) -> ArmError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.error);

    match detail {
        Some(detail) => ArmError::Api {
            status: status.as_u16(),
            code: (!detail.code.is_empty()).then_some(detail.code),
            message: detail.message,
        },
        None => ArmError::Api {
            status: status.as_u16(),
            code: None,
            message: status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| body.chars().take(500).collect()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn client() -> HttpClient {
        HttpClient::new(
            Client::new(),
            "https://management.azure.com/".to_string(),
            "token".to_string(),
        )
    }

    #[test]
    fn test_build_url_appends_api_version() {
        let http = client();
        assert_eq!(
            http.build_url("/subscriptions/123/providers/Microsoft.Compute/skus", "2019-04-01"),
            "https://management.azure.com/subscriptions/123/providers/Microsoft.Compute/skus?api-version=2019-04-01"
        );
        assert_eq!(
            http.build_url("/a?ipAddress=10.0.0.4", "2019-06-01"),
            "https://management.azure.com/a?ipAddress=10.0.0.4&api-version=2019-06-01"
        );
    }

    #[test]
    fn test_api_error_parses_error_envelope() {
        let err = api_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":"ResourceNotFound","message":"The Resource 'my-lb' was not found."}}"#,
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
        match err {
            ArmError::Api { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("ResourceNotFound"));
                assert_eq!(message, "The Resource 'my-lb' was not found.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_without_envelope_uses_reason() {
        let err = api_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert_eq!(err.kind(), ErrorKind::Throttled);
        assert_eq!(err.to_string(), "Too Many Requests: StatusCode=429");
    }
}
