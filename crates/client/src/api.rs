//! HTTP adapter for the Cafecraft backend API.
//!
//! A single-shot request/response mapper over `reqwest`: no retry, no
//! timeout beyond the transport's own, no caching. The bearer token is read
//! from durable storage before every request, so a login or logout in the
//! shell takes effect on the next call without rebuilding the client.

use std::sync::Arc;

use reqwest::{Method, StatusCode, header, multipart};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::auth::CredentialStore;
use crate::config::ClientConfig;
use crate::error::{ApiError, error_body_message};
use crate::storage::StorageBackend;
use crate::ui::{LOGIN_PATH, Navigator};

/// A successfully mapped response body.
///
/// HTTP 204 and byte-empty 2xx bodies map to [`ApiBody::NoContent`] - never
/// to an empty JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    /// Parsed JSON body.
    Json(serde_json::Value),
    /// The server confirmed the request without returning data.
    NoContent,
}

impl ApiBody {
    /// Unwrap into a JSON value; `NoContent` becomes `Value::Null`.
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        match self {
            Self::Json(value) => value,
            Self::NoContent => serde_json::Value::Null,
        }
    }

    /// Whether the response carried no body.
    #[must_use]
    pub const fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent)
    }
}

/// Client for the Cafecraft backend API.
///
/// Cheaply cloneable via `Arc`; one instance is shared by every store in the
/// process.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialStore,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn StorageBackend>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_base_url.clone(),
                credentials: CredentialStore::new(storage),
                navigator,
            }),
        }
    }

    /// Access to the persisted session credentials.
    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    /// `GET` a relative endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or any non-2xx response.
    #[instrument(skip(self))]
    pub async fn get(&self, endpoint: &str) -> Result<ApiBody, ApiError> {
        self.dispatch(endpoint, self.request(Method::GET, endpoint))
            .await
    }

    /// `POST` a JSON body to a relative endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or any non-2xx response.
    #[instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiBody, ApiError> {
        self.dispatch(endpoint, self.request(Method::POST, endpoint).json(body))
            .await
    }

    /// `PATCH` a JSON body to a relative endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or any non-2xx response.
    #[instrument(skip(self, body))]
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiBody, ApiError> {
        self.dispatch(endpoint, self.request(Method::PATCH, endpoint).json(body))
            .await
    }

    /// `DELETE` a relative endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or any non-2xx response.
    #[instrument(skip(self))]
    pub async fn delete(&self, endpoint: &str) -> Result<ApiBody, ApiError> {
        self.dispatch(endpoint, self.request(Method::DELETE, endpoint))
            .await
    }

    /// `POST` a multipart form (file uploads).
    ///
    /// The JSON `Content-Type` override is omitted so the transport can set
    /// the multipart boundary; the `Authorization` header is still attached.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or any non-2xx response.
    #[instrument(skip(self, form))]
    pub async fn post_multipart(
        &self,
        endpoint: &str,
        form: multipart::Form,
    ) -> Result<ApiBody, ApiError> {
        let mut builder = self
            .inner
            .http
            .post(format!("{}{endpoint}", self.inner.base_url))
            .multipart(form);
        if let Some(token) = self.inner.credentials.access_token() {
            builder = builder.bearer_auth(token.expose_secret());
        }
        self.dispatch(endpoint, builder).await
    }

    /// `GET` an endpoint and deserialize its JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, any non-2xx response, or a body
    /// that does not match `T` (a `NoContent` response never matches).
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let body = self.get(endpoint).await?;
        Ok(serde_json::from_value(body.into_value())?)
    }

    fn request(&self, method: Method, endpoint: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .inner
            .http
            .request(method, format!("{}{endpoint}", self.inner.base_url))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = self.inner.credentials.access_token() {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    async fn dispatch(
        &self,
        endpoint: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<ApiBody, ApiError> {
        let response = builder.send().await?;
        self.handle_response(endpoint, response).await
    }

    /// Map a raw response to `ApiBody` / `ApiError`.
    async fn handle_response(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<ApiBody, ApiError> {
        let status = response.status();

        // Session rejected: wipe local credentials, send the client to login,
        // and fail the call. Never retried.
        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.inner.credentials.clear_session() {
                tracing::warn!(error = %e, "failed to wipe credentials after 401");
            }
            self.inner.navigator.redirect(LOGIN_PATH);
            return Err(ApiError::Unauthenticated);
        }

        // Body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_body_message(&body)
                .unwrap_or_else(|| format!("{} {endpoint} failed", status.as_u16()));
            tracing::error!(
                status = %status,
                endpoint,
                body = %body.chars().take(500).collect::<String>(),
                "API request failed"
            );
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT || body.is_empty() {
            return Ok(ApiBody::NoContent);
        }

        Ok(ApiBody::Json(serde_json::from_str(&body)?))
    }
}
