//! The single chokepoint for outbound calls to the VisaPath platform
//! API: bearer injection, response-envelope normalization, and the
//! 401 refresh-and-retry protocol.

use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::Settings;
use crate::error::{ApiError, Result};
use crate::session;
use crate::ui::{self, Route};

const GENERIC_ERROR: &str = "An error occurred";
const NETWORK_ERROR: &str = "Network error. Please check your connection.";

/// Standard `{ success, message, data }` wrapper every platform endpoint
/// responds with. Loose shapes are normalized here so callers never
/// branch on shape ambiguity.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

fn default_success() -> bool {
    true
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            let message = self.message.unwrap_or_else(|| GENERIC_ERROR.to_string());
            return Err(ApiError::Envelope(message));
        }
        self.data
            .ok_or_else(|| ApiError::Envelope("response carried no data".to_string()))
    }

    /// For endpoints where an absent payload is a valid answer
    /// (e.g. "no assessment on file yet").
    pub fn into_optional(self) -> Result<Option<T>> {
        if !self.success {
            let message = self.message.unwrap_or_else(|| GENERIC_ERROR.to_string());
            return Err(ApiError::Envelope(message));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    /// Single-flight gate: concurrent 401s funnel into one refresh call.
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.api.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.api.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: settings.api.base_url.trim_end_matches('/').to_string(),
            refresh_gate: Mutex::new(()),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.http.request(Method::GET, self.url(path));
        self.execute(builder).await?.into_data()
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.http.request(Method::GET, self.url(path)).query(query);
        self.execute(builder).await?.into_data()
    }

    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let builder = self.http.request(Method::GET, self.url(path));
        self.execute(builder).await?.into_optional()
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.http.request(Method::POST, self.url(path)).json(body);
        self.execute(builder).await?.into_data()
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.http.request(Method::PUT, self.url(path)).json(body);
        self.execute(builder).await?.into_data()
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.http.request(Method::DELETE, self.url(path));
        self.execute(builder).await?.into_data()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Runs one request through the full response protocol. Bodies are
    /// buffered by reqwest, so the builder is cloneable for the single
    /// permitted retry.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Envelope<T>> {
        let retry_builder = builder.try_clone();
        let response = self.dispatch(builder).await?;
        let status = response.status();

        if status.is_success() {
            return decode(response).await;
        }

        let message = error_message(response).await;

        if status == StatusCode::UNAUTHORIZED {
            if session::refresh_token().is_some() {
                if let Some(retry) = retry_builder {
                    self.ensure_fresh_token().await?;
                    return self.retry_once(retry).await;
                }
                warn!("Unauthorized response on an unclonable request; not retrying");
            }
            // No refresh credential: surface and propagate the original
            // unauthorized error.
            ui::toast_error(message.as_str());
            return Err(ApiError::Unauthorized(message));
        }

        Err(self.fail(status, message))
    }

    /// The one retry an original request is entitled to. A second
    /// unauthorized here must not trigger another refresh.
    async fn retry_once<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Envelope<T>> {
        debug!("Retrying request with refreshed credentials");
        let response = self.dispatch(builder).await?;
        let status = response.status();

        if status.is_success() {
            return decode(response).await;
        }

        let message = error_message(response).await;
        if status == StatusCode::UNAUTHORIZED {
            ui::toast_error(message.as_str());
            return Err(ApiError::Unauthorized(message));
        }
        Err(self.fail(status, message))
    }

    /// Attaches the current access credential (if any) and sends.
    /// Requests that never reach the server surface the connectivity
    /// toast and map to `ApiError::Network`.
    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response> {
        let builder = match session::access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        builder.send().await.map_err(|e| {
            ui::toast_error(NETWORK_ERROR);
            ApiError::Network(e.to_string())
        })
    }

    /// Non-401 failure classification. Validation failures are left for
    /// the originating form to render; everything else is toasted with
    /// the server message when present.
    fn fail(&self, status: StatusCode, message: String) -> ApiError {
        if status == StatusCode::BAD_REQUEST {
            return ApiError::Validation { message };
        }
        ui::toast_error(message.as_str());
        ApiError::Server { status: status.as_u16(), message }
    }

    /// Single-flight token refresh. The first caller holds the gate and
    /// rotates both credentials; callers that queued behind it observe
    /// the rotated token and skip the extra refresh call. Refresh
    /// failure tears the session down and redirects to login.
    async fn ensure_fresh_token(&self) -> Result<()> {
        let stale = session::access_token();
        let _gate = self.refresh_gate.lock().await;
        if session::access_token() != stale {
            debug!("Access credential already rotated by a concurrent refresh");
            return Ok(());
        }

        let refresh_token = session::refresh_token()
            .ok_or_else(|| ApiError::Unauthorized("no refresh credential".to_string()))?;

        info!("Access credential expired, refreshing");
        let body = serde_json::json!({ "refreshToken": refresh_token });
        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.refresh_failed(e.to_string()))?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            return Err(self.refresh_failed(message));
        }

        let pair = response
            .json::<Envelope<TokenPair>>()
            .await
            .map_err(|e| self.refresh_failed(e.to_string()))?
            .into_data()
            .map_err(|e| self.refresh_failed(e.to_string()))?;

        // Both credentials are replaced before any retry is issued.
        session::rotate_tokens(pair.access_token, pair.refresh_token);
        Ok(())
    }

    /// Unrecoverable authorization loss: empty the session and point the
    /// UI at the login entry. Exactly one redirect per failed refresh.
    fn refresh_failed(&self, reason: String) -> ApiError {
        warn!("Session refresh failed: {}", reason);
        session::clear_local();
        ui::navigate(Route::Login);
        ApiError::RefreshFailed(reason)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>> {
    response
        .json::<Envelope<T>>()
        .await
        .map_err(|e| ApiError::Envelope(e.to_string()))
}

/// Pulls the server-provided message out of an error body, falling back
/// to a generic one.
async fn error_message(response: Response) -> String {
    match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or(GENERIC_ERROR)
            .to_string(),
        Err(_) => GENERIC_ERROR.to_string(),
    }
}
