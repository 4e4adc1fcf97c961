//! reqwest-backed implementation of [`AuthApi`] and [`TokenValidator`].

use reqwest::{Client, Response, StatusCode};
use serde_json::from_str;
use tradepost_types::{
    ApiErrorBody, AuthResponse, LoginRequest, RegisterRequest, User,
    UserRecord,
};

use crate::{
    ApiConfig, ApiError, AuthApi, CURRENT_USER_PATH, LOGIN_PATH,
    REGISTER_PATH, TokenValidator, Validation,
};

/// JSON-over-HTTPS client for the marketplace's auth endpoints.
///
/// Cloning is cheap: `reqwest::Client` is an `Arc` around a connection
/// pool.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: Client,
    config: ApiConfig,
}

impl HttpAuthApi {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    /// [`ApiError::Network`] if the TLS backend cannot be initialised.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn post_auth<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "auth request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = error_for_status(response).await?;
        let text = response.text().await.map_err(transport_error)?;
        from_str(&text).map_err(|e| {
            ApiError::Contract(format!("malformed auth response: {e}"))
        })
    }
}

impl AuthApi for HttpAuthApi {
    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        self.post_auth(LOGIN_PATH, request).await
    }

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        self.post_auth(REGISTER_PATH, request).await
    }
}

impl TokenValidator for HttpAuthApi {
    /// Asks the current-user endpoint who the token belongs to.
    ///
    /// 401 and 403 mean the token is no good; any other failure is
    /// returned as an error.
    async fn validate(&self, token: &str) -> Result<Validation, ApiError> {
        let url = self.config.endpoint(CURRENT_USER_PATH);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(Validation::Rejected);
        }

        let response = error_for_status(response).await?;
        let text = response.text().await.map_err(transport_error)?;
        let record: UserRecord = from_str(&text).map_err(|e| {
            ApiError::Contract(format!("malformed user record: {e}"))
        })?;
        Ok(Validation::Valid(User::from(record)))
    }
}

/// Passes 2xx responses through; turns everything else into an
/// [`ApiError`] whose message is the backend's `detail`, or the status
/// reason phrase when the body has none.
async fn error_for_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match from_str::<ApiErrorBody>(&body) {
        Ok(envelope) => envelope.detail,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    tracing::debug!(status = status.as_u16(), %message, "auth request failed");
    Err(ApiError::from_status(status.as_u16(), message))
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(err.to_string())
    }
}
