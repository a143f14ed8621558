//! API client for communicating with the CreatorsHub REST API.
//!
//! Every operation is a single request/response round trip. Nothing is
//! retried here; retry policy belongs to the caller.

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{Config, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::models::{
    AudioFile, AuthSession, LoginRequest, RegistrationRequest, RegistrationResult, Track, User,
    VerificationRequest,
};

use super::multipart::MultipartBuilder;
use super::ClientError;

// ============================================================================
// Constants
// ============================================================================

const REGISTER_PATH: &str = "/auth/register";
const LOGIN_PATH: &str = "/auth/login";
const VERIFY_PATH: &str = "/auth/verify";
const CURRENT_USER_PATH: &str = "/users/me";
const UPLOAD_TRACK_PATH: &str = "/tracks/upload";

/// Fixed filename and content type for the optional cover image part
const COVER_FILENAME: &str = "cover.jpg";
const COVER_CONTENT_TYPE: &str = "image/jpeg";

/// API client for CreatorsHub.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client from startup configuration
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        // A zero timeout would fail every request immediately
        let timeout_secs = match config.request_timeout_secs {
            0 => {
                warn!(default = DEFAULT_REQUEST_TIMEOUT_SECS, "Request timeout of 0s ignored, using default");
                DEFAULT_REQUEST_TIMEOUT_SECS
            }
            secs => secs,
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client for the given origin with default settings
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let config = Config {
            base_url: base_url.into(),
            ..Config::default()
        };
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode a 2xx JSON body into `T`.
    ///
    /// Non-2xx responses are classified from their body, empty 2xx bodies are
    /// reported as `EmptyResponse`.
    async fn send<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let err = ClientError::from_status(status, &body);
            debug!(
                url = url,
                status = status.as_u16(),
                body = %ClientError::truncate_body(&String::from_utf8_lossy(&body)),
                "Request failed"
            );
            return Err(err);
        }

        if body.is_empty() {
            warn!(url = url, status = status.as_u16(), "Response had no body");
            return Err(ClientError::EmptyResponse(url.to_string()));
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!(url = url, error = %e, "Failed to parse JSON response");
            ClientError::Decode(e)
        })
    }

    // ===== Auth =====

    /// Create an account. The account must be verified before it can log in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
        display_name: &str,
    ) -> Result<RegistrationResult, ClientError> {
        let url = self.url(REGISTER_PATH);
        debug!(url = %url, username = username, "Registering account");

        let body = RegistrationRequest {
            email,
            password,
            username,
            display_name,
        };
        Self::send(self.client.post(&url).json(&body), &url).await
    }

    /// Exchange credentials for a session.
    ///
    /// An unverified account fails with `ClientError::Server` whose code is
    /// `EMAIL_NOT_VERIFIED`; see `ClientError::unverified_user_id`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let url = self.url(LOGIN_PATH);
        debug!(url = %url, "Logging in");

        let body = LoginRequest { email, password };
        Self::send(self.client.post(&url).json(&body), &url).await
    }

    /// Submit the emailed verification code. The code is passed through as-is.
    pub async fn verify_code(&self, user_id: &str, code: &str) -> Result<AuthSession, ClientError> {
        let url = self.url(VERIFY_PATH);
        debug!(url = %url, user_id = user_id, "Verifying account");

        let body = VerificationRequest { user_id, code };
        Self::send(self.client.post(&url).json(&body), &url).await
    }

    // ===== Users =====

    pub async fn get_current_user(&self, access_token: &str) -> Result<User, ClientError> {
        let url = self.url(CURRENT_USER_PATH);
        debug!(url = %url, "Fetching current user");

        let request = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(access_token);
        Self::send(request, &url).await
    }

    // ===== Tracks =====

    /// Upload an audio file with its metadata and an optional JPEG cover.
    ///
    /// The file is read before anything is sent; a read failure resolves to
    /// `ClientError::LocalIo` without a network request.
    pub async fn upload_track(
        &self,
        file: &AudioFile,
        title: &str,
        description: &str,
        cover_image: Option<&[u8]>,
        access_token: &str,
    ) -> Result<Track, ClientError> {
        let audio = tokio::fs::read(file.path())
            .await
            .map_err(|source| ClientError::LocalIo {
                path: file.path().to_path_buf(),
                source,
            })?;

        let builder = upload_body(file, &audio, title, description, cover_image);
        let content_type = builder.content_type();
        let body = builder.finish();

        let url = self.url(UPLOAD_TRACK_PATH);
        debug!(
            url = %url,
            file = %file.file_name(),
            bytes = body.len(),
            has_cover = cover_image.is_some(),
            "Uploading track"
        );

        let request = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .header(header::CONTENT_TYPE, content_type)
            .body(body);
        Self::send(request, &url).await
    }
}

/// Lay out the upload parts: title, description, file, then the optional cover
fn upload_body(
    file: &AudioFile,
    audio: &[u8],
    title: &str,
    description: &str,
    cover_image: Option<&[u8]>,
) -> MultipartBuilder {
    let mut builder = MultipartBuilder::new();
    builder
        .text("title", title)
        .text("description", description)
        .file("file", &file.file_name(), file.content_type(), audio);

    if let Some(cover) = cover_image {
        builder.file("coverImage", COVER_FILENAME, COVER_CONTENT_TYPE, cover);
    }

    builder
}
