//! Sign-in coordinator used by front-ends.
//!
//! `AuthFlow` validates form input, calls the API client and hands
//! successful auth exchanges to the `SessionManager`. A login refused for an
//! unverified email becomes `LoginOutcome::VerificationRequired` instead of
//! an error. Pending verification is never persisted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::api::{ApiClient, ClientError};
use crate::models::{AudioFile, AuthSession, Track, User};

use super::session::SessionManager;
use super::vault::VaultError;
use super::validation::{
    validate_login, validate_registration, validate_upload, validate_verification_code,
    ValidationError,
};

#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error("Session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl FlowError {
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Invalid(e) => e.to_string(),
            FlowError::Client(e) => e.user_message(),
            FlowError::Vault(e) => format!("Sign-out may be incomplete: {}", e),
            FlowError::Task(e) => e.to_string(),
        }
    }
}

/// Result of a login attempt that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn(User),
    /// The account exists but its email is unverified; send a code for `user_id`.
    VerificationRequired { user_id: String },
}

/// Transient state between registration and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub user_id: String,
    pub message: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct AuthFlow {
    client: ApiClient,
    session: Arc<SessionManager>,
}

impl AuthFlow {
    pub fn new(client: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Hand a fresh session to the manager. Vault writes block, so they run
    /// on the blocking pool instead of the async worker.
    async fn store(&self, auth: AuthSession) -> Result<User, FlowError> {
        let session = self.session.clone();
        let user = tokio::task::spawn_blocking(move || {
            session.save_auth(&auth);
            auth.user
        })
        .await?;
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, FlowError> {
        validate_login(email, password)?;

        match self.client.login(email, password).await {
            Ok(auth) => {
                let user = self.store(auth).await?;
                info!(user_id = %user.id, "Signed in");
                Ok(LoginOutcome::SignedIn(user))
            }
            Err(e) => match e.unverified_user_id() {
                Some(user_id) => {
                    info!(user_id = user_id, "Email not verified, verification required");
                    Ok(LoginOutcome::VerificationRequired {
                        user_id: user_id.to_string(),
                    })
                }
                None => Err(e.into()),
            },
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
        display_name: &str,
    ) -> Result<PendingVerification, FlowError> {
        validate_registration(email, password, username, display_name)?;

        let result = self
            .client
            .register(email, password, username, display_name)
            .await?;
        info!(user_id = %result.user_id, "Registered, awaiting verification");

        Ok(PendingVerification {
            expires_at: result.expires_at_utc(),
            user_id: result.user_id,
            message: result.message,
        })
    }

    /// Submit a verification code and sign in on success
    pub async fn verify(&self, user_id: &str, code: &str) -> Result<User, FlowError> {
        validate_verification_code(code)?;

        let auth = self.client.verify_code(user_id, code).await?;
        let user = self.store(auth).await?;
        info!(user_id = %user.id, "Verified and signed in");
        Ok(user)
    }

    /// Fetch `/users/me` with the stored token
    pub async fn current_user(&self) -> Result<User, FlowError> {
        let token = self.session.access_token().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.client.get_current_user(&token).await?)
    }

    pub async fn upload_track(
        &self,
        file: &AudioFile,
        title: &str,
        description: &str,
        cover_image: Option<&[u8]>,
    ) -> Result<Track, FlowError> {
        let token = self.session.access_token().ok_or(ClientError::NotAuthenticated)?;
        validate_upload(title)?;

        let track = self
            .client
            .upload_track(file, title, description, cover_image, &token)
            .await?;
        info!(track_id = %track.track_id, "Track uploaded");
        Ok(track)
    }

    /// Sign out. An error means some stored entries survived.
    pub async fn logout(&self) -> Result<(), FlowError> {
        let session = self.session.clone();
        tokio::task::spawn_blocking(move || session.logout()).await??;
        Ok(())
    }
}
