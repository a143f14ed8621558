use std::path::PathBuf;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Server error code for an account whose email has not been verified yet
pub const EMAIL_NOT_VERIFIED: &str = "EMAIL_NOT_VERIFIED";

/// Maximum length for error response bodies in log messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Structured error body returned by the API on any non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// No HTTP response was obtained (connectivity, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response arrived but carried no body where one was required.
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// Non-2xx status, with the structured body when it could be decoded.
    #[error("Server error (HTTP {status}): {}", .code.as_deref().unwrap_or("no error code"))]
    Server {
        status: u16,
        code: Option<String>,
        user_id: Option<String>,
    },

    /// 2xx status whose body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A local file could not be read; nothing was sent.
    #[error("Failed to read {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Not supported: {0}")]
    Unsupported(&'static str),
}

impl ClientError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Classify a non-2xx response from its status and raw body
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<ApiErrorBody>(body) {
            Ok(api) => ClientError::Server {
                status: status.as_u16(),
                code: Some(api.error),
                user_id: api.user_id,
            },
            Err(_) => ClientError::Server {
                status: status.as_u16(),
                code: None,
                user_id: None,
            },
        }
    }

    /// True for failures where no usable response was obtained
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::EmptyResponse(_))
    }

    /// Error code sent by the server, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_email_not_verified(&self) -> bool {
        self.code() == Some(EMAIL_NOT_VERIFIED)
    }

    /// The user id to verify when login was refused for an unverified email.
    ///
    /// `None` unless the code is `EMAIL_NOT_VERIFIED` and the server sent the id.
    pub fn unverified_user_id(&self) -> Option<&str> {
        match self {
            ClientError::Server {
                code: Some(code),
                user_id: Some(user_id),
                ..
            } if code == EMAIL_NOT_VERIFIED => Some(user_id),
            _ => None,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server { code: Some(code), .. } => code.clone(),
            ClientError::Server { status, .. } => {
                format!("The server returned an error (HTTP {}).", status)
            }
            ClientError::Transport(_) | ClientError::EmptyResponse(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ClientError::Decode(_) => "The server sent an unexpected response.".to_string(),
            ClientError::LocalIo { path, .. } => format!(
                "Could not read {}.",
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            ),
            ClientError::NotAuthenticated => "Log in to continue.".to_string(),
            ClientError::Unsupported(what) => format!("{} is not available yet.", what),
        }
    }
}
