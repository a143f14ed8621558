use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub username: &'a str,
    #[serde(rename = "displayName")]
    pub display_name: &'a str,
}

/// Body of `POST /auth/login`. Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/verify`.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRequest<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    pub code: &'a str,
}

/// Pre-verification registration result. No tokens are issued yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResult {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub message: String,
    #[serde(rename = "expiresAt", default)]
    pub expires_at: Option<String>,
}

impl RegistrationResult {
    /// Expiry of the verification code, when the server sent a parseable one
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Authenticated result of login or verification.
///
/// Only ever produced by decoding a server response; the tokens are opaque
/// bearer strings and are never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthSession {
    pub user: User,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registration_result() {
        let json = r#"{"userId":"u42","message":"Check your inbox","expiresAt":"2026-10-18T12:30:00Z"}"#;
        let result: RegistrationResult =
            serde_json::from_str(json).expect("Failed to parse registration JSON");
        assert_eq!(result.user_id, "u42");
        let expires = result.expires_at_utc().expect("expiry should parse");
        assert_eq!(expires.to_rfc3339(), "2026-10-18T12:30:00+00:00");
    }

    #[test]
    fn test_registration_expiry_missing_or_garbage() {
        let mut result = RegistrationResult {
            user_id: "u1".to_string(),
            message: "ok".to_string(),
            expires_at: None,
        };
        assert!(result.expires_at_utc().is_none());
        result.expires_at = Some("tomorrow-ish".to_string());
        assert!(result.expires_at_utc().is_none());
    }

    #[test]
    fn test_request_bodies_use_wire_names() {
        let body = RegistrationRequest {
            email: "a@b.c",
            password: "pw",
            username: "neon",
            display_name: "Neon",
        };
        let value = serde_json::to_value(&body).expect("Failed to serialize request");
        assert_eq!(value["displayName"], "Neon");

        let verify = VerificationRequest { user_id: "u1", code: "123456" };
        let value = serde_json::to_value(&verify).expect("Failed to serialize request");
        assert_eq!(value, serde_json::json!({"userId": "u1", "code": "123456"}));
    }
}
