//! Authentication module for managing the signed-in session.
//!
//! This module provides:
//! - `SessionManager`: in-memory user and tokens, mirrored to a vault
//! - `CredentialVault`: secure key-value storage (`KeyringVault`, `MemoryVault`)
//! - `AuthFlow`: login, registration and verification on top of the API client
//! - Form validation shared by front-ends

pub mod flow;
pub mod session;
pub mod validation;
pub mod vault;

pub use flow::{AuthFlow, FlowError, LoginOutcome, PendingVerification};
pub use session::{SessionManager, SessionState};
pub use validation::ValidationError;
pub use vault::{CredentialVault, KeyringVault, MemoryVault, VaultError};
