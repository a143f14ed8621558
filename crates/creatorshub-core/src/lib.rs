//! Core library for CreatorsHub clients.
//!
//! - `api`: typed client for the CreatorsHub REST API
//! - `auth`: session lifecycle, credential vault and sign-in flow
//! - `models`: wire types
//! - `config`: startup configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ClientError};
pub use auth::{AuthFlow, CredentialVault, KeyringVault, MemoryVault, SessionManager};
pub use config::Config;
