//! Data models for CreatorsHub entities.
//!
//! This module contains the wire types exchanged with the CreatorsHub API:
//!
//! - `User`: server-issued identity
//! - `AuthSession`, `RegistrationResult`: results of the auth endpoints
//! - `Track`, `AudioFile`: uploaded tracks and the local file handle

pub mod auth;
pub mod track;
pub mod user;

pub use auth::{AuthSession, LoginRequest, RegistrationRequest, RegistrationResult, VerificationRequest};
pub use track::{AudioFile, Track};
pub use user::User;
