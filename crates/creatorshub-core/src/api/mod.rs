//! REST API client module for the CreatorsHub service.
//!
//! This module provides the `ApiClient` for registration, email
//! verification, login, fetching the signed-in user and uploading tracks.
//!
//! Protected endpoints take an opaque bearer access token obtained from
//! login or verification.

pub mod client;
pub mod error;
pub mod multipart;

pub use client::ApiClient;
pub use error::{ApiErrorBody, ClientError, EMAIL_NOT_VERIFIED};
pub use multipart::MultipartBuilder;
