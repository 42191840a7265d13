//! proctor-client — HTTP client for the exam backend.
//!
//! Implements [`proctor_core::traits::AttemptBackend`] over `reqwest`, plus
//! the exam bank, question bank and account endpoints, configuration loading
//! and on-disk credential storage.

pub mod account;
pub mod api;
pub mod attempts;
pub mod config;
pub mod context;
pub mod credentials;
pub mod exams;
pub mod mock;
pub mod questions;

pub use api::ApiClient;
pub use config::{load_config, load_config_from, ProctorConfig};
pub use context::SessionContext;
pub use credentials::{CredentialStore, StoredCredential};
pub use mock::MockBackend;
