//! proctor-core — exam data model, timed exam session, review and authoring.
//!
//! This crate defines the data model the backend speaks, the
//! [`traits::AttemptBackend`] seam, and the exam-taking state machine that
//! the client and CLI crates build on.

pub mod error;
pub mod model;
pub mod parser;
pub mod review;
pub mod session;
pub mod traits;

pub use error::ApiError;
pub use session::{ExamSession, SubmitOutcome, SubmitTrigger};
