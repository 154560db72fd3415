//! Quill CMS - content records and integration-test harness
//!
//! Two cooperating pieces of a content-management system: typed descriptors
//! for per-section localized entry-content tables, and a test harness that
//! bootstraps a deterministic database state and provides test helpers.

pub mod config;
pub mod domain;
pub mod error;
pub mod harness;
pub mod records;

pub use error::{Error, Result};
pub use harness::Bootstrap;
