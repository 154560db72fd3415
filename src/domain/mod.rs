//! Domain types for Quill CMS
//!
//! This module contains the core domain types shared by the record
//! descriptors and the test harness.

pub mod identifiers;
pub mod section;
pub mod types;

pub use identifiers::*;
pub use section::*;
pub use types::*;
