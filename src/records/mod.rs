//! Record descriptors for stored content
//!
//! Descriptors own a table's identity and lifecycle; they issue plain DDL/DML
//! through `sqlx` rather than reproducing a full ORM layer.

pub mod entry_content;

pub use entry_content::{EntryContentRecord, EntryContentRow};
