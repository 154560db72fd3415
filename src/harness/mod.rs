//! Integration-test harness for Quill CMS
//!
//! This module wires a database connection, applies migrations, installs
//! plugins, and provides the helpers end-to-end tests lean on (event
//! expectations, component stubbing). Everything is sequenced explicitly
//! through [`Bootstrap`] against an explicit [`TestApp`] context; there is no
//! ambient global state.

pub mod app;
pub mod bootstrap;
pub mod db_setup;
pub mod events;
pub mod migrations;
pub mod plugins;

pub use app::{Module, TestApp};
pub use bootstrap::Bootstrap;
pub use db_setup::TestSetup;
pub use events::{EventBus, ListenerId};
pub use migrations::{Migration, MigrationRegistry};
pub use plugins::{Plugin, PluginRegistry};
