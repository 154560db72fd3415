//! Optional feature plugins installed during bootstrap

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::PluginHandle;
use crate::harness::app::TestApp;
use crate::{Error, Result};

/// An installable feature plugin
#[async_trait]
pub trait Plugin: Send + Sync {
    fn handle(&self) -> PluginHandle;

    /// Runs the plugin's install routine against the app context.
    async fn install(&self, app: &TestApp) -> Result<()>;
}

/// Known plugins, resolvable by handle
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<PluginHandle, Arc<dyn Plugin>>,
    installed: RwLock<Vec<PluginHandle>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.insert(plugin.handle(), plugin);
    }

    /// Resolves and installs a plugin by raw handle.
    ///
    /// An unparsable or unregistered handle is a configuration error and
    /// installs nothing.
    #[instrument(skip(self, app))]
    pub async fn install(&self, app: &TestApp, raw_handle: &str) -> Result<()> {
        let handle = PluginHandle::try_new(raw_handle.to_string())
            .map_err(|_| Error::invalid_config(format!("invalid plugin handle: {raw_handle}")))?;

        let plugin = self
            .plugins
            .get(&handle)
            .ok_or_else(|| Error::invalid_config(format!("invalid plugin handle: {handle}")))?;

        plugin.install(app).await?;
        info!(handle = %handle, "installed plugin");
        self.installed.write().push(handle);
        Ok(())
    }

    /// Handles of the plugins installed so far, in install order.
    pub fn installed(&self) -> Vec<PluginHandle> {
        self.installed.read().clone()
    }
}
