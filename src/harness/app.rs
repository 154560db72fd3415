//! Explicit application context for tests
//!
//! `TestApp` replaces the framework's ambient application singleton with an
//! explicit context object handed to each setup step: the active database
//! pool, the event bus, and a registry of replaceable components keyed by
//! handle. Stubbing a dependency means registering a test implementation
//! under the real component's handle.

use parking_lot::RwLock;
use sqlx::PgPool;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::HarnessSettings;
use crate::domain::ComponentHandle;
use crate::harness::events::EventBus;
use crate::{Error, Result};

/// An application module registered from the harness configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub handle: ComponentHandle,
    pub class: String,
}

/// Application context owned by the test harness for the duration of a run
#[derive(Default)]
pub struct TestApp {
    db: RwLock<Option<PgPool>>,
    events: EventBus,
    components: RwLock<HashMap<ComponentHandle, Arc<dyn Any + Send + Sync>>>,
    bootstrap: Vec<ComponentHandle>,
}

impl std::fmt::Debug for TestApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestApp")
            .field("bootstrap", &self.bootstrap)
            .finish_non_exhaustive()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an app context and registers the configured modules, listing
    /// each for bootstrap in configuration order.
    #[instrument(skip(settings))]
    pub fn warm(settings: &HarnessSettings) -> Result<Self> {
        let mut app = Self::new();

        for module_ref in &settings.modules {
            let handle = ComponentHandle::try_new(module_ref.handle.clone()).map_err(|e| {
                Error::invalid_config(format!(
                    "invalid module handle: {}: {e}",
                    module_ref.handle
                ))
            })?;
            debug!(handle = %handle, class = %module_ref.class, "registering module");
            app.components.write().insert(
                handle.clone(),
                Arc::new(Module {
                    handle: handle.clone(),
                    class: module_ref.class.clone(),
                }),
            );
            app.bootstrap.push(handle);
        }

        Ok(app)
    }

    /// Registers a pool as the active data-access dependency, replacing any
    /// previous one.
    pub fn set_db(&self, pool: PgPool) {
        *self.db.write() = Some(pool);
    }

    /// The active pool; cheap to clone, shares the underlying connections.
    pub fn db(&self) -> Result<PgPool> {
        let guard = self.db.read();
        guard.as_ref().cloned().ok_or_else(|| Error::not_found("db"))
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Module handles in bootstrap order, as configured.
    pub fn bootstrap_order(&self) -> &[ComponentHandle] {
        &self.bootstrap
    }

    /// Registers (or replaces) a component under a handle.
    pub fn set_component<T>(&self, handle: ComponentHandle, component: T)
    where
        T: Any + Send + Sync,
    {
        self.components.write().insert(handle, Arc::new(component));
    }

    /// Resolves a component by handle and concrete type.
    pub fn component<T>(&self, handle: &ComponentHandle) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let component = self
            .components
            .read()
            .get(handle)
            .cloned()
            .ok_or_else(|| Error::not_found(handle.as_ref()))?;

        component.downcast::<T>().map_err(|_| {
            Error::invalid_config(format!(
                "component `{handle}` is not a `{}`",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Replaces a registered component with a test stub.
    ///
    /// The handle must already resolve to something; stubbing a component the
    /// app never had is a configuration error, matching the failure mode of
    /// resolving an unknown component.
    pub fn stub_component<T>(&self, handle: &ComponentHandle, stub: T) -> Result<()>
    where
        T: Any + Send + Sync,
    {
        let mut components = self.components.write();
        if !components.contains_key(handle) {
            return Err(Error::invalid_config(format!(
                "cannot stub unresolvable component: {handle}"
            )));
        }
        components.insert(handle.clone(), Arc::new(stub));
        Ok(())
    }

    /// Drops the context, releasing the registry and any bound pool.
    #[instrument(skip(self))]
    pub fn teardown(self) {
        debug!("tearing down test app context");
    }
}
