//! Configuration oracle abstraction.

use avlink_entity::{EntityId, EntityRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Answers whether the entities this driver owns are currently configured.
///
/// The oracle is a point-in-time, side-effect-free query. It is read from
/// both `notify` and the retry task, so implementations must be callable
/// concurrently without extra coordination.
pub trait ConfigurationOracle: Send + Sync {
    /// Returns true iff every owned entity has completed the hub's
    /// subscription handshake.
    fn is_configured(&self) -> bool;
}

/// Oracle backed by the hub-side [`EntityRegistry`].
///
/// Reports configured only when *all* owned entities are subscribed; a
/// partially subscribed entity set still drops updates for the rest, so
/// the driver keeps deferring until the set is complete.
pub struct RegistryOracle {
    registry: Arc<EntityRegistry>,
    owned: Vec<EntityId>,
}

impl RegistryOracle {
    /// Creates an oracle over a registry for the given owned entities.
    pub fn new(registry: Arc<EntityRegistry>, owned: Vec<EntityId>) -> Self {
        Self { registry, owned }
    }

    /// Returns the entities this oracle watches.
    pub fn owned_entities(&self) -> &[EntityId] {
        &self.owned
    }
}

impl ConfigurationOracle for RegistryOracle {
    fn is_configured(&self) -> bool {
        self.registry.all_configured(self.owned.iter())
    }
}

/// A mock oracle for tests, toggled directly.
#[derive(Debug, Default)]
pub struct MockOracle {
    configured: AtomicBool,
}

impl MockOracle {
    /// Creates a mock oracle reporting "not configured".
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock oracle reporting "configured".
    pub fn configured() -> Self {
        Self {
            configured: AtomicBool::new(true),
        }
    }

    /// Sets the configured answer.
    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::SeqCst);
    }
}

impl ConfigurationOracle for MockOracle {
    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }
}

impl<O: ConfigurationOracle> ConfigurationOracle for Arc<O> {
    fn is_configured(&self) -> bool {
        self.as_ref().is_configured()
    }
}
