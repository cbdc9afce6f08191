//! Hub-side entity registry bookkeeping.

use crate::id::EntityId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Subscription state of one entity inside the hub's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistryState {
    /// Known to exist, not yet subscribed; updates targeting it are dropped.
    Available,
    /// Subscription handshake completed; updates are accepted.
    Configured,
}

/// A mirror of the hub's entity registry.
///
/// Entities enter as *available* when the driver announces them and move to
/// *configured* only when the hub sends a subscription event. The sync core
/// never mutates this registry; it observes it through the configuration
/// oracle adapter.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: RwLock<HashMap<EntityId, RegistryState>>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Announces an entity to the registry in the available state.
    ///
    /// Announcing an already-configured entity does not demote it.
    pub fn add_available(&self, entity_id: EntityId) {
        self.entities
            .write()
            .entry(entity_id)
            .or_insert(RegistryState::Available);
    }

    /// Marks an entity as configured (hub-originated subscription event).
    ///
    /// Unknown entities are registered on the fly; the hub can subscribe
    /// entities the driver announced in an earlier run.
    pub fn subscribe(&self, entity_id: EntityId) {
        self.entities
            .write()
            .insert(entity_id, RegistryState::Configured);
    }

    /// Marks every known entity as configured.
    pub fn subscribe_all(&self) {
        let mut entities = self.entities.write();
        for state in entities.values_mut() {
            *state = RegistryState::Configured;
        }
    }

    /// Returns an entity to the available state (hub-originated removal).
    pub fn unsubscribe(&self, entity_id: &EntityId) {
        if let Some(state) = self.entities.write().get_mut(entity_id) {
            *state = RegistryState::Available;
        }
    }

    /// Returns true if the entity has completed the subscription handshake.
    pub fn is_configured(&self, entity_id: &EntityId) -> bool {
        self.entities.read().get(entity_id).copied() == Some(RegistryState::Configured)
    }

    /// Returns true if every one of the given entities is configured.
    ///
    /// An empty id list is vacuously configured.
    pub fn all_configured<'a>(&self, ids: impl IntoIterator<Item = &'a EntityId>) -> bool {
        let entities = self.entities.read();
        ids.into_iter()
            .all(|id| entities.get(id) == Some(&RegistryState::Configured))
    }

    /// Returns the number of known entities.
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    /// Returns true if no entities have been announced.
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}
