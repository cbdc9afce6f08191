//! Immutable state snapshots.

use crate::attribute::EntityUpdate;
use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An immutable bundle of entity updates captured at one instant.
///
/// The sync core treats snapshot contents as opaque; it only cares whether
/// a snapshot has been delivered. Snapshots are cheap to clone (shared
/// backing storage) and compare by content, so "the same snapshot" means
/// "the same attribute values", not "the same allocation".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    updates: Arc<[EntityUpdate]>,
}

impl StateSnapshot {
    /// Creates a snapshot from a set of entity updates.
    pub fn new(updates: Vec<EntityUpdate>) -> Self {
        Self {
            updates: updates.into(),
        }
    }

    /// Returns the number of entity updates in the bundle.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns true if the bundle contains no updates.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Iterates over the entity updates.
    pub fn iter(&self) -> impl Iterator<Item = &EntityUpdate> {
        self.updates.iter()
    }

    /// Returns the update for one entity, if present.
    pub fn update_for(&self, entity_id: &EntityId) -> Option<&EntityUpdate> {
        self.updates.iter().find(|u| &u.entity_id == entity_id)
    }

    /// Returns the ids of all entities covered by this snapshot.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.updates.iter().map(|u| u.entity_id.clone()).collect()
    }
}

impl From<Vec<EntityUpdate>> for StateSnapshot {
    fn from(updates: Vec<EntityUpdate>) -> Self {
        Self::new(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityKind;

    fn player_update(volume: i64) -> EntityUpdate {
        EntityUpdate::new(EntityId::new(EntityKind::MediaPlayer, "den")).with("volume", volume)
    }

    #[test]
    fn snapshot_accessors() {
        let snapshot = StateSnapshot::new(vec![player_update(10)]);
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.is_empty());

        let id = EntityId::new(EntityKind::MediaPlayer, "den");
        assert!(snapshot.update_for(&id).is_some());
        assert_eq!(snapshot.entity_ids(), vec![id]);
    }

    #[test]
    fn content_equality() {
        let a = StateSnapshot::new(vec![player_update(10)]);
        let b = StateSnapshot::new(vec![player_update(10)]);
        let c = StateSnapshot::new(vec![player_update(11)]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn clone_is_shallow_and_equal() {
        let a = StateSnapshot::new(vec![player_update(10), player_update(11)]);
        let b = a.clone();
        assert_eq!(a, b);
    }
}
