use std::collections::HashMap;

use bevy_ecs::prelude::*;

use crate::allocator::EntityAllocator;
use crate::error::EcsError;
use crate::types::EntityId;

/// Maps between our stable EntityId and bevy's internal Entity.
#[derive(Debug, Default)]
struct EntityMapping {
    to_bevy: HashMap<EntityId, Entity>,
    from_bevy: HashMap<Entity, EntityId>,
}

impl EntityMapping {
    fn insert(&mut self, eid: EntityId, bevy: Entity) {
        self.to_bevy.insert(eid, bevy);
        self.from_bevy.insert(bevy, eid);
    }

    fn remove_by_eid(&mut self, eid: &EntityId) -> Option<Entity> {
        if let Some(bevy) = self.to_bevy.remove(eid) {
            self.from_bevy.remove(&bevy);
            Some(bevy)
        } else {
            None
        }
    }

    fn get_bevy(&self, eid: &EntityId) -> Option<Entity> {
        self.to_bevy.get(eid).copied()
    }
}

/// Public ECS adapter that hides bevy_ecs internals.
///
/// Entities are addressed by [`EntityId`]; context variables are bevy
/// resources, one per type.
pub struct EcsAdapter {
    world: World,
    mapping: EntityMapping,
    allocator: EntityAllocator,
}

impl std::fmt::Debug for EcsAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcsAdapter")
            .field("entity_count", &self.mapping.to_bevy.len())
            .field("alive", &self.allocator.alive_count())
            .finish()
    }
}

impl EcsAdapter {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            mapping: EntityMapping::default(),
            allocator: EntityAllocator::new(),
        }
    }

    /// Spawn a new entity, returning a stable EntityId.
    pub fn spawn_entity(&mut self) -> EntityId {
        let eid = self.allocator.allocate();
        let bevy_entity = self.world.spawn_empty().id();
        self.mapping.insert(eid, bevy_entity);
        eid
    }

    /// Spawn an entity under an exact EntityId (for snapshot restore).
    ///
    /// Fails if that id is already alive, or if its slot is held by a
    /// different generation.
    pub fn spawn_entity_with_id(&mut self, eid: EntityId) -> Result<(), EcsError> {
        if self.mapping.get_bevy(&eid).is_some() {
            return Err(EcsError::EntityAlreadyExists(eid));
        }
        if !self.allocator.reserve(eid) {
            return Err(EcsError::StaleEntity(eid));
        }
        let bevy_entity = self.world.spawn_empty().id();
        self.mapping.insert(eid, bevy_entity);
        tracing::trace!(entity = %eid, "spawned entity with explicit id");
        Ok(())
    }

    /// Despawn an entity.
    pub fn despawn_entity(&mut self, eid: EntityId) -> Result<(), EcsError> {
        if !self.allocator.is_alive(eid) {
            return Err(EcsError::EntityNotFound(eid));
        }
        let bevy_entity = self
            .mapping
            .remove_by_eid(&eid)
            .ok_or(EcsError::EntityNotFound(eid))?;
        // bevy_ecs 0.15: despawn() no longer takes a bool for recursive despawn
        self.world.despawn(bevy_entity);
        self.allocator.deallocate(eid);
        Ok(())
    }

    /// Whether `eid` names a live entity in this store.
    pub fn contains(&self, eid: EntityId) -> bool {
        self.mapping.get_bevy(&eid).is_some()
    }

    /// Get a component reference for an entity.
    pub fn get_component<C: Component>(&self, eid: EntityId) -> Result<&C, EcsError> {
        let bevy_entity = self
            .mapping
            .get_bevy(&eid)
            .ok_or(EcsError::EntityNotFound(eid))?;
        self.world
            .entity(bevy_entity)
            .get::<C>()
            .ok_or(EcsError::ComponentNotFound(eid))
    }

    /// Get a mutable component reference for an entity.
    pub fn get_component_mut<C: Component>(&mut self, eid: EntityId) -> Result<Mut<'_, C>, EcsError> {
        let bevy_entity = self
            .mapping
            .get_bevy(&eid)
            .ok_or(EcsError::EntityNotFound(eid))?;
        self.world
            .get_mut::<C>(bevy_entity)
            .ok_or(EcsError::ComponentNotFound(eid))
    }

    /// Set (insert or overwrite) a component on an entity.
    pub fn set_component<C: Component>(&mut self, eid: EntityId, component: C) -> Result<(), EcsError> {
        let bevy_entity = self
            .mapping
            .get_bevy(&eid)
            .ok_or(EcsError::EntityNotFound(eid))?;
        self.world.entity_mut(bevy_entity).insert(component);
        Ok(())
    }

    /// Remove a component from an entity.
    pub fn remove_component<C: Component>(&mut self, eid: EntityId) -> Result<(), EcsError> {
        let bevy_entity = self
            .mapping
            .get_bevy(&eid)
            .ok_or(EcsError::EntityNotFound(eid))?;
        self.world.entity_mut(bevy_entity).remove::<C>();
        Ok(())
    }

    /// Check if an entity has a specific component.
    pub fn has_component<C: Component>(&self, eid: EntityId) -> bool {
        self.mapping
            .get_bevy(&eid)
            .map(|bevy_entity| self.world.entity(bevy_entity).contains::<C>())
            .unwrap_or(false)
    }

    /// Collect all alive EntityIds that have a specific component.
    pub fn entities_with<C: Component>(&self) -> Vec<EntityId> {
        let mut result = Vec::new();
        // Iterate our mapping and check which ones have the component
        for (&eid, &bevy_entity) in &self.mapping.to_bevy {
            if self.world.entity(bevy_entity).contains::<C>() {
                result.push(eid);
            }
        }
        result.sort();
        result
    }

    /// Number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.mapping.to_bevy.len()
    }

    /// Get all alive entity IDs (sorted for determinism).
    pub fn all_entities(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.mapping.to_bevy.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Visit every alive entity once, in the same order as [`all_entities`](Self::all_entities).
    pub fn for_each_entity(&self, mut f: impl FnMut(EntityId)) {
        for eid in self.all_entities() {
            f(eid);
        }
    }

    // -- context variables ------------------------------------------------

    /// The store-wide singleton of type `R`, if one is set.
    pub fn get_context<R: Resource>(&self) -> Option<&R> {
        self.world.get_resource::<R>()
    }

    pub fn get_context_mut<R: Resource>(&mut self) -> Option<Mut<'_, R>> {
        self.world.get_resource_mut::<R>()
    }

    /// Install (or replace) the singleton of type `R`.
    pub fn set_context<R: Resource>(&mut self, value: R) {
        self.world.insert_resource(value);
    }

    pub fn remove_context<R: Resource>(&mut self) -> Option<R> {
        self.world.remove_resource::<R>()
    }

    pub fn has_context<R: Resource>(&self) -> bool {
        self.world.contains_resource::<R>()
    }

    /// Drop every entity, component and context value.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for EcsAdapter {
    fn default() -> Self {
        Self::new()
    }
}
