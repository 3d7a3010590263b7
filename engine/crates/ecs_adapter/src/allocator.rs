use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Generational index allocator.
///
/// Only slots that were handed out or reserved are stored, so reserving a
/// far index costs one entry. `free_indices` may hold slots that were
/// reserved again since they were freed; `allocate` skips those.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityAllocator {
    slots: BTreeMap<u32, Slot>,
    free_indices: Vec<u32>,
    /// Lowest index never handed out, `None` once the index space is used up.
    next_index: Option<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            free_indices: Vec::new(),
            next_index: Some(0),
        }
    }

    /// # Panics
    ///
    /// Panics if all `u32` indices are alive.
    pub fn allocate(&mut self) -> EntityId {
        while let Some(index) = self.free_indices.pop() {
            if let Some(slot) = self.slots.get_mut(&index) {
                if !slot.alive {
                    slot.generation = slot.generation.wrapping_add(1);
                    slot.alive = true;
                    return EntityId::new(index, slot.generation);
                }
            }
        }
        match self.fresh_index() {
            Some(index) => {
                self.slots.insert(index, Slot { generation: 0, alive: true });
                EntityId::new(index, 0)
            }
            None => panic!("entity index space exhausted"),
        }
    }

    fn fresh_index(&mut self) -> Option<u32> {
        while let Some(index) = self.next_index {
            self.next_index = index.checked_add(1);
            if !self.slots.contains_key(&index) {
                return Some(index);
            }
        }
        None
    }

    /// Mark an exact `(index, generation)` as alive.
    ///
    /// Indices skipped over are not touched; later allocations hand them out
    /// fresh. Returns false if the slot is already alive.
    pub fn reserve(&mut self, id: EntityId) -> bool {
        let slot = self.slots.entry(id.index).or_insert(Slot {
            generation: id.generation,
            alive: false,
        });
        if slot.alive {
            return false;
        }
        slot.generation = id.generation;
        slot.alive = true;
        true
    }

    pub fn deallocate(&mut self, id: EntityId) -> bool {
        match self.slots.get_mut(&id.index) {
            Some(slot) if slot.alive && slot.generation == id.generation => {
                slot.alive = false;
                self.free_indices.push(id.index);
                true
            }
            _ => false,
        }
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.slots
            .get(&id.index)
            .is_some_and(|slot| slot.alive && slot.generation == id.generation)
    }

    pub fn alive_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.alive).count()
    }

    /// Number of slots tracked, alive or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
