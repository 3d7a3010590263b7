//! Snapshot model and capture.
//!
//! A [`Snapshot`] holds, for every registered component type, the ordered
//! `(portable entity id, value)` pairs of the entities that carried it, and
//! for every registered context type an optional value.

use std::marker::PhantomData;

use ecs_adapter::EcsAdapter;
use serde::{Deserialize, Serialize};

use crate::registry::{ComponentList, ContextList, Registry, TypeDescriptor};

pub const SNAPSHOT_VERSION: u32 = 3;

/// Captured store state for component list `C` and context list `X`.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Snapshot<C: ComponentList, X: ContextList> {
    pub components: C::Columns,
    pub contexts: X::Slots,
    #[serde(skip)]
    _registry: PhantomData<fn() -> Registry<C, X>>,
}

impl<C: ComponentList, X: ContextList> Snapshot<C, X> {
    pub fn from_parts(components: C::Columns, contexts: X::Slots) -> Self {
        Self {
            components,
            contexts,
            _registry: PhantomData,
        }
    }

    pub fn into_parts(self) -> (C::Columns, X::Slots) {
        (self.components, self.contexts)
    }

    pub fn fingerprint() -> u64 {
        Registry::<C, X>::fingerprint()
    }

    /// Number of distinct entities referenced by any column.
    pub fn entity_count(&self) -> usize {
        let mut ids = Vec::new();
        C::collect_ids(&self.components, &mut ids);
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Per-type counts, for logging and diagnostics.
    pub fn summary(&self) -> SnapshotSummary {
        let columns = C::descriptors()
            .into_iter()
            .zip(C::column_lens(&self.components))
            .map(|(descriptor, len)| ColumnSummary { descriptor, len })
            .collect();
        let contexts = X::descriptors()
            .into_iter()
            .zip(X::presence(&self.contexts))
            .map(|(descriptor, present)| ContextSummary { descriptor, present })
            .collect();
        SnapshotSummary { columns, contexts }
    }
}

impl<C: ComponentList, X: ContextList> Clone for Snapshot<C, X> {
    fn clone(&self) -> Self {
        Self::from_parts(self.components.clone(), self.contexts.clone())
    }
}

impl<C: ComponentList, X: ContextList> std::fmt::Debug for Snapshot<C, X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("summary", &self.summary())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub descriptor: TypeDescriptor,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSummary {
    pub descriptor: TypeDescriptor,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub columns: Vec<ColumnSummary>,
    pub contexts: Vec<ContextSummary>,
}

impl SnapshotSummary {
    pub fn component_count(&self) -> usize {
        self.columns.iter().map(|c| c.len).sum()
    }

    pub fn context_count(&self) -> usize {
        self.contexts.iter().filter(|c| c.present).count()
    }
}

/// Capture every registered component and context value from `ecs`.
///
/// Entities are visited once each, in the store's iteration order, so each
/// column lists its entities in that order too.
pub fn capture<C: ComponentList, X: ContextList>(ecs: &EcsAdapter) -> Snapshot<C, X> {
    let mut components = C::Columns::default();
    ecs.for_each_entity(|eid| C::capture_entity(ecs, eid, &mut components));
    let contexts = X::capture(ecs);

    let snapshot = Snapshot::from_parts(components, contexts);
    let summary = snapshot.summary();
    tracing::debug!(
        entities = ecs.entity_count(),
        components = summary.component_count(),
        contexts = summary.context_count(),
        "Snapshot captured"
    );
    snapshot
}
