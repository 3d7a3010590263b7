use std::marker::PhantomData;

use ecs_adapter::{Component, EcsAdapter, EntityId, Resource};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::PersistenceError;

/// A component type that can take part in snapshots.
pub trait SnapshotComponent: Component + Clone + Serialize + DeserializeOwned {}

impl<T> SnapshotComponent for T where T: Component + Clone + Serialize + DeserializeOwned {}

/// A context (singleton resource) type that can take part in snapshots.
pub trait SnapshotContext: Resource + Clone + Serialize + DeserializeOwned {}

impl<T> SnapshotContext for T where T: Resource + Clone + Serialize + DeserializeOwned {}

/// Runtime description of one registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// `std::any::type_name` of the type. Stable for a given build of the
    /// crate that defines it.
    pub name: &'static str,
    /// Zero-sized tag type: only presence is meaningful.
    pub marker: bool,
}

impl TypeDescriptor {
    pub fn of<T: 'static>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            marker: std::mem::size_of::<T>() == 0,
        }
    }
}

/// An ordered list of component types, implemented for tuples.
///
/// `Columns` holds one `Vec<(portable entity id, value)>` per type, in list
/// order.
pub trait ComponentList: 'static {
    type Columns: Serialize + DeserializeOwned + Default + Clone + Send + Sync;

    fn descriptors() -> Vec<TypeDescriptor>;

    /// Append every listed component present on `eid` to its column.
    fn capture_entity(ecs: &EcsAdapter, eid: EntityId, columns: &mut Self::Columns);

    /// Attach every captured value, column by column, creating entities
    /// under their recorded ids as needed. Returns the number of values attached.
    fn restore_columns(columns: Self::Columns, ecs: &mut EcsAdapter) -> Result<usize, PersistenceError>;

    fn column_lens(columns: &Self::Columns) -> Vec<usize>;

    /// Push the portable id of every captured pair, column by column.
    fn collect_ids(columns: &Self::Columns, out: &mut Vec<u64>);
}

/// An ordered list of context types, implemented for tuples.
///
/// `Slots` holds one `Option<value>` per type, in list order.
pub trait ContextList: 'static {
    type Slots: Serialize + DeserializeOwned + Default + Clone + Send + Sync;

    fn descriptors() -> Vec<TypeDescriptor>;

    fn capture(ecs: &EcsAdapter) -> Self::Slots;

    /// Install present values; absent ones are left unset. Returns the number installed.
    fn restore(slots: Self::Slots, ecs: &mut EcsAdapter) -> usize;

    fn presence(slots: &Self::Slots) -> Vec<bool>;
}

fn capture_component<T: SnapshotComponent>(
    ecs: &EcsAdapter,
    eid: EntityId,
    column: &mut Vec<(u64, T)>,
) {
    if let Ok(value) = ecs.get_component::<T>(eid) {
        column.push((eid.to_u64(), value.clone()));
    }
}

fn restore_component<T: SnapshotComponent>(
    column: Vec<(u64, T)>,
    ecs: &mut EcsAdapter,
) -> Result<usize, PersistenceError> {
    let count = column.len();
    for (raw, value) in column {
        let eid = EntityId::from_u64(raw);
        if !ecs.contains(eid) {
            ecs.spawn_entity_with_id(eid)
                .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        }
        ecs.set_component(eid, value)
            .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
    }
    Ok(count)
}

fn restore_context<T: SnapshotContext>(slot: Option<T>, ecs: &mut EcsAdapter) -> usize {
    match slot {
        Some(value) => {
            ecs.set_context(value);
            1
        }
        None => 0,
    }
}

macro_rules! impl_type_lists {
    ($(($T:ident, $idx:tt)),*) => {
        impl<$($T: SnapshotComponent),*> ComponentList for ($($T,)*) {
            type Columns = ($(Vec<(u64, $T)>,)*);

            fn descriptors() -> Vec<TypeDescriptor> {
                vec![$(TypeDescriptor::of::<$T>()),*]
            }

            #[allow(unused_variables)]
            fn capture_entity(ecs: &EcsAdapter, eid: EntityId, columns: &mut Self::Columns) {
                $(capture_component::<$T>(ecs, eid, &mut columns.$idx);)*
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn restore_columns(
                columns: Self::Columns,
                ecs: &mut EcsAdapter,
            ) -> Result<usize, PersistenceError> {
                let ($($T,)*) = columns;
                let mut restored = 0;
                $(restored += restore_component::<$T>($T, ecs)?;)*
                Ok(restored)
            }

            #[allow(unused_variables)]
            fn column_lens(columns: &Self::Columns) -> Vec<usize> {
                vec![$(columns.$idx.len()),*]
            }

            #[allow(unused_variables)]
            fn collect_ids(columns: &Self::Columns, out: &mut Vec<u64>) {
                $(out.extend(columns.$idx.iter().map(|(id, _)| *id));)*
            }
        }

        impl<$($T: SnapshotContext),*> ContextList for ($($T,)*) {
            type Slots = ($(Option<$T>,)*);

            fn descriptors() -> Vec<TypeDescriptor> {
                vec![$(TypeDescriptor::of::<$T>()),*]
            }

            #[allow(unused_variables, clippy::unused_unit)]
            fn capture(ecs: &EcsAdapter) -> Self::Slots {
                ($(ecs.get_context::<$T>().cloned(),)*)
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn restore(slots: Self::Slots, ecs: &mut EcsAdapter) -> usize {
                let ($($T,)*) = slots;
                let mut installed = 0;
                $(installed += restore_context::<$T>($T, ecs);)*
                installed
            }

            #[allow(unused_variables)]
            fn presence(slots: &Self::Slots) -> Vec<bool> {
                vec![$(slots.$idx.is_some()),*]
            }
        }
    };
}

impl_type_lists!();
impl_type_lists!((A, 0));
impl_type_lists!((A, 0), (B, 1));
impl_type_lists!((A, 0), (B, 1), (C, 2));
impl_type_lists!((A, 0), (B, 1), (C, 2), (D, 3));
impl_type_lists!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
impl_type_lists!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
impl_type_lists!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
impl_type_lists!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));
impl_type_lists!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8));
impl_type_lists!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8), (J, 9));
impl_type_lists!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8), (J, 9), (K, 10));
impl_type_lists!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7), (I, 8), (J, 9), (K, 10), (L, 11));

/// Names one `(components, contexts)` pair of type lists.
///
/// Capture and restore call sites should share a single alias of this type
/// (or of [`Snapshot`](crate::snapshot::Snapshot)) so both sides agree on
/// the lists and their order.
pub struct Registry<C, X> {
    _lists: PhantomData<fn() -> (C, X)>,
}

impl<C: ComponentList, X: ContextList> Registry<C, X> {
    pub fn component_descriptors() -> Vec<TypeDescriptor> {
        C::descriptors()
    }

    pub fn context_descriptors() -> Vec<TypeDescriptor> {
        X::descriptors()
    }

    /// Hash of both ordered type lists, written into every encoded snapshot.
    pub fn fingerprint() -> u64 {
        let mut hasher = blake3::Hasher::new();
        for (section, descriptors) in [
            ("components", C::descriptors()),
            ("contexts", X::descriptors()),
        ] {
            hasher.update(section.as_bytes());
            hasher.update(&(descriptors.len() as u32).to_le_bytes());
            for d in descriptors {
                hasher.update(d.name.as_bytes());
                hasher.update(&[0, d.marker as u8]);
            }
        }
        let hash = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(prefix)
    }
}
