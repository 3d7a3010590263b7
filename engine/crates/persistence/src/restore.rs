use ecs_adapter::EcsAdapter;

use crate::codec::{self, Format};
use crate::error::PersistenceError;
use crate::registry::{ComponentList, ContextList};
use crate::snapshot::Snapshot;

/// What a restore put back into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub entities: usize,
    pub components: usize,
    pub contexts: usize,
}

/// Replace the whole contents of `ecs` with `snapshot`.
///
/// The new state is built in a fresh store and swapped in at the end, so on
/// error `ecs` is left exactly as it was. Entities come back under their
/// captured ids; context types absent from the snapshot stay unset.
pub fn restore<C: ComponentList, X: ContextList>(
    ecs: &mut EcsAdapter,
    snapshot: Snapshot<C, X>,
) -> Result<RestoreReport, PersistenceError> {
    let (columns, slots) = snapshot.into_parts();

    let mut rebuilt = EcsAdapter::new();
    let components = C::restore_columns(columns, &mut rebuilt)?;
    let contexts = X::restore(slots, &mut rebuilt);

    let report = RestoreReport {
        entities: rebuilt.entity_count(),
        components,
        contexts,
    };
    *ecs = rebuilt;

    tracing::info!(
        entities = report.entities,
        components = report.components,
        contexts = report.contexts,
        "Snapshot restored"
    );
    Ok(report)
}

/// Decode `bytes` and restore them into `ecs`.
///
/// Decoding finishes before the store is touched; a bad stream leaves `ecs`
/// unchanged.
pub fn load_into<C: ComponentList, X: ContextList>(
    ecs: &mut EcsAdapter,
    bytes: &[u8],
    format: Format,
) -> Result<RestoreReport, PersistenceError> {
    let snapshot = codec::decode::<C, X>(bytes, format)?;
    restore(ecs, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::capture;
    use ecs_adapter::{Component, EntityId, Resource};
    use serde::{Deserialize, Serialize};

    #[derive(Component, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Position {
        x: f32,
        y: f32,
        z: f32,
    }

    #[derive(Component, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Velocity {
        x: f32,
        y: f32,
        z: f32,
    }

    /// Holds another entity's portable id.
    #[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Follows(u64);

    #[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Frozen;

    type Components = (Position, Velocity, Follows, Frozen);
    type Contexts = (Position, Velocity);
    type TestSnapshot = Snapshot<Components, Contexts>;

    fn pos(x: f32) -> Position {
        Position { x, y: 2.0, z: 3.0 }
    }

    fn vel(x: f32) -> Velocity {
        Velocity { x, y: 0.0, z: 0.0 }
    }

    #[test]
    fn scenario_mutation_is_undone() {
        let mut ecs = EcsAdapter::new();
        let e1 = ecs.spawn_entity();
        ecs.set_component(e1, pos(1.0)).unwrap();
        ecs.set_context(vel(0.0));

        let bytes = codec::encode(&capture::<Components, Contexts>(&ecs), Format::Binary).unwrap();

        ecs.get_component_mut::<Position>(e1).unwrap().x += 99.0;
        ecs.get_context_mut::<Velocity>().unwrap().x = 99.0;

        load_into::<Components, Contexts>(&mut ecs, &bytes, Format::Binary).unwrap();

        assert_eq!(ecs.get_component::<Position>(e1).unwrap().x, 1.0);
        assert_eq!(ecs.get_context::<Velocity>().unwrap().x, 0.0);
        assert!(!ecs.has_context::<Position>());
    }

    #[test]
    fn restore_replaces_everything() {
        let mut source = EcsAdapter::new();
        let kept = source.spawn_entity();
        source.set_component(kept, vel(5.0)).unwrap();
        let snap: TestSnapshot = capture(&source);

        let mut target = EcsAdapter::new();
        for _ in 0..4 {
            let e = target.spawn_entity();
            target.set_component(e, pos(7.0)).unwrap();
        }
        target.set_context(pos(8.0));

        let report = restore(&mut target, snap).unwrap();

        assert_eq!(report, RestoreReport { entities: 1, components: 1, contexts: 0 });
        assert_eq!(target.all_entities(), vec![kept]);
        assert!(target.entities_with::<Position>().is_empty());
        assert!(!target.has_context::<Position>());
        assert_eq!(target.get_component::<Velocity>(kept).unwrap(), &vel(5.0));
    }

    #[test]
    fn absent_context_is_not_defaulted() {
        let source = EcsAdapter::new();
        let snap: TestSnapshot = capture(&source);

        let mut target = EcsAdapter::new();
        target.set_context(vel(3.0));
        restore(&mut target, snap).unwrap();

        assert!(!target.has_context::<Velocity>());
        assert!(!target.has_context::<Position>());
    }

    #[test]
    fn sparsity_and_tags_survive() {
        let mut source = EcsAdapter::new();
        let a = source.spawn_entity();
        let b = source.spawn_entity();
        source.set_component(a, pos(1.0)).unwrap();
        source.set_component(a, Frozen).unwrap();
        source.set_component(b, vel(2.0)).unwrap();

        let bytes = codec::encode(&capture::<Components, Contexts>(&source), Format::Compact).unwrap();
        let mut target = EcsAdapter::new();
        load_into::<Components, Contexts>(&mut target, &bytes, Format::Compact).unwrap();

        assert!(target.has_component::<Frozen>(a));
        assert!(!target.has_component::<Frozen>(b));
        assert!(target.has_component::<Position>(a));
        assert!(!target.has_component::<Velocity>(a));
        assert!(!target.has_component::<Position>(b));
        assert_eq!(target.get_component::<Velocity>(b).unwrap(), &vel(2.0));
    }

    #[test]
    fn entity_references_stay_valid() {
        let mut source = EcsAdapter::new();
        let old = source.spawn_entity();
        source.despawn_entity(old).unwrap();
        let leader = source.spawn_entity();
        let follower = source.spawn_entity();
        source.set_component(leader, pos(0.0)).unwrap();
        source.set_component(follower, Follows(leader.to_u64())).unwrap();

        let snap: TestSnapshot = capture(&source);
        let mut target = EcsAdapter::new();
        restore(&mut target, snap).unwrap();

        let link = target.get_component::<Follows>(follower).unwrap().0;
        let resolved = EntityId::from_u64(link);
        assert_eq!(resolved, leader);
        assert_eq!(resolved.generation, 1);
        assert!(target.has_component::<Position>(resolved));
    }

    #[test]
    fn new_spawns_after_restore_do_not_collide() {
        let mut source = EcsAdapter::new();
        let ids: Vec<EntityId> = (0..3).map(|_| source.spawn_entity()).collect();
        source.despawn_entity(ids[1]).unwrap();
        source.set_component(ids[0], Frozen).unwrap();
        source.set_component(ids[2], Frozen).unwrap();

        let mut target = EcsAdapter::new();
        restore(&mut target, capture::<Components, Contexts>(&source)).unwrap();

        let fresh = target.spawn_entity();
        assert_ne!(fresh, ids[0]);
        assert_ne!(fresh, ids[2]);
        assert_eq!(target.entity_count(), 3);
    }

    #[test]
    fn far_ids_restore_without_filling_the_gap() {
        let top = EntityId::new(u32::MAX, 0);
        let far = EntityId::new(30_000_000, 0);
        let snap: TestSnapshot = Snapshot::from_parts(
            (
                Vec::new(),
                Vec::new(),
                Vec::new(),
                vec![(far.to_u64(), Frozen), (top.to_u64(), Frozen)],
            ),
            (None, None),
        );
        let bytes = codec::encode(&snap, Format::Compact).unwrap();

        let mut ecs = EcsAdapter::new();
        let report = load_into::<Components, Contexts>(&mut ecs, &bytes, Format::Compact).unwrap();

        assert_eq!(report.entities, 2);
        assert!(ecs.has_component::<Frozen>(top));
        assert!(ecs.has_component::<Frozen>(far));
        assert_eq!(ecs.spawn_entity(), EntityId::new(0, 0));
        assert_eq!(ecs.entity_count(), 3);
    }

    #[test]
    fn sparse_first_column_restores_every_entity() {
        let mut source = EcsAdapter::new();
        let ids: Vec<EntityId> = (0..20_000).map(|_| source.spawn_entity()).collect();
        for (i, &eid) in ids.iter().enumerate() {
            source.set_component(eid, pos(i as f32)).unwrap();
        }
        let last = ids[ids.len() - 1];
        source.set_component(last, Frozen).unwrap();

        // Frozen comes first, so the highest id is recreated before the rest.
        type FrozenFirst = (Frozen, Position);
        let snap = capture::<FrozenFirst, ()>(&source);
        let mut target = EcsAdapter::new();
        let report = restore(&mut target, snap).unwrap();

        assert_eq!(report.entities, ids.len());
        assert_eq!(report.components, ids.len() + 1);
        assert_eq!(target.all_entities(), ids);
        assert_eq!(target.get_component::<Position>(ids[7]).unwrap(), &pos(7.0));
        assert_eq!(target.spawn_entity(), EntityId::new(ids.len() as u32, 0));
    }

    #[test]
    fn restore_twice_is_idempotent() {
        let mut source = EcsAdapter::new();
        let e = source.spawn_entity();
        source.set_component(e, pos(4.0)).unwrap();
        source.set_component(e, Frozen).unwrap();
        source.set_context(vel(1.0));
        let snap: TestSnapshot = capture(&source);

        let mut target = EcsAdapter::new();
        let first = restore(&mut target, snap.clone()).unwrap();
        let after_first = capture::<Components, Contexts>(&target);
        let second = restore(&mut target, snap).unwrap();
        let after_second = capture::<Components, Contexts>(&target);

        assert_eq!(first, second);
        assert_eq!(after_first.components, after_second.components);
        assert_eq!(after_first.contexts, after_second.contexts);
    }

    #[test]
    fn failed_decode_keeps_store() {
        let mut ecs = EcsAdapter::new();
        let e = ecs.spawn_entity();
        ecs.set_component(e, pos(6.0)).unwrap();
        ecs.set_context(vel(6.0));

        let bytes = codec::encode(&capture::<Components, Contexts>(&ecs), Format::Binary).unwrap();
        let err = load_into::<Components, Contexts>(&mut ecs, &bytes[..bytes.len() / 2], Format::Binary)
            .unwrap_err();

        assert!(matches!(err, PersistenceError::TruncatedStream(_)));
        assert_eq!(ecs.get_component::<Position>(e).unwrap(), &pos(6.0));
        assert_eq!(ecs.get_context::<Velocity>().unwrap(), &vel(6.0));
    }

    #[test]
    fn corrupt_snapshot_keeps_store() {
        let mut ecs = EcsAdapter::new();
        let e = ecs.spawn_entity();
        ecs.set_component(e, pos(6.0)).unwrap();

        // Same index under two generations cannot both be alive.
        let snap: TestSnapshot = Snapshot::from_parts(
            (
                vec![(EntityId::new(0, 0).to_u64(), pos(1.0))],
                vec![(EntityId::new(0, 3).to_u64(), vel(1.0))],
                Vec::new(),
                Vec::new(),
            ),
            (None, None),
        );

        assert!(matches!(
            restore(&mut ecs, snap),
            Err(PersistenceError::Corrupt(_))
        ));
        assert_eq!(ecs.get_component::<Position>(e).unwrap(), &pos(6.0));
    }
}
