use std::path::PathBuf;
use std::time::Instant;

use ecs_adapter::{EcsAdapter, EcsError, EntityId};
use observability::SnapshotMetrics;
use persistence::{restore, snapshot, PersistenceError, RestoreReport, SnapshotManager};

use crate::components::{DemoComponents, DemoContexts, DemoSnapshot, Frozen, Position, Velocity};
use crate::config::DemoConfig;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("persistence: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("store: {0}")]
    Ecs(#[from] EcsError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Entities created by [`build_world`].
#[derive(Debug, Clone, Copy)]
pub struct DemoEntities {
    pub mover: EntityId,
    pub frozen: EntityId,
}

/// State observed after the restore.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub path: PathBuf,
    pub report: RestoreReport,
    pub position_x: f32,
    pub velocity_x: f32,
    pub position_context_set: bool,
    pub frozen_kept: bool,
}

/// Entity `mover` at (1,2,3), a frozen entity, and a zero velocity context.
pub fn build_world() -> Result<(EcsAdapter, DemoEntities), EcsError> {
    let mut ecs = EcsAdapter::new();

    let mover = ecs.spawn_entity();
    ecs.set_component(mover, Position::new(1.0, 2.0, 3.0))?;

    let frozen = ecs.spawn_entity();
    ecs.set_component(frozen, Position::new(-4.0, 0.0, 8.0))?;
    ecs.set_component(frozen, Frozen)?;

    ecs.set_context(Velocity::zero());

    Ok((ecs, DemoEntities { mover, frozen }))
}

/// Save, mutate, load and restore, then read back what the restore produced.
pub fn run(config: &DemoConfig) -> Result<ScenarioOutcome, ScenarioError> {
    let (mut ecs, entities) = build_world()?;
    let manager = SnapshotManager::new(&config.persistence.save_dir, config.persistence.format);

    let started = Instant::now();
    let snap: DemoSnapshot = snapshot::capture(&ecs);
    let entity_count = snap.entity_count();
    let summary = snap.summary();
    let path = manager.save(&snap, &config.persistence.label)?;
    SnapshotMetrics {
        operation: "save",
        duration_us: started.elapsed().as_micros(),
        bytes: std::fs::metadata(&path)?.len() as usize,
        entity_count,
    }
    .log();

    tracing::info!(
        components = summary.component_count(),
        contexts = summary.context_count(),
        "Captured demo world"
    );
    for column in &summary.columns {
        tracing::debug!(
            component = column.descriptor.name,
            entries = column.len,
            marker = column.descriptor.marker,
            "Captured column"
        );
    }

    ecs.get_component_mut::<Position>(entities.mover)?.x += 99.0;
    if let Some(mut velocity) = ecs.get_context_mut::<Velocity>() {
        velocity.x = 99.0;
    }
    tracing::info!(
        position_x = ecs.get_component::<Position>(entities.mover)?.x,
        "World mutated"
    );

    let started = Instant::now();
    let loaded: DemoSnapshot = manager.load_latest()?;
    let report = restore::<DemoComponents, DemoContexts>(&mut ecs, loaded)?;
    SnapshotMetrics {
        operation: "load",
        duration_us: started.elapsed().as_micros(),
        bytes: std::fs::metadata(manager.latest_path())?.len() as usize,
        entity_count: report.entities,
    }
    .log();

    Ok(ScenarioOutcome {
        path,
        report,
        position_x: ecs.get_component::<Position>(entities.mover)?.x,
        velocity_x: ecs.get_context::<Velocity>().map(|v| v.x).unwrap_or(f32::NAN),
        position_context_set: ecs.has_context::<Position>(),
        frozen_kept: ecs.has_component::<Frozen>(entities.frozen)
            && !ecs.has_component::<Frozen>(entities.mover),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::Format;

    fn config_in(dir: &std::path::Path, format: Format) -> DemoConfig {
        let mut config = DemoConfig::default();
        config.persistence.save_dir = dir.to_string_lossy().into_owned();
        config.persistence.format = format;
        config
    }

    #[test]
    fn build_world_layout() {
        let (ecs, entities) = build_world().unwrap();
        assert_eq!(ecs.entity_count(), 2);
        assert!(entities.mover < entities.frozen);
        assert!(ecs.has_component::<Frozen>(entities.frozen));
        assert!(!ecs.has_component::<Velocity>(entities.mover));
        assert_eq!(ecs.get_context::<Velocity>(), Some(&Velocity::zero()));
        assert!(!ecs.has_context::<Position>());
    }

    #[test]
    fn run_restores_saved_values() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(&config_in(dir.path(), Format::Binary)).unwrap();

        assert_eq!(outcome.position_x, 1.0);
        assert_eq!(outcome.velocity_x, 0.0);
        assert!(!outcome.position_context_set);
        assert!(outcome.frozen_kept);
        assert_eq!(outcome.report, RestoreReport { entities: 2, components: 3, contexts: 1 });
        assert!(outcome.path.ends_with("snapshot_demo.bin"));
    }
}
