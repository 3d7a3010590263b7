//! Snapshot and restore of an [`EcsAdapter`](ecs_adapter::EcsAdapter).
//!
//! ```ignore
//! type SaveState = Snapshot<(Position, Velocity, Frozen), (Weather,)>;
//!
//! let snap: SaveState = snapshot::capture(&ecs);
//! let bytes = codec::encode(&snap, Format::Binary)?;
//! // ...
//! restore::load_into::<(Position, Velocity, Frozen), (Weather,)>(&mut ecs, &bytes, Format::Binary)?;
//! ```

pub mod codec;
pub mod error;
pub mod manager;
pub mod registry;
pub mod restore;
pub mod snapshot;

pub use codec::{decode, encode, Format, SnapshotHeader};
pub use error::PersistenceError;
pub use manager::SnapshotManager;
pub use registry::{ComponentList, ContextList, Registry, SnapshotComponent, SnapshotContext, TypeDescriptor};
pub use restore::{load_into, restore, RestoreReport};
pub use snapshot::{capture, Snapshot, SnapshotSummary, SNAPSHOT_VERSION};
