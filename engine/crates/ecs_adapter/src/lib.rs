pub mod types;
pub mod allocator;
pub mod bevy_backend;
pub mod error;

pub use types::EntityId;
pub use allocator::EntityAllocator;
pub use bevy_backend::EcsAdapter;
pub use error::EcsError;

pub use bevy_ecs::prelude::{Component, Resource};
