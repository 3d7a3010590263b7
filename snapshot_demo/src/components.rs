use ecs_adapter::{Component, Resource};
use serde::{Deserialize, Serialize};

/// World-space position. Also used as a context variable.
#[derive(Component, Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Component, Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Tag: entity does not move.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frozen;

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Velocity {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Component types captured by the demo, in registry order.
pub type DemoComponents = (Position, Velocity, Frozen);

/// Context types captured by the demo, in registry order.
pub type DemoContexts = (Position, Velocity);

pub type DemoSnapshot = persistence::Snapshot<DemoComponents, DemoContexts>;
