//! Common component types used across benchmarks.

use rusty_ecs::ecs::Component;

/// 3D position component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 3D velocity component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Rotation as euler angles (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Health with a cap.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            current: 100,
            max: 100,
        }
    }
}

/// A heap-backed component, for measuring deep copies.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    pub items: Vec<u32>,
}
