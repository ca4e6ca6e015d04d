pub mod archetype;
pub mod component;
pub mod entity;
pub mod error;
pub mod schedule;
pub mod storage;
pub mod system;
pub(crate) mod util;
pub mod world;

pub use archetype::{Attribute, Attributes, Blueprint};
pub use component::Component;
pub use entity::{Entity, Selector};
pub use error::{Error, Result};
pub use schedule::{Schedule, Worker};
pub use system::{Collected, System};
pub use world::{Id as WorldId, World};

/// Derive macro for [`Component`].
pub use rusty_ecs_macros::Component;
