//! Errors surfaced by the ECS to an embedding application.
//!
//! Every variant except [`Error::Config`] describes a programming contract violation rather than a
//! transient condition, so nothing in the crate retries on them. Absence (an entity without a
//! given component, a destroyed entity) is never an error at the storage layer; it is reported as
//! `None` or as a no-op, and only escalated here when the absence means the caller made a mistake.

use thiserror::Error;

use crate::ecs::{entity, world};

/// Result alias used across the ECS.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The ECS error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    /// A value passed to create/attach (or found in a blueprint) is neither a component instance
    /// nor a registered component type.
    #[error("{value} is not a component instance or a registered component type (in {operation})")]
    InvalidComponent {
        /// Description of the offending value.
        value: String,
        /// The operation that rejected the value.
        operation: &'static str,
    },

    /// A detach selector could not be resolved to a component type, instance, or a collection of
    /// those.
    #[error("unable to resolve component selector {selector}")]
    UnknownComponentSelector {
        /// Description of the offending selector.
        selector: String,
    },

    /// A system was driven without supplying a processing body.
    #[error("system `{system}` does not implement processing")]
    UnimplementedProcessing {
        /// The system name.
        system: String,
    },

    /// Components were attached to an entity that was never created or was already destroyed.
    #[error("entity {0} is not registered in this world")]
    EntityNotFound(entity::Id),

    /// A typed write targeted a component instance of another type.
    #[error("component instance holds `{found}`, not `{expected}`")]
    TypeMismatch {
        /// The type the caller tried to write.
        expected: &'static str,
        /// The type the instance actually holds.
        found: &'static str,
    },

    /// A system worker thread panicked while running a cycle.
    #[error("worker for system `{system}` panicked")]
    WorkerPanicked {
        /// The system name.
        system: String,
    },

    /// A system was run against a world other than the one it was added against.
    #[error(
        "system `{system}` was added against world {} and cannot run in world {}",
        .expected.id(),
        .found.id()
    )]
    WorldMismatch {
        /// The system name.
        system: String,
        /// The world the system was added against.
        expected: world::Id,
        /// The world it was asked to run in.
        found: world::Id,
    },

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Build an [`Error::InvalidComponent`] for the given value description and operation.
    pub(crate) fn invalid_component(value: impl Into<String>, operation: &'static str) -> Self {
        Self::InvalidComponent {
            value: value.into(),
            operation,
        }
    }

    /// Build an [`Error::UnknownComponentSelector`] for the given selector description.
    pub(crate) fn unknown_selector(selector: impl Into<String>) -> Self {
        Self::UnknownComponentSelector {
            selector: selector.into(),
        }
    }
}
