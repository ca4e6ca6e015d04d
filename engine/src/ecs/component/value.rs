use std::{any::Any, fmt};

use crate::ecs::{
    component::{
        Component, Handle, Instance, Registry, Token,
        registry::Erased,
    },
    error::{Error, Result},
};

/// Anything that may be handed to entity creation or attachment.
///
/// Typed call sites never need to think about this: component values and tuples of them convert
/// through [`Set`](super::Set). `Value` exists for the dynamic boundary, where a component type or
/// an arbitrary boxed value has to be checked against the registry at runtime.
pub enum Value {
    /// A fresh component instance.
    Owned(Token, Erased),

    /// An existing instance. If it is attached elsewhere it moves to the new entity.
    Shared(Handle),

    /// A component type, default-constructed on demand.
    Type(Token),

    /// A value of unknown type. Only accepted if its type is a registered component.
    Erased(Erased),
}

impl Value {
    /// A fresh instance of a component.
    pub fn instance<C: Component>(component: C) -> Self {
        Self::Owned(Token::of::<C>(), Box::new(component))
    }

    /// A component type to default-construct.
    pub fn of<C: Component>() -> Self {
        Self::Type(Token::of::<C>())
    }

    /// An arbitrary value, checked against the registry when used.
    pub fn erased(value: impl Any + Send + Sync) -> Self {
        Self::Erased(Box::new(value))
    }

    /// Resolve this value to a component instance, registering typed components as needed.
    ///
    /// Fails with [`Error::InvalidComponent`] when the value is neither a component instance nor a
    /// registered component type, or when a shared instance was built by another world's registry.
    pub fn resolve(self, registry: &Registry, operation: &'static str) -> Result<Handle> {
        match self {
            Value::Shared(handle) if registry.owns(handle.info()) => Ok(handle),
            Value::Shared(handle) => Err(Error::invalid_component(
                format!("instance of {} from another world", handle.info().name()),
                operation,
            )),
            Value::Owned(token, value) => registry
                .resolve(&token)
                .map(|info| Instance::new(info, value))
                .ok_or_else(|| Error::invalid_component(token.name(), operation)),
            Value::Type(token) => registry
                .resolve(&token)
                .map(|info| Instance::new(info, info.construct()))
                .ok_or_else(|| Error::invalid_component(format!("type {}", token.name()), operation)),
            Value::Erased(value) => registry
                .get_info_by_type_id(Any::type_id(&*value))
                .map(|info| Instance::new(info, value))
                .ok_or_else(|| Error::invalid_component("erased value", operation)),
        }
    }
}

impl From<Handle> for Value {
    fn from(handle: Handle) -> Self {
        Self::Shared(handle)
    }
}

impl From<Token> for Value {
    fn from(token: Token) -> Self {
        Self::Type(token)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Owned(token, _) => write!(f, "Owned({})", token.name()),
            Value::Shared(handle) => write!(f, "Shared({:?})", handle),
            Value::Type(token) => write!(f, "Type({})", token.name()),
            Value::Erased(_) => write!(f, "Erased"),
        }
    }
}
