use std::{fmt, sync::Arc};

use crate::ecs::{
    component::{self, Component, Handle, Token},
    error::{Error, Result},
};

/// Describes which components to detach from an entity.
#[derive(Clone)]
pub enum Selector {
    /// Every instance of a component type.
    Type(Token),

    /// Every instance of a registered component id.
    Id(component::Id),

    /// One specific instance. Only detached if it is the one occupying its slot.
    Instance(Handle),

    /// A component type by name: the full type path or an unambiguous short name.
    Named(String),

    /// Several selectors at once.
    Many(Vec<Selector>),
}

/// A selector reduced to what the entity registry acts on.
pub(crate) enum Target {
    Type(component::Id),
    Instance(Handle),
}

impl Selector {
    /// Select the component type `C`.
    pub fn of<C: Component>() -> Self {
        Self::Type(Token::of::<C>())
    }

    /// Reduce this selector to concrete targets against the component registry.
    ///
    /// Fails with [`Error::UnknownComponentSelector`] if any part of the selector does not name a
    /// registered component type or an instance.
    pub(crate) fn resolve(&self, registry: &component::Registry) -> Result<Vec<Target>> {
        let mut targets = Vec::new();
        self.resolve_into(registry, &mut targets)?;
        Ok(targets)
    }

    fn resolve_into(&self, registry: &component::Registry, targets: &mut Vec<Target>) -> Result<()> {
        match self {
            Selector::Type(token) => {
                let info = registry
                    .resolve(token)
                    .ok_or_else(|| Error::unknown_selector(self.to_string()))?;
                targets.push(Target::Type(info.id()));
            }
            Selector::Id(id) => {
                let info = registry
                    .get_info_by_id(*id)
                    .ok_or_else(|| Error::unknown_selector(self.to_string()))?;
                targets.push(Target::Type(info.id()));
            }
            Selector::Instance(handle) => targets.push(Target::Instance(Arc::clone(handle))),
            Selector::Named(name) => {
                let info = registry
                    .find(name)
                    .ok_or_else(|| Error::unknown_selector(self.to_string()))?;
                targets.push(Target::Type(info.id()));
            }
            Selector::Many(selectors) => {
                for selector in selectors {
                    selector.resolve_into(registry, targets)?;
                }
            }
        }
        Ok(())
    }
}

impl From<Token> for Selector {
    fn from(token: Token) -> Self {
        Self::Type(token)
    }
}

impl From<component::Id> for Selector {
    fn from(id: component::Id) -> Self {
        Self::Id(id)
    }
}

impl From<Handle> for Selector {
    fn from(handle: Handle) -> Self {
        Self::Instance(handle)
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl<S: Into<Selector>> From<Vec<S>> for Selector {
    fn from(selectors: Vec<S>) -> Self {
        Self::Many(selectors.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Type(token) => write!(f, "type `{}`", token.name()),
            Selector::Id(id) => write!(f, "component id {}", id.index()),
            Selector::Instance(handle) => write!(f, "instance of `{}`", handle.info().name()),
            Selector::Named(name) => write!(f, "name `{}`", name),
            Selector::Many(selectors) => {
                write!(f, "[")?;
                for (i, selector) in selectors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", selector)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self)
    }
}

#[cfg(test)]
mod tests {
    use rusty_ecs_macros::Component;

    use super::*;

    #[derive(Component, Clone, Default)]
    struct Armor;

    struct NotAComponent;

    #[test]
    fn resolves_every_form() {
        // Given
        let registry = component::Registry::new();
        let id = registry.register::<Armor>();

        // When
        let targets = Selector::from(vec![
            Selector::of::<Armor>(),
            Selector::Id(id),
            Selector::from("Armor"),
        ])
        .resolve(&registry)
        .unwrap();

        // Then
        assert_eq!(targets.len(), 3);
        assert!(
            targets
                .iter()
                .all(|t| matches!(t, Target::Type(target) if *target == id))
        );
    }

    #[test]
    fn unresolvable_selectors_fail() {
        // Given
        let registry = component::Registry::new();

        // Then
        let foreign = Selector::Type(Token::foreign::<NotAComponent>()).resolve(&registry);
        assert!(matches!(foreign, Err(Error::UnknownComponentSelector { .. })));

        let named = Selector::from("Nothing").resolve(&registry);
        assert!(matches!(named, Err(Error::UnknownComponentSelector { .. })));

        let id = Selector::Id(component::Id::new(99)).resolve(&registry);
        assert!(matches!(id, Err(Error::UnknownComponentSelector { .. })));

        // A single bad element poisons the list
        let many = Selector::Many(vec![Selector::of::<Armor>(), Selector::from("Nothing")])
            .resolve(&registry);
        assert!(matches!(many, Err(Error::UnknownComponentSelector { .. })));
    }

    #[test]
    fn display_names_the_selector() {
        let selector = Selector::Many(vec![Selector::from("Armor"), Selector::from("Boots")]);
        assert_eq!(selector.to_string(), "[name `Armor`, name `Boots`]");
    }
}
