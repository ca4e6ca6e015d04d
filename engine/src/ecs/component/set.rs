use crate::{
    all_tuples,
    ecs::component::{Component, Handle, Value},
};

/// A trait describing an ordered set of component values handed to entity creation or attachment.
///
/// The goal of this trait is to let call sites pass whatever they have on hand: a single
/// component, a tuple of components, a prepared [`Value`], an existing [`Handle`] or a list of
/// values built at runtime. Order is preserved; it is the order the values are attached in.
pub trait Set: Sized {
    /// Append the values in this set to `values`. This takes ownership of self.
    fn push_into(self, values: &mut Vec<Value>);

    /// Collect the values in this set.
    fn into_values(self) -> Vec<Value> {
        let mut values = Vec::new();
        self.push_into(&mut values);
        values
    }
}

/// Implement Set for single component types.
impl<C: Component> Set for C {
    fn push_into(self, values: &mut Vec<Value>) {
        values.push(Value::instance(self));
    }
}

impl Set for Value {
    fn push_into(self, values: &mut Vec<Value>) {
        values.push(self);
    }
}

impl Set for Handle {
    fn push_into(self, values: &mut Vec<Value>) {
        values.push(Value::Shared(self));
    }
}

impl Set for Vec<Value> {
    fn push_into(self, values: &mut Vec<Value>) {
        values.extend(self);
    }
}

impl Set for () {
    fn push_into(self, _values: &mut Vec<Value>) {
        // No components to apply.
    }
}

/// Implement Set for tuples of other sets.
macro_rules! tuple_set {
    ($($name: ident),*) => {
        impl<$($name: Set),*> Set for ($($name,)*) {
            fn push_into(self, values: &mut Vec<Value>) {
                #[allow(non_snake_case)]
                let ( $($name,)* ) = self;
                $(<$name as Set>::push_into($name, values);)*
            }
        }
    }
}

// Implement the tuple Set for all tuples up to 26 elements.
all_tuples!(tuple_set);

#[cfg(test)]
mod tests {
    use rusty_ecs_macros::Component;

    use super::*;
    use crate::ecs::component::Registry;

    #[derive(Component, Clone, Default, Debug, PartialEq)]
    struct Component1 {
        value: u32,
    }

    #[derive(Component, Clone, Default, Debug, PartialEq)]
    struct Component2 {
        value: u32,
    }

    #[test]
    fn single_component_set() {
        // Given
        let registry = Registry::new();

        // When
        let values = Component1 { value: 42 }.into_values();

        // Then
        assert_eq!(values.len(), 1);
        let handle = values.into_iter().next().unwrap().resolve(&registry, "test").unwrap();
        assert_eq!(handle.value::<Component1>(), Some(Component1 { value: 42 }));
    }

    #[test]
    fn nested_tuple_keeps_order() {
        // Given
        let registry = Registry::new();

        // When
        let values = (
            Component1 { value: 1 },
            (Value::of::<Component2>(), vec![Value::instance(Component1 { value: 3 })]),
        )
            .into_values();

        // Then
        let handles: Vec<_> = values
            .into_iter()
            .map(|v| v.resolve(&registry, "test").unwrap())
            .collect();
        assert_eq!(handles.len(), 3);
        assert_eq!(handles[0].value::<Component1>(), Some(Component1 { value: 1 }));
        assert_eq!(handles[1].value::<Component2>(), Some(Component2 { value: 0 }));
        assert_eq!(handles[2].value::<Component1>(), Some(Component1 { value: 3 }));
    }

    #[test]
    fn empty_set() {
        assert!(().into_values().is_empty());
    }
}
