//! Elevated props: read-only fields backed by the props container, with
//! defaults recorded on the class so the host fills them in before the
//! first render.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::class::{FieldDescriptor, FieldKind};
use crate::error::Result;
use crate::hooks::HookStage;
use crate::{ClassBuilder, Component, Node, Props};

/// Typed handle to an elevated prop. There is deliberately no `set`: props
/// belong to the parent.
pub struct PropField<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PropField<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            _marker: PhantomData,
        }
    }
}

impl<T: Clone + 'static> PropField<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get<R: Node>(&self, component: &Component<R>) -> Option<T> {
        component
            .prop_value(self.name)
            .and_then(|v| v.get::<T>())
    }

    pub fn get_or<R: Node>(&self, component: &Component<R>, fallback: T) -> T {
        self.get(component).unwrap_or(fallback)
    }
}

impl<R: Node> ClassBuilder<R> {
    /// Elevates prop `name`. A `default` goes into the class default props.
    pub fn prop<T: Clone + 'static>(
        &mut self,
        name: &'static str,
        default: Option<T>,
    ) -> Result<PropField<T>> {
        self.check_name(name, FieldKind::Prop)?;

        let getter = Rc::new(move |c: &Component<R>| c.prop_value(name));
        self.install(FieldDescriptor::read_only(name, FieldKind::Prop, getter));

        if let Some(d) = default {
            self.class.default_props.insert(name, d);
        }

        Ok(PropField {
            name,
            _marker: PhantomData,
        })
    }

    /// Calls `on_change(component, old, new)` before the component receives
    /// props in which `field` differs from its current value.
    pub fn watch_prop<T: Clone + PartialEq + 'static>(
        &mut self,
        field: &PropField<T>,
        on_change: impl Fn(&Component<R>, Option<&T>, Option<&T>) + 'static,
    ) -> &mut Self {
        let name = field.name;
        self.class.hooks.before_receive_props.push(
            HookStage::Sync,
            Rc::new(move |c: &Component<R>, next: &Props| {
                let old = c.prop_value(name);
                let old = old.as_ref().and_then(|v| v.downcast_ref::<T>());
                let new = next.get(name).and_then(|v| v.downcast_ref::<T>());
                if old != new {
                    on_change(c, old, new);
                }
            }),
        );
        self
    }
}
