//! # Elevated state
//!
//! `ClassBuilder::state` exposes one entry of the host's state container as
//! a field with synchronous read/write semantics:
//!
//! - a write lands in a per-instance shadow at once and is handed to the
//!   host as a `{ name: value }` patch;
//! - a read returns the shadow when there is one, else the container;
//! - before each update the shadow is re-derived from the state about to be
//!   committed, and after it the shadow is dropped once its write landed.
//!
//! Only whole-value writes go through this path. Mutating something inside
//! a stored value (pushing into a `Rc<RefCell<Vec<_>>>`, say) is invisible
//! to the host and will not re-render.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::class::{FieldDescriptor, FieldKind};
use crate::error::Result;
use crate::hooks::{HookStage, UpdateGate};
use crate::{ClassBuilder, Component, Node, Props, State, Value};

/// Typed handle to an elevated state field. Shared by every instance of the
/// class it was declared on (and of classes extended from it).
pub struct StateField<T> {
    name: &'static str,
    init: Rc<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for StateField<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            init: self.init.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Clone + 'static> StateField<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn initial(&self) -> &T {
        &self.init
    }

    pub fn get<R: Node>(&self, component: &Component<R>) -> T {
        match component
            .read_state_field(self.name)
            .and_then(|v| v.get::<T>())
        {
            Some(v) => v,
            None => {
                log::warn!(
                    "elevate: state `{}` on {} missing or not a {}; using initializer",
                    self.name,
                    component.class().name(),
                    std::any::type_name::<T>()
                );
                (*self.init).clone()
            }
        }
    }

    pub fn set<R: Node>(&self, component: &Component<R>, value: T) {
        component.write_state_field(self.name, Value::new(value));
    }

    /// Read-modify-write against the synchronous value.
    pub fn update<R: Node>(&self, component: &Component<R>, f: impl FnOnce(&T) -> T) {
        let next = f(&self.get(component));
        self.set(component, next);
    }
}

impl<R: Node> ClassBuilder<R> {
    /// Elevates state entry `name`, seeding the class default state with
    /// `init`.
    pub fn state<T: Clone + 'static>(
        &mut self,
        name: &'static str,
        init: T,
    ) -> Result<StateField<T>> {
        self.check_name(name, FieldKind::State)?;

        let getter = Rc::new(move |c: &Component<R>| c.read_state_field(name));
        let setter = Rc::new(move |c: &Component<R>, v: Value| c.write_state_field(name, v));
        self.install(FieldDescriptor::read_write(
            name,
            FieldKind::State,
            getter,
            setter,
        ));

        self.class.default_state.insert(name, init.clone());

        self.class.hooks.before_update.push_keyed(
            HookStage::Sync,
            name,
            Rc::new(move |c: &Component<R>, _: &Props, next: &State| {
                c.sync_shadow(name, next);
                UpdateGate::Proceed
            }),
        );
        self.class.hooks.after_update.push_keyed(
            HookStage::Sync,
            name,
            Rc::new(move |c: &Component<R>, _: &Props, _: &State| c.confirm_shadow(name)),
        );

        Ok(StateField {
            name,
            init: Rc::new(init),
            _marker: PhantomData,
        })
    }
}
