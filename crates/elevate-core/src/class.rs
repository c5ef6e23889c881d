//! # Classes and field descriptors
//!
//! A `ComponentClass` is the shared, immutable half of a component: the
//! descriptors installed by decorators, default props and state, lifecycle
//! hook chains, the render method and the static render table. It is built
//! once through `ClassBuilder` and then shared (`Rc`) by every instance.
//!
//! ```rust
//! use elevate_core::*;
//!
//! let mut b = ComponentClass::<String>::builder("Greeting");
//! let name = b.prop("name", Some("world".to_string())).unwrap();
//! b.render_with("GreetingView", |vm| {
//!     format!("hello {}", vm.field::<String>("name").unwrap_or_default())
//! })
//! .unwrap();
//! let class = b.build();
//!
//! let host = Host::new();
//! let c = host.mount(&class, Props::new(), Children::Empty);
//! assert_eq!(name.get(&c).as_deref(), Some("world"));
//! assert_eq!(c.rendered().as_deref(), Some("hello world"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::error::{ElevateError, Result};
use crate::hooks::{HookStage, LifecycleHooks, UpdateGate};
use crate::{Component, FieldMap, Node, Props, State, Value, ViewModel};

/// Names owned by the host; a field may not shadow them.
pub const RESERVED_NAMES: &[&str] = &["props", "state", "children", "render"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    State,
    Prop,
    Child,
    Children,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::State => "state",
            FieldKind::Prop => "prop",
            FieldKind::Child => "child",
            FieldKind::Children => "children",
        };
        f.write_str(s)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FieldAccess: u8 {
        const READ = 1;
        const WRITE = 1 << 1;
    }
}

pub type Getter<R> = Rc<dyn Fn(&Component<R>) -> Option<Value>>;
pub type Setter<R> = Rc<dyn Fn(&Component<R>, Value)>;
pub type RenderFn<R> = Rc<dyn Fn(&dyn ViewModel) -> R>;

pub struct FieldDescriptor<R: Node> {
    pub name: &'static str,
    pub kind: FieldKind,
    pub access: FieldAccess,
    pub(crate) getter: Getter<R>,
    pub(crate) setter: Option<Setter<R>>,
}

impl<R: Node> Clone for FieldDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            kind: self.kind,
            access: self.access,
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<R: Node> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("access", &self.access)
            .finish()
    }
}

impl<R: Node> FieldDescriptor<R> {
    pub(crate) fn read_only(name: &'static str, kind: FieldKind, getter: Getter<R>) -> Self {
        Self {
            name,
            kind,
            access: FieldAccess::READ,
            getter,
            setter: None,
        }
    }

    pub(crate) fn read_write(
        name: &'static str,
        kind: FieldKind,
        getter: Getter<R>,
        setter: Setter<R>,
    ) -> Self {
        Self {
            name,
            kind,
            access: FieldAccess::READ | FieldAccess::WRITE,
            getter,
            setter: Some(setter),
        }
    }
}

pub struct ComponentClass<R: Node> {
    name: String,
    parent: Option<String>,
    pub(crate) fields: Vec<FieldDescriptor<R>>,
    pub(crate) default_props: FieldMap,
    pub(crate) default_state: FieldMap,
    pub(crate) initial_state: FieldMap,
    pub(crate) hooks: LifecycleHooks<R>,
    pub(crate) render: Option<RenderFn<R>>,
    pub(crate) statics: HashMap<&'static str, RenderFn<R>>,
}

impl<R: Node> Clone for ComponentClass<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            parent: self.parent.clone(),
            fields: self.fields.clone(),
            default_props: self.default_props.clone(),
            default_state: self.default_state.clone(),
            initial_state: self.initial_state.clone(),
            hooks: self.hooks.clone(),
            render: self.render.clone(),
            statics: self.statics.clone(),
        }
    }
}

impl<R: Node> fmt::Debug for ComponentClass<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("fields", &self.fields)
            .field("default_props", &self.default_props)
            .field("default_state", &self.default_state)
            .finish()
    }
}

impl<R: Node> ComponentClass<R> {
    pub fn builder(name: impl Into<String>) -> ClassBuilder<R> {
        ClassBuilder {
            class: ComponentClass {
                name: name.into(),
                parent: None,
                fields: Vec::new(),
                default_props: FieldMap::new(),
                default_state: FieldMap::new(),
                initial_state: FieldMap::new(),
                hooks: LifecycleHooks::default(),
                render: None,
                statics: HashMap::new(),
            },
        }
    }

    /// Starts a subclass: everything installed on `parent` applies to it,
    /// and anything declared on the builder is layered on top.
    pub fn extend(parent: &ComponentClass<R>, name: impl Into<String>) -> ClassBuilder<R> {
        let mut class = parent.clone();
        class.parent = Some(parent.name.clone());
        class.name = name.into();
        ClassBuilder { class }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<R>> {
        self.fields.iter().find(|d| d.name == name)
    }

    pub fn default_props(&self) -> &FieldMap {
        &self.default_props
    }

    pub fn default_state(&self) -> &FieldMap {
        &self.default_state
    }

    /// Static render reference, callable with any view model.
    pub fn static_render(&self, name: &str) -> Option<RenderFn<R>> {
        self.statics.get(name).cloned()
    }

    pub fn hooks(&self) -> &LifecycleHooks<R> {
        &self.hooks
    }

    pub(crate) fn resolve_props(&self, supplied: Props) -> Props {
        let mut props = supplied;
        props.fill_from(&self.default_props);
        props
    }

    pub(crate) fn mount_state(&self, overrides: Option<State>) -> State {
        let mut state = self.default_state.clone();
        state.merge(&self.initial_state);
        if let Some(o) = overrides {
            state.merge(&o);
        }
        state
    }
}

pub struct ClassBuilder<R: Node> {
    pub(crate) class: ComponentClass<R>,
}

impl<R: Node> ClassBuilder<R> {
    pub fn name(&self) -> &str {
        &self.class.name
    }

    /// Initial state defined by the class itself. Wins over the
    /// initializers captured by `state` fields.
    pub fn initial_state(&mut self, state: State) -> &mut Self {
        self.class.initial_state.merge(&state);
        self
    }

    pub fn on_before_receive_props(
        &mut self,
        hook: impl Fn(&Component<R>, &Props) + 'static,
    ) -> &mut Self {
        self.class
            .hooks
            .before_receive_props
            .push(HookStage::User, Rc::new(hook));
        self
    }

    pub fn on_before_update(
        &mut self,
        hook: impl Fn(&Component<R>, &Props, &State) -> UpdateGate + 'static,
    ) -> &mut Self {
        self.class
            .hooks
            .before_update
            .push(HookStage::User, Rc::new(hook));
        self
    }

    pub fn on_after_update(
        &mut self,
        hook: impl Fn(&Component<R>, &Props, &State) + 'static,
    ) -> &mut Self {
        self.class
            .hooks
            .after_update
            .push(HookStage::User, Rc::new(hook));
        self
    }

    pub fn build(self) -> Rc<ComponentClass<R>> {
        log::debug!(
            "elevate: built class {} with {} field(s)",
            self.class.name,
            self.class.fields.len()
        );
        Rc::new(self.class)
    }

    pub(crate) fn check_name(&self, name: &'static str, kind: FieldKind) -> Result<()> {
        if name.is_empty() {
            return Err(ElevateError::invalid(name, "field name is empty"));
        }
        let mut chars = name.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !head_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ElevateError::invalid(name, "field name is not an identifier"));
        }
        if RESERVED_NAMES.contains(&name) {
            return Err(ElevateError::invalid(
                name,
                "field name is reserved by the host",
            ));
        }
        if let Some(existing) = self.class.field(name)
            && existing.kind != kind
        {
            return Err(ElevateError::invalid(
                name,
                format!("already declared as a {} field", existing.kind),
            ));
        }
        Ok(())
    }

    /// Installs (or overrides) a descriptor.
    pub(crate) fn install(&mut self, descriptor: FieldDescriptor<R>) {
        log::debug!(
            "elevate: installing {} field `{}` on {}",
            descriptor.kind,
            descriptor.name,
            self.class.name
        );
        match self
            .class
            .fields
            .iter_mut()
            .find(|d| d.name == descriptor.name)
        {
            Some(slot) => *slot = descriptor,
            None => self.class.fields.push(descriptor),
        }
    }
}
