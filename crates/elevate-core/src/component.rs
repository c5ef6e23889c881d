use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::class::{ComponentClass, FieldKind};
use crate::error::{ElevateError, Result};
use crate::host::{ComponentId, Pending, StateUpdate, UpdateQueue};
use crate::hooks::UpdateGate;
use crate::{Children, Props, State, Value, ViewModel};

/// Anything a host can render into and hand down as a child.
pub trait Node: Clone + 'static {}
impl<T> Node for T where T: Clone + 'static {}

/// A synchronous write not yet confirmed by the host, tagged with the queue
/// sequence of the update carrying it.
#[derive(Clone, Debug)]
struct Shadow {
    value: Value,
    seq: u64,
}

/// Handle to a mounted component instance.
///
/// Cloning the handle does not clone the instance.
pub struct Component<R: Node>(Rc<ComponentInner<R>>);

struct ComponentInner<R: Node> {
    id: ComponentId,
    class: Rc<ComponentClass<R>>,
    props: RefCell<Props>,
    state: RefCell<State>,
    shadow: RefCell<HashMap<String, Shadow>>,
    // highest queue sequence folded into the current or last update cycle
    applied_seq: Cell<u64>,
    children: RefCell<Children<R>>,
    rendered: RefCell<Option<R>>,
    render_count: Cell<u64>,
    mounted: Cell<bool>,
    queue: Rc<UpdateQueue<R>>,
}

impl<R: Node> Clone for Component<R> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<R: Node> fmt::Debug for Component<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.0.id)
            .field("class", &self.0.class.name())
            .field("props", &*self.0.props.borrow())
            .field("state", &*self.0.state.borrow())
            .finish()
    }
}

impl<R: Node> Component<R> {
    pub(crate) fn new(
        id: ComponentId,
        class: Rc<ComponentClass<R>>,
        props: Props,
        state: State,
        children: Children<R>,
        queue: Rc<UpdateQueue<R>>,
    ) -> Self {
        Self(Rc::new(ComponentInner {
            id,
            class,
            props: RefCell::new(props),
            state: RefCell::new(state),
            shadow: RefCell::new(HashMap::new()),
            applied_seq: Cell::new(0),
            children: RefCell::new(children),
            rendered: RefCell::new(None),
            render_count: Cell::new(0),
            mounted: Cell::new(true),
            queue,
        }))
    }

    pub fn id(&self) -> ComponentId {
        self.0.id
    }

    pub fn class(&self) -> &Rc<ComponentClass<R>> {
        &self.0.class
    }

    pub fn ptr_eq(&self, other: &Component<R>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_mounted(&self) -> bool {
        self.0.mounted.get()
    }

    pub(crate) fn set_unmounted(&self) {
        self.0.mounted.set(false);
    }

    /// Snapshot of the props container.
    pub fn props(&self) -> Props {
        self.0.props.borrow().clone()
    }

    /// Snapshot of the host's state container, ignoring any shadow values.
    pub fn state(&self) -> State {
        self.0.state.borrow().clone()
    }

    pub fn children(&self) -> Children<R> {
        self.0.children.borrow().clone()
    }

    pub fn prop_value(&self, name: &str) -> Option<Value> {
        self.0.props.borrow().get(name).cloned()
    }

    pub fn state_value(&self, name: &str) -> Option<Value> {
        self.0.state.borrow().get(name).cloned()
    }

    /// Schedules a partial state update. Applied on the next host flush.
    pub fn set_state(&self, patch: State) {
        self.schedule(StateUpdate::Patch(patch));
    }

    /// Schedules an updater computing a patch from the state and props as
    /// they stand when the host applies it.
    pub fn update_state(&self, f: impl FnOnce(&State, &Props) -> State + 'static) {
        self.schedule(StateUpdate::Updater(Box::new(f)));
    }

    fn schedule(&self, update: StateUpdate) -> Option<u64> {
        if !self.is_mounted() {
            log::warn!(
                "elevate: state update on unmounted {} ignored",
                self.0.class.name()
            );
            return None;
        }
        Some(self.0.queue.push(self.0.id, Pending::State(update)))
    }

    /// Reads a field through its installed descriptor.
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        let descriptor = self
            .0
            .class
            .field(name)
            .ok_or_else(|| ElevateError::UnknownField {
                field: name.to_string(),
            })?;
        let getter = descriptor.getter.clone();
        Ok(getter(self))
    }

    /// Writes a field through its installed descriptor.
    pub fn set(&self, name: &str, value: Value) -> Result<()> {
        let descriptor = self
            .0
            .class
            .field(name)
            .ok_or_else(|| ElevateError::UnknownField {
                field: name.to_string(),
            })?;
        match descriptor.setter.clone() {
            Some(setter) => {
                setter(self, value);
                Ok(())
            }
            None => Err(ElevateError::ReadOnlyField {
                field: name.to_string(),
            }),
        }
    }

    /// Whether a state field currently reads from its shadow rather than the
    /// host's container.
    pub fn is_shadowed(&self, name: &str) -> bool {
        self.0.shadow.borrow().contains_key(name)
    }

    /// Invokes the class render method against this instance.
    pub fn render(&self) -> Option<R> {
        let render = self.0.class.render.clone()?;
        Some(render(self as &dyn ViewModel))
    }

    /// Output of the host's last render of this instance.
    pub fn rendered(&self) -> Option<R> {
        self.0.rendered.borrow().clone()
    }

    pub fn render_count(&self) -> u64 {
        self.0.render_count.get()
    }

    pub(crate) fn read_state_field(&self, name: &str) -> Option<Value> {
        if let Some(s) = self.0.shadow.borrow().get(name) {
            return Some(s.value.clone());
        }
        self.state_value(name)
    }

    pub(crate) fn write_state_field(&self, name: &str, value: Value) {
        let mut patch = State::new();
        patch.insert_value(name, value.clone());
        // an unmounted instance keeps its shadow; nothing will ever confirm it
        let seq = self
            .schedule(StateUpdate::Patch(patch))
            .unwrap_or(u64::MAX);
        self.0
            .shadow
            .borrow_mut()
            .insert(name.to_string(), Shadow { value, seq });
    }

    /// Re-derives the shadow from the state about to be committed, unless
    /// the shadow holds a write newer than the batch being applied.
    pub(crate) fn sync_shadow(&self, name: &str, next_state: &State) {
        let applied = self.0.applied_seq.get();
        let mut shadow = self.0.shadow.borrow_mut();
        if shadow.get(name).is_some_and(|s| s.seq > applied) {
            return;
        }
        match next_state.get(name) {
            Some(v) => {
                shadow.insert(
                    name.to_string(),
                    Shadow {
                        value: v.clone(),
                        seq: applied,
                    },
                );
            }
            None => {
                shadow.remove(name);
            }
        }
    }

    /// Drops the shadow once the write it carries has been committed.
    pub(crate) fn confirm_shadow(&self, name: &str) {
        let applied = self.0.applied_seq.get();
        let mut shadow = self.0.shadow.borrow_mut();
        if shadow.get(name).is_some_and(|s| s.seq <= applied) {
            shadow.remove(name);
        }
    }

    pub(crate) fn render_now(&self) {
        if let Some(out) = self.render() {
            *self.0.rendered.borrow_mut() = Some(out);
            self.0.render_count.set(self.0.render_count.get() + 1);
        } else {
            log::trace!("elevate: {} has no render method", self.0.class.name());
        }
    }

    /// One host update cycle over a drained batch.
    pub(crate) fn run_update(&self, batch: SmallVec<[(u64, Pending<R>); 4]>) -> UpdateGate {
        let class = self.0.class.clone();
        if let Some(last) = batch.iter().map(|(seq, _)| *seq).max() {
            self.0.applied_seq.set(last);
        }
        let prev_props = self.props();
        let prev_state = self.state();

        let mut next_props = prev_props.clone();
        let mut next_children = None;
        let mut next_state = prev_state.clone();

        for (_, pending) in batch {
            match pending {
                Pending::Props { props, children } => {
                    let resolved = class.resolve_props(props);
                    class.hooks.run_before_receive_props(self, &resolved);
                    next_props = resolved;
                    next_children = Some(children);
                }
                Pending::State(StateUpdate::Patch(patch)) => next_state.merge(&patch),
                Pending::State(StateUpdate::Updater(f)) => {
                    let patch = f(&next_state, &next_props);
                    next_state.merge(&patch);
                }
            }
        }

        let gate = class
            .hooks
            .run_before_update(self, &next_props, &next_state);

        *self.0.props.borrow_mut() = next_props;
        *self.0.state.borrow_mut() = next_state;
        if let Some(children) = next_children {
            *self.0.children.borrow_mut() = children;
        }

        if gate == UpdateGate::Proceed {
            self.render_now();
            class.hooks.run_after_update(self, &prev_props, &prev_state);
        } else {
            // after-update is skipped, but the committed state still confirms
            // whatever shadows it covers
            for field in class.fields().iter().filter(|d| d.kind == FieldKind::State) {
                self.confirm_shadow(field.name);
            }
            log::trace!(
                "elevate: update of {} committed without render",
                class.name()
            );
        }
        gate
    }
}

impl<R: Node> ViewModel for Component<R> {
    fn read(&self, name: &str) -> Option<Value> {
        self.get(name).ok().flatten()
    }
}
