//! # Host runtime
//!
//! The minimal component host the elevated fields run on: a registry of
//! mounted instances and a queue of deferred updates. Nothing written
//! through `Component::set_state` (and so nothing written through a state
//! field) reaches the state container before `Host::flush`.
//!
//! ```rust
//! use elevate_core::*;
//!
//! let mut b = ComponentClass::<()>::builder("Counter");
//! let count = b.state("count", 0i32).unwrap();
//! let class = b.build();
//!
//! let host = Host::new();
//! let c = host.mount(&class, Props::new(), Children::Empty);
//! count.update(&c, |n| n + 1);
//!
//! assert_eq!(count.get(&c), 1); // synchronous
//! assert_eq!(c.state().get_as::<i32>("count"), Some(0)); // not yet applied
//!
//! host.flush();
//! assert_eq!(c.state().get_as::<i32>("count"), Some(1));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::{Children, Component, ComponentClass, Node, Props, State};

new_key_type! {
    pub struct ComponentId;
}

pub(crate) enum StateUpdate {
    Patch(State),
    Updater(Box<dyn FnOnce(&State, &Props) -> State>),
}

pub(crate) enum Pending<R: Node> {
    State(StateUpdate),
    Props { props: Props, children: Children<R> },
}

struct Queued<R: Node> {
    id: ComponentId,
    seq: u64,
    pending: Pending<R>,
}

pub(crate) struct UpdateQueue<R: Node> {
    pending: RefCell<VecDeque<Queued<R>>>,
    next_seq: Cell<u64>,
}

impl<R: Node> UpdateQueue<R> {
    fn new() -> Self {
        Self {
            pending: RefCell::new(VecDeque::new()),
            next_seq: Cell::new(1),
        }
    }

    /// Queues an update and returns its sequence number.
    pub(crate) fn push(&self, id: ComponentId, pending: Pending<R>) -> u64 {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.pending
            .borrow_mut()
            .push_back(Queued { id, seq, pending });
        seq
    }

    fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Takes everything queued so far, grouped per component in the order
    /// each component first appears.
    fn drain_grouped(&self) -> Vec<(ComponentId, SmallVec<[(u64, Pending<R>); 4]>)> {
        let drained = std::mem::take(&mut *self.pending.borrow_mut());
        let mut groups: Vec<(ComponentId, SmallVec<[(u64, Pending<R>); 4]>)> = Vec::new();
        for q in drained {
            match groups.iter_mut().find(|(id, _)| *id == q.id) {
                Some((_, batch)) => batch.push((q.seq, q.pending)),
                None => {
                    let mut batch = SmallVec::new();
                    batch.push((q.seq, q.pending));
                    groups.push((q.id, batch));
                }
            }
        }
        groups
    }
}

#[derive(Clone, Debug)]
pub struct HostConfig {
    /// Upper bound on queue passes per `flush`. Updates scheduled from
    /// lifecycle hooks trigger further passes.
    pub max_flush_passes: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_flush_passes: 32,
        }
    }
}

impl HostConfig {
    pub fn max_flush_passes(mut self, passes: usize) -> Self {
        self.max_flush_passes = passes.max(1);
        self
    }
}

pub struct Host<R: Node> {
    config: HostConfig,
    components: RefCell<SlotMap<ComponentId, Component<R>>>,
    queue: Rc<UpdateQueue<R>>,
}

impl<R: Node> Default for Host<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Node> Host<R> {
    pub fn new() -> Self {
        Self::with_config(HostConfig::default())
    }

    pub fn with_config(config: HostConfig) -> Self {
        Self {
            config,
            components: RefCell::new(SlotMap::with_key()),
            queue: Rc::new(UpdateQueue::new()),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn mount(
        &self,
        class: &Rc<ComponentClass<R>>,
        props: Props,
        children: Children<R>,
    ) -> Component<R> {
        self.mount_inner(class, props, children, None)
    }

    /// Mounts with an explicit initial state layered over the class's own.
    pub fn mount_with_state(
        &self,
        class: &Rc<ComponentClass<R>>,
        props: Props,
        children: Children<R>,
        initial_state: State,
    ) -> Component<R> {
        self.mount_inner(class, props, children, Some(initial_state))
    }

    fn mount_inner(
        &self,
        class: &Rc<ComponentClass<R>>,
        props: Props,
        children: Children<R>,
        initial_state: Option<State>,
    ) -> Component<R> {
        let props = class.resolve_props(props);
        let state = class.mount_state(initial_state);
        let id = self.components.borrow_mut().insert_with_key(|id| {
            Component::new(
                id,
                class.clone(),
                props,
                state,
                children,
                self.queue.clone(),
            )
        });
        let component = self.components.borrow()[id].clone();
        log::debug!(
            "elevate: mounted {} as {:?}",
            class.name(),
            component.id()
        );
        component.render_now();
        component
    }

    /// Queues new props (and children) from the parent.
    pub fn receive_props(&self, component: &Component<R>, props: Props, children: Children<R>) {
        if !self.components.borrow().contains_key(component.id()) {
            log::warn!(
                "elevate: props for unmounted {} dropped",
                component.class().name()
            );
            return;
        }
        self.queue.push(component.id(), Pending::Props { props, children });
    }

    pub fn unmount(&self, component: &Component<R>) -> bool {
        let removed = self.components.borrow_mut().remove(component.id());
        match removed {
            Some(c) => {
                c.set_unmounted();
                log::debug!("elevate: unmounted {:?}", c.id());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ComponentId) -> Option<Component<R>> {
        self.components.borrow().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.components.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.borrow().is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Applies queued updates. Returns the number of update cycles run.
    pub fn flush(&self) -> usize {
        let mut cycles = 0;
        for pass in 0..self.config.max_flush_passes {
            let groups = self.queue.drain_grouped();
            if groups.is_empty() {
                return cycles;
            }
            log::trace!(
                "elevate: flush pass {} over {} component(s)",
                pass,
                groups.len()
            );
            for (id, batch) in groups {
                let Some(component) = self.get(id) else {
                    log::debug!("elevate: dropping updates for unmounted {:?}", id);
                    continue;
                };
                component.run_update(batch);
                cycles += 1;
            }
        }
        if !self.is_idle() {
            log::warn!(
                "elevate: flush stopped after {} passes with {} update(s) still queued",
                self.config.max_flush_passes,
                self.pending()
            );
        }
        cycles
    }
}
