//! Lifecycle hook chains.
//!
//! A hook point holds every hook registered for it instead of a single
//! overridable slot. Decorators register in the `Sync` stage, authors in the
//! `User` stage; all `Sync` hooks run before any `User` hook so author code
//! already sees synchronized fields.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::{Component, Node, Props, State};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HookStage {
    Sync,
    User,
}

/// Returned by before-update hooks. Any `Skip` in a chain vetoes the render;
/// the state is committed either way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateGate {
    #[default]
    Proceed,
    Skip,
}

impl UpdateGate {
    pub fn and(self, other: UpdateGate) -> UpdateGate {
        match (self, other) {
            (UpdateGate::Proceed, UpdateGate::Proceed) => UpdateGate::Proceed,
            _ => UpdateGate::Skip,
        }
    }
}

pub type ReceivePropsHook<R> = dyn Fn(&Component<R>, &Props);
pub type BeforeUpdateHook<R> = dyn Fn(&Component<R>, &Props, &State) -> UpdateGate;
pub type AfterUpdateHook<R> = dyn Fn(&Component<R>, &Props, &State);

struct HookEntry<H: ?Sized> {
    stage: HookStage,
    key: Option<String>,
    hook: Rc<H>,
}

impl<H: ?Sized> Clone for HookEntry<H> {
    fn clone(&self) -> Self {
        Self {
            stage: self.stage,
            key: self.key.clone(),
            hook: self.hook.clone(),
        }
    }
}

pub struct HookChain<H: ?Sized> {
    entries: SmallVec<[HookEntry<H>; 4]>,
}

impl<H: ?Sized> Default for HookChain<H> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<H: ?Sized> Clone for HookChain<H> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<H: ?Sized> HookChain<H> {
    pub fn push(&mut self, stage: HookStage, hook: Rc<H>) {
        self.entries.push(HookEntry {
            stage,
            key: None,
            hook,
        });
    }

    /// Registers `hook` under `key`, replacing an earlier hook with the same
    /// stage and key in place. Hooks under other keys are untouched.
    pub fn push_keyed(&mut self, stage: HookStage, key: impl Into<String>, hook: Rc<H>) {
        let key = key.into();
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.stage == stage && e.key.as_deref() == Some(key.as_str()))
        {
            existing.hook = hook;
            return;
        }
        self.entries.push(HookEntry {
            stage,
            key: Some(key),
            hook,
        });
    }

    /// Hooks in invocation order.
    pub fn ordered(&self) -> SmallVec<[Rc<H>; 4]> {
        let mut out: SmallVec<[Rc<H>; 4]> = SmallVec::new();
        for stage in [HookStage::Sync, HookStage::User] {
            out.extend(
                self.entries
                    .iter()
                    .filter(|e| e.stage == stage)
                    .map(|e| e.hook.clone()),
            );
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct LifecycleHooks<R: Node> {
    pub before_receive_props: HookChain<ReceivePropsHook<R>>,
    pub before_update: HookChain<BeforeUpdateHook<R>>,
    pub after_update: HookChain<AfterUpdateHook<R>>,
}

impl<R: Node> Default for LifecycleHooks<R> {
    fn default() -> Self {
        Self {
            before_receive_props: HookChain::default(),
            before_update: HookChain::default(),
            after_update: HookChain::default(),
        }
    }
}

impl<R: Node> Clone for LifecycleHooks<R> {
    fn clone(&self) -> Self {
        Self {
            before_receive_props: self.before_receive_props.clone(),
            before_update: self.before_update.clone(),
            after_update: self.after_update.clone(),
        }
    }
}

impl<R: Node> LifecycleHooks<R> {
    pub(crate) fn run_before_receive_props(&self, component: &Component<R>, next_props: &Props) {
        for hook in self.before_receive_props.ordered() {
            hook(component, next_props);
        }
    }

    pub(crate) fn run_before_update(
        &self,
        component: &Component<R>,
        next_props: &Props,
        next_state: &State,
    ) -> UpdateGate {
        // every hook runs, a veto does not short-circuit later hooks
        self.before_update
            .ordered()
            .iter()
            .fold(UpdateGate::Proceed, |gate, hook| {
                gate.and(hook(component, next_props, next_state))
            })
    }

    pub(crate) fn run_after_update(
        &self,
        component: &Component<R>,
        prev_props: &Props,
        prev_state: &State,
    ) {
        for hook in self.after_update.ordered() {
            hook(component, prev_props, prev_state);
        }
    }
}
