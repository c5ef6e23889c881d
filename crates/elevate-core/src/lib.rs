//! # Elevated component fields
//!
//! Components keep their data in containers owned by the host: props handed
//! down by the parent, state that only changes when the host applies a
//! queued update, and the children the parent supplied. This crate lets a
//! component class expose entries of those containers as plain fields:
//!
//! - `state` — a read/write field. Writes are visible immediately and reach
//!   the host's container on the next flush.
//! - `prop` — a read-only field with an optional default.
//! - `child` / `children` — the first child, or all of them, optionally
//!   filtered.
//! - `render_with` — a pure render function bound to the class, also kept as
//!   a named static so it can be called with a plain `FieldMap`.
//!
//! ## Declaring a class
//!
//! Decorators run once, while the class is built. The handles they return
//! are shared by every instance:
//!
//! ```rust
//! use elevate_core::*;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Label(String);
//!
//! let mut b = ComponentClass::<Label>::builder("Counter");
//! let count = b.state("count", 0i32).unwrap();
//! let step = b.prop("step", Some(1i32)).unwrap();
//! b.render_with("CounterView", |vm| {
//!     Label(format!("count = {}", vm.field::<i32>("count").unwrap_or_default()))
//! })
//! .unwrap();
//! let counter = b.build();
//!
//! let host = Host::new();
//! let c = host.mount(&counter, Props::new(), Children::Empty);
//!
//! let by = step.get_or(&c, 1);
//! count.update(&c, |n| n + by);
//! assert_eq!(count.get(&c), 1);
//!
//! host.flush();
//! assert_eq!(c.rendered(), Some(Label("count = 1".into())));
//! ```
//!
//! ## Lifecycle
//!
//! The host runs three hook chains per update: before-receive-props,
//! before-update (whose `UpdateGate` can veto the render) and after-update.
//! Decorators add their synchronization to these chains; author hooks added
//! with `on_before_update` and friends run after it, so they already see the
//! upcoming values through elevated fields.

pub mod children;
pub mod class;
pub mod component;
pub mod error;
pub mod hooks;
pub mod host;
pub mod prelude;
pub mod props;
pub mod render;
pub mod state;
pub mod tests;
pub mod value;

pub use children::*;
pub use class::*;
pub use component::*;
pub use error::*;
pub use hooks::*;
pub use host::*;
pub use props::*;
pub use state::*;
pub use value::*;
