pub use crate::children::{ChildField, ChildPredicate, Children, ChildrenField};
pub use crate::class::{ClassBuilder, ComponentClass, FieldKind, RenderFn};
pub use crate::component::{Component, Node};
pub use crate::error::{ElevateError, Result};
pub use crate::hooks::UpdateGate;
pub use crate::host::{ComponentId, Host, HostConfig};
pub use crate::props::PropField;
pub use crate::state::StateField;
pub use crate::value::{FieldMap, Props, State, Value, ViewModel};
