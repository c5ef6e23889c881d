//! Type-erased field values and the name → value tables used for props,
//! state, patches and plain view models.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Cheaply cloneable, type-erased value.
///
/// Clones share the same allocation, so `ptr_eq` tells whether two values
/// came from the same write.
#[derive(Clone)]
pub struct Value {
    inner: Rc<dyn Any>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: 'static>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value(<{}>)", self.type_name)
    }
}

#[derive(Clone, Default)]
pub struct FieldMap {
    entries: HashMap<String, Value>,
}

/// Props container as handed down by a parent.
pub type Props = FieldMap;
/// State container, or a partial patch of one.
pub type State = FieldMap;

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert<T: 'static>(&mut self, name: impl Into<String>, value: T) {
        self.entries.insert(name.into(), Value::new(value));
    }

    pub fn insert_value(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn get_as<T: Clone + 'static>(&self, name: &str) -> Option<T> {
        self.entries.get(name).and_then(Value::get::<T>)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    /// Shallow merge: entries of `patch` replace entries of `self`.
    pub fn merge(&mut self, patch: &FieldMap) {
        for (k, v) in &patch.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    /// Copies entries of `defaults` that `self` does not define.
    pub fn fill_from(&mut self, defaults: &FieldMap) {
        for (k, v) in &defaults.entries {
            self.entries
                .entry(k.clone())
                .or_insert_with(|| v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        f.debug_map().entries(names).finish()
    }
}

/// What a render function sees: named fields, nothing else.
///
/// Implemented by live components and by `FieldMap`, so render functions can
/// be exercised without mounting anything.
pub trait ViewModel {
    fn read(&self, name: &str) -> Option<Value>;
}

impl dyn ViewModel + '_ {
    pub fn field<T: Clone + 'static>(&self, name: &str) -> Option<T> {
        self.read(name).and_then(|v| v.get::<T>())
    }
}

impl ViewModel for FieldMap {
    fn read(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }
}
