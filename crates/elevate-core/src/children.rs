//! # Children
//!
//! A parent hands a component its children as a `Children<R>` tree: empty,
//! a single node, or a (possibly nested) list. Elevated child fields see that
//! tree flattened into the order the parent supplied, recomputed on every
//! read:
//!
//! ```rust
//! use elevate_core::*;
//!
//! let kids = Children::nested(vec![
//!     Children::One("a"),
//!     Children::many(["b", "c"]),
//!     Children::Empty,
//! ]);
//! assert_eq!(kids.flatten(), vec!["a", "b", "c"]);
//! ```

use std::rc::Rc;

use crate::class::{FieldDescriptor, FieldKind};
use crate::error::{ElevateError, Result};
use crate::{ClassBuilder, Component, Node, Value};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Children<R> {
    #[default]
    Empty,
    One(R),
    Many(Vec<Children<R>>),
}

impl<R: Clone> Children<R> {
    pub fn many(items: impl IntoIterator<Item = R>) -> Self {
        Children::Many(items.into_iter().map(Children::One).collect())
    }

    pub fn nested(groups: Vec<Children<R>>) -> Self {
        Children::Many(groups)
    }

    /// Depth-first, in supplied order. Always a fresh `Vec`.
    pub fn flatten(&self) -> Vec<R> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<R>) {
        match self {
            Children::Empty => {}
            Children::One(node) => out.push(node.clone()),
            Children::Many(items) => {
                for item in items {
                    item.collect_into(out);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Children::Empty => true,
            Children::One(_) => false,
            Children::Many(items) => items.iter().all(Children::is_empty),
        }
    }
}

impl<R> From<Vec<R>> for Children<R> {
    fn from(items: Vec<R>) -> Self {
        Children::Many(items.into_iter().map(Children::One).collect())
    }
}

impl<R> From<Option<R>> for Children<R> {
    fn from(item: Option<R>) -> Self {
        item.map_or(Children::Empty, Children::One)
    }
}

pub type ChildPredicate<R> = Rc<dyn Fn(&R) -> bool>;

/// Accepts an optional, dynamically supplied predicate: absent means "any",
/// anything but a `ChildPredicate<R>` is rejected.
pub fn predicate_from_value<R: Node>(
    field: &str,
    arg: Option<Value>,
) -> Result<Option<ChildPredicate<R>>> {
    match arg {
        None => Ok(None),
        Some(v) => match v.get::<ChildPredicate<R>>() {
            Some(p) => Ok(Some(p)),
            None => Err(ElevateError::invalid(
                field,
                format!("child predicate must be a function, got {}", v.type_name()),
            )),
        },
    }
}

fn select_first<R: Node>(children: &Children<R>, pred: Option<&ChildPredicate<R>>) -> Option<R> {
    let all = children.flatten();
    match pred {
        Some(p) => all.into_iter().find(|c| p(c)),
        None => all.into_iter().next(),
    }
}

fn select_all<R: Node>(children: &Children<R>, pred: Option<&ChildPredicate<R>>) -> Vec<R> {
    let all = children.flatten();
    match pred {
        Some(p) => all.into_iter().filter(|c| p(c)).collect(),
        None => all,
    }
}

/// Typed handle to a single-child field.
pub struct ChildField<R: Node> {
    name: &'static str,
    pred: Option<ChildPredicate<R>>,
}

impl<R: Node> Clone for ChildField<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            pred: self.pred.clone(),
        }
    }
}

impl<R: Node> ChildField<R> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, component: &Component<R>) -> Option<R> {
        select_first(&component.children(), self.pred.as_ref())
    }
}

/// Typed handle to an all-children field.
pub struct ChildrenField<R: Node> {
    name: &'static str,
    pred: Option<ChildPredicate<R>>,
}

impl<R: Node> Clone for ChildrenField<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            pred: self.pred.clone(),
        }
    }
}

impl<R: Node> ChildrenField<R> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, component: &Component<R>) -> Vec<R> {
        select_all(&component.children(), self.pred.as_ref())
    }
}

impl<R: Node> ClassBuilder<R> {
    /// First child, in supplied order.
    pub fn child(&mut self, name: &'static str) -> Result<ChildField<R>> {
        self.install_child(name, None)
    }

    /// First child matching `pred`.
    pub fn child_where(
        &mut self,
        name: &'static str,
        pred: impl Fn(&R) -> bool + 'static,
    ) -> Result<ChildField<R>> {
        self.install_child(name, Some(Rc::new(pred)))
    }

    /// Like `child_where`, with the predicate supplied as a dynamic value.
    pub fn child_with(&mut self, name: &'static str, arg: Option<Value>) -> Result<ChildField<R>> {
        let pred = predicate_from_value(name, arg)?;
        self.install_child(name, pred)
    }

    /// Every child, in supplied order.
    pub fn children(&mut self, name: &'static str) -> Result<ChildrenField<R>> {
        self.install_children(name, None)
    }

    pub fn children_where(
        &mut self,
        name: &'static str,
        pred: impl Fn(&R) -> bool + 'static,
    ) -> Result<ChildrenField<R>> {
        self.install_children(name, Some(Rc::new(pred)))
    }

    pub fn children_with(
        &mut self,
        name: &'static str,
        arg: Option<Value>,
    ) -> Result<ChildrenField<R>> {
        let pred = predicate_from_value(name, arg)?;
        self.install_children(name, pred)
    }

    fn install_child(
        &mut self,
        name: &'static str,
        pred: Option<ChildPredicate<R>>,
    ) -> Result<ChildField<R>> {
        self.check_name(name, FieldKind::Child)?;
        let p = pred.clone();
        let getter = Rc::new(move |c: &Component<R>| {
            select_first(&c.children(), p.as_ref()).map(Value::new)
        });
        self.install(FieldDescriptor::read_only(name, FieldKind::Child, getter));
        Ok(ChildField { name, pred })
    }

    fn install_children(
        &mut self,
        name: &'static str,
        pred: Option<ChildPredicate<R>>,
    ) -> Result<ChildrenField<R>> {
        self.check_name(name, FieldKind::Children)?;
        let p = pred.clone();
        let getter = Rc::new(move |c: &Component<R>| {
            Some(Value::new(select_all(&c.children(), p.as_ref())))
        });
        self.install(FieldDescriptor::read_only(
            name,
            FieldKind::Children,
            getter,
        ));
        Ok(ChildrenField { name, pred })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_child_is_a_sequence_of_one() {
        let one = Children::One(7);
        let list = Children::many([7]);
        assert_eq!(one.flatten(), list.flatten());
        assert_eq!(select_first(&one, None), Some(7));
    }

    #[test]
    fn empty_children() {
        let none: Children<i32> = Children::Empty;
        assert!(none.is_empty());
        assert_eq!(select_first(&none, None), None);
        assert!(select_all(&none, None).is_empty());
        assert!(Children::<i32>::nested(vec![Children::Empty, Children::Many(vec![])]).is_empty());
    }

    #[test]
    fn nested_lists_flatten_in_order() {
        let kids = Children::nested(vec![
            Children::many([1, 2]),
            Children::One(3),
            Children::nested(vec![Children::many([4]), Children::One(5)]),
        ]);
        assert_eq!(kids.flatten(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn predicate_picks_first_match_in_order() {
        let kids: Children<i32> = vec![1, 4, 6, 9].into();
        let even: ChildPredicate<i32> = Rc::new(|n: &i32| n % 2 == 0);
        assert_eq!(select_first(&kids, Some(&even)), Some(4));
        assert_eq!(select_all(&kids, Some(&even)), vec![4, 6]);

        let big: ChildPredicate<i32> = Rc::new(|n: &i32| *n > 100);
        assert_eq!(select_first(&kids, Some(&big)), None);
        assert!(select_all(&kids, Some(&big)).is_empty());
    }

    #[test]
    fn dynamic_predicate_must_be_a_function() {
        assert!(predicate_from_value::<i32>("tab", None).unwrap().is_none());

        let pred: ChildPredicate<i32> = Rc::new(|n: &i32| *n == 1);
        let ok = predicate_from_value::<i32>("tab", Some(Value::new(pred))).unwrap();
        assert!(ok.is_some());

        let err = predicate_from_value::<i32>("tab", Some(Value::new("not a fn"))).err();
        assert!(matches!(
            err,
            Some(ElevateError::InvalidArgument { ref field, .. }) if field == "tab"
        ));
    }
}
