//! Render binding: a pure function of the view model, attached to a class.

use std::rc::Rc;

use crate::class::RenderFn;
use crate::error::{ElevateError, Result};
use crate::{ClassBuilder, Node, ViewModel};

impl<R: Node> ClassBuilder<R> {
    /// Binds a pure `(view model) -> R` function as the class render method
    /// and publishes it as the static `name` on the class, so it can be
    /// called with a plain `FieldMap` without mounting anything.
    pub fn render_with(
        &mut self,
        name: &'static str,
        render: impl Fn(&dyn ViewModel) -> R + 'static,
    ) -> Result<RenderFn<R>> {
        if name.is_empty() {
            return Err(ElevateError::invalid(name, "render binding needs a name"));
        }
        let render: RenderFn<R> = Rc::new(render);
        if self.class.render.is_some() {
            log::debug!(
                "elevate: {} replaces its render method with `{}`",
                self.class.name(),
                name
            );
        }
        self.class.render = Some(render.clone());
        self.class.statics.insert(name, render.clone());
        Ok(render)
    }
}
