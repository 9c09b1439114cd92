//! Type erasure for cached node values.
//!
//! A node's cache can hold any `T: fmt::Debug + 'static` the caller chooses —
//! the graph itself never needs to know what `T` is, only how to render it
//! for a snapshot and how to hand it back to a typed [`crate::Node`] handle
//! on read. [`ErasedValue`] is the vtable that makes this possible without
//! naming `T` in the graph's own storage.

use std::any::Any;
use std::fmt;

pub(crate) trait ErasedValue: Any {
    fn render(&self) -> String;
    fn as_any(&self) -> &dyn Any;
    fn clone_box(&self) -> Box<dyn ErasedValue>;
}

impl<T> ErasedValue for T
where
    T: fmt::Debug + Clone + 'static,
{
    fn render(&self) -> String {
        format!("{self:?}")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn ErasedValue> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn ErasedValue> {
    fn clone(&self) -> Self {
        self.as_ref().clone_box()
    }
}
