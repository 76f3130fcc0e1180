use std::sync::Arc;

use tracing::trace;

/// Bodies that can produce an independent deep copy of themselves.
///
/// Implemented on the trait-object types (`dyn EvaluationImplementation`, ...)
/// so that one copy-on-write handle serves every function shape.
pub trait SharedBody: Send + Sync {
    /// Returns a fresh, uniquely owned copy of the body.
    fn clone_shared(&self) -> Arc<Self>;

    /// Class name used in logs and persisted studies.
    fn body_name(&self) -> &'static str;
}

/// Reference-counted body with copy-on-write mutation.
///
/// Cloning a `Shared` is cheap and shares the body. [`Shared::make_mut`]
/// detaches the handle first whenever the body is also referenced elsewhere,
/// so mutations through one handle are never observed through another.
#[derive(Debug)]
pub struct Shared<T: ?Sized + SharedBody> {
    body: Arc<T>,
}

impl<T: ?Sized + SharedBody> Shared<T> {
    /// Wraps an already shared body.
    pub fn from_arc(body: Arc<T>) -> Self {
        Self { body }
    }

    /// Read access to the body.
    pub fn get(&self) -> &T {
        &self.body
    }

    /// Returns the underlying reference-counted body.
    pub fn arc(&self) -> &Arc<T> {
        &self.body
    }

    /// Mutable access to the body, cloning it first when it is shared.
    pub fn make_mut(&mut self) -> &mut T {
        if Arc::get_mut(&mut self.body).is_none() {
            trace!(class = self.body.body_name(), "copy-on-write detach");
            self.body = self.body.clone_shared();
        }
        match Arc::get_mut(&mut self.body) {
            Some(body) => body,
            None => unreachable!("freshly cloned body is uniquely owned"),
        }
    }

    /// Returns whether another handle references the same body.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.body) > 1
    }

    /// Returns whether both handles reference the same body.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }

    /// Stable identity of the body while it is alive.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.body) as *const () as usize
    }
}

impl<T: ?Sized + SharedBody> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            body: Arc::clone(&self.body),
        }
    }
}
