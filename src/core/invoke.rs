// ============================================================================
// observable-map - Invocable Values
// Lets a map double as a table of named functions
// ============================================================================

use std::rc::Rc;

/// A stored value that may be callable with `Args`.
///
/// Returning `None` means "not callable"; dispatch treats that the same as a
/// missing entry.
pub trait Invoke<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Option<Self::Output>;
}

impl<A, R> Invoke<A> for Rc<dyn Fn(A) -> R> {
    type Output = R;

    fn invoke(&self, args: A) -> Option<R> {
        Some(self(args))
    }
}

impl<A, R> Invoke<A> for Box<dyn Fn(A) -> R> {
    type Output = R;

    fn invoke(&self, args: A) -> Option<R> {
        Some(self(args))
    }
}

impl<A, T: Invoke<A>> Invoke<A> for Option<T> {
    type Output = T::Output;

    fn invoke(&self, args: A) -> Option<T::Output> {
        self.as_ref().and_then(|f| f.invoke(args))
    }
}
