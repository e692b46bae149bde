//! Arena allocator for AST nodes.
//!
//! Every node of one parse lives in a single `bumpalo` arena and borrows the
//! arena's lifetime, so the whole tree is dropped at once.

use bumpalo::Bump;
use std::cell::UnsafeCell;

/// Bump arena owning the nodes of one parsed program.
///
/// SAFETY: single-threaded (UnsafeCell). Allocation never moves or frees
/// earlier values, so handing out shared references while allocating is
/// sound as long as `reset` (which needs `&mut self`) is not reachable.
pub struct Arena {
    inner: UnsafeCell<Bump>,
}

impl Arena {
    pub fn new() -> Self {
        Arena {
            inner: UnsafeCell::new(Bump::new()),
        }
    }

    /// Create an arena with a first chunk of `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Arena {
            inner: UnsafeCell::new(Bump::with_capacity(bytes)),
        }
    }

    /// Allocate a value in the arena.
    pub fn alloc<T>(&self, value: T) -> &T {
        unsafe { (*self.inner.get()).alloc(value) }
    }

    /// Allocate a string in the arena.
    pub fn alloc_str(&self, s: &str) -> &str {
        unsafe { (*self.inner.get()).alloc_str(s) }
    }

    /// Allocate a vector of non-Copy items as a slice.
    pub fn alloc_slice_vec<T>(&self, vec: Vec<T>) -> &[T] {
        let bump = unsafe { &*self.inner.get() };
        bump.alloc_slice_fill_iter(vec)
    }

    /// Allocate any exact-size iterator of items as a slice.
    pub fn alloc_slice_iter<T, I>(&self, iter: I) -> &[T]
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let bump = unsafe { &*self.inner.get() };
        bump.alloc_slice_fill_iter(iter)
    }

    /// Bytes handed out so far (for benchmarks and diagnostics).
    pub fn allocated_bytes(&self) -> usize {
        unsafe { (*self.inner.get()).allocated_bytes() }
    }

    /// Free every node so the arena can parse another program.
    pub fn reset(&mut self) {
        self.inner.get_mut().reset();
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_alloc() {
        let arena = Arena::new();
        let val = arena.alloc(42);
        assert_eq!(*val, 42);
    }

    #[test]
    fn test_arena_slices_keep_order() {
        let arena = Arena::new();
        let values = arena.alloc_slice_vec(vec![String::from("a"), String::from("b")]);
        assert_eq!(values, ["a", "b"]);
        let squares = arena.alloc_slice_iter((1..4).map(|n| n * n));
        assert_eq!(squares, [1, 4, 9]);
    }

    #[test]
    fn test_reset_frees_nodes() {
        let mut arena = Arena::new();
        arena.alloc_str("some text");
        arena.reset();
        let again = arena.alloc_str("x");
        assert_eq!(again, "x");
    }
}
