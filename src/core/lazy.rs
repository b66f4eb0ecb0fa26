//! core::lazy
//!
//! Memoized field that is computed at most once per owning instance.

/// A value that is either not yet looked up or already resolved.
///
/// Resolution happens through [`Lazy::get_or_resolve`]; once resolved the
/// value is never recomputed for the lifetime of the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Lazy<T> {
    /// Not queried yet.
    #[default]
    Unresolved,
    /// Queried; holds the result (possibly a sentinel).
    Resolved(T),
}

impl<T> Lazy<T> {
    /// Return the resolved value, computing it with `resolve` on first use.
    pub fn get_or_resolve(&mut self, resolve: impl FnOnce() -> T) -> &T {
        if let Lazy::Unresolved = self {
            *self = Lazy::Resolved(resolve());
        }
        match &*self {
            Lazy::Resolved(value) => value,
            Lazy::Unresolved => unreachable!("resolved above"),
        }
    }

    /// Store a value without running a lookup.
    pub fn set(&mut self, value: T) {
        *self = Lazy::Resolved(value);
    }

    /// Get the value if it was already resolved.
    pub fn get(&self) -> Option<&T> {
        match self {
            Lazy::Resolved(value) => Some(value),
            Lazy::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Lazy::Resolved(_))
    }
}
