//! LinearPtr: the public handle API over the chain and release-state
//! layers.

use crate::chain::{Chain, NodeKey};
use crate::release_state::ReleaseState;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Attempted dereference or access through a handle that is not the live
/// owner (or is empty and groupless).
///
/// This is a caller-programming-error condition and is surfaced at the
/// access site: `get`/`get_mut` return it, `Deref`/`DerefMut` panic with
/// its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessViolation;

impl fmt::Display for AccessViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("access violation: handle is not the live owner")
    }
}

impl std::error::Error for AccessViolation {}

struct Membership<T> {
    state: Arc<ReleaseState<T>>,
    key: NodeKey,
}

/// A handle with linear ownership semantics.
///
/// Any number of handles may be linked into one group tracing to a single
/// heap resource, but exactly one of them at a time is the live owner
/// allowed to access it. Ownership moves to a handle through
/// [`transfer_from`](LinearPtr::transfer_from) and migrates to a chain
/// neighbor when the owner is [`reset`](LinearPtr::reset) or dropped; when
/// the last linked handle relinquishes, the resource is released exactly
/// once.
///
/// `Clone` is deliberately not implemented: duplicating a live owner is the
/// one thing the type exists to rule out, and every alias has to come into
/// existence through the locked transfer protocol.
pub struct LinearPtr<T> {
    inner: Option<Membership<T>>,
}

// SAFETY: a handle hands out `&T` only while it is the live owner, and
// ownership can leave a handle only through `&mut` access to it, so access
// to the resource moves between threads strictly through the group mutex
// and the Release/Acquire owner word. The release action is a `Send`
// closure over `T: Send`.
unsafe impl<T: Send> Send for LinearPtr<T> {}

// SAFETY: `&LinearPtr<T>` can produce `&T` (owner reads), so sharing a
// handle across threads shares the resource.
unsafe impl<T: Send + Sync> Sync for LinearPtr<T> {}

impl<T> LinearPtr<T> {
    /// An empty, groupless handle. Its liveness test is false and it is
    /// linked to no siblings.
    pub fn empty() -> Self {
        Self { inner: None }
    }

    /// True iff this handle is the live owner of its group's resource.
    ///
    /// A single atomic read; never blocks. The answer can be stale with
    /// respect to a concurrent transfer, but it always reflects a state
    /// the group really was in.
    pub fn is_owner(&self) -> bool {
        match &self.inner {
            Some(m) => m.state.is_owner(m.key),
            None => false,
        }
    }

    /// Shared access to the resource, if this handle is the live owner.
    pub fn get(&self) -> Result<&T, AccessViolation> {
        let m = self.inner.as_ref().ok_or(AccessViolation)?;
        if !m.state.is_owner(m.key) {
            return Err(AccessViolation);
        }
        // SAFETY: the resource is released only when the last chain member
        // relinquishes, and `self` stays a member for as long as this
        // borrow lives (relinquishing `self` needs `&mut self`).
        Ok(unsafe { m.state.resource().as_ref() })
    }

    /// Exclusive access to the resource, if this handle is the live owner.
    pub fn get_mut(&mut self) -> Result<&mut T, AccessViolation> {
        let m = self.inner.as_ref().ok_or(AccessViolation)?;
        if !m.state.is_owner(m.key) {
            return Err(AccessViolation);
        }
        // SAFETY: as in `get`; additionally, ownership cannot leave `self`
        // while it is exclusively borrowed, and no other handle can pass
        // the owner check, so the resource is not reachable elsewhere.
        Ok(unsafe { &mut *m.state.resource().as_ptr() })
    }

    /// Join `source`'s group and take over its ownership, if any.
    ///
    /// `self` relinquishes whatever it held first. If `source` is empty
    /// and groupless, `self` ends up empty and groupless too. Otherwise
    /// `self` is linked immediately before `source` in the chain and, when
    /// `source` was the live owner, ownership moves to `self` in the same
    /// critical section that links it.
    ///
    /// This is the only way a new alias of a resource comes into
    /// existence; there is no `Clone` and no unlocked path.
    pub fn transfer_from(&mut self, source: &mut LinearPtr<T>) {
        self.reset();
        let Some(src) = source.inner.as_ref() else {
            return;
        };
        let state = Arc::clone(&src.state);
        let key = {
            let mut links = state.lock();
            let key = links.chain.insert_before(src.key);
            if state.is_owner(src.key) {
                state.set_owner(key);
            }
            key
        };
        self.inner = Some(Membership { state, key });
    }

    /// Relinquish: leave the chain, handing ownership to the next sibling
    /// or, when none remains, releasing the resource exactly once.
    ///
    /// A non-owning handle only unlinks itself; the group's single owner
    /// is unaffected. No-op on an empty handle. Dropping a handle does
    /// exactly this.
    pub fn reset(&mut self) {
        let Some(m) = self.inner.take() else {
            return;
        };
        let mut terminal = None;
        {
            let mut links = m.state.lock();
            let was_owner = m.state.is_owner(m.key);
            let removed = links.chain.remove(m.key);
            if was_owner {
                debug_assert!(removed.prev.is_none(), "the owner is always the chain head");
                match removed.next {
                    Some(next) => m.state.set_owner(next),
                    None => {
                        debug_assert!(
                            links.chain.is_empty(),
                            "an owner with no next neighbor is the sole member"
                        );
                        m.state.clear_owner();
                        terminal = links.action.take();
                    }
                }
            }
        }
        // The deleter runs outside the group lock.
        if let Some(action) = terminal {
            action.invoke();
        }
    }
}

impl<T: Send + 'static> LinearPtr<T> {
    /// Acquire `value` on the heap. The new handle is the sole member and
    /// owner of a fresh group; the resource is dropped when released.
    pub fn new(value: T) -> Self {
        Self::with_deleter(value, drop)
    }

    /// Acquire `value` with a custom deleter, which receives the re-boxed
    /// resource when the release action fires.
    pub fn with_deleter(value: T, deleter: impl FnOnce(Box<T>) + Send + 'static) -> Self {
        let (chain, key) = Chain::singleton();
        let state = ReleaseState::new(value, deleter, chain, key);
        Self {
            inner: Some(Membership {
                state: Arc::new(state),
                key,
            }),
        }
    }

    /// Relinquish, then acquire `value` fresh. Always yields a singleton
    /// group, regardless of prior chain membership.
    pub fn reset_to(&mut self, value: T) {
        self.reset();
        *self = Self::new(value);
    }

    /// Relinquish, then acquire `value` fresh with a custom deleter.
    pub fn reset_to_with(&mut self, value: T, deleter: impl FnOnce(Box<T>) + Send + 'static) {
        self.reset();
        *self = Self::with_deleter(value, deleter);
    }
}

impl<T> Default for LinearPtr<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Drop for LinearPtr<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T> Deref for LinearPtr<T> {
    type Target = T;

    /// Panics when `self` is not the live owner.
    fn deref(&self) -> &T {
        match self.get() {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> DerefMut for LinearPtr<T> {
    /// Panics when `self` is not the live owner.
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LinearPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Ok(v) => f.debug_tuple("LinearPtr").field(v).finish(),
            Err(_) if self.inner.is_some() => f.write_str("LinearPtr(<linked, not owner>)"),
            Err(_) => f.write_str("LinearPtr(<empty>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_handle_is_groupless() {
        let h: LinearPtr<i32> = LinearPtr::default();
        assert!(!h.is_owner());
        assert_eq!(h.get(), Err(AccessViolation));
        assert_eq!(format!("{h:?}"), "LinearPtr(<empty>)");
    }

    #[test]
    fn linked_non_owner_debug() {
        let mut x = LinearPtr::new(5);
        let mut y: LinearPtr<i32> = LinearPtr::empty();
        y.transfer_from(&mut x);
        assert_eq!(format!("{x:?}"), "LinearPtr(<linked, not owner>)");
        assert_eq!(format!("{y:?}"), "LinearPtr(5)");
    }
}
