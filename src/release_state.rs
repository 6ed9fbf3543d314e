//! ReleaseState: the per-group shared state.
//!
//! Holds the resource pointer, the type-erased release action, the owner
//! word read by lock-free liveness checks, and the mutex that serializes
//! every structural change to the group's chain. Each acquisition gets its
//! own state and its own lock, so unrelated handles never contend.
//!
//! All raw-pointer handling in the crate is confined to this module.

use crate::chain::{Chain, NodeKey};
use slotmap::Key;
use std::ptr::NonNull;
use std::sync::atomic::{
    AtomicU64,
    Ordering::{Acquire, Release},
};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Pointer carried into the release closure. The constructor's `T: Send`
/// bound is what actually licenses moving the resource across threads.
struct RawResource<T>(NonNull<T>);

unsafe impl<T: Send> Send for RawResource<T> {}

/// Type-erased, zero-argument release action capturing the resource
/// pointer and its deleter.
pub(crate) struct ReleaseAction {
    run: Box<dyn FnOnce() + Send>,
}

impl ReleaseAction {
    /// Fire the stored deleter. At-most-once is enforced by the caller's
    /// protocol: the action is `take`n out of `Links` under the group lock.
    pub(crate) fn invoke(self) {
        (self.run)()
    }
}

/// Chain structure plus the not-yet-fired release action, both guarded by
/// the group mutex.
pub(crate) struct Links {
    pub(crate) chain: Chain,
    pub(crate) action: Option<ReleaseAction>,
}

pub(crate) struct ReleaseState<T> {
    resource: NonNull<T>,
    /// `NodeKey` bits of the current owner, or the null key once the
    /// resource has been released. Written only while `links` is locked.
    owner: AtomicU64,
    links: Mutex<Links>,
}

impl<T> ReleaseState<T> {
    /// Heap-allocate `value`, wrap it with `deleter` into the release
    /// action, and build the group state with `owner` as the sole member
    /// of `chain`.
    pub(crate) fn new(
        value: T,
        deleter: impl FnOnce(Box<T>) + Send + 'static,
        chain: Chain,
        owner: NodeKey,
    ) -> Self
    where
        T: Send + 'static,
    {
        let resource = NonNull::from(Box::leak(Box::new(value)));
        let raw = RawResource(resource);
        let run = Box::new(move || {
            // Capture the whole `RawResource` wrapper (whose `Send` impl
            // licenses the move), not just its `NonNull` field.
            let raw = raw;
            // SAFETY: the pointer came from `Box::into_raw` above and the
            // action runs at most once, so the box is rebuilt exactly once.
            let boxed = unsafe { Box::from_raw(raw.0.as_ptr()) };
            deleter(boxed);
        });
        Self {
            resource,
            owner: AtomicU64::new(owner.data().as_ffi()),
            links: Mutex::new(Links {
                chain,
                action: Some(ReleaseAction { run }),
            }),
        }
    }

    /// Lock-free check whether `key` is the current owner.
    pub(crate) fn is_owner(&self, key: NodeKey) -> bool {
        self.owner.load(Acquire) == key.data().as_ffi()
    }

    /// Record `key` as the owner. Callers hold the group lock.
    pub(crate) fn set_owner(&self, key: NodeKey) {
        self.owner.store(key.data().as_ffi(), Release);
    }

    /// Clear the owner word ahead of the terminal release. Callers hold
    /// the group lock.
    pub(crate) fn clear_owner(&self) {
        self.owner.store(NodeKey::null().data().as_ffi(), Release);
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Links> {
        // The critical sections run no user code, so a poisoned lock can
        // only follow a panic in this crate's own structural code; the
        // structure is consistent whenever the lock is released.
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The resource pointer. Valid until the release action has fired,
    /// which cannot happen while any chain membership remains.
    pub(crate) fn resource(&self) -> NonNull<T> {
        self.resource
    }
}

impl<T> Drop for ReleaseState<T> {
    fn drop(&mut self) {
        // Backstop mirroring the terminal relinquish: if the state goes
        // away with the action still stored, fire it now.
        let links = self.links.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(action) = links.action.take() {
            action.invoke();
        }
    }
}
