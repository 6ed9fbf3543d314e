//! linear-ptr: a pointer with linear ownership semantics. Any number of
//! aliasing handles may trace to one heap resource, but exactly one handle
//! at a time is the live owner allowed to access and eventually release it.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build `LinearPtr` in small, verifiable layers so each piece can
//!   be reasoned about independently.
//! - Layers:
//!   - Chain: structural doubly linked list of sibling nodes stored in a
//!     slotmap arena; links are stable generational keys, never addresses,
//!     so arena relocation cannot dangle them. Knows nothing about the
//!     resource. Safe Rust only.
//!   - ReleaseState: per-group shared state holding the resource pointer,
//!     the type-erased release action, the lock-free owner word, and the
//!     mutex that serializes structural operations. All raw-pointer
//!     handling is confined here.
//!   - LinearPtr<T>: public handle API (`transfer_from`, `reset`, liveness
//!     test, guarded access).
//!
//! Ownership protocol
//! - Each group of linked handles shares one `ReleaseState`. The owner
//!   word is an atomic holding the node key of the current owner; the
//!   liveness test is a single `Acquire` load and never blocks.
//! - `transfer_from` links the destination immediately before the source
//!   and, when the source was owner, hands it the owner word, all inside
//!   one critical section of the group mutex.
//! - `reset` (also run on drop) unlinks the node; an owner hands the
//!   resource to its next neighbor, and the last member fires the release
//!   action, outside the lock, exactly once.
//! - Consequence of the insertion and migration rules: the owner is always
//!   the chain head, so an owner without a next neighbor is the sole
//!   member. The property tests check this against an ordered model.
//!
//! Constraints
//! - Exactly one live owner per group; the release action fires once.
//! - No reference counting of owners and no `Clone`: every alias comes
//!   into existence through the locked transfer, and transfer takes the
//!   source by `&mut`, so no unlocked duplication path exists.
//! - Structural operations are short bounded critical sections; unrelated
//!   acquisitions have independent states and locks and never contend.
//! - `Send` iff `T: Send`, `Sync` iff `T: Send + Sync` (mutex-like
//!   bounds). Owning constructors need `T: Send + 'static` because the
//!   release action is a type-erased `Send` closure that may fire on any
//!   thread.
//!
//! Why this split?
//! - Localize invariants: the chain layer is plain safe list surgery, the
//!   state layer owns the two `unsafe` blocks with one-line safety
//!   arguments, and the handle layer is protocol only.
//! - Clear failure boundaries: no user code ever runs while the group
//!   lock is held; deleters fire after the structure is consistent.
//!
//! Memory vs. resource lifetime
//! - The state's memory is managed by `Arc`; the resource's release is
//!   governed strictly by the chain protocol. A `Drop` backstop on the
//!   state fires a still-stored action, mirroring the terminal relinquish.
//!
//! Notes and non-goals
//! - Misuse (dereferencing a non-owner) surfaces as `AccessViolation` from
//!   `get`/`get_mut` and as a panic from `Deref`/`DerefMut`.
//! - No weak handles, no cycle detection, no cross-process sharing.
//! - Public API surface is `LinearPtr` and `AccessViolation`; the lower
//!   layers are implementation details.

mod chain;
mod linear_ptr;
mod linear_ptr_proptest;
mod release_state;

// Public surface
pub use linear_ptr::{AccessViolation, LinearPtr};
