// Concurrent properties: structural operations from many threads on one
// group must keep exactly one live owner and fire the release action
// exactly once.

use linear_ptr::LinearPtr;
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};
use std::sync::Arc;
use std::thread;

fn counted(value: usize) -> (LinearPtr<usize>, Arc<AtomicUsize>) {
    let releases = Arc::new(AtomicUsize::new(0));
    let r = releases.clone();
    let ptr = LinearPtr::with_deleter(value, move |_| {
        r.fetch_add(1, Relaxed);
    });
    (ptr, releases)
}

#[test]
fn handles_are_send_and_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<LinearPtr<usize>>();
    assert_sync::<LinearPtr<usize>>();
}

// The classic demonstration scenario as a test: five siblings take turns
// bumping the value and relinquishing until ownership migrates back to x.
#[test]
fn parallel_rounds_return_ownership_to_x() {
    let (mut x, releases) = counted(1);
    let mut ys: Vec<LinearPtr<usize>> = (0..5).map(|_| LinearPtr::empty()).collect();
    for y in &mut ys {
        y.transfer_from(&mut x);
    }
    assert!(!x.is_owner());
    assert!(ys[0].is_owner());

    let mut rounds = 0;
    while !x.is_owner() {
        rounds += 1;
        assert!(rounds <= 5, "each round relinquishes at least one sibling");
        thread::scope(|s| {
            for y in &mut ys {
                s.spawn(move || {
                    let bumped = match y.get_mut() {
                        Ok(v) => {
                            *v += 1;
                            true
                        }
                        Err(_) => false,
                    };
                    if bumped {
                        y.reset();
                    }
                });
            }
        });
    }

    // Every sibling bumped exactly once before handing the resource on.
    assert_eq!(*x, 6);
    assert!(ys.iter().all(|y| !y.is_owner()));
    assert_eq!(releases.load(Relaxed), 0);
    x.reset();
    assert_eq!(releases.load(Relaxed), 1);
}

#[test]
fn concurrent_relinquish_releases_once() {
    for _ in 0..50 {
        let (mut x, releases) = counted(0);
        let mut hs: Vec<LinearPtr<usize>> = (0..8).map(|_| LinearPtr::empty()).collect();
        for h in &mut hs {
            h.transfer_from(&mut x);
        }
        // x is a non-owning tail; relinquishing it only unlinks.
        x.reset();
        assert!(hs[0].is_owner());

        thread::scope(|s| {
            for h in &mut hs {
                s.spawn(move || h.reset());
            }
        });

        assert_eq!(releases.load(Relaxed), 1);
        assert!(hs.iter().all(|h| !h.is_owner()));
    }
}

// Random interleaving of transfers and relinquishes across threads sharing
// one acquisition: the release action never fires while x keeps the chain
// alive, and afterwards exactly one handle is the owner.
#[test]
fn stress_transfer_reset_keeps_single_owner() {
    const THREADS: usize = 4;
    const ITERS: usize = 250;

    for _ in 0..20 {
        let (mut x, releases) = counted(0);
        let mut seats: Vec<LinearPtr<usize>> = (0..THREADS).map(|_| LinearPtr::empty()).collect();
        for seat in &mut seats {
            seat.transfer_from(&mut x);
        }

        thread::scope(|s| {
            for seat in &mut seats {
                s.spawn(move || {
                    let mut scratch: LinearPtr<usize> = LinearPtr::empty();
                    for _ in 0..ITERS {
                        scratch.transfer_from(seat);
                        seat.transfer_from(&mut scratch);
                    }
                });
            }
        });

        assert_eq!(releases.load(Relaxed), 0, "x still holds the chain open");
        let owners =
            seats.iter().filter(|h| h.is_owner()).count() + usize::from(x.is_owner());
        assert_eq!(owners, 1);

        for seat in &mut seats {
            seat.reset();
        }
        x.reset();
        assert_eq!(releases.load(Relaxed), 1);
    }
}

// Ownership handed over between threads: the receiving thread must see the
// owner's writes.
#[test]
fn migration_publishes_writes_across_threads() {
    for _ in 0..100 {
        let (mut x, releases) = counted(1);
        let mut y: LinearPtr<usize> = LinearPtr::empty();
        y.transfer_from(&mut x);

        thread::scope(|s| {
            s.spawn(|| {
                *y.get_mut().expect("y starts as owner") = 41;
                // Migrates ownership to the only neighbor, x.
                y.reset();
            });
            s.spawn(|| {
                // Spin until the migration lands; is_owner never blocks.
                while !x.is_owner() {
                    std::hint::spin_loop();
                }
                *x.get_mut().expect("owner after migration") += 1;
            });
        });

        assert_eq!(*x, 42);
        x.reset();
        assert_eq!(releases.load(Relaxed), 1);
    }
}
