#![cfg(test)]

// Property tests for LinearPtr kept inside the crate. A fixed set of
// handles is driven through random acquire/transfer/reset sequences and
// compared against an ordered-chain model after every operation: owner
// identity (the model's chain head), value visibility, and release counts
// must all agree.

use crate::LinearPtr;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};
use std::sync::Arc;

const H: usize = 6;

#[derive(Clone, Debug)]
enum Op {
    Acquire(usize),
    Transfer(usize, usize),
    Reset(usize),
}

prop_compose! {
    fn arb_ops()(ops in proptest::collection::vec(
        prop_oneof![
            (0..H).prop_map(Op::Acquire),
            ((0..H), (0..H)).prop_map(|(d, s)| Op::Transfer(d, s)),
            (0..H).prop_map(Op::Reset),
        ], 1..200)) -> Vec<Op> { ops }
}

/// Model: one chain per acquisition, members listed head first. The head
/// of a non-empty chain is the owner.
struct Model {
    chains: Vec<Vec<usize>>,
    membership: Vec<Option<usize>>,
    released: Vec<bool>,
}

impl Model {
    fn new() -> Self {
        Self {
            chains: Vec::new(),
            membership: vec![None; H],
            released: Vec::new(),
        }
    }

    fn relinquish(&mut self, i: usize) {
        if let Some(g) = self.membership[i].take() {
            let pos = self.chains[g]
                .iter()
                .position(|&m| m == i)
                .expect("member listed in its chain");
            self.chains[g].remove(pos);
            if pos == 0 && self.chains[g].is_empty() {
                self.released[g] = true;
            }
        }
    }

    fn acquire(&mut self, i: usize) -> usize {
        self.relinquish(i);
        let g = self.chains.len();
        self.chains.push(vec![i]);
        self.released.push(false);
        self.membership[i] = Some(g);
        g
    }

    fn transfer(&mut self, dest: usize, source: usize) {
        self.relinquish(dest);
        if let Some(g) = self.membership[source] {
            let pos = self.chains[g]
                .iter()
                .position(|&m| m == source)
                .expect("member listed in its chain");
            self.chains[g].insert(pos, dest);
            self.membership[dest] = Some(g);
        }
    }

    fn owner_of(&self, i: usize) -> bool {
        match self.membership[i] {
            Some(g) => self.chains[g].first() == Some(&i),
            None => false,
        }
    }
}

fn pair_mut<T>(v: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j);
    if i < j {
        let (a, b) = v.split_at_mut(j);
        (&mut a[i], &mut b[0])
    } else {
        let (a, b) = v.split_at_mut(i);
        (&mut b[0], &mut a[j])
    }
}

fn check(
    sut: &[LinearPtr<usize>],
    model: &Model,
    counters: &[Arc<AtomicUsize>],
) -> Result<(), TestCaseError> {
    for i in 0..H {
        let expect = model.owner_of(i);
        prop_assert_eq!(sut[i].is_owner(), expect, "handle {} owner mismatch", i);
        if expect {
            let g = model.membership[i].expect("owner is a member");
            prop_assert_eq!(sut[i].get().copied(), Ok(g), "handle {} value mismatch", i);
        } else {
            prop_assert!(sut[i].get().is_err(), "non-owner {} must not read", i);
        }
    }
    for (g, counter) in counters.iter().enumerate() {
        prop_assert_eq!(
            counter.load(Relaxed),
            model.released[g] as usize,
            "release count mismatch for group {}",
            g
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_single_owner_and_single_release(ops in arb_ops()) {
        let mut sut: Vec<LinearPtr<usize>> = (0..H).map(|_| LinearPtr::empty()).collect();
        let mut model = Model::new();
        let mut counters: Vec<Arc<AtomicUsize>> = Vec::new();

        for op in ops {
            match op {
                Op::Acquire(i) => {
                    let g = model.acquire(i);
                    let counter = Arc::new(AtomicUsize::new(0));
                    let c = counter.clone();
                    counters.push(counter);
                    let mut fresh = LinearPtr::with_deleter(g, move |_| {
                        c.fetch_add(1, Relaxed);
                    });
                    // Assigning over the old handle relinquishes it first.
                    std::mem::swap(&mut sut[i], &mut fresh);
                    drop(fresh);
                }
                Op::Transfer(d, s) => {
                    if d == s {
                        continue;
                    }
                    let (dest, source) = pair_mut(&mut sut, d, s);
                    dest.transfer_from(source);
                    model.transfer(d, s);
                }
                Op::Reset(i) => {
                    sut[i].reset();
                    model.relinquish(i);
                }
            }

            check(&sut, &model, &counters)?;
        }

        // Relinquishing every handle must fire each group's release action
        // exactly once, in any order.
        for i in 0..H {
            sut[i].reset();
            model.relinquish(i);
            check(&sut, &model, &counters)?;
        }
        for counter in &counters {
            prop_assert_eq!(counter.load(Relaxed), 1);
        }
    }
}
