//! Demonstration: one resource, five extra handles, rounds of parallel
//! increment-and-relinquish until ownership migrates back to `x`.
//!
//! A pure consumer of the public `LinearPtr` surface.

use linear_ptr::LinearPtr;
use std::thread;

fn show(name: &str, h: &LinearPtr<i32>) {
    match h.get() {
        Ok(v) => println!("{name}: {v}"),
        Err(_) => println!("{name}: nup"),
    }
}

fn main() {
    let mut x = LinearPtr::new(1);
    show("x", &x);

    let mut ys: Vec<LinearPtr<i32>> = (0..5).map(|_| LinearPtr::empty()).collect();
    for y in &mut ys {
        y.transfer_from(&mut x);
    }

    let mut round = 1;
    while !x.is_owner() {
        println!("round {round}");
        round += 1;

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

        for (i, y) in ys.iter().enumerate() {
            show(&format!("y[{i}]"), y);
        }
    }

    show("x", &x);
}
