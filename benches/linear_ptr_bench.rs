use criterion::{criterion_group, criterion_main, Criterion};
use linear_ptr::LinearPtr;
use std::hint::black_box;

fn bench_transfer_chain(c: &mut Criterion) {
    c.bench_function("build_and_drain_chain_64", |b| {
        b.iter(|| {
            let mut x = LinearPtr::new(0u64);
            let mut hs: Vec<LinearPtr<u64>> = (0..64).map(|_| LinearPtr::empty()).collect();
            for h in &mut hs {
                h.transfer_from(&mut x);
            }
            for h in &mut hs {
                h.reset();
            }
            x.reset();
        })
    });
}

fn bench_transfer_pair(c: &mut Criterion) {
    c.bench_function("transfer_ping_pong", |b| {
        let mut a = LinearPtr::new(0u64);
        let mut s = LinearPtr::empty();
        b.iter(|| {
            s.transfer_from(&mut a);
            a.transfer_from(&mut s);
        });
    });
}

fn bench_is_owner(c: &mut Criterion) {
    let h = LinearPtr::new(7u32);
    c.bench_function("is_owner", |b| b.iter(|| black_box(&h).is_owner()));
}

criterion_group!(
    benches,
    bench_transfer_chain,
    bench_transfer_pair,
    bench_is_owner
);
criterion_main!(benches);
