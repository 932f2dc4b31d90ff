use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hyperloom::concurrency::worklist::Bag;

fn bench_bag_single_threaded_push_pop(c: &mut Criterion) {
    c.bench_function("bag_push_pop_1000_single_thread", |b| {
        b.iter(|| {
            let bag: Bag<u32> = Bag::new(1, 64, 1 << 16);
            for i in 0..1000u32 {
                bag.add(black_box(i));
            }
            while let Some(item) = bag.remove() {
                black_box(item);
            }
        });
    });
}

fn bench_bag_contended_push(c: &mut Criterion) {
    c.bench_function("bag_push_8_threads_contended", |b| {
        b.iter(|| {
            let bag = std::sync::Arc::new(Bag::<u32>::new(8, 64, 1 << 16));
            std::thread::scope(|scope| {
                for t in 0..8u32 {
                    let bag = std::sync::Arc::clone(&bag);
                    scope.spawn(move || {
                        for i in 0..500 {
                            bag.add(black_box(t * 500 + i));
                        }
                    });
                }
            });
            black_box(bag.size())
        });
    });
}

fn bench_bag_take_elements(c: &mut Criterion) {
    c.bench_function("bag_take_elements_batches_of_64", |b| {
        b.iter(|| {
            let bag: Bag<u32> = Bag::new(1, 64, 1 << 16);
            for i in 0..10_000u32 {
                bag.add(i);
            }
            let mut drained = 0;
            loop {
                let batch = bag.take_elements(64);
                if batch.is_empty() {
                    break;
                }
                drained += batch.len();
            }
            black_box(drained)
        });
    });
}

criterion_group!(
    benches,
    bench_bag_single_threaded_push_pop,
    bench_bag_contended_push,
    bench_bag_take_elements
);
criterion_main!(benches);
