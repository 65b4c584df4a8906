use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hexary_rlp::{encode::RLPEncode, item::RLPItem};
use rand::Rng;
use std::hint::black_box;

fn bench_encode_scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_scalars");

    let values: Vec<u64> = (0..1000).map(|_| rand::random()).collect();
    group.bench_function(BenchmarkId::new("u64", 1000), |b| {
        b.iter(|| {
            for value in &values {
                black_box(value.encode_to_vec());
            }
        })
    });

    group.finish();
}

fn bench_encode_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_bytes");

    for size in [32usize, 256, 4096] {
        let mut data = vec![0u8; size];
        rand::thread_rng().fill(&mut data[..]);
        group.bench_function(BenchmarkId::new("bytes", size), |b| {
            b.iter(|| black_box(data.as_slice().encode_to_vec()))
        });
    }

    group.finish();
}

fn bench_encode_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_items");

    let item = RLPItem::list(
        (0..256)
            .map(|i: u32| RLPItem::bytes(i.to_be_bytes().to_vec()))
            .collect::<Vec<_>>(),
    );
    group.bench_function("flat_list_256", |b| {
        b.iter(|| black_box(item.encode_to_vec()))
    });

    let mut nested = RLPItem::bytes(b"leaf".to_vec());
    for _ in 0..64 {
        nested = RLPItem::list(vec![nested]);
    }
    group.bench_function("nested_64", |b| {
        b.iter(|| black_box(nested.encode_to_vec()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_scalars,
    bench_encode_bytes,
    bench_encode_items
);
criterion_main!(benches);
