use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hexary_rlp::{
    decode::RLPDecode,
    encode::RLPEncode,
    item::RLPItem,
};
use rand::Rng;
use std::hint::black_box;

fn bench_decode_scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_scalars");

    let encoded: Vec<Vec<u8>> = (0..1000)
        .map(|_| rand::random::<u64>().encode_to_vec())
        .collect();
    group.bench_function(BenchmarkId::new("u64", 1000), |b| {
        b.iter(|| {
            for data in &encoded {
                black_box(u64::decode(data).unwrap());
            }
        })
    });

    group.finish();
}

fn bench_decode_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_items");

    for size in [32usize, 256, 4096] {
        let mut data = vec![0u8; size];
        rand::thread_rng().fill(&mut data[..]);
        let encoded = data.as_slice().encode_to_vec();
        group.bench_function(BenchmarkId::new("bytes", size), |b| {
            b.iter(|| black_box(RLPItem::decode(&encoded).unwrap()))
        });
    }

    let item = RLPItem::list(
        (0..256)
            .map(|i: u32| RLPItem::bytes(i.to_be_bytes().to_vec()))
            .collect::<Vec<_>>(),
    );
    let encoded = item.encode_to_vec();
    group.bench_function("flat_list_256", |b| {
        b.iter(|| black_box(RLPItem::decode(&encoded).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_decode_scalars, bench_decode_items);
criterion_main!(benches);
