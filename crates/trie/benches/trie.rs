use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hexary_trie::{InMemoryTrieDB, Trie};
use rand::Rng;
use std::hint::black_box;

fn random_entries(count: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let mut key = vec![0u8; 32];
            let mut value = vec![0u8; 64];
            rng.fill(&mut key[..]);
            rng.fill(&mut value[..]);
            (key, value)
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("trie_insert");

    for size in [100usize, 1000] {
        let entries = random_entries(size);
        group.bench_function(BenchmarkId::new("insert_and_hash", size), |b| {
            b.iter(|| {
                let mut trie = Trie::new(Box::new(InMemoryTrieDB::new_empty()));
                for (key, value) in &entries {
                    trie.insert(key.clone(), value.clone()).unwrap();
                }
                black_box(trie.hash_no_commit())
            })
        });
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("trie_get");

    let entries = random_entries(1000);
    let mut trie = Trie::new(Box::new(InMemoryTrieDB::new_empty()));
    for (key, value) in &entries {
        trie.insert(key.clone(), value.clone()).unwrap();
    }
    group.bench_function(BenchmarkId::new("get", 1000), |b| {
        b.iter(|| {
            for (key, _) in &entries {
                black_box(trie.get(key).unwrap());
            }
        })
    });

    group.finish();
}

fn bench_proof(c: &mut Criterion) {
    let mut group = c.benchmark_group("trie_proof");

    let entries = random_entries(1000);
    let mut trie = Trie::new(Box::new(InMemoryTrieDB::new_empty()));
    for (key, value) in &entries {
        trie.insert(key.clone(), value.clone()).unwrap();
    }
    let root = trie.hash_no_commit();
    let (key, value) = entries[0].clone();
    let proof = trie.get_proof(&key).unwrap();

    group.bench_function("generate", |b| {
        b.iter(|| black_box(trie.get_proof(&key).unwrap()))
    });
    group.bench_function("verify", |b| {
        b.iter(|| black_box(hexary_trie::verify_proof(root, &key, &proof, Some(&value))))
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_get, bench_proof);
criterion_main!(benches);
