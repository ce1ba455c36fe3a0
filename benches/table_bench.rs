use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rhmap::HashTable;

const ITER: u64 = 16 * 1024;

fn keys(n: u64) -> Vec<Box<[u8]>> {
    (0..n)
        .map(|i| i.to_string().into_bytes().into_boxed_slice())
        .collect()
}

fn task_insert(keys: &[Box<[u8]>]) -> HashTable<'_, u32> {
    let mut table = HashTable::new(4).unwrap();
    for (i, key) in keys.iter().enumerate() {
        table.insert(None, key, i as u32).unwrap();
    }
    table
}

fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("HashTable/insert");
    group.throughput(Throughput::Elements(ITER));
    let keys = keys(ITER);
    group.bench_function(BenchmarkId::from_parameter(ITER), |bencher| {
        bencher.iter(|| task_insert(&keys));
    });
    group.finish();
}

fn task_get(table: &HashTable<'_, u32>, keys: &[Box<[u8]>]) {
    for key in keys {
        table.get(None, key).unwrap();
    }
}

fn get_already_present(c: &mut Criterion) {
    let mut group = c.benchmark_group("HashTable/get_already_present");
    group.throughput(Throughput::Elements(ITER));
    let keys = keys(ITER);
    let table = task_insert(&keys);
    group.bench_function(BenchmarkId::from_parameter(ITER), |bencher| {
        bencher.iter(|| task_get(&table, &keys));
    });
    group.finish();
}

fn task_remove_all(keys: &[Box<[u8]>]) {
    let mut table = task_insert(keys);
    for key in keys {
        table.remove(None, key).unwrap();
    }
}

fn remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("HashTable/remove");
    group.throughput(Throughput::Elements(ITER));
    let keys = keys(ITER);
    group.bench_function(BenchmarkId::from_parameter(ITER), |bencher| {
        bencher.iter(|| task_remove_all(&keys));
    });
    group.finish();
}

fn task_iterate(table: &HashTable<'_, u32>) -> usize {
    table.iter().count()
}

fn iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("HashTable/iterate");
    group.throughput(Throughput::Elements(ITER));
    let keys = keys(ITER);
    let table = task_insert(&keys);
    group.bench_function(BenchmarkId::from_parameter(ITER), |bencher| {
        bencher.iter(|| task_iterate(&table));
    });
    group.finish();
}

criterion_group!(benches, insert, get_already_present, remove, iterate);
criterion_main!(benches);
