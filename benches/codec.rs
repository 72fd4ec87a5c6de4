use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use std::io::{Read, Write};

use lzstream::{Decoder, Encoder};

fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut enc = Encoder::new(&mut out);
    enc.write_all(data).unwrap();
    enc.flush().unwrap();
    out
}

fn decompress(data: &[u8]) -> Vec<u8> {
    let mut dec = Decoder::new(data);
    let mut out = Vec::new();
    dec.read_to_end(&mut out).unwrap();
    out
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut data = vec![0u8; 1_000_000];
    thread_rng().fill(&mut data[200_000..600_000]); // mixed compressible/incompressible

    let compressed = compress(&data);

    let mut group = c.benchmark_group("lzstream");
    group.bench_function("compress mixed 1MB", |b| b.iter(|| compress(black_box(&data))));
    group.bench_function("decompress mixed 1MB", |b| {
        b.iter(|| decompress(black_box(&compressed)))
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
