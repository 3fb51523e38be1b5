//! Benchmarks comparing each available codec with the external base64 crate.

use base64_external::{engine::general_purpose::STANDARD, Engine};
use base64_kernels::{codecs, decoded_len, encoded_len};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

/// Sample data sizes for benchmarking
const SIZES: &[usize] = &[16, 64, 256, 1024, 4096, 16384];

fn generate_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for &size in SIZES {
        let data = generate_data(size);
        let mut out = vec![0u8; encoded_len(size)];
        group.throughput(Throughput::Bytes(size as u64));

        for codec in codecs().iter().filter(|c| c.is_available()) {
            group.bench_with_input(BenchmarkId::new(codec.name(), size), &data, |b, data| {
                b.iter(|| codec.encode(black_box(data), black_box(&mut out)))
            });
        }

        group.bench_with_input(BenchmarkId::new("base64_crate", size), &data, |b, data| {
            b.iter(|| STANDARD.encode_slice(black_box(data), black_box(&mut out)))
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for &size in SIZES {
        let encoded = STANDARD.encode(generate_data(size));
        let mut out = vec![0u8; decoded_len(encoded.len())];
        group.throughput(Throughput::Bytes(size as u64));

        for codec in codecs().iter().filter(|c| c.is_available()) {
            group.bench_with_input(
                BenchmarkId::new(codec.name(), size),
                encoded.as_bytes(),
                |b, encoded| b.iter(|| codec.decode(black_box(encoded), black_box(&mut out))),
            );
        }

        group.bench_with_input(
            BenchmarkId::new("base64_crate", size),
            encoded.as_bytes(),
            |b, encoded| b.iter(|| STANDARD.decode_slice(black_box(encoded), black_box(&mut out))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
