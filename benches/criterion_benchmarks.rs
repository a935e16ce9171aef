use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ictl::compress::{self, Algorithm, Compression, Scratch};
use ictl::{BufferPool, Endpoint, EndpointConfig};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fs;
use std::path::Path;

const PAYLOAD: usize = 1024;

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut out = vec![0u8; size];
    StdRng::seed_from_u64(seed).fill_bytes(&mut out);
    out
}

fn mutate(base: &[u8], stride: usize, round: u8) -> Vec<u8> {
    let mut out = base.to_vec();
    for i in (0..out.len()).step_by(stride.max(1)) {
        out[i] = out[i].wrapping_add(round);
    }
    out
}

/// Payload sequences: fresh random data every frame, or the same bytes again.
fn workloads() -> [(&'static str, Vec<Vec<u8>>); 3] {
    let base = gen_data(PAYLOAD, 1);
    [
        ("random", (0..16).map(|i| gen_data(PAYLOAD, 100 + i)).collect()),
        ("identical", (0..16).map(|_| base.clone()).collect()),
        ("sparse_updates", (1..=16).map(|i| mutate(&base, 64, i)).collect()),
    ]
}

fn compressions() -> [(&'static str, Compression); 2] {
    [
        ("auto", Compression::Auto),
        ("flate", Compression::Fixed(Algorithm::Flate)),
    ]
}

fn write_ratio_snapshot() {
    let mut csv = String::from("workload,compression,payload_bytes,packet_bytes,ratio\n");
    for (workload, frames) in workloads() {
        for (name, compression) in compressions() {
            let endpoint = Endpoint::new(EndpointConfig::new().with_compression(compression)).unwrap();
            let mut packet_bytes = 0usize;
            let payload_bytes: usize = frames.iter().map(Vec::len).sum();
            for frame in &frames {
                packet_bytes += endpoint.encode("bench", frame, 0).unwrap().len();
            }
            let ratio = packet_bytes as f64 / payload_bytes as f64;
            csv.push_str(&format!("{workload},{name},{payload_bytes},{packet_bytes},{ratio}\n"));
        }
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_encode_stream(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("encode_stream");
    for (workload, frames) in workloads() {
        let bytes: usize = frames.iter().map(Vec::len).sum();
        g.throughput(Throughput::Bytes(bytes as u64));
        for (name, compression) in compressions() {
            let config = EndpointConfig::new().with_compression(compression);
            g.bench_with_input(
                BenchmarkId::new(workload, name),
                &frames,
                |b, frames| {
                    b.iter(|| {
                        let endpoint = Endpoint::new(config.clone()).unwrap();
                        for frame in frames {
                            black_box(endpoint.encode("bench", black_box(frame), 0).unwrap());
                        }
                    });
                },
            );
        }
    }
    g.finish();
}

fn bench_decode_stream(c: &mut Criterion) {
    let mut g = c.benchmark_group("decode_stream");
    for (workload, frames) in workloads() {
        let sender = Endpoint::new(EndpointConfig::default()).unwrap();
        let packets: Vec<Vec<u8>> = frames
            .iter()
            .map(|f| sender.encode("bench", f, 0).unwrap().as_bytes().to_vec())
            .collect();
        let bytes: usize = frames.iter().map(Vec::len).sum();
        g.throughput(Throughput::Bytes(bytes as u64));
        g.bench_with_input(BenchmarkId::from_parameter(workload), &packets, |b, packets| {
            b.iter(|| {
                let receiver = Endpoint::new(EndpointConfig::default()).unwrap();
                for packet in packets {
                    black_box(receiver.decode("bench", black_box(packet)).unwrap());
                }
            });
        });
    }
    g.finish();
}

fn bench_best_fit(c: &mut Criterion) {
    let mut g = c.benchmark_group("best_fit_vs_size");
    for size in [128usize, 512, 1375] {
        let data = mutate(&vec![0u8; size], 16, 3);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            let mut scratch = Scratch::new();
            b.iter(|| {
                let best = compress::best_fit(black_box(data), 0, &mut scratch).unwrap();
                black_box(best.bytes.len());
            });
        });
    }
    g.finish();
}

fn bench_xor(c: &mut Criterion) {
    let mut g = c.benchmark_group("xor");
    let pool = BufferPool::new(PAYLOAD);
    let a = gen_data(PAYLOAD, 5);
    let b_data = mutate(&a, 32, 1);
    g.throughput(Throughput::Bytes(PAYLOAD as u64));
    g.bench_function("xor_1k", |b| {
        let mut out = pool.acquire();
        b.iter(|| {
            ictl::xor::xor(black_box(&a), black_box(&b_data), &mut out).unwrap();
            black_box(out.len());
        });
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_encode_stream,
    bench_decode_stream,
    bench_best_fit,
    bench_xor
);
criterion_main!(benches);
