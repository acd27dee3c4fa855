//! Envelope encoding/decoding benchmarks.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use searchproto_protocol::message::{Hit, SearchReply, SearchRequest};
use searchproto_protocol::{
    decode_message, encode_message, CompressionConfig, CompressionType, Envelope,
};

const ALGORITHMS: [CompressionType; 3] = [
    CompressionType::Raw,
    CompressionType::Lz4,
    CompressionType::Zstd,
];

fn create_test_reply(hits: usize) -> SearchReply {
    SearchReply {
        total_hit_count: hits as i64 * 10,
        hits: (0..hits)
            .map(|i| Hit {
                global_id: Bytes::from(vec![(i % 251) as u8; 12]),
                relevance: 1.0 / (i + 1) as f64,
                sort_data: Bytes::from(format!("key-{:08}", i)),
            })
            .collect(),
        ..Default::default()
    }
}

fn create_test_request(query_size: usize) -> SearchRequest {
    SearchRequest {
        hits: 10,
        timeout: 500,
        rank_profile: "default".to_string(),
        query_tree_blob: Bytes::from("x".repeat(query_size)),
        ..Default::default()
    }
}

fn bench_reply_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_encode");

    for algorithm in ALGORITHMS {
        let config = CompressionConfig::new(algorithm);
        for hits in [10, 100, 1000] {
            let reply = create_test_reply(hits);

            group.throughput(Throughput::Elements(hits as u64));
            group.bench_with_input(
                BenchmarkId::new(algorithm.to_string(), hits),
                &reply,
                |b, reply| {
                    b.iter(|| black_box(encode_message(reply, &config).unwrap()));
                },
            );
        }
    }

    group.finish();
}

fn bench_reply_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_decode");

    for algorithm in ALGORITHMS {
        let config = CompressionConfig::new(algorithm);
        for hits in [10, 100, 1000] {
            let envelope = encode_message(&create_test_reply(hits), &config).unwrap();

            group.throughput(Throughput::Bytes(u64::from(envelope.uncompressed_size)));
            group.bench_with_input(
                BenchmarkId::new(algorithm.to_string(), hits),
                &envelope,
                |b, envelope| {
                    b.iter(|| black_box(decode_message::<SearchReply>(envelope).unwrap()));
                },
            );
        }
    }

    group.finish();
}

fn bench_request_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_round_trip");
    let config = CompressionConfig::default();

    for size in [100, 1000, 10000] {
        let request = create_test_request(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &request, |b, request| {
            b.iter(|| {
                let envelope = encode_message(request, &config).unwrap();
                black_box(decode_message::<SearchRequest>(&envelope).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_open_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope_open_raw");

    for size in [100, 10000, 100000] {
        let envelope = Envelope::raw(Bytes::from(vec![0x42u8; size]));

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &envelope, |b, envelope| {
            b.iter(|| black_box(envelope.open().unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_reply_encode,
    bench_reply_decode,
    bench_request_round_trip,
    bench_open_raw,
);

criterion_main!(benches);
