use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use dnacomp::_internal_test_data::SEQ_1M;
use dnacomp::context::ContextOrder;
use dnacomp::pipeline::{compress, decompress, CompressorParams};

fn params() -> CompressorParams {
    CompressorParams::builder()
        .fixed_order(ContextOrder::new(10).unwrap())
        .build()
}

fn compress_1m(c: &mut Criterion) {
    c.bench_function("Compress 1M bases", |b| {
        b.iter_batched_ref(
            params,
            |params| {
                let container = compress(&SEQ_1M, params).unwrap();
                assert_eq!(container.symbol_count(), SEQ_1M.len() as u64);
            },
            BatchSize::LargeInput,
        )
    });
}

fn decompress_1m(c: &mut Criterion) {
    let container = compress(&SEQ_1M, &params()).unwrap();

    c.bench_function("Decompress 1M bases", |b| {
        b.iter(|| {
            let symbols = decompress(&container).unwrap();
            assert_eq!(symbols.len(), SEQ_1M.len());
        })
    });
}

criterion_group!(benches, compress_1m, decompress_1m);
criterion_main!(benches);
