//! Benchmark for the issue queue and dispatch path.
//!
//! TARGET: issuing a fire-and-forget call well under a microsecond
//!
//! Run with: cargo bench --package glrelay_core --bench queue_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use glrelay_core::constants as gl;
use glrelay_core::{
    ContextRegistry, GlRelayConfig, GlState, InlineFlush, IssueQueue, RecordingGl, Value,
};

fn benchmark_append_seal_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("issue_queue");
    group.throughput(Throughput::Elements(1_000));

    group.bench_function("append_seal_drain_1k", |b| {
        let queue = IssueQueue::new(256);
        let mut state = GlState::new(Box::new(RecordingGl::new()), Arc::default());
        b.iter(|| {
            for i in 0..1_000_u32 {
                queue.append(Box::new(move |_| {
                    black_box(i);
                    Ok(())
                }));
                if i % 256 == 255 {
                    queue.seal();
                }
            }
            queue.seal();
            black_box(queue.drain(&mut state).ok());
        });
    });
    group.finish();
}

fn benchmark_dispatch(c: &mut Criterion) {
    let registry = ContextRegistry::new(GlRelayConfig::default());
    let id = registry.create(Box::new(RecordingGl::new()), Arc::new(InlineFlush));
    let ctx = registry.get(id).expect("context");
    let args = [Value::from(gl::DEPTH_TEST)];

    c.bench_function("dispatch_enable_256", |b| {
        b.iter(|| {
            for _ in 0..256 {
                black_box(ctx.call("enable", &args).ok());
            }
            ctx.seal();
            black_box(ctx.flush().ok());
        });
    });

    c.bench_function("blocking_get_error", |b| {
        b.iter(|| black_box(ctx.call("getError", &[]).ok()));
    });
}

criterion_group!(benches, benchmark_append_seal_drain, benchmark_dispatch);
criterion_main!(benches);
