//! Integration tests with a real execution thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glrelay_core::constants as gl;
use glrelay_core::{
    ContextRegistry, FlushRequester, GlContext, GlRelayConfig, GlThreadRunner, MethodError,
    RecordingGl, TypedArray, Value,
};

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Drains inline while open; once closed, remembers the request and drops it,
/// leaving blocking calls parked.
#[derive(Default)]
struct GatedFlush {
    closed: AtomicBool,
    parked: AtomicBool,
}

impl FlushRequester for GatedFlush {
    fn request_flush(&self, context: &GlContext) {
        if self.closed.load(Ordering::Acquire) {
            self.parked.store(true, Ordering::Release);
        } else {
            context.flush().unwrap();
        }
    }
}

#[test]
fn test_issuing_threads_share_one_execution_thread() {
    let registry = Arc::new(ContextRegistry::new(GlRelayConfig::default()));
    let runner = GlThreadRunner::spawn(Arc::clone(&registry));

    let handles: Vec<_> = (0..4_u32)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let requester = runner.requester();
            thread::spawn(move || {
                let id = registry.create(Box::new(RecordingGl::new()), requester);
                assert!(id.is_valid());
                for i in 0..50_u32 {
                    let width = f64::from(t * 100 + i);
                    registry
                        .call(id, "lineWidth", &[Value::from(width)])
                        .unwrap();
                    if i % 10 == 0 {
                        let value = registry
                            .call(id, "getParameter", &[Value::from(gl::LINE_WIDTH)])
                            .unwrap();
                        assert_eq!(value, Value::from(width as f32));
                    }
                }
                id
            })
        })
        .collect();

    let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(registry.len(), 4);

    runner.shutdown();
}

#[test]
fn test_handles_resolve_across_threads() {
    let registry = Arc::new(ContextRegistry::new(GlRelayConfig::default()));
    let runner = GlThreadRunner::spawn(Arc::clone(&registry));
    let id = registry.create(Box::new(RecordingGl::new()), runner.requester());

    let buffer = registry.call(id, "createBuffer", &[]).unwrap();
    registry
        .call(id, "bindBuffer", &[Value::from(gl::ARRAY_BUFFER), buffer.clone()])
        .unwrap();
    let bound = registry
        .call(id, "getParameter", &[Value::from(gl::ARRAY_BUFFER_BINDING)])
        .unwrap();
    assert_eq!(bound, buffer);

    runner.shutdown();
}

#[test]
fn test_end_frame_is_drained_by_the_runner() {
    let config = GlRelayConfig {
        frame_interval_ms: 2,
        ..GlRelayConfig::default()
    };
    let registry = Arc::new(ContextRegistry::new(config));
    let runner = GlThreadRunner::spawn(Arc::clone(&registry));
    let id = registry.create(Box::new(RecordingGl::new()), runner.requester());
    let ctx = registry.get(id).unwrap();

    let red = [1.0, 0.0, 0.0, 1.0].map(Value::from);
    ctx.call("clearColor", &red).unwrap();
    ctx.call("clear", &[Value::from(gl::COLOR_BUFFER_BIT)]).unwrap();
    ctx.call("endFrameEXP", &[]).unwrap();
    assert!(wait_until(|| ctx.needs_redraw()));
    assert!(wait_until(|| runner.frames() > 0));

    let pixels = ctx
        .call(
            "readPixels",
            &[0, 0, 1, 1, gl::RGBA, gl::UNSIGNED_BYTE].map(Value::from),
        )
        .unwrap();
    assert_eq!(pixels, Value::TypedArray(TypedArray::from_u8s(&[255, 0, 0, 255])));

    runner.shutdown();
}

#[test]
fn test_destroy_from_another_thread() {
    let registry = Arc::new(ContextRegistry::new(GlRelayConfig::default()));
    let runner = GlThreadRunner::spawn(Arc::clone(&registry));
    let id = registry.create(Box::new(RecordingGl::new()), runner.requester());
    let ctx = registry.get(id).unwrap();

    let destroyer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || registry.destroy(id))
    };
    assert!(destroyer.join().unwrap());

    assert_eq!(ctx.call("getError", &[]).unwrap_err(), MethodError::ContextLost);
    assert_eq!(
        registry.call(id, "flushEXP", &[]).unwrap_err(),
        MethodError::ContextLost
    );
    runner.shutdown();
}

#[test]
fn test_destroy_wakes_pending_blocking_call() {
    let registry = Arc::new(ContextRegistry::new(GlRelayConfig::default()));
    let requester = Arc::new(GatedFlush::default());
    let shared: Arc<dyn FlushRequester> = Arc::clone(&requester) as Arc<dyn FlushRequester>;
    let id = registry.create(Box::new(RecordingGl::new()), shared);
    assert!(id.is_valid());
    requester.closed.store(true, Ordering::Release);

    let waiter = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || registry.call(id, "getError", &[]))
    };
    assert!(wait_until(|| requester.parked.load(Ordering::Acquire)));
    assert!(!waiter.is_finished());

    assert!(registry.destroy(id));
    assert_eq!(waiter.join().unwrap().unwrap_err(), MethodError::ContextLost);
}
