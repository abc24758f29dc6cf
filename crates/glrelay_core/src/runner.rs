//! # Execution Thread
//!
//! [`GlThreadRunner`] owns the execution thread for every context of a
//! registry. It drains a context as soon as that context asks for it and
//! drains all of them once per frame tick.
//!
//! ```text
//!   issuing thread                      execution thread
//!   ──────────────                      ────────────────
//!   enqueue_blocking
//!     seal
//!     ChannelFlush ──Flush(id)──────>   registry.flush(id)
//!     wait ................. <─wake──   Completer::complete
//!
//!                         frame tick    registry.flush_all()
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use glrelay_shared::ContextId;

use crate::context::{FlushRequester, GlContext};
use crate::registry::ContextRegistry;

/// Messages for the execution thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerMessage {
    /// Drain this context now.
    Flush(ContextId),
    /// Exit the loop.
    Shutdown,
}

/// [`FlushRequester`] that forwards requests to a [`GlThreadRunner`].
#[derive(Clone, Debug)]
pub struct ChannelFlush {
    sender: Sender<RunnerMessage>,
}

impl FlushRequester for ChannelFlush {
    fn request_flush(&self, context: &GlContext) {
        if self.sender.send(RunnerMessage::Flush(context.id())).is_err() {
            tracing::warn!(context = %context.id(), "execution thread is gone; flush request dropped");
        }
    }
}

/// Handle to the execution thread.
pub struct GlThreadRunner {
    sender: Sender<RunnerMessage>,
    requester: Arc<ChannelFlush>,
    frames: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl GlThreadRunner {
    /// Starts the execution thread. The frame tick comes from the
    /// registry's config.
    #[must_use]
    pub fn spawn(registry: Arc<ContextRegistry>) -> Self {
        let (sender, receiver) = unbounded();
        let frames = Arc::new(AtomicU64::new(0));
        let interval = registry.config().frame_interval();

        let loop_frames = Arc::clone(&frames);
        let handle = thread::spawn(move || {
            Self::run(&registry, &receiver, interval, &loop_frames);
        });

        Self {
            requester: Arc::new(ChannelFlush {
                sender: sender.clone(),
            }),
            sender,
            frames,
            handle: Some(handle),
        }
    }

    fn run(
        registry: &ContextRegistry,
        receiver: &Receiver<RunnerMessage>,
        interval: Duration,
        frames: &AtomicU64,
    ) {
        tracing::debug!(interval_ms = interval.as_millis() as u64, "execution thread started");
        let mut next_frame = Instant::now() + interval;

        loop {
            match receiver.recv_deadline(next_frame) {
                Ok(RunnerMessage::Flush(id)) => match registry.flush(id) {
                    Some(Err(err)) => tracing::warn!(context = %id, error = %err, "drain failed"),
                    Some(Ok(_)) => {}
                    // Destroyed between request and drain.
                    None => tracing::debug!(context = %id, "flush for unknown context"),
                },
                Ok(RunnerMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    for (id, result) in registry.flush_all() {
                        if let Err(err) = result {
                            tracing::warn!(context = %id, error = %err, "frame drain failed");
                        }
                    }
                    frames.fetch_add(1, Ordering::Relaxed);
                    next_frame = (next_frame + interval).max(Instant::now());
                }
            }
        }
        tracing::debug!(frames = frames.load(Ordering::Relaxed), "execution thread stopped");
    }

    /// The requester to pass to [`ContextRegistry::create`].
    #[must_use]
    pub fn requester(&self) -> Arc<ChannelFlush> {
        Arc::clone(&self.requester)
    }

    /// Frame ticks completed so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Stops the thread and waits for it. Pending requests queued before the
    /// shutdown message are still served.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.sender.send(RunnerMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("execution thread panicked");
            }
        }
    }
}

impl Drop for GlThreadRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for GlThreadRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlThreadRunner")
            .field("frames", &self.frames())
            .field("running", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}
