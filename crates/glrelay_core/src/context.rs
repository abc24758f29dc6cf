//! # Rendering Context
//!
//! A [`GlContext`] is the issuing-side face of one rendering surface. Script
//! calls arrive on the issuing thread, are validated there, and become Ops
//! in the context's [`IssueQueue`]. The execution thread later calls
//! [`GlContext::flush`] to run them against the backend.
//!
//! ## Three Ways to Enqueue
//!
//! | Path                         | Issuing thread waits? | Returns              |
//! |------------------------------|-----------------------|----------------------|
//! | [`enqueue`](GlContext::enqueue)                   | no  | nothing              |
//! | [`enqueue_future`](GlContext::enqueue_future)     | no  | a fresh [`ObjectId`] |
//! | [`enqueue_blocking`](GlContext::enqueue_blocking) | yes | the Op's result      |
//!
//! ## Lifecycle
//!
//! ```text
//!   Created ──activate()──> Active ──destroy()──> Destroyed
//!      └──────────────destroy()──────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use glrelay_shared::constants as gl;
use glrelay_shared::{ContextAttributes, ContextId, NativeId, ObjectId, Value};
use parking_lot::Mutex;

use crate::backend::{GlBackend, GlCommand, ObjectKind};
use crate::bridge;
use crate::config::GlRelayConfig;
use crate::error::{ExecResult, MethodError, MethodResult};
use crate::handles::ObjectIdAllocator;
use crate::methods;
use crate::queue::{DrainReport, IssueQueue, QueueStats};
use crate::state::{ContextFlags, GlState};

// =============================================================================
// FLUSH REQUESTS
// =============================================================================

/// Asks the execution thread to drain a context soon.
///
/// Called on the issuing thread after every seal that needs prompt
/// execution (blocking calls, end of frame, `flushEXP`).
pub trait FlushRequester: Send + Sync {
    /// Schedules `context.flush()` on the execution thread.
    fn request_flush(&self, context: &GlContext);
}

/// Drains on the calling thread.
///
/// For single-threaded hosts and tests, where the issuing and execution
/// threads are the same.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineFlush;

impl FlushRequester for InlineFlush {
    fn request_flush(&self, context: &GlContext) {
        if let Err(err) = context.flush() {
            tracing::warn!(context = %context.id(), error = %err, "inline flush failed");
        }
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Where a context is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    /// Registered, initialization Op not yet confirmed.
    Created = 0,
    /// Initialized and accepting calls.
    Active = 1,
    /// Removed from the registry. Every call fails with
    /// [`MethodError::ContextLost`].
    Destroyed = 2,
}

impl Lifecycle {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Active,
            _ => Self::Destroyed,
        }
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// One rendering context: issue queue, handle table, backend and flags.
pub struct GlContext {
    id: ContextId,
    queue: IssueQueue,
    gl: Mutex<GlState>,
    flags: Arc<ContextFlags>,
    allocator: Arc<ObjectIdAllocator>,
    requester: Arc<dyn FlushRequester>,
    lifecycle: AtomicU8,
    unpack_flip_y: AtomicBool,
    config: Arc<GlRelayConfig>,
}

impl GlContext {
    /// Builds a context and queues its initialization Op.
    ///
    /// The context stays [`Lifecycle::Created`] until
    /// [`activate`](Self::activate) has seen that Op run.
    #[must_use]
    pub fn new(
        id: ContextId,
        backend: Box<dyn GlBackend>,
        requester: Arc<dyn FlushRequester>,
        allocator: Arc<ObjectIdAllocator>,
        config: Arc<GlRelayConfig>,
    ) -> Self {
        let flags = Arc::new(ContextFlags::default());
        let context = Self {
            id,
            queue: IssueQueue::new(config.batch_capacity),
            gl: Mutex::new(GlState::new(backend, Arc::clone(&flags))),
            flags,
            allocator,
            requester,
            lifecycle: AtomicU8::new(Lifecycle::Created as u8),
            unpack_flip_y: AtomicBool::new(false),
            config,
        };
        let viewport = context.config.headless_viewport;
        context.queue.append(Box::new(move |gl| {
            initialize(gl, viewport);
            Ok(())
        }));
        context
    }

    /// Waits for the initialization Op and marks the context active.
    ///
    /// Must not be called while holding a lock the execution thread needs
    /// to find this context.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::ContextLost`] if the context was destroyed
    /// first.
    pub fn activate(&self) -> MethodResult<()> {
        self.enqueue_blocking("activate", |_| Ok(()))?;
        let _ = self.lifecycle.compare_exchange(
            Lifecycle::Created as u8,
            Lifecycle::Active as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        tracing::debug!(
            context = %self.id,
            webgl2 = self.supports_webgl2(),
            "context active"
        );
        Ok(())
    }

    /// Marks the context destroyed and drops every pending Op.
    ///
    /// Blocking callers still waiting are woken with
    /// [`MethodError::ContextLost`].
    pub fn destroy(&self) {
        self.lifecycle
            .store(Lifecycle::Destroyed as u8, Ordering::Release);
        let dropped = self.queue.discard();
        tracing::debug!(context = %self.id, dropped, "context destroyed");
    }

    // =========================================================================
    // ISSUING SIDE
    // =========================================================================

    /// Appends a fire-and-forget Op to the next batch.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::ContextLost`] on a destroyed context.
    pub fn enqueue<F>(&self, op: F) -> MethodResult<()>
    where
        F: FnOnce(&mut GlState) -> ExecResult<()> + Send + 'static,
    {
        self.ensure_alive()?;
        self.queue.append(Box::new(op));
        Ok(())
    }

    /// Reserves a handle now and queues the Op that creates its native
    /// object. The handle is usable in later calls right away.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::ContextLost`] on a destroyed context.
    pub fn enqueue_future<F>(&self, create: F) -> MethodResult<ObjectId>
    where
        F: FnOnce(&mut dyn GlBackend) -> NativeId + Send + 'static,
    {
        self.ensure_alive()?;
        let id = self.allocator.allocate();
        self.queue.append(Box::new(move |gl| {
            let native = create(gl.backend());
            gl.objects_mut().map(id, native)
        }));
        Ok(id)
    }

    /// Queues `op`, seals, requests a flush and waits for the result.
    ///
    /// Every Op issued before this call has run by the time it returns.
    ///
    /// # Errors
    ///
    /// - [`MethodError::ContextLost`] if the context is (or becomes)
    ///   destroyed.
    /// - [`MethodError::Abandoned`] if an earlier Op failed the drain.
    /// - [`MethodError::Execution`] if `op` itself failed.
    pub fn enqueue_blocking<R, F>(&self, method: &'static str, op: F) -> MethodResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut GlState) -> ExecResult<R> + Send + 'static,
    {
        self.ensure_alive()?;
        let (completer, waiter) = bridge::oneshot();
        self.queue.append(Box::new(move |gl| {
            completer.complete(op(gl));
            Ok(())
        }));
        self.seal();
        if self.is_lost() {
            // Destroyed after the liveness check; nothing will drain us.
            self.queue.discard();
        } else {
            self.requester.request_flush(self);
        }

        match waiter.wait() {
            Ok(result) => result.map_err(|source| MethodError::Execution { method, source }),
            Err(bridge::Abandoned) if self.is_lost() => Err(MethodError::ContextLost),
            Err(bridge::Abandoned) => Err(MethodError::Abandoned(method)),
        }
    }

    /// Moves the next batch into the backlog.
    pub fn seal(&self) {
        self.queue.seal();
    }

    /// Marks the end of a frame: queues the redraw flag, seals and requests
    /// a flush.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError::ContextLost`] on a destroyed context.
    pub fn end_frame(&self) -> MethodResult<()> {
        self.enqueue(|gl| {
            gl.flags().set_needs_redraw(true);
            Ok(())
        })?;
        self.seal();
        self.requester.request_flush(self);
        Ok(())
    }

    /// Validates and issues a script call by method name.
    ///
    /// # Errors
    ///
    /// Any [`MethodError`]; nothing is enqueued when validation fails.
    pub fn call(&self, method: &str, args: &[Value]) -> MethodResult<Value> {
        methods::dispatch(self, method, args)
    }

    // =========================================================================
    // EXECUTION SIDE
    // =========================================================================

    /// Drains the backlog against the backend. Runs on the execution thread.
    ///
    /// A destroyed context has nothing to drain.
    ///
    /// # Errors
    ///
    /// Returns the first Op failure; the rest of that drain pass is dropped.
    pub fn flush(&self) -> ExecResult<DrainReport> {
        let mut gl = self.gl.lock();
        self.queue.drain(&mut gl)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Registry id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.lifecycle.load(Ordering::Acquire))
    }

    /// True once destroyed.
    #[inline]
    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.lifecycle() == Lifecycle::Destroyed
    }

    /// True if initialization found an OpenGL ES 3.0+ driver.
    #[inline]
    #[must_use]
    pub fn supports_webgl2(&self) -> bool {
        self.flags.supports_webgl2()
    }

    /// True if a frame ended since the flag was last cleared.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.flags.needs_redraw()
    }

    /// Set by the platform after presenting.
    pub fn set_needs_redraw(&self, value: bool) {
        self.flags.set_needs_redraw(value);
    }

    /// Native framebuffer that `bindFramebuffer(null)` binds.
    #[must_use]
    pub fn default_framebuffer(&self) -> NativeId {
        self.flags.default_framebuffer()
    }

    /// Set by the platform when it attaches its own framebuffer.
    pub fn set_default_framebuffer(&self, name: NativeId) {
        self.flags.set_default_framebuffer(name);
    }

    /// Whether texture uploads are flipped vertically.
    #[must_use]
    pub fn unpack_flip_y(&self) -> bool {
        self.unpack_flip_y.load(Ordering::Acquire)
    }

    /// Set by `pixelStorei(UNPACK_FLIP_Y_WEBGL, ...)`.
    pub fn set_unpack_flip_y(&self, value: bool) {
        self.unpack_flip_y.store(value, Ordering::Release);
    }

    /// Attributes reported by `getContextAttributes`.
    #[must_use]
    pub fn attributes(&self) -> ContextAttributes {
        self.config.context_attributes
    }

    /// Engine settings.
    #[must_use]
    pub fn config(&self) -> &GlRelayConfig {
        &self.config
    }

    /// Ops not yet taken by a drain.
    #[must_use]
    pub fn pending_ops(&self) -> usize {
        self.queue.pending_ops()
    }

    /// Queue counters.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    fn ensure_alive(&self) -> MethodResult<()> {
        if self.is_lost() {
            Err(MethodError::ContextLost)
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for GlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle())
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// INITIALIZATION
// =============================================================================

/// First Op of every context.
///
/// Detects WebGL2 support from the version string, binds the platform's
/// framebuffer, then either clears it or, with no surface attached, sets
/// the headless viewport.
fn initialize(gl: &mut GlState, headless_viewport: [i32; 2]) {
    let version = gl.backend().get_string(gl::VERSION);
    let gles = parse_gles_version(&version);
    gl.flags().set_supports_webgl2(gles >= 3.0);

    let framebuffer = gl.flags().default_framebuffer();
    let backend = gl.backend();
    backend.bind(ObjectKind::Framebuffer, gl::FRAMEBUFFER, framebuffer);
    if backend.check_framebuffer_status(gl::FRAMEBUFFER) == gl::FRAMEBUFFER_UNDEFINED {
        backend.execute(GlCommand::Viewport {
            x: 0,
            y: 0,
            width: headless_viewport[0],
            height: headless_viewport[1],
        });
    } else {
        backend.execute(GlCommand::ClearColor([0.0; 4]));
        backend.execute(GlCommand::ClearDepth(1.0));
        backend.execute(GlCommand::ClearStencil(0));
        backend.execute(GlCommand::Clear(
            gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT,
        ));
    }
    tracing::debug!(version = %version, gles, "initialized backend");
}

/// Extracts the number from an `OpenGL ES X.Y ...` version string, `0.0`
/// when there is none.
fn parse_gles_version(version: &str) -> f32 {
    let rest = version.strip_prefix("OpenGL ES ").unwrap_or(version);
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    rest[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GlCall, RecordingGl};

    fn context(backend: RecordingGl) -> GlContext {
        GlContext::new(
            ContextId(1),
            Box::new(backend),
            Arc::new(InlineFlush),
            Arc::new(ObjectIdAllocator::new()),
            Arc::new(GlRelayConfig::default()),
        )
    }

    #[test]
    fn test_parse_gles_version() {
        assert!((parse_gles_version("OpenGL ES 3.0 Mesa") - 3.0).abs() < f32::EPSILON);
        assert!((parse_gles_version("OpenGL ES 2.0") - 2.0).abs() < f32::EPSILON);
        assert!((parse_gles_version("3.2") - 3.2).abs() < f32::EPSILON);
        assert!(parse_gles_version("garbage").abs() < f32::EPSILON);
    }

    #[test]
    fn test_activate_runs_initialization() {
        let backend = RecordingGl::new();
        let ctx = context(backend.clone());
        assert_eq!(ctx.lifecycle(), Lifecycle::Created);

        ctx.activate().unwrap();
        assert_eq!(ctx.lifecycle(), Lifecycle::Active);
        assert!(ctx.supports_webgl2());
        assert_eq!(backend.state().viewport, [0, 0, 300, 150]);
    }

    #[test]
    fn test_initialization_clears_attached_surface() {
        let backend = RecordingGl::gles2().with_surface();
        let ctx = context(backend.clone());
        ctx.activate().unwrap();

        assert!(!ctx.supports_webgl2());
        assert!(backend.commands().contains(&GlCommand::Clear(
            gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT
        )));
    }

    #[test]
    fn test_future_handle_resolves_before_drain() {
        let backend = RecordingGl::new();
        let ctx = context(backend.clone());
        ctx.activate().unwrap();

        let id = ctx
            .enqueue_future(|b| b.create(ObjectKind::Buffer))
            .unwrap();
        ctx.enqueue(move |gl| {
            let name = gl.lookup(id);
            gl.backend().bind(ObjectKind::Buffer, gl::ARRAY_BUFFER, name);
            Ok(())
        })
        .unwrap();
        assert!(backend
            .calls()
            .iter()
            .all(|c| !matches!(c, GlCall::Create { .. })));

        ctx.seal();
        ctx.flush().unwrap();
        let calls = backend.calls();
        let created = calls
            .iter()
            .find_map(|c| match c {
                GlCall::Create { name, .. } => Some(*name),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            calls.last(),
            Some(&GlCall::Bind {
                kind: ObjectKind::Buffer,
                target: gl::ARRAY_BUFFER,
                name: created,
            })
        );
    }

    #[test]
    fn test_destroyed_context_rejects_calls() {
        let ctx = context(RecordingGl::new());
        ctx.activate().unwrap();
        ctx.enqueue(|_| Ok(())).unwrap();
        ctx.destroy();

        assert!(ctx.is_lost());
        assert_eq!(ctx.pending_ops(), 0);
        assert_eq!(ctx.enqueue(|_| Ok(())), Err(MethodError::ContextLost));
        assert_eq!(
            ctx.enqueue_blocking("getError", |_| Ok(0)),
            Err(MethodError::ContextLost)
        );
    }

    #[test]
    fn test_end_frame_sets_redraw_flag() {
        let ctx = context(RecordingGl::new());
        ctx.activate().unwrap();
        assert!(!ctx.needs_redraw());
        ctx.end_frame().unwrap();
        assert!(ctx.needs_redraw());
    }
}
