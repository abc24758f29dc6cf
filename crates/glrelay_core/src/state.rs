//! Execution-side state handed to every Op.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use glrelay_shared::{NativeId, ObjectId};

use crate::backend::GlBackend;
use crate::handles::HandleTable;

/// Flags written by one side of a context and read by the other.
#[derive(Debug, Default)]
pub struct ContextFlags {
    supports_webgl2: AtomicBool,
    needs_redraw: AtomicBool,
    default_framebuffer: AtomicU32,
}

impl ContextFlags {
    /// True once initialization found an OpenGL ES 3.0+ driver.
    #[inline]
    #[must_use]
    pub fn supports_webgl2(&self) -> bool {
        self.supports_webgl2.load(Ordering::Acquire)
    }

    /// Records whether the driver is WebGL2-capable.
    #[inline]
    pub fn set_supports_webgl2(&self, value: bool) {
        self.supports_webgl2.store(value, Ordering::Release);
    }

    /// True if a frame ended since the platform last presented.
    #[inline]
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw.load(Ordering::Acquire)
    }

    /// Sets or clears the redraw flag.
    #[inline]
    pub fn set_needs_redraw(&self, value: bool) {
        self.needs_redraw.store(value, Ordering::Release);
    }

    /// Native framebuffer that `bindFramebuffer(null)` binds.
    #[inline]
    #[must_use]
    pub fn default_framebuffer(&self) -> NativeId {
        self.default_framebuffer.load(Ordering::Acquire)
    }

    /// Sets the framebuffer the platform renders into.
    #[inline]
    pub fn set_default_framebuffer(&self, name: NativeId) {
        self.default_framebuffer.store(name, Ordering::Release);
    }
}

/// What an Op may touch: the handle table, the backend and the shared
/// flags. Owned by the context, locked for the length of a drain.
pub struct GlState {
    objects: HandleTable,
    backend: Box<dyn GlBackend>,
    flags: Arc<ContextFlags>,
}

impl GlState {
    /// Wraps a backend with an empty handle table.
    #[must_use]
    pub fn new(backend: Box<dyn GlBackend>, flags: Arc<ContextFlags>) -> Self {
        Self {
            objects: HandleTable::new(),
            backend,
            flags,
        }
    }

    /// The native API.
    #[inline]
    pub fn backend(&mut self) -> &mut dyn GlBackend {
        self.backend.as_mut()
    }

    /// Handle table, read-only.
    #[inline]
    #[must_use]
    pub fn objects(&self) -> &HandleTable {
        &self.objects
    }

    /// Handle table.
    #[inline]
    pub fn objects_mut(&mut self) -> &mut HandleTable {
        &mut self.objects
    }

    /// Native name for `id`, `0` if unmapped.
    #[inline]
    #[must_use]
    pub fn lookup(&self, id: ObjectId) -> NativeId {
        self.objects.lookup(id)
    }

    /// Flags shared with the issuing side.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> &ContextFlags {
        &self.flags
    }
}

impl std::fmt::Debug for GlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlState")
            .field("objects", &self.objects.len())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
