//! # Context Registry
//!
//! Owns every live [`GlContext`] and hands out [`ContextId`]s.
//!
//! ```text
//!   next_id: 1 ──create──> 2 ──create──> 3 ...      (never reused)
//!   0 = ContextId::INVALID, also returned once u32 is exhausted
//! ```
//!
//! ## Locking
//!
//! One `Mutex` guards the id counter and the map. It is never held while a
//! context lock is taken or while waiting on a blocking call: `create`
//! registers under the lock and activates after releasing it, and
//! `flush_all` snapshots the contexts before draining them.

use std::collections::HashMap;
use std::sync::Arc;

use glrelay_shared::{ContextId, Value};
use parking_lot::Mutex;

use crate::backend::GlBackend;
use crate::config::GlRelayConfig;
use crate::context::{FlushRequester, GlContext};
use crate::error::{ExecResult, MethodError, MethodResult};
use crate::handles::ObjectIdAllocator;
use crate::queue::DrainReport;

struct RegistryInner {
    contexts: HashMap<ContextId, Arc<GlContext>>,
    next_id: u32,
}

/// Every live context, keyed by id.
pub struct ContextRegistry {
    inner: Mutex<RegistryInner>,
    allocator: Arc<ObjectIdAllocator>,
    config: Arc<GlRelayConfig>,
}

impl ContextRegistry {
    /// Creates an empty registry. All its contexts share one
    /// [`ObjectIdAllocator`] and `config`.
    #[must_use]
    pub fn new(config: GlRelayConfig) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                contexts: HashMap::new(),
                next_id: 1,
            }),
            allocator: Arc::new(ObjectIdAllocator::new()),
            config: Arc::new(config),
        }
    }

    /// Registers a context over `backend` and waits for its initialization.
    ///
    /// Returns [`ContextId::INVALID`] when the id space is exhausted or
    /// initialization did not complete. `requester` must be able to drain
    /// the new context, since activation is a blocking call.
    pub fn create(
        &self,
        backend: Box<dyn GlBackend>,
        requester: Arc<dyn FlushRequester>,
    ) -> ContextId {
        let context = {
            let mut inner = self.inner.lock();
            if inner.next_id == u32::MAX {
                tracing::error!("context ids exhausted");
                return ContextId::INVALID;
            }
            let id = ContextId(inner.next_id);
            inner.next_id += 1;

            let context = Arc::new(GlContext::new(
                id,
                backend,
                requester,
                Arc::clone(&self.allocator),
                Arc::clone(&self.config),
            ));
            inner.contexts.insert(id, Arc::clone(&context));
            context
        };

        let id = context.id();
        if let Err(err) = context.activate() {
            tracing::error!(context = %id, error = %err, "context failed to initialize");
            self.destroy(id);
            return ContextId::INVALID;
        }
        tracing::info!(
            context = %id,
            webgl2 = context.supports_webgl2(),
            "context created"
        );
        id
    }

    /// The context behind `id`, if it is still registered.
    #[must_use]
    pub fn get(&self, id: ContextId) -> Option<Arc<GlContext>> {
        self.inner.lock().contexts.get(&id).cloned()
    }

    /// Removes and destroys a context. Returns `false` for unknown ids.
    ///
    /// The id is never handed out again.
    pub fn destroy(&self, id: ContextId) -> bool {
        let removed = self.inner.lock().contexts.remove(&id);
        match removed {
            Some(context) => {
                context.destroy();
                tracing::info!(context = %id, "context destroyed");
                true
            }
            None => false,
        }
    }

    /// Calls `method` on the context behind `id`.
    ///
    /// # Errors
    ///
    /// [`MethodError::ContextLost`] for unknown or destroyed ids, otherwise
    /// whatever the method returns.
    pub fn call(&self, id: ContextId, method: &str, args: &[Value]) -> MethodResult<Value> {
        let context = self.get(id).ok_or(MethodError::ContextLost)?;
        context.call(method, args)
    }

    /// Drains one context. `None` if `id` is not registered.
    pub fn flush(&self, id: ContextId) -> Option<ExecResult<DrainReport>> {
        self.get(id).map(|context| context.flush())
    }

    /// Drains every registered context, in no particular order.
    pub fn flush_all(&self) -> Vec<(ContextId, ExecResult<DrainReport>)> {
        let contexts: Vec<Arc<GlContext>> = self.inner.lock().contexts.values().cloned().collect();
        contexts
            .into_iter()
            .map(|context| (context.id(), context.flush()))
            .collect()
    }

    /// Number of registered contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().contexts.len()
    }

    /// `true` if no context is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared configuration.
    #[must_use]
    pub fn config(&self) -> &GlRelayConfig {
        &self.config
    }

    /// Shared handle allocator.
    #[must_use]
    pub fn allocator(&self) -> &ObjectIdAllocator {
        &self.allocator
    }
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ContextRegistry")
            .field("contexts", &inner.contexts.len())
            .field("next_id", &inner.next_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingGl;
    use crate::context::InlineFlush;

    fn registry() -> ContextRegistry {
        ContextRegistry::new(GlRelayConfig::default())
    }

    fn create(registry: &ContextRegistry) -> ContextId {
        registry.create(Box::new(RecordingGl::new()), Arc::new(InlineFlush))
    }

    #[test]
    fn test_ids_start_at_one() {
        let registry = registry();
        assert_eq!(create(&registry), ContextId(1));
        assert_eq!(create(&registry), ContextId(2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let registry = registry();
        let first = create(&registry);
        assert!(registry.destroy(first));
        assert!(!registry.destroy(first));
        let second = create(&registry);
        assert!(second > first);
        assert!(registry.get(first).is_none());
    }

    #[test]
    fn test_exhaustion_returns_invalid() {
        let registry = registry();
        registry.inner.lock().next_id = u32::MAX - 1;
        assert_eq!(create(&registry), ContextId(u32::MAX - 1));
        assert_eq!(create(&registry), ContextId::INVALID);
        assert_eq!(create(&registry), ContextId::INVALID);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_call_on_unknown_id() {
        let registry = registry();
        let err = registry.call(ContextId(7), "getError", &[]).unwrap_err();
        assert!(matches!(err, MethodError::ContextLost));
        assert!(registry.flush(ContextId(7)).is_none());
    }

    #[test]
    fn test_flush_all_reports_every_context() {
        let registry = registry();
        let a = create(&registry);
        let b = create(&registry);
        registry.call(a, "clearColor", &vec![Value::from(1.0); 4]).unwrap();
        registry.call(a, "flush", &[]).unwrap();

        let mut reports = registry.flush_all();
        reports.sort_by_key(|(id, _)| *id);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].0, a);
        assert_eq!(reports[1].0, b);
        assert_eq!(reports[0].1.as_ref().unwrap().ops, 2);
        assert_eq!(reports[1].1.as_ref().unwrap().ops, 0);
    }
}
