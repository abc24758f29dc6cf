//! # GLRELAY Core
//!
//! Deferred graphics command engine. Script calls are validated on an
//! issuing thread, turned into Ops, and executed later, in order, on the one
//! thread that owns the graphics driver.
//!
//! ## Design Principles
//!
//! 1. **Batch, then swap** - the issuing thread fills a batch without
//!    touching shared state; sealing and draining meet under one lock for a
//!    single `Vec` move
//! 2. **Handles before objects** - `create*` calls return an [`ObjectId`]
//!    immediately; the native object is made and mapped when the Op runs
//! 3. **Block only when asked** - calls that return a value wait on a
//!    condition variable for their Op, which sees every earlier Op
//! 4. **Validate early** - argument and capability errors surface on the
//!    issuing thread and enqueue nothing
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use glrelay_core::{ContextRegistry, GlRelayConfig, GlThreadRunner, RecordingGl};
//!
//! let registry = Arc::new(ContextRegistry::new(GlRelayConfig::default()));
//! let runner = GlThreadRunner::spawn(Arc::clone(&registry));
//!
//! let ctx = registry.create(Box::new(RecordingGl::new()), runner.requester());
//! let buffer = registry.call(ctx, "createBuffer", &[])?;
//! registry.call(ctx, "bindBuffer", &[Value::from(gl::ARRAY_BUFFER), buffer])?;
//! let bound = registry.call(ctx, "getParameter", &[Value::from(gl::ARRAY_BUFFER_BINDING)])?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod args;
pub mod backend;
pub mod bridge;
pub mod config;
pub mod context;
pub mod error;
pub mod handles;
pub mod methods;
pub mod pixels;
pub mod queue;
pub mod registry;
pub mod runner;
pub mod state;

pub use backend::{ActiveInfo, ActiveKind, GlBackend, GlCall, GlCommand, ObjectKind, RecordingGl};
pub use config::GlRelayConfig;
pub use context::{FlushRequester, GlContext, InlineFlush, Lifecycle};
pub use error::{ConfigError, ExecError, ExecResult, MethodError, MethodResult};
pub use handles::{HandleTable, ObjectIdAllocator};
pub use queue::{DrainReport, IssueQueue, QueueStats};
pub use registry::ContextRegistry;
pub use runner::{ChannelFlush, GlThreadRunner, RunnerMessage};
pub use state::{ContextFlags, GlState};

pub use glrelay_shared::{constants, ContextAttributes, ContextId, NativeId, ObjectId, TypedArray, Value};
