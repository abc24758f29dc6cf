//! # Method Table
//!
//! Every script-visible method, its minimum argument count, whether it needs
//! a WebGL2 context, and the handler that validates its arguments and issues
//! Ops.
//!
//! ## Dispatch
//!
//! ```text
//!   call("bindBuffer", args)
//!     ├─ unknown name?          -> UnknownMethod
//!     ├─ WebGL2-only on WebGL1? -> RequiresWebGL2
//!     ├─ too few arguments?     -> WrongArgumentCount
//!     └─ handler(ctx, args)     -> enqueue / enqueue_future / enqueue_blocking
//! ```
//!
//! All three checks and all argument unpacking run before anything is
//! enqueued, so a rejected call leaves the queue untouched. Extra arguments
//! are ignored, as scripts expect.

mod buffers;
mod drawing;
mod framebuffers;
mod pipeline;
mod programs;
mod textures;
mod webgl2;

use std::collections::HashMap;
use std::sync::OnceLock;

use glrelay_shared::{ObjectId, Value};

use crate::args::Args;
use crate::backend::{GlCommand, ObjectKind};
use crate::context::GlContext;
use crate::error::{MethodError, MethodResult};

/// Validates arguments and issues the call.
pub type Handler = fn(&GlContext, &Args<'_>) -> MethodResult<Value>;

/// One entry of the method table.
#[derive(Clone, Copy)]
pub struct MethodEntry {
    /// Script-visible name.
    pub name: &'static str,
    /// Minimum number of arguments.
    pub argc: usize,
    /// Only available on WebGL2 contexts.
    pub webgl2: bool,
    handler: Handler,
}

impl std::fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodEntry")
            .field("name", &self.name)
            .field("argc", &self.argc)
            .field("webgl2", &self.webgl2)
            .finish_non_exhaustive()
    }
}

const fn gl1(name: &'static str, argc: usize, handler: Handler) -> MethodEntry {
    MethodEntry {
        name,
        argc,
        webgl2: false,
        handler,
    }
}

const fn gl2(name: &'static str, argc: usize, handler: Handler) -> MethodEntry {
    MethodEntry {
        name,
        argc,
        webgl2: true,
        handler,
    }
}

/// Recognized, but always fails with [`MethodError::Unimplemented`].
const fn stub(name: &'static str) -> MethodEntry {
    gl1(name, 0, not_implemented)
}

/// WebGL2-gated variant of [`stub`].
const fn stub2(name: &'static str) -> MethodEntry {
    gl2(name, 0, not_implemented)
}

fn not_implemented(_: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    Err(MethodError::Unimplemented(args.method()))
}

const GROUPS: &[&[MethodEntry]] = &[
    pipeline::METHODS,
    buffers::METHODS,
    framebuffers::METHODS,
    textures::METHODS,
    programs::METHODS,
    drawing::METHODS,
    webgl2::METHODS,
];

fn table() -> &'static HashMap<&'static str, &'static MethodEntry> {
    static TABLE: OnceLock<HashMap<&'static str, &'static MethodEntry>> = OnceLock::new();
    TABLE.get_or_init(|| {
        GROUPS
            .iter()
            .flat_map(|group| group.iter())
            .map(|entry| (entry.name, entry))
            .collect()
    })
}

/// Looks up a method by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static MethodEntry> {
    table().get(name).copied()
}

/// Every method name, in no particular order.
pub fn names() -> impl Iterator<Item = &'static str> {
    table().keys().copied()
}

/// Validates a call against the table and runs its handler.
///
/// # Errors
///
/// Any [`MethodError`]. Validation failures enqueue nothing.
pub fn dispatch(ctx: &GlContext, name: &str, values: &[Value]) -> MethodResult<Value> {
    let entry = lookup(name).ok_or_else(|| MethodError::UnknownMethod(name.to_owned()))?;
    if entry.webgl2 && !ctx.supports_webgl2() {
        return Err(MethodError::RequiresWebGL2(entry.name));
    }
    if values.len() < entry.argc {
        return Err(MethodError::WrongArgumentCount {
            method: entry.name,
            expected: entry.argc,
            got: values.len(),
        });
    }
    (entry.handler)(ctx, &Args::new(entry.name, values))
}

// =============================================================================
// SHARED HANDLER PIECES
// =============================================================================

/// Queues a fire-and-forget command.
fn command(ctx: &GlContext, command: GlCommand) -> MethodResult<Value> {
    ctx.enqueue(move |gl| {
        gl.backend().execute(command);
        Ok(())
    })?;
    Ok(Value::Undefined)
}

/// Reserves a handle for a new object of `kind`.
fn create(ctx: &GlContext, kind: ObjectKind) -> MethodResult<Value> {
    let id = ctx.enqueue_future(move |backend| backend.create(kind))?;
    Ok(Value::from(id))
}

/// Deletes the object behind argument 0 and forgets its handle. Unmapped
/// handles are ignored.
fn delete(ctx: &GlContext, args: &Args<'_>, kind: ObjectKind) -> MethodResult<Value> {
    let id = args.object(0)?;
    ctx.enqueue(move |gl| {
        if let Some(native) = gl.objects_mut().unmap(id) {
            gl.backend().delete(kind, native);
        }
        Ok(())
    })?;
    Ok(Value::Undefined)
}

/// Binds the object behind `id` (null unbinds).
fn bind(ctx: &GlContext, kind: ObjectKind, target: u32, id: ObjectId) -> MethodResult<Value> {
    ctx.enqueue(move |gl| {
        let native = gl.lookup(id);
        gl.backend().bind(kind, target, native);
        Ok(())
    })?;
    Ok(Value::Undefined)
}

/// Blocking `glIs*` on the object behind argument 0.
fn is_object(ctx: &GlContext, args: &Args<'_>, kind: ObjectKind) -> MethodResult<Value> {
    let id = args.object(0)?;
    ctx.enqueue_blocking(args.method(), move |gl| {
        let native = gl.lookup(id);
        Ok(native != 0 && gl.backend().is_object(kind, native))
    })
    .map(Value::Bool)
}

/// Handle bound to `native`, or `null`.
fn handle_or_null(id: Option<ObjectId>) -> Value {
    id.map_or(Value::Null, Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let mut seen = HashSet::new();
        for entry in GROUPS.iter().flat_map(|g| g.iter()) {
            assert!(seen.insert(entry.name), "duplicate method {}", entry.name);
        }
        assert_eq!(seen.len(), table().len());
    }

    #[test]
    fn test_lookup() {
        let entry = lookup("bindBuffer").unwrap();
        assert_eq!(entry.argc, 2);
        assert!(!entry.webgl2);
        assert!(lookup("createVertexArray").unwrap().webgl2);
        assert!(lookup("glBindBuffer").is_none());
        assert!(names().any(|n| n == "endFrameEXP"));
    }
}
