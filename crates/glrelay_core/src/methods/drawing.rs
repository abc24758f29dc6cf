//! Clears, draws and explicit flushes.

use glrelay_shared::Value;

use super::{command, gl1, gl2, MethodEntry};
use crate::backend::GlCommand;

pub(super) const METHODS: &[MethodEntry] = &[
    gl1("clear", 1, |ctx, args| command(ctx, GlCommand::Clear(args.glenum(0)?))),
    gl1("drawArrays", 3, |ctx, args| {
        command(
            ctx,
            GlCommand::DrawArrays {
                mode: args.glenum(0)?,
                first: args.int(1)?,
                count: args.int(2)?,
            },
        )
    }),
    gl1("drawElements", 4, |ctx, args| {
        command(
            ctx,
            GlCommand::DrawElements {
                mode: args.glenum(0)?,
                count: args.int(1)?,
                ty: args.glenum(2)?,
                offset: args.intptr(3)?,
            },
        )
    }),
    // `finish` waits for the execution thread, not just for the driver.
    gl1("finish", 0, |ctx, args| {
        ctx.enqueue_blocking(args.method(), |gl| {
            gl.backend().execute(GlCommand::Finish);
            Ok(())
        })?;
        Ok(Value::Undefined)
    }),
    gl1("flush", 0, |ctx, _| {
        command(ctx, GlCommand::Flush)?;
        ctx.seal();
        Ok(Value::Undefined)
    }),
    gl2("vertexAttribDivisor", 2, |ctx, args| {
        command(
            ctx,
            GlCommand::VertexAttribDivisor {
                index: args.uint(0)?,
                divisor: args.uint(1)?,
            },
        )
    }),
    gl2("drawArraysInstanced", 4, |ctx, args| {
        command(
            ctx,
            GlCommand::DrawArraysInstanced {
                mode: args.glenum(0)?,
                first: args.int(1)?,
                count: args.int(2)?,
                instances: args.int(3)?,
            },
        )
    }),
    gl2("drawElementsInstanced", 5, |ctx, args| {
        command(
            ctx,
            GlCommand::DrawElementsInstanced {
                mode: args.glenum(0)?,
                count: args.int(1)?,
                ty: args.glenum(2)?,
                offset: args.intptr(3)?,
                instances: args.int(4)?,
            },
        )
    }),
    gl2("drawBuffers", 1, |ctx, args| {
        command(ctx, GlCommand::DrawBuffers(args.enums(0)?))
    }),
];
