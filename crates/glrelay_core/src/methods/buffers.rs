//! Buffer objects.

use glrelay_shared::Value;

use super::{bind, command, create, delete, gl1, gl2, is_object, stub, MethodEntry};
use crate::args::Args;
use crate::backend::{GlCommand, ObjectKind};
use crate::context::GlContext;
use crate::error::MethodResult;

pub(super) const METHODS: &[MethodEntry] = &[
    gl1("bindBuffer", 2, |ctx, args| {
        bind(ctx, ObjectKind::Buffer, args.glenum(0)?, args.object(1)?)
    }),
    gl1("bufferData", 3, buffer_data),
    gl1("bufferSubData", 3, |ctx, args| {
        command(
            ctx,
            GlCommand::BufferSubData {
                target: args.glenum(0)?,
                offset: args.intptr(1)?,
                data: args.bytes(2)?,
            },
        )
    }),
    gl1("createBuffer", 0, |ctx, _| create(ctx, ObjectKind::Buffer)),
    gl1("deleteBuffer", 1, |ctx, args| delete(ctx, args, ObjectKind::Buffer)),
    gl1("getBufferParameter", 2, |ctx, args| {
        let (target, pname) = (args.glenum(0)?, args.glenum(1)?);
        ctx.enqueue_blocking(args.method(), move |gl| {
            Ok(gl.backend().get_buffer_parameter(target, pname))
        })
        .map(Value::from)
    }),
    gl1("isBuffer", 1, |ctx, args| is_object(ctx, args, ObjectKind::Buffer)),
    stub("getBufferSubData"),
    gl2("copyBufferSubData", 5, |ctx, args| {
        command(
            ctx,
            GlCommand::CopyBufferSubData {
                read_target: args.glenum(0)?,
                write_target: args.glenum(1)?,
                read_offset: args.intptr(2)?,
                write_offset: args.intptr(3)?,
                size: args.intptr(4)?,
            },
        )
    }),
    gl2("bindBufferBase", 3, |ctx, args| {
        bind_buffer_range(ctx, args, None)
    }),
    gl2("bindBufferRange", 5, |ctx, args| {
        let range = (args.intptr(3)?, args.intptr(4)?);
        bind_buffer_range(ctx, args, Some(range))
    }),
];

/// `bufferData(target, sizeOrData, usage)`: a number allocates that many
/// bytes, `null` allocates none, a buffer uploads its bytes.
fn buffer_data(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let target = args.glenum(0)?;
    let usage = args.glenum(2)?;
    let (size, data) = match args.get(1) {
        Value::Number(_) => (usize::try_from(args.intptr(1)?).unwrap_or(0), None),
        Value::Null | Value::Undefined => (0, None),
        _ => {
            let data = args.bytes(1)?;
            (data.len(), Some(data))
        }
    };
    command(
        ctx,
        GlCommand::BufferData {
            target,
            size,
            data,
            usage,
        },
    )
}

/// `bindBufferBase` binds the whole buffer; `bindBufferRange` a slice of it.
/// A size of `-1` stands for "whole buffer" on the backend side.
fn bind_buffer_range(
    ctx: &GlContext,
    args: &Args<'_>,
    range: Option<(i64, i64)>,
) -> MethodResult<Value> {
    let target = args.glenum(0)?;
    let index = args.uint(1)?;
    let buffer = args.object(2)?;
    let (offset, size) = range.unwrap_or((0, -1));
    ctx.enqueue(move |gl| {
        let buffer = gl.lookup(buffer);
        gl.backend().execute(GlCommand::BindBufferRange {
            target,
            index,
            buffer,
            offset,
            size,
        });
        Ok(())
    })?;
    Ok(Value::Undefined)
}
