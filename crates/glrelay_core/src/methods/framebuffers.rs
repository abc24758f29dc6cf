//! Framebuffers, renderbuffers and `readPixels`.

use glrelay_shared::{TypedArray, Value};

use super::{bind, command, create, delete, gl1, gl2, is_object, stub, MethodEntry};
use crate::args::Args;
use crate::backend::{GlCommand, ObjectKind};
use crate::context::GlContext;
use crate::error::MethodResult;
use crate::pixels;

pub(super) const METHODS: &[MethodEntry] = &[
    gl1("bindFramebuffer", 2, bind_framebuffer),
    gl1("checkFramebufferStatus", 1, |ctx, args| {
        let target = args.glenum(0)?;
        ctx.enqueue_blocking(args.method(), move |gl| {
            Ok(gl.backend().check_framebuffer_status(target))
        })
        .map(Value::from)
    }),
    gl1("createFramebuffer", 0, |ctx, _| create(ctx, ObjectKind::Framebuffer)),
    gl1("deleteFramebuffer", 1, |ctx, args| delete(ctx, args, ObjectKind::Framebuffer)),
    gl1("framebufferRenderbuffer", 4, |ctx, args| {
        let target = args.glenum(0)?;
        let attachment = args.glenum(1)?;
        let rb_target = args.glenum(2)?;
        let renderbuffer = args.object(3)?;
        ctx.enqueue(move |gl| {
            let renderbuffer = gl.lookup(renderbuffer);
            gl.backend().execute(GlCommand::FramebufferRenderbuffer {
                target,
                attachment,
                rb_target,
                renderbuffer,
            });
            Ok(())
        })?;
        Ok(Value::Undefined)
    }),
    gl1("framebufferTexture2D", 5, |ctx, args| {
        let target = args.glenum(0)?;
        let attachment = args.glenum(1)?;
        let tex_target = args.glenum(2)?;
        let texture = args.object(3)?;
        let level = args.int(4)?;
        ctx.enqueue(move |gl| {
            let texture = gl.lookup(texture);
            gl.backend().execute(GlCommand::FramebufferTexture2D {
                target,
                attachment,
                tex_target,
                texture,
                level,
            });
            Ok(())
        })?;
        Ok(Value::Undefined)
    }),
    stub("getFramebufferAttachmentParameter"),
    gl1("isFramebuffer", 1, |ctx, args| is_object(ctx, args, ObjectKind::Framebuffer)),
    gl1("readPixels", 6, read_pixels),
    gl1("bindRenderbuffer", 2, |ctx, args| {
        bind(ctx, ObjectKind::Renderbuffer, args.glenum(0)?, args.object(1)?)
    }),
    gl1("createRenderbuffer", 0, |ctx, _| create(ctx, ObjectKind::Renderbuffer)),
    gl1("deleteRenderbuffer", 1, |ctx, args| delete(ctx, args, ObjectKind::Renderbuffer)),
    stub("getRenderbufferParameter"),
    gl1("isRenderbuffer", 1, |ctx, args| is_object(ctx, args, ObjectKind::Renderbuffer)),
    gl1("renderbufferStorage", 4, |ctx, args| {
        command(
            ctx,
            GlCommand::RenderbufferStorage {
                target: args.glenum(0)?,
                internal_format: args.glenum(1)?,
                width: args.int(2)?,
                height: args.int(3)?,
            },
        )
    }),
    stub("getInternalformatParameter"),
    stub("renderbufferStorageMultisample"),
    gl2("readBuffer", 1, |ctx, args| {
        command(ctx, GlCommand::ReadBuffer(args.glenum(0)?))
    }),
];

/// `null` binds the platform's framebuffer rather than name `0`.
fn bind_framebuffer(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let target = args.glenum(0)?;
    let framebuffer = args.object(1)?;
    if !framebuffer.is_null() {
        return bind(ctx, ObjectKind::Framebuffer, target, framebuffer);
    }
    ctx.enqueue(move |gl| {
        let native = gl.flags().default_framebuffer();
        gl.backend().bind(ObjectKind::Framebuffer, target, native);
        Ok(())
    })?;
    Ok(Value::Undefined)
}

/// Blocking read of a `width` x `height` rectangle, returned as a
/// `Uint8Array`. A trailing destination argument is accepted and ignored;
/// the caller copies the result into it.
fn read_pixels(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let x = args.int(0)?;
    let y = args.int(1)?;
    let width = args.int(2)?;
    let height = args.int(3)?;
    let format = args.glenum(4)?;
    let ty = args.glenum(5)?;
    let len = pixels::image_size(width, height, ty, format)
        .ok_or_else(|| args.invalid(2, "a width and height of sane size"))?;

    let bytes = ctx.enqueue_blocking(args.method(), move |gl| {
        let mut out = vec![0; len];
        gl.backend()
            .read_pixels(x, y, width, height, format, ty, &mut out);
        Ok(out)
    })?;
    Ok(Value::TypedArray(TypedArray::from_u8s(&bytes)))
}
