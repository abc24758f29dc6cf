//! Texture objects and uploads.
//!
//! Uploads copy their pixels on the issuing thread and, when
//! `UNPACK_FLIP_Y_WEBGL` is set, flip them there too, so the Op only
//! carries finished bytes.

use glrelay_shared::Value;

use super::{bind, command, create, delete, gl1, gl2, is_object, stub, stub2, MethodEntry};
use crate::args::Args;
use crate::backend::{GlCommand, ObjectKind};
use crate::context::GlContext;
use crate::error::{MethodError, MethodResult};
use crate::pixels;

pub(super) const METHODS: &[MethodEntry] = &[
    gl1("bindTexture", 2, |ctx, args| {
        bind(ctx, ObjectKind::Texture, args.glenum(0)?, args.object(1)?)
    }),
    gl1("createTexture", 0, |ctx, _| create(ctx, ObjectKind::Texture)),
    gl1("deleteTexture", 1, |ctx, args| delete(ctx, args, ObjectKind::Texture)),
    gl1("isTexture", 1, |ctx, args| is_object(ctx, args, ObjectKind::Texture)),
    gl1("texParameteri", 3, |ctx, args| {
        command(
            ctx,
            GlCommand::TexParameteri {
                target: args.glenum(0)?,
                pname: args.glenum(1)?,
                param: args.int(2)?,
            },
        )
    }),
    gl1("texParameterf", 3, |ctx, args| {
        command(
            ctx,
            GlCommand::TexParameterf {
                target: args.glenum(0)?,
                pname: args.glenum(1)?,
                param: args.float(2)?,
            },
        )
    }),
    gl1("generateMipmap", 1, |ctx, args| {
        command(ctx, GlCommand::GenerateMipmap(args.glenum(0)?))
    }),
    gl1("texImage2D", 6, tex_image_2d),
    gl1("texSubImage2D", 7, tex_sub_image_2d),
    stub("compressedTexImage2D"),
    stub("compressedTexSubImage2D"),
    stub("getTexParameter"),
    stub2("compressedTexImage3D"),
    stub2("compressedTexSubImage3D"),
    gl2("texStorage2D", 5, |ctx, args| {
        command(
            ctx,
            GlCommand::TexStorage2D {
                target: args.glenum(0)?,
                levels: args.int(1)?,
                internal_format: args.glenum(2)?,
                width: args.int(3)?,
                height: args.int(4)?,
            },
        )
    }),
];

/// Copies pixel data and flips it if the context asks for it.
fn upload_bytes(
    ctx: &GlContext,
    args: &Args<'_>,
    index: usize,
    width: i32,
    height: i32,
    format: u32,
    ty: u32,
) -> MethodResult<Option<Vec<u8>>> {
    let Some(mut data) = args.optional_bytes(index)? else {
        return Ok(None);
    };
    if ctx.unpack_flip_y() {
        let row_bytes = pixels::row_size(width, ty, format)
            .ok_or_else(|| args.invalid(index, "pixel data of a sane size"))?;
        pixels::flip_rows(&mut data, row_bytes, usize::try_from(height).unwrap_or(0));
    }
    Ok(Some(data))
}

/// The short forms take a DOM image source in place of explicit sizes.
/// Only `null` is accepted there; decoding images is not this crate's job.
fn require_null_source(args: &Args<'_>, index: usize) -> MethodResult<()> {
    if args.get(index).is_nullish() {
        Ok(())
    } else {
        Err(args.invalid(index, "null (image sources need the long form)"))
    }
}

/// `texImage2D(target, level, internalformat, width, height, border, format,
/// type, pixels)` or the 6-argument `(target, level, internalformat, format,
/// type, source)`.
fn tex_image_2d(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let target = args.glenum(0)?;
    let level = args.int(1)?;
    let internal_format = args.int(2)?;

    let command_ = match args.len() {
        n if n >= 9 => {
            let width = args.int(3)?;
            let height = args.int(4)?;
            let format = args.glenum(6)?;
            let ty = args.glenum(7)?;
            GlCommand::TexImage2D {
                target,
                level,
                internal_format,
                width,
                height,
                border: args.int(5)?,
                format,
                ty,
                pixels: upload_bytes(ctx, args, 8, width, height, format, ty)?,
            }
        }
        6 => {
            require_null_source(args, 5)?;
            GlCommand::TexImage2D {
                target,
                level,
                internal_format,
                width: 0,
                height: 0,
                border: 0,
                format: args.glenum(3)?,
                ty: args.glenum(4)?,
                pixels: None,
            }
        }
        got => {
            return Err(MethodError::WrongArgumentCount {
                method: args.method(),
                expected: 9,
                got,
            })
        }
    };
    command(ctx, command_)
}

/// `texSubImage2D(target, level, xoffset, yoffset, width, height, format,
/// type, pixels)` or the 7-argument form with a source. A `null` pixel
/// argument uploads zeroes.
fn tex_sub_image_2d(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let target = args.glenum(0)?;
    let level = args.int(1)?;
    let x_offset = args.int(2)?;
    let y_offset = args.int(3)?;

    let (width, height, format, ty, data) = match args.len() {
        n if n >= 9 => {
            let (width, height) = (args.int(4)?, args.int(5)?);
            let (format, ty) = (args.glenum(6)?, args.glenum(7)?);
            let data = upload_bytes(ctx, args, 8, width, height, format, ty)?;
            (width, height, format, ty, data)
        }
        7 => {
            require_null_source(args, 6)?;
            (0, 0, args.glenum(4)?, args.glenum(5)?, None)
        }
        got => {
            return Err(MethodError::WrongArgumentCount {
                method: args.method(),
                expected: 9,
                got,
            })
        }
    };
    let pixels = match data {
        Some(data) => data,
        None => {
            let len = pixels::image_size(width, height, ty, format)
                .ok_or_else(|| args.invalid(4, "a width and height of sane size"))?;
            vec![0; len]
        }
    };
    command(
        ctx,
        GlCommand::TexSubImage2D {
            target,
            level,
            x_offset,
            y_offset,
            width,
            height,
            format,
            ty,
            pixels,
        },
    )
}
