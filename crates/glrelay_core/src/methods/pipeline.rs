//! Context queries, fixed-function state, `getParameter` and the frame
//! extensions.

use std::collections::BTreeMap;

use glrelay_shared::constants as gl;
use glrelay_shared::{TypedArray, Value};

use super::{command, gl1, handle_or_null, MethodEntry};
use crate::args::Args;
use crate::backend::GlCommand;
use crate::context::GlContext;
use crate::error::{MethodError, MethodResult};

pub(super) const METHODS: &[MethodEntry] = &[
    gl1("getContextAttributes", 0, get_context_attributes),
    gl1("isContextLost", 0, |ctx, _| Ok(Value::Bool(ctx.is_lost()))),
    gl1("scissor", 4, |ctx, args| {
        command(
            ctx,
            GlCommand::Scissor {
                x: args.int(0)?,
                y: args.int(1)?,
                width: args.int(2)?,
                height: args.int(3)?,
            },
        )
    }),
    gl1("viewport", 4, |ctx, args| {
        command(
            ctx,
            GlCommand::Viewport {
                x: args.int(0)?,
                y: args.int(1)?,
                width: args.int(2)?,
                height: args.int(3)?,
            },
        )
    }),
    gl1("activeTexture", 1, |ctx, args| {
        command(ctx, GlCommand::ActiveTexture(args.glenum(0)?))
    }),
    gl1("blendColor", 4, |ctx, args| {
        command(ctx, GlCommand::BlendColor(rgba(args)?))
    }),
    gl1("blendEquation", 1, |ctx, args| {
        let mode = args.glenum(0)?;
        command(ctx, GlCommand::BlendEquationSeparate { rgb: mode, alpha: mode })
    }),
    gl1("blendEquationSeparate", 2, |ctx, args| {
        command(
            ctx,
            GlCommand::BlendEquationSeparate {
                rgb: args.glenum(0)?,
                alpha: args.glenum(1)?,
            },
        )
    }),
    gl1("blendFunc", 2, |ctx, args| {
        let (src, dst) = (args.glenum(0)?, args.glenum(1)?);
        command(
            ctx,
            GlCommand::BlendFuncSeparate {
                src_rgb: src,
                dst_rgb: dst,
                src_alpha: src,
                dst_alpha: dst,
            },
        )
    }),
    gl1("blendFuncSeparate", 4, |ctx, args| {
        command(
            ctx,
            GlCommand::BlendFuncSeparate {
                src_rgb: args.glenum(0)?,
                dst_rgb: args.glenum(1)?,
                src_alpha: args.glenum(2)?,
                dst_alpha: args.glenum(3)?,
            },
        )
    }),
    gl1("clearColor", 4, |ctx, args| {
        command(ctx, GlCommand::ClearColor(rgba(args)?))
    }),
    gl1("clearDepth", 1, |ctx, args| {
        command(ctx, GlCommand::ClearDepth(args.float(0)?))
    }),
    gl1("clearStencil", 1, |ctx, args| {
        command(ctx, GlCommand::ClearStencil(args.int(0)?))
    }),
    gl1("colorMask", 4, |ctx, args| {
        command(
            ctx,
            GlCommand::ColorMask([
                args.boolean(0)?,
                args.boolean(1)?,
                args.boolean(2)?,
                args.boolean(3)?,
            ]),
        )
    }),
    gl1("cullFace", 1, |ctx, args| {
        command(ctx, GlCommand::CullFace(args.glenum(0)?))
    }),
    gl1("depthFunc", 1, |ctx, args| {
        command(ctx, GlCommand::DepthFunc(args.glenum(0)?))
    }),
    gl1("depthMask", 1, |ctx, args| {
        command(ctx, GlCommand::DepthMask(args.boolean(0)?))
    }),
    gl1("depthRange", 2, |ctx, args| {
        command(
            ctx,
            GlCommand::DepthRange {
                near: args.float(0)?,
                far: args.float(1)?,
            },
        )
    }),
    gl1("disable", 1, |ctx, args| {
        command(ctx, GlCommand::Disable(args.glenum(0)?))
    }),
    gl1("enable", 1, |ctx, args| {
        command(ctx, GlCommand::Enable(args.glenum(0)?))
    }),
    gl1("frontFace", 1, |ctx, args| {
        command(ctx, GlCommand::FrontFace(args.glenum(0)?))
    }),
    gl1("getParameter", 1, get_parameter),
    gl1("getError", 0, |ctx, args| {
        ctx.enqueue_blocking(args.method(), |gl| Ok(gl.backend().get_error()))
            .map(Value::from)
    }),
    gl1("hint", 2, |ctx, args| {
        command(
            ctx,
            GlCommand::Hint {
                target: args.glenum(0)?,
                mode: args.glenum(1)?,
            },
        )
    }),
    gl1("isEnabled", 1, |ctx, args| {
        let cap = args.glenum(0)?;
        ctx.enqueue_blocking(args.method(), move |gl| Ok(gl.backend().is_enabled(cap)))
            .map(Value::Bool)
    }),
    gl1("lineWidth", 1, |ctx, args| {
        command(ctx, GlCommand::LineWidth(args.float(0)?))
    }),
    gl1("pixelStorei", 2, pixel_storei),
    gl1("polygonOffset", 2, |ctx, args| {
        command(
            ctx,
            GlCommand::PolygonOffset {
                factor: args.float(0)?,
                units: args.float(1)?,
            },
        )
    }),
    gl1("sampleCoverage", 2, |ctx, args| {
        command(
            ctx,
            GlCommand::SampleCoverage {
                value: args.float(0)?,
                invert: args.boolean(1)?,
            },
        )
    }),
    gl1("stencilFunc", 3, |ctx, args| {
        command(
            ctx,
            GlCommand::StencilFuncSeparate {
                face: gl::FRONT_AND_BACK,
                func: args.glenum(0)?,
                reference: args.int(1)?,
                mask: args.uint(2)?,
            },
        )
    }),
    gl1("stencilFuncSeparate", 4, |ctx, args| {
        command(
            ctx,
            GlCommand::StencilFuncSeparate {
                face: args.glenum(0)?,
                func: args.glenum(1)?,
                reference: args.int(2)?,
                mask: args.uint(3)?,
            },
        )
    }),
    gl1("stencilMask", 1, |ctx, args| {
        command(
            ctx,
            GlCommand::StencilMaskSeparate {
                face: gl::FRONT_AND_BACK,
                mask: args.uint(0)?,
            },
        )
    }),
    gl1("stencilMaskSeparate", 2, |ctx, args| {
        command(
            ctx,
            GlCommand::StencilMaskSeparate {
                face: args.glenum(0)?,
                mask: args.uint(1)?,
            },
        )
    }),
    gl1("stencilOp", 3, |ctx, args| {
        command(
            ctx,
            GlCommand::StencilOpSeparate {
                face: gl::FRONT_AND_BACK,
                fail: args.glenum(0)?,
                zfail: args.glenum(1)?,
                zpass: args.glenum(2)?,
            },
        )
    }),
    gl1("stencilOpSeparate", 4, |ctx, args| {
        command(
            ctx,
            GlCommand::StencilOpSeparate {
                face: args.glenum(0)?,
                fail: args.glenum(1)?,
                zfail: args.glenum(2)?,
                zpass: args.glenum(3)?,
            },
        )
    }),
    gl1("getSupportedExtensions", 0, |ctx, _| {
        Ok(Value::Array(
            ctx.config()
                .supported_extensions
                .iter()
                .map(|name| Value::from(name.as_str()))
                .collect(),
        ))
    }),
    gl1("getExtension", 1, |_, args| {
        args.string(0)?;
        Ok(Value::Null)
    }),
    gl1("endFrameEXP", 0, |ctx, _| {
        ctx.end_frame()?;
        Ok(Value::Undefined)
    }),
    gl1("flushEXP", 0, |ctx, args| {
        ctx.enqueue_blocking(args.method(), |_| Ok(()))?;
        Ok(Value::Undefined)
    }),
];

fn rgba(args: &Args<'_>) -> MethodResult<[f32; 4]> {
    Ok([
        args.float(0)?,
        args.float(1)?,
        args.float(2)?,
        args.float(3)?,
    ])
}

fn get_context_attributes(ctx: &GlContext, _: &Args<'_>) -> MethodResult<Value> {
    let attributes = ctx.attributes();
    let fields = [
        ("alpha", attributes.alpha),
        ("depth", attributes.depth),
        ("stencil", attributes.stencil),
        ("antialias", attributes.antialias),
        ("premultipliedAlpha", attributes.premultiplied_alpha),
    ];
    Ok(Value::Object(
        fields
            .into_iter()
            .map(|(name, value)| (name.to_owned(), Value::Bool(value)))
            .collect::<BTreeMap<_, _>>(),
    ))
}

fn pixel_storei(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let pname = args.glenum(0)?;
    match pname {
        gl::UNPACK_FLIP_Y_WEBGL => ctx.set_unpack_flip_y(args.boolean(1)?),
        _ => tracing::warn!(pname, "pixelStorei: parameter isn't supported yet, ignored"),
    }
    Ok(Value::Undefined)
}

// =============================================================================
// getParameter
// =============================================================================

fn get_parameter(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let pname = args.glenum(0)?;
    let method = args.method();
    match pname {
        gl::COMPRESSED_TEXTURE_FORMATS => Ok(Value::TypedArray(TypedArray::from_f32s(&[]))),

        gl::ALIASED_LINE_WIDTH_RANGE | gl::ALIASED_POINT_SIZE_RANGE | gl::DEPTH_RANGE => {
            let values = query_floats::<2>(ctx, method, pname)?;
            Ok(Value::TypedArray(TypedArray::from_f32s(&values)))
        }
        gl::BLEND_COLOR | gl::COLOR_CLEAR_VALUE => {
            let values = query_floats::<4>(ctx, method, pname)?;
            Ok(Value::TypedArray(TypedArray::from_f32s(&values)))
        }
        gl::MAX_VIEWPORT_DIMS => {
            let values = query_ints::<2>(ctx, method, pname)?;
            Ok(Value::TypedArray(TypedArray::from_i32s(&values)))
        }
        gl::SCISSOR_BOX | gl::VIEWPORT => {
            let values = query_ints::<4>(ctx, method, pname)?;
            Ok(Value::TypedArray(TypedArray::from_i32s(&values)))
        }
        gl::COLOR_WRITEMASK => {
            let values = query_bools::<4>(ctx, method, pname)?;
            Ok(Value::Array(values.into_iter().map(Value::Bool).collect()))
        }

        gl::UNPACK_FLIP_Y_WEBGL => Ok(Value::Bool(ctx.unpack_flip_y())),
        gl::UNPACK_PREMULTIPLY_ALPHA_WEBGL | gl::UNPACK_COLORSPACE_CONVERSION_WEBGL => {
            Ok(Value::Bool(false))
        }
        gl::RASTERIZER_DISCARD
        | gl::SAMPLE_ALPHA_TO_COVERAGE
        | gl::SAMPLE_COVERAGE
        | gl::TRANSFORM_FEEDBACK_ACTIVE
        | gl::TRANSFORM_FEEDBACK_PAUSED => {
            let [value] = query_bools::<1>(ctx, method, pname)?;
            Ok(Value::Bool(value))
        }

        gl::RENDERER | gl::SHADING_LANGUAGE_VERSION | gl::VENDOR | gl::VERSION => ctx
            .enqueue_blocking(method, move |gl| Ok(gl.backend().get_string(pname)))
            .map(Value::from),

        gl::DEPTH_CLEAR_VALUE
        | gl::LINE_WIDTH
        | gl::POLYGON_OFFSET_FACTOR
        | gl::POLYGON_OFFSET_UNITS
        | gl::SAMPLE_COVERAGE_VALUE
        | gl::MAX_TEXTURE_LOD_BIAS => {
            let [value] = query_floats::<1>(ctx, method, pname)?;
            Ok(Value::from(value))
        }

        gl::ARRAY_BUFFER_BINDING | gl::ELEMENT_ARRAY_BUFFER_BINDING | gl::CURRENT_PROGRAM => ctx
            .enqueue_blocking(method, move |gl| {
                let mut name = [0];
                gl.backend().get_integers(pname, &mut name);
                Ok(gl.objects().reverse_lookup(name[0] as u32))
            })
            .map(handle_or_null),

        gl::COPY_READ_BUFFER_BINDING
        | gl::COPY_WRITE_BUFFER_BINDING
        | gl::DRAW_FRAMEBUFFER_BINDING
        | gl::READ_FRAMEBUFFER_BINDING
        | gl::RENDERBUFFER_BINDING
        | gl::SAMPLER_BINDING
        | gl::TEXTURE_BINDING_2D_ARRAY
        | gl::TEXTURE_BINDING_2D
        | gl::TEXTURE_BINDING_3D
        | gl::TEXTURE_BINDING_CUBE_MAP
        | gl::TRANSFORM_FEEDBACK_BINDING
        | gl::TRANSFORM_FEEDBACK_BUFFER_BINDING
        | gl::UNIFORM_BUFFER_BINDING
        | gl::VERTEX_ARRAY_BINDING => Err(MethodError::UnsupportedParameter { method, pname }),

        _ => {
            let [value] = query_ints::<1>(ctx, method, pname)?;
            Ok(Value::from(value))
        }
    }
}

fn query_floats<const N: usize>(
    ctx: &GlContext,
    method: &'static str,
    pname: u32,
) -> MethodResult<[f32; N]> {
    ctx.enqueue_blocking(method, move |gl| {
        let mut out = [0.0; N];
        gl.backend().get_floats(pname, &mut out);
        Ok(out)
    })
}

fn query_ints<const N: usize>(
    ctx: &GlContext,
    method: &'static str,
    pname: u32,
) -> MethodResult<[i32; N]> {
    ctx.enqueue_blocking(method, move |gl| {
        let mut out = [0; N];
        gl.backend().get_integers(pname, &mut out);
        Ok(out)
    })
}

fn query_bools<const N: usize>(
    ctx: &GlContext,
    method: &'static str,
    pname: u32,
) -> MethodResult<[bool; N]> {
    ctx.enqueue_blocking(method, move |gl| {
        let mut out = [false; N];
        gl.backend().get_booleans(pname, &mut out);
        Ok(out)
    })
}
