//! Shaders, programs, uniforms and vertex attributes.
//!
//! Uniform locations travel as plain numbers; `null` becomes `-1`, which GL
//! silently ignores.

use std::collections::BTreeMap;

use glrelay_shared::constants as gl;
use glrelay_shared::{ObjectId, Value};

use super::{command, create, delete, gl1, is_object, stub, MethodEntry};
use crate::args::Args;
use crate::backend::{ActiveKind, GlBackend, GlCommand, ObjectKind};
use crate::context::GlContext;
use crate::error::{ExecError, MethodResult};
use crate::state::GlState;

pub(super) const METHODS: &[MethodEntry] = &[
    gl1("attachShader", 2, |ctx, args| {
        program_and_shader(ctx, args, |program, shader| GlCommand::AttachShader {
            program,
            shader,
        })
    }),
    gl1("bindAttribLocation", 3, |ctx, args| {
        let program = args.object(0)?;
        let index = args.uint(1)?;
        let name = args.string(2)?;
        ctx.enqueue(move |gl| {
            let program = gl.lookup(program);
            gl.backend()
                .execute(GlCommand::BindAttribLocation { program, index, name });
            Ok(())
        })?;
        Ok(Value::Undefined)
    }),
    gl1("compileShader", 1, |ctx, args| {
        on_object(ctx, args, GlCommand::CompileShader)
    }),
    gl1("createProgram", 0, |ctx, _| create(ctx, ObjectKind::Program)),
    gl1("createShader", 1, |ctx, args| {
        let shader_type = args.glenum(0)?;
        let id = ctx.enqueue_future(move |backend| backend.create_shader(shader_type))?;
        Ok(Value::from(id))
    }),
    gl1("deleteProgram", 1, |ctx, args| delete(ctx, args, ObjectKind::Program)),
    gl1("deleteShader", 1, |ctx, args| delete(ctx, args, ObjectKind::Shader)),
    gl1("detachShader", 2, |ctx, args| {
        program_and_shader(ctx, args, |program, shader| GlCommand::DetachShader {
            program,
            shader,
        })
    }),
    gl1("getAttachedShaders", 1, get_attached_shaders),
    gl1("getProgramParameter", 2, |ctx, args| {
        object_parameter(ctx, args, |b, p, n| b.get_program_parameter(p, n), &[
            gl::DELETE_STATUS,
            gl::LINK_STATUS,
            gl::VALIDATE_STATUS,
        ])
    }),
    gl1("getShaderParameter", 2, |ctx, args| {
        object_parameter(ctx, args, |b, s, n| b.get_shader_parameter(s, n), &[
            gl::DELETE_STATUS,
            gl::COMPILE_STATUS,
        ])
    }),
    gl1("getProgramInfoLog", 1, |ctx, args| {
        object_string(ctx, args, |b, p| b.get_program_info_log(p))
    }),
    gl1("getShaderInfoLog", 1, |ctx, args| {
        object_string(ctx, args, |b, s| b.get_shader_info_log(s))
    }),
    gl1("getShaderSource", 1, |ctx, args| {
        object_string(ctx, args, |b, s| b.get_shader_source(s))
    }),
    gl1("isProgram", 1, |ctx, args| is_object(ctx, args, ObjectKind::Program)),
    gl1("isShader", 1, |ctx, args| is_object(ctx, args, ObjectKind::Shader)),
    gl1("linkProgram", 1, |ctx, args| on_object(ctx, args, GlCommand::LinkProgram)),
    gl1("shaderSource", 2, |ctx, args| {
        let shader = args.object(0)?;
        let source = args.string(1)?;
        ctx.enqueue(move |gl| {
            let shader = gl.lookup(shader);
            gl.backend().execute(GlCommand::ShaderSource { shader, source });
            Ok(())
        })?;
        Ok(Value::Undefined)
    }),
    gl1("useProgram", 1, |ctx, args| {
        super::bind(ctx, ObjectKind::Program, 0, args.object(0)?)
    }),
    gl1("validateProgram", 1, |ctx, args| {
        on_object(ctx, args, GlCommand::ValidateProgram)
    }),
    gl1("getUniformLocation", 2, |ctx, args| {
        location_query(ctx, args, |b, p, name| b.get_uniform_location(p, name)).map(|location| {
            if location < 0 {
                Value::Null
            } else {
                Value::from(location)
            }
        })
    }),
    gl1("getAttribLocation", 2, |ctx, args| {
        location_query(ctx, args, |b, p, name| b.get_attrib_location(p, name)).map(Value::from)
    }),
    gl1("getActiveAttrib", 2, |ctx, args| {
        get_active_info(ctx, args, ActiveKind::Attribute)
    }),
    gl1("getActiveUniform", 2, |ctx, args| {
        get_active_info(ctx, args, ActiveKind::Uniform)
    }),
    stub("getUniform"),
    stub("getVertexAttrib"),
    stub("getVertexAttribOffset"),
    // Uniforms
    gl1("uniform1f", 2, uniform_f::<1>),
    gl1("uniform2f", 3, uniform_f::<2>),
    gl1("uniform3f", 4, uniform_f::<3>),
    gl1("uniform4f", 5, uniform_f::<4>),
    gl1("uniform1i", 2, uniform_i::<1>),
    gl1("uniform2i", 3, uniform_i::<2>),
    gl1("uniform3i", 4, uniform_i::<3>),
    gl1("uniform4i", 5, uniform_i::<4>),
    gl1("uniform1fv", 2, uniform_fv::<1>),
    gl1("uniform2fv", 2, uniform_fv::<2>),
    gl1("uniform3fv", 2, uniform_fv::<3>),
    gl1("uniform4fv", 2, uniform_fv::<4>),
    gl1("uniform1iv", 2, uniform_iv::<1>),
    gl1("uniform2iv", 2, uniform_iv::<2>),
    gl1("uniform3iv", 2, uniform_iv::<3>),
    gl1("uniform4iv", 2, uniform_iv::<4>),
    gl1("uniformMatrix2fv", 3, uniform_matrix::<2>),
    gl1("uniformMatrix3fv", 3, uniform_matrix::<3>),
    gl1("uniformMatrix4fv", 3, uniform_matrix::<4>),
    // Vertex attributes
    gl1("vertexAttrib1f", 2, vertex_attrib_f::<1>),
    gl1("vertexAttrib2f", 3, vertex_attrib_f::<2>),
    gl1("vertexAttrib3f", 4, vertex_attrib_f::<3>),
    gl1("vertexAttrib4f", 5, vertex_attrib_f::<4>),
    gl1("vertexAttrib1fv", 2, vertex_attrib_fv::<1>),
    gl1("vertexAttrib2fv", 2, vertex_attrib_fv::<2>),
    gl1("vertexAttrib3fv", 2, vertex_attrib_fv::<3>),
    gl1("vertexAttrib4fv", 2, vertex_attrib_fv::<4>),
    gl1("vertexAttribPointer", 6, |ctx, args| {
        command(
            ctx,
            GlCommand::VertexAttribPointer {
                index: args.uint(0)?,
                size: args.int(1)?,
                ty: args.glenum(2)?,
                normalized: args.boolean(3)?,
                stride: args.int(4)?,
                offset: args.intptr(5)?,
            },
        )
    }),
    gl1("enableVertexAttribArray", 1, |ctx, args| {
        command(ctx, GlCommand::EnableVertexAttribArray(args.uint(0)?))
    }),
    gl1("disableVertexAttribArray", 1, |ctx, args| {
        command(ctx, GlCommand::DisableVertexAttribArray(args.uint(0)?))
    }),
];

// =============================================================================
// OBJECT HELPERS
// =============================================================================

/// Fire-and-forget command on the object behind argument 0.
fn on_object(ctx: &GlContext, args: &Args<'_>, build: fn(u32) -> GlCommand) -> MethodResult<Value> {
    let id = args.object(0)?;
    ctx.enqueue(move |gl| {
        let native = gl.lookup(id);
        gl.backend().execute(build(native));
        Ok(())
    })?;
    Ok(Value::Undefined)
}

fn program_and_shader(
    ctx: &GlContext,
    args: &Args<'_>,
    build: fn(u32, u32) -> GlCommand,
) -> MethodResult<Value> {
    let program = args.object(0)?;
    let shader = args.object(1)?;
    ctx.enqueue(move |gl| {
        let command = build(gl.lookup(program), gl.lookup(shader));
        gl.backend().execute(command);
        Ok(())
    })?;
    Ok(Value::Undefined)
}

/// `get{Program,Shader}Parameter`. The status pnames come back as booleans.
fn object_parameter(
    ctx: &GlContext,
    args: &Args<'_>,
    query: impl FnOnce(&mut dyn GlBackend, u32, u32) -> i32 + Send + 'static,
    boolean_pnames: &'static [u32],
) -> MethodResult<Value> {
    let id = args.object(0)?;
    let pname = args.glenum(1)?;
    let value = ctx.enqueue_blocking(args.method(), move |gl| {
        let native = gl.lookup(id);
        Ok(query(gl.backend(), native, pname))
    })?;
    Ok(if boolean_pnames.contains(&pname) {
        Value::Bool(value != 0)
    } else {
        Value::from(value)
    })
}

fn object_string(
    ctx: &GlContext,
    args: &Args<'_>,
    query: impl FnOnce(&mut dyn GlBackend, u32) -> String + Send + 'static,
) -> MethodResult<Value> {
    let id = args.object(0)?;
    ctx.enqueue_blocking(args.method(), move |gl| {
        let native = gl.lookup(id);
        Ok(query(gl.backend(), native))
    })
    .map(Value::from)
}

fn location_query(
    ctx: &GlContext,
    args: &Args<'_>,
    query: impl FnOnce(&mut dyn GlBackend, u32, &str) -> i32 + Send + 'static,
) -> MethodResult<i32> {
    let program = args.object(0)?;
    let name = args.string(1)?;
    ctx.enqueue_blocking(args.method(), move |gl| {
        let native = gl.lookup(program);
        Ok(query(gl.backend(), native, &name))
    })
}

/// `{ name, size, type }` for one active attribute or uniform, `null` for a
/// null program or an index with no entry.
fn get_active_info(ctx: &GlContext, args: &Args<'_>, kind: ActiveKind) -> MethodResult<Value> {
    let program = args.object(0)?;
    if program.is_null() {
        return Ok(Value::Null);
    }
    let index = args.uint(1)?;
    let info = ctx.enqueue_blocking(args.method(), move |gl| {
        let native = gl.lookup(program);
        Ok(gl.backend().get_active_info(native, kind, index))
    })?;
    if info.name.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::Object(BTreeMap::from([
        ("name".to_owned(), Value::from(info.name)),
        ("size".to_owned(), Value::from(info.size)),
        ("type".to_owned(), Value::from(info.ty)),
    ])))
}

/// Maps the driver's shader names back to handles. A shader the driver
/// reports but we never created is an error.
fn get_attached_shaders(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let program = args.object(0)?;
    let shaders = ctx.enqueue_blocking(args.method(), move |gl: &mut GlState| {
        let native = gl.lookup(program);
        gl.backend()
            .get_attached_shaders(native)
            .into_iter()
            .map(|shader| {
                gl.objects()
                    .reverse_lookup(shader)
                    .ok_or(ExecError::UnknownNativeObject(shader))
            })
            .collect::<Result<Vec<ObjectId>, _>>()
    })?;
    Ok(Value::Array(
        shaders.into_iter().map(Value::from).collect(),
    ))
}

// =============================================================================
// UNIFORMS AND ATTRIBUTES
// =============================================================================

/// Uniform location argument; `null` is the ignored location `-1`.
fn location(args: &Args<'_>, index: usize) -> MethodResult<i32> {
    if args.get(index).is_nullish() {
        Ok(-1)
    } else {
        args.int(index)
    }
}

/// Checks that a vector argument holds a whole number of `unit`-sized
/// elements.
fn whole_units<T>(
    args: &Args<'_>,
    index: usize,
    values: Vec<T>,
    unit: usize,
) -> MethodResult<Vec<T>> {
    if values.is_empty() || values.len() % unit != 0 {
        return Err(args.invalid(index, "array with a whole number of elements"));
    }
    Ok(values)
}

fn uniform_f<const N: usize>(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let location = location(args, 0)?;
    let values = (1..=N).map(|i| args.float(i)).collect::<MethodResult<Vec<_>>>()?;
    command(
        ctx,
        GlCommand::Uniformf {
            location,
            components: N as u8,
            values,
        },
    )
}

fn uniform_i<const N: usize>(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let location = location(args, 0)?;
    let values = (1..=N).map(|i| args.int(i)).collect::<MethodResult<Vec<_>>>()?;
    command(
        ctx,
        GlCommand::Uniformi {
            location,
            components: N as u8,
            values,
        },
    )
}

fn uniform_fv<const N: usize>(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let location = location(args, 0)?;
    let values = whole_units(args, 1, args.floats(1)?, N)?;
    command(
        ctx,
        GlCommand::Uniformf {
            location,
            components: N as u8,
            values,
        },
    )
}

fn uniform_iv<const N: usize>(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let location = location(args, 0)?;
    let values = whole_units(args, 1, args.ints(1)?, N)?;
    command(
        ctx,
        GlCommand::Uniformi {
            location,
            components: N as u8,
            values,
        },
    )
}

fn uniform_matrix<const N: usize>(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let location = location(args, 0)?;
    let transpose = args.boolean(1)?;
    let values = whole_units(args, 2, args.floats(2)?, N * N)?;
    command(
        ctx,
        GlCommand::UniformMatrix {
            location,
            dim: N as u8,
            transpose,
            values,
        },
    )
}

fn vertex_attrib_f<const N: usize>(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let index = args.uint(0)?;
    let values = (1..=N).map(|i| args.float(i)).collect::<MethodResult<Vec<_>>>()?;
    command(ctx, GlCommand::VertexAttribf { index, values })
}

fn vertex_attrib_fv<const N: usize>(ctx: &GlContext, args: &Args<'_>) -> MethodResult<Value> {
    let index = args.uint(0)?;
    let values = args.floats(1)?;
    if values.len() < N {
        return Err(args.invalid(1, "array with enough components"));
    }
    command(
        ctx,
        GlCommand::VertexAttribf {
            index,
            values: values[..N].to_vec(),
        },
    )
}
