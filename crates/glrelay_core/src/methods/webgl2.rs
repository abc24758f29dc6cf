//! WebGL2-only objects: vertex arrays, queries, samplers and transform
//! feedback. Fence syncs are recognized but not implemented.

use glrelay_shared::constants as gl;
use glrelay_shared::Value;

use super::{bind, command, create, delete, gl2, is_object, stub2, MethodEntry};
use crate::backend::{GlCommand, ObjectKind};

pub(super) const METHODS: &[MethodEntry] = &[
    // Vertex arrays
    gl2("createVertexArray", 0, |ctx, _| create(ctx, ObjectKind::VertexArray)),
    gl2("deleteVertexArray", 1, |ctx, args| delete(ctx, args, ObjectKind::VertexArray)),
    gl2("bindVertexArray", 1, |ctx, args| {
        bind(ctx, ObjectKind::VertexArray, 0, args.object(0)?)
    }),
    gl2("isVertexArray", 1, |ctx, args| is_object(ctx, args, ObjectKind::VertexArray)),
    // Queries
    gl2("createQuery", 0, |ctx, _| create(ctx, ObjectKind::Query)),
    gl2("deleteQuery", 1, |ctx, args| delete(ctx, args, ObjectKind::Query)),
    gl2("beginQuery", 2, |ctx, args| {
        let target = args.glenum(0)?;
        let query = args.object(1)?;
        ctx.enqueue(move |gl| {
            let query = gl.lookup(query);
            gl.backend().execute(GlCommand::BeginQuery { target, query });
            Ok(())
        })?;
        Ok(Value::Undefined)
    }),
    gl2("endQuery", 1, |ctx, args| command(ctx, GlCommand::EndQuery(args.glenum(0)?))),
    gl2("getQueryParameter", 2, |ctx, args| {
        let query = args.object(0)?;
        let pname = args.glenum(1)?;
        let value = ctx.enqueue_blocking(args.method(), move |gl| {
            let native = gl.lookup(query);
            Ok(gl.backend().get_query_parameter(native, pname))
        })?;
        Ok(if pname == gl::QUERY_RESULT_AVAILABLE {
            Value::Bool(value != 0)
        } else {
            Value::from(value)
        })
    }),
    gl2("isQuery", 1, |ctx, args| is_object(ctx, args, ObjectKind::Query)),
    // Samplers
    gl2("createSampler", 0, |ctx, _| create(ctx, ObjectKind::Sampler)),
    gl2("deleteSampler", 1, |ctx, args| delete(ctx, args, ObjectKind::Sampler)),
    gl2("bindSampler", 2, |ctx, args| {
        bind(ctx, ObjectKind::Sampler, args.uint(0)?, args.object(1)?)
    }),
    gl2("samplerParameteri", 3, |ctx, args| {
        let sampler = args.object(0)?;
        let pname = args.glenum(1)?;
        let param = args.int(2)?;
        ctx.enqueue(move |gl| {
            let sampler = gl.lookup(sampler);
            gl.backend().execute(GlCommand::SamplerParameteri { sampler, pname, param });
            Ok(())
        })?;
        Ok(Value::Undefined)
    }),
    gl2("samplerParameterf", 3, |ctx, args| {
        let sampler = args.object(0)?;
        let pname = args.glenum(1)?;
        let param = args.float(2)?;
        ctx.enqueue(move |gl| {
            let sampler = gl.lookup(sampler);
            gl.backend().execute(GlCommand::SamplerParameterf { sampler, pname, param });
            Ok(())
        })?;
        Ok(Value::Undefined)
    }),
    gl2("isSampler", 1, |ctx, args| is_object(ctx, args, ObjectKind::Sampler)),
    // Transform feedback
    gl2("createTransformFeedback", 0, |ctx, _| {
        create(ctx, ObjectKind::TransformFeedback)
    }),
    gl2("deleteTransformFeedback", 1, |ctx, args| {
        delete(ctx, args, ObjectKind::TransformFeedback)
    }),
    gl2("bindTransformFeedback", 2, |ctx, args| {
        bind(ctx, ObjectKind::TransformFeedback, args.glenum(0)?, args.object(1)?)
    }),
    gl2("isTransformFeedback", 1, |ctx, args| {
        is_object(ctx, args, ObjectKind::TransformFeedback)
    }),
    gl2("beginTransformFeedback", 1, |ctx, args| {
        command(ctx, GlCommand::BeginTransformFeedback(args.glenum(0)?))
    }),
    gl2("endTransformFeedback", 0, |ctx, _| command(ctx, GlCommand::EndTransformFeedback)),
    gl2("pauseTransformFeedback", 0, |ctx, _| {
        command(ctx, GlCommand::PauseTransformFeedback)
    }),
    gl2("resumeTransformFeedback", 0, |ctx, _| {
        command(ctx, GlCommand::ResumeTransformFeedback)
    }),
    stub2("getActiveUniformBlockParameter"),
    // Sync objects
    stub2("fenceSync"),
    stub2("isSync"),
    stub2("deleteSync"),
    stub2("clientWaitSync"),
    stub2("waitSync"),
    stub2("getSyncParameter"),
];
