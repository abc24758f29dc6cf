//! Integration tests for the issuing side, drained inline.

use std::sync::Arc;

use glrelay_core::constants as gl;
use glrelay_core::{
    ContextId, ContextRegistry, ExecError, GlCall, GlCommand, GlRelayConfig, InlineFlush,
    MethodError, ObjectKind, RecordingGl, TypedArray, Value,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn setup_with(backend: RecordingGl) -> (ContextRegistry, ContextId, RecordingGl) {
    let registry = ContextRegistry::new(GlRelayConfig::default());
    let id = registry.create(Box::new(backend.clone()), Arc::new(InlineFlush));
    assert!(id.is_valid());
    (registry, id, backend)
}

fn setup() -> (ContextRegistry, ContextId, RecordingGl) {
    setup_with(RecordingGl::new())
}

fn num(value: u32) -> Value {
    Value::from(value)
}

#[test]
fn test_ops_execute_in_issue_order() {
    let (registry, id, backend) = setup();
    let ctx = registry.get(id).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let caps = [gl::BLEND, gl::CULL_FACE, gl::DEPTH_TEST, gl::SCISSOR_TEST];

    let mut expected = Vec::new();
    for _ in 0..500 {
        match rng.gen_range(0..3) {
            0 => {
                let width = f64::from(rng.gen_range(1_u32..16));
                ctx.call("lineWidth", &[Value::from(width)]).unwrap();
                expected.push(GlCommand::LineWidth(width as f32));
            }
            1 => {
                let cap = caps[rng.gen_range(0..caps.len())];
                ctx.call("enable", &[num(cap)]).unwrap();
                expected.push(GlCommand::Enable(cap));
            }
            _ => {
                let cap = caps[rng.gen_range(0..caps.len())];
                ctx.call("disable", &[num(cap)]).unwrap();
                expected.push(GlCommand::Disable(cap));
            }
        }
        if rng.gen_bool(0.05) {
            ctx.seal();
        }
    }
    ctx.seal();
    let report = ctx.flush().unwrap();
    assert_eq!(report.ops, 500);

    let commands = backend.commands();
    assert_eq!(commands[commands.len() - expected.len()..], expected[..]);
}

#[test]
fn test_future_handle_usable_before_drain() {
    let (registry, id, backend) = setup();
    let buffer = registry.call(id, "createBuffer", &[]).unwrap();
    assert!(matches!(buffer, Value::Number(_)));
    assert!(!backend
        .calls()
        .iter()
        .any(|c| matches!(c, GlCall::Create { .. })));

    registry
        .call(id, "bindBuffer", &[num(gl::ARRAY_BUFFER), buffer])
        .unwrap();
    registry
        .call(id, "bufferData", &[num(gl::ARRAY_BUFFER), num(64), num(gl::STATIC_DRAW)])
        .unwrap();
    let size = registry
        .call(id, "getBufferParameter", &[num(gl::ARRAY_BUFFER), num(gl::BUFFER_SIZE)])
        .unwrap();
    assert_eq!(size, Value::from(64_i32));
    assert_eq!(registry.call(id, "getError", &[]).unwrap(), num(gl::NO_ERROR));
}

#[test]
fn test_delete_unmapped_handle_is_noop() {
    let (registry, id, backend) = setup();
    registry.call(id, "deleteBuffer", &[num(9999)]).unwrap();
    registry.call(id, "deleteTexture", &[Value::Null]).unwrap();

    let buffer = registry.call(id, "createBuffer", &[]).unwrap();
    registry.call(id, "deleteBuffer", &[buffer.clone()]).unwrap();
    registry.call(id, "deleteBuffer", &[buffer]).unwrap();

    assert_eq!(registry.call(id, "getError", &[]).unwrap(), num(gl::NO_ERROR));
    let deletes = backend
        .calls()
        .iter()
        .filter(|c| matches!(c, GlCall::Delete { .. }))
        .count();
    assert_eq!(deletes, 1);
}

#[test]
fn test_blocking_call_sees_earlier_ops() {
    let (registry, id, _backend) = setup();
    let color = [0.25, 0.5, 0.75, 1.0];
    let args: Vec<Value> = color.iter().map(|c| Value::from(*c)).collect();
    registry.call(id, "clearColor", &args).unwrap();

    let value = registry
        .call(id, "getParameter", &[num(gl::COLOR_CLEAR_VALUE)])
        .unwrap();
    assert_eq!(
        value,
        Value::TypedArray(TypedArray::from_f32s(&[0.25, 0.5, 0.75, 1.0]))
    );
}

#[test]
fn test_ids_increase_across_destroy_and_recreate() {
    let registry = ContextRegistry::new(GlRelayConfig::default());
    let create = || registry.create(Box::new(RecordingGl::new()), Arc::new(InlineFlush));

    let first = create();
    let h1 = registry.call(first, "createBuffer", &[]).unwrap();
    assert!(registry.destroy(first));

    let second = create();
    let h2 = registry.call(second, "createBuffer", &[]).unwrap();
    assert!(second > first);
    match (h1, h2) {
        (Value::Number(a), Value::Number(b)) => assert!(b > a),
        other => panic!("expected numeric handles, got {other:?}"),
    }
}

#[test]
fn test_bound_buffer_reads_back_as_handle() {
    let (registry, id, _backend) = setup();
    let h1 = registry.call(id, "createBuffer", &[]).unwrap();
    registry
        .call(id, "bindBuffer", &[num(gl::ARRAY_BUFFER), h1.clone()])
        .unwrap();

    let binding = [num(gl::ARRAY_BUFFER_BINDING)];
    assert_eq!(registry.call(id, "getParameter", &binding).unwrap(), h1);

    registry.call(id, "deleteBuffer", &[h1]).unwrap();
    assert_eq!(registry.call(id, "getParameter", &binding).unwrap(), Value::Null);
}

#[test]
fn test_unsupported_binding_query_fails_synchronously() {
    let (registry, id, _backend) = setup();
    let ctx = registry.get(id).unwrap();
    let pending = ctx.pending_ops();
    let err = ctx
        .call("getParameter", &[num(gl::TEXTURE_BINDING_2D)])
        .unwrap_err();
    assert!(matches!(err, MethodError::UnsupportedParameter { .. }));
    assert_eq!(ctx.pending_ops(), pending);
}

#[test]
fn test_invalid_calls_enqueue_nothing() {
    let (registry, id, _backend) = setup();
    let ctx = registry.get(id).unwrap();
    ctx.call("clear", &[num(gl::COLOR_BUFFER_BIT)]).unwrap();
    let pending = ctx.pending_ops();

    let err = ctx.call("bindBuffer", &[num(gl::ARRAY_BUFFER)]).unwrap_err();
    assert_eq!(
        err,
        MethodError::WrongArgumentCount {
            method: "bindBuffer",
            expected: 2,
            got: 1,
        }
    );

    let err = ctx
        .call("bindBuffer", &[Value::from("ARRAY_BUFFER"), Value::Null])
        .unwrap_err();
    assert!(matches!(
        err,
        MethodError::InvalidArgument {
            method: "bindBuffer",
            index: 0,
            ..
        }
    ));

    let err = ctx.call("glClear", &[]).unwrap_err();
    assert_eq!(err, MethodError::UnknownMethod("glClear".to_owned()));

    let err = ctx.call("getBufferSubData", &[]).unwrap_err();
    assert_eq!(err, MethodError::Unimplemented("getBufferSubData"));
    for method in [
        "compressedTexImage3D",
        "compressedTexSubImage3D",
        "getActiveUniformBlockParameter",
    ] {
        assert_eq!(
            ctx.call(method, &[]).unwrap_err(),
            MethodError::Unimplemented(method)
        );
    }

    assert_eq!(ctx.pending_ops(), pending);
}

#[test]
fn test_destroyed_context_is_lost() {
    let (registry, id, _backend) = setup();
    let leftover = registry.get(id).unwrap();
    leftover.call("clear", &[num(gl::COLOR_BUFFER_BIT)]).unwrap();

    assert!(registry.destroy(id));
    assert!(registry.get(id).is_none());
    assert!(registry.is_empty());
    assert_eq!(
        registry.call(id, "getError", &[]).unwrap_err(),
        MethodError::ContextLost
    );
    assert_eq!(
        leftover.call("clear", &[num(gl::COLOR_BUFFER_BIT)]).unwrap_err(),
        MethodError::ContextLost
    );
    assert_eq!(leftover.pending_ops(), 0);
    assert_eq!(
        leftover.call("isContextLost", &[]).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_failed_op_drops_rest_of_drain() {
    let (registry, id, backend) = setup();
    let ctx = registry.get(id).unwrap();

    ctx.call("lineWidth", &[Value::from(2.0)]).unwrap();
    ctx.enqueue(|_| Err(ExecError::Backend("device reset".to_owned())))
        .unwrap();
    ctx.call("lineWidth", &[Value::from(3.0)]).unwrap();
    ctx.seal();

    let err = ctx.flush().unwrap_err();
    assert_eq!(err, ExecError::Backend("device reset".to_owned()));
    let commands = backend.commands();
    assert!(commands.contains(&GlCommand::LineWidth(2.0)));
    assert!(!commands.contains(&GlCommand::LineWidth(3.0)));

    let stats = ctx.stats();
    assert_eq!(stats.failed_drains, 1);
    assert_eq!(stats.ops_dropped, 1);

    ctx.call("lineWidth", &[Value::from(4.0)]).unwrap();
    ctx.seal();
    assert_eq!(ctx.flush().unwrap().ops, 1);
    assert!(backend.commands().contains(&GlCommand::LineWidth(4.0)));
}

#[test]
fn test_blocking_call_behind_failed_op_is_abandoned() {
    let (registry, id, _backend) = setup();
    let ctx = registry.get(id).unwrap();

    ctx.enqueue(|_| Err(ExecError::Backend("device reset".to_owned())))
        .unwrap();
    let err = ctx.call("getError", &[]).unwrap_err();
    assert_eq!(err, MethodError::Abandoned("getError"));

    assert_eq!(ctx.call("getError", &[]).unwrap(), num(gl::NO_ERROR));
}

#[test]
fn test_webgl1_rejects_webgl2_methods() {
    let (registry, id, _backend) = setup_with(RecordingGl::gles2());
    let ctx = registry.get(id).unwrap();
    assert!(!ctx.supports_webgl2());
    assert_eq!(
        ctx.call("createVertexArray", &[]).unwrap_err(),
        MethodError::RequiresWebGL2("createVertexArray")
    );

    let (registry, id, _backend) = setup();
    let vao = registry.call(id, "createVertexArray", &[]).unwrap();
    registry.call(id, "bindVertexArray", &[vao.clone()]).unwrap();
    assert_eq!(registry.call(id, "isVertexArray", &[vao]).unwrap(), Value::Bool(true));
}

#[test]
fn test_read_pixels_after_clear() {
    let (registry, id, _backend) = setup();
    let red = [1.0, 0.0, 0.0, 1.0].map(Value::from);
    registry.call(id, "clearColor", &red).unwrap();
    registry.call(id, "clear", &[num(gl::COLOR_BUFFER_BIT)]).unwrap();

    let pixels = registry
        .call(
            id,
            "readPixels",
            &[num(0), num(0), num(2), num(2), num(gl::RGBA), num(gl::UNSIGNED_BYTE)],
        )
        .unwrap();
    let expected: Vec<u8> = [255, 0, 0, 255].repeat(4);
    assert_eq!(pixels, Value::TypedArray(TypedArray::from_u8s(&expected)));
}

#[test]
fn test_shader_program_flow() {
    let (registry, id, _backend) = setup();
    let call = |method: &str, args: &[Value]| registry.call(id, method, args).unwrap();

    let vs = call("createShader", &[num(gl::VERTEX_SHADER)]);
    call(
        "shaderSource",
        &[vs.clone(), Value::from("attribute vec4 pos; void main() { gl_Position = pos; }")],
    );
    call("compileShader", &[vs.clone()]);
    let fs = call("createShader", &[num(gl::FRAGMENT_SHADER)]);
    call(
        "shaderSource",
        &[fs.clone(), Value::from("uniform vec4 tint; void main() { gl_FragColor = tint; }")],
    );
    call("compileShader", &[fs.clone()]);
    assert_eq!(
        call("getShaderParameter", &[vs.clone(), num(gl::COMPILE_STATUS)]),
        Value::Bool(true)
    );

    let program = call("createProgram", &[]);
    call("attachShader", &[program.clone(), vs.clone()]);
    call("attachShader", &[program.clone(), fs.clone()]);
    call("linkProgram", &[program.clone()]);
    assert_eq!(
        call("getProgramParameter", &[program.clone(), num(gl::LINK_STATUS)]),
        Value::Bool(true)
    );
    assert_eq!(
        call("getProgramParameter", &[program.clone(), num(gl::ATTACHED_SHADERS)]),
        Value::from(2_i32)
    );
    assert_eq!(
        call("getAttachedShaders", &[program.clone()]),
        Value::Array(vec![vs.clone(), fs])
    );
    assert_eq!(
        call("getUniformLocation", &[program.clone(), Value::from("tint")]),
        Value::from(0_i32)
    );
    assert_eq!(
        call("getUniformLocation", &[program.clone(), Value::from("missing")]),
        Value::Null
    );

    call("useProgram", &[program.clone()]);
    assert_eq!(call("getParameter", &[num(gl::CURRENT_PROGRAM)]), program);
    assert_eq!(
        call("getShaderSource", &[vs]),
        Value::from("attribute vec4 pos; void main() { gl_Position = pos; }")
    );
    assert_eq!(call("getError", &[]), num(gl::NO_ERROR));
}

#[test]
fn test_active_info_describes_linked_program() {
    let (registry, id, _backend) = setup();
    let call = |method: &str, args: &[Value]| registry.call(id, method, args).unwrap();

    let program = call("createProgram", &[]);
    for (ty, source) in [
        (gl::VERTEX_SHADER, "attribute vec2 corner; uniform mat4 bones[4]; void main() {}"),
        (gl::FRAGMENT_SHADER, "uniform sampler2D atlas; void main() {}"),
    ] {
        let shader = call("createShader", &[num(ty)]);
        call("shaderSource", &[shader.clone(), Value::from(source)]);
        call("compileShader", &[shader.clone()]);
        call("attachShader", &[program.clone(), shader]);
    }
    call("linkProgram", &[program.clone()]);

    let info = |name: &str, size: i32, ty: u32| {
        Value::Object(
            [
                ("name".to_owned(), Value::from(name)),
                ("size".to_owned(), Value::from(size)),
                ("type".to_owned(), num(ty)),
            ]
            .into_iter()
            .collect(),
        )
    };
    assert_eq!(
        call("getActiveAttrib", &[program.clone(), num(0)]),
        info("corner", 1, gl::FLOAT_VEC2)
    );
    assert_eq!(
        call("getActiveUniform", &[program.clone(), num(0)]),
        info("bones", 4, gl::FLOAT_MAT4)
    );
    assert_eq!(
        call("getActiveUniform", &[program.clone(), num(1)]),
        info("atlas", 1, gl::SAMPLER_2D)
    );
    assert_eq!(call("getActiveAttrib", &[Value::Null, num(0)]), Value::Null);
    assert_eq!(call("getError", &[]), num(gl::NO_ERROR));

    assert_eq!(call("getActiveUniform", &[program, num(7)]), Value::Null);
    assert_eq!(call("getError", &[]), num(gl::INVALID_VALUE));
}

#[test]
fn test_oversized_images_are_rejected() {
    let (registry, id, _backend) = setup();
    let ctx = registry.get(id).unwrap();
    let pending = ctx.pending_ops();

    let err = ctx
        .call(
            "texSubImage2D",
            &[
                num(gl::TEXTURE_2D),
                num(0),
                num(0),
                num(0),
                Value::from(i32::MAX),
                Value::from(i32::MAX),
                num(gl::RGBA),
                num(gl::FLOAT),
                Value::Null,
            ],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        MethodError::InvalidArgument {
            method: "texSubImage2D",
            index: 4,
            ..
        }
    ));

    let err = ctx
        .call(
            "readPixels",
            &[
                num(0),
                num(0),
                Value::from(i32::MAX),
                Value::from(i32::MAX),
                num(gl::RGBA),
                num(gl::UNSIGNED_BYTE),
            ],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        MethodError::InvalidArgument {
            method: "readPixels",
            index: 2,
            ..
        }
    ));

    ctx.call("pixelStorei", &[num(gl::UNPACK_FLIP_Y_WEBGL), Value::Bool(true)])
        .unwrap();
    let err = ctx
        .call(
            "texImage2D",
            &[
                num(gl::TEXTURE_2D),
                num(0),
                num(gl::RGBA),
                Value::from(i32::MAX),
                num(2),
                num(0),
                num(gl::RGBA),
                num(gl::FLOAT),
                Value::TypedArray(TypedArray::from_u8s(&[0; 8])),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, MethodError::InvalidArgument { method: "texImage2D", .. }));
    assert_eq!(ctx.pending_ops(), pending);
}

#[test]
fn test_failed_compile_reports_log() {
    let (registry, id, _backend) = setup();
    let call = |method: &str, args: &[Value]| registry.call(id, method, args).unwrap();

    let shader = call("createShader", &[num(gl::FRAGMENT_SHADER)]);
    call("shaderSource", &[shader.clone(), Value::from("this is not glsl")]);
    call("compileShader", &[shader.clone()]);
    assert_eq!(
        call("getShaderParameter", &[shader.clone(), num(gl::COMPILE_STATUS)]),
        Value::Bool(false)
    );
    match call("getShaderInfoLog", &[shader]) {
        Value::String(log) => assert!(!log.is_empty()),
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn test_get_error_after_bad_bind() {
    let (registry, id, _backend) = setup();
    let texture = registry.call(id, "createTexture", &[]).unwrap();
    registry
        .call(id, "bindBuffer", &[num(gl::ARRAY_BUFFER), texture])
        .unwrap();

    assert_eq!(
        registry.call(id, "getError", &[]).unwrap(),
        num(gl::INVALID_OPERATION)
    );
    assert_eq!(registry.call(id, "getError", &[]).unwrap(), num(gl::NO_ERROR));
}

#[test]
fn test_tex_image_flips_rows_when_asked() {
    let (registry, id, backend) = setup();
    let ctx = registry.get(id).unwrap();
    ctx.call("pixelStorei", &[num(gl::UNPACK_FLIP_Y_WEBGL), Value::Bool(true)])
        .unwrap();
    assert!(ctx.unpack_flip_y());

    ctx.call(
        "texImage2D",
        &[
            num(gl::TEXTURE_2D),
            num(0),
            num(gl::RGBA),
            num(1),
            num(2),
            num(0),
            num(gl::RGBA),
            num(gl::UNSIGNED_BYTE),
            Value::TypedArray(TypedArray::from_u8s(&[1, 2, 3, 4, 5, 6, 7, 8])),
        ],
    )
    .unwrap();
    ctx.seal();
    ctx.flush().unwrap();

    let uploaded = backend.commands().into_iter().find_map(|c| match c {
        GlCommand::TexImage2D { pixels, .. } => pixels,
        _ => None,
    });
    assert_eq!(uploaded, Some(vec![5, 6, 7, 8, 1, 2, 3, 4]));
}

#[test]
fn test_object_kinds_are_checked() {
    let (registry, id, backend) = setup();
    let buffer = registry.call(id, "createBuffer", &[]).unwrap();
    assert_eq!(
        registry.call(id, "isBuffer", &[buffer.clone()]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        registry.call(id, "isTexture", &[buffer]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        registry.call(id, "isBuffer", &[Value::Null]).unwrap(),
        Value::Bool(false)
    );
    assert!(backend.calls().iter().any(|c| matches!(
        c,
        GlCall::Create {
            kind: ObjectKind::Buffer,
            ..
        }
    )));
}
