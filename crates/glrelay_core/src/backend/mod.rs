//! # Graphics Backend Seam
//!
//! Everything an Op does to the driver goes through [`GlBackend`]. Ops only
//! ever hold native names here; virtual handles are resolved before the
//! backend is called.
//!
//! Fire-and-forget calls are expressed as [`GlCommand`] values so a backend
//! can record, replay or forward them. Calls that produce a value (object
//! creation, queries) are trait methods.
//!
//! The backend is owned by the execution thread and never shared, so every
//! method takes `&mut self`.

mod recording;

pub use recording::{GlCall, ProgramRecord, RecordingGl, RecordingState, ShaderRecord};

use glrelay_shared::NativeId;

/// Driver object namespaces that virtual handles can stand for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// `glGenBuffers`
    Buffer,
    /// `glGenTextures`
    Texture,
    /// `glGenFramebuffers`
    Framebuffer,
    /// `glGenRenderbuffers`
    Renderbuffer,
    /// `glCreateProgram`
    Program,
    /// `glCreateShader`
    Shader,
    /// `glGenVertexArrays`
    VertexArray,
    /// `glGenSamplers`
    Sampler,
    /// `glGenQueries`
    Query,
    /// `glGenTransformFeedbacks`
    TransformFeedback,
}

/// Which list of a linked program an active-info query reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveKind {
    /// `glGetActiveAttrib`
    Attribute,
    /// `glGetActiveUniform`
    Uniform,
}

/// One active attribute or uniform of a linked program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActiveInfo {
    /// Declared name, empty when the index has no entry.
    pub name: String,
    /// Array length, `1` for scalars.
    pub size: i32,
    /// GL type enum (`FLOAT_VEC4`, `SAMPLER_2D`, ...).
    pub ty: u32,
}

/// A driver call that returns nothing.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum GlCommand {
    // Pipeline state
    ActiveTexture(u32),
    BlendColor([f32; 4]),
    BlendEquationSeparate { rgb: u32, alpha: u32 },
    BlendFuncSeparate { src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32 },
    ClearColor([f32; 4]),
    ClearDepth(f32),
    ClearStencil(i32),
    Clear(u32),
    ColorMask([bool; 4]),
    CullFace(u32),
    DepthFunc(u32),
    DepthMask(bool),
    DepthRange { near: f32, far: f32 },
    Enable(u32),
    Disable(u32),
    FrontFace(u32),
    Hint { target: u32, mode: u32 },
    LineWidth(f32),
    PolygonOffset { factor: f32, units: f32 },
    SampleCoverage { value: f32, invert: bool },
    Scissor { x: i32, y: i32, width: i32, height: i32 },
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    StencilFuncSeparate { face: u32, func: u32, reference: i32, mask: u32 },
    StencilMaskSeparate { face: u32, mask: u32 },
    StencilOpSeparate { face: u32, fail: u32, zfail: u32, zpass: u32 },
    Flush,
    Finish,

    // Buffers
    BufferData { target: u32, size: usize, data: Option<Vec<u8>>, usage: u32 },
    BufferSubData { target: u32, offset: i64, data: Vec<u8> },
    CopyBufferSubData { read_target: u32, write_target: u32, read_offset: i64, write_offset: i64, size: i64 },
    BindBufferRange { target: u32, index: u32, buffer: NativeId, offset: i64, size: i64 },

    // Textures
    TexImage2D {
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        border: i32,
        format: u32,
        ty: u32,
        pixels: Option<Vec<u8>>,
    },
    TexSubImage2D {
        target: u32,
        level: i32,
        x_offset: i32,
        y_offset: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: Vec<u8>,
    },
    TexParameteri { target: u32, pname: u32, param: i32 },
    TexParameterf { target: u32, pname: u32, param: f32 },
    TexStorage2D { target: u32, levels: i32, internal_format: u32, width: i32, height: i32 },
    GenerateMipmap(u32),

    // Framebuffers
    FramebufferTexture2D { target: u32, attachment: u32, tex_target: u32, texture: NativeId, level: i32 },
    FramebufferRenderbuffer { target: u32, attachment: u32, rb_target: u32, renderbuffer: NativeId },
    RenderbufferStorage { target: u32, internal_format: u32, width: i32, height: i32 },
    ReadBuffer(u32),
    DrawBuffers(Vec<u32>),

    // Programs and shaders
    ShaderSource { shader: NativeId, source: String },
    CompileShader(NativeId),
    AttachShader { program: NativeId, shader: NativeId },
    DetachShader { program: NativeId, shader: NativeId },
    LinkProgram(NativeId),
    ValidateProgram(NativeId),
    BindAttribLocation { program: NativeId, index: u32, name: String },
    Uniformf { location: i32, components: u8, values: Vec<f32> },
    Uniformi { location: i32, components: u8, values: Vec<i32> },
    UniformMatrix { location: i32, dim: u8, transpose: bool, values: Vec<f32> },

    // Vertex input
    VertexAttribf { index: u32, values: Vec<f32> },
    VertexAttribPointer { index: u32, size: i32, ty: u32, normalized: bool, stride: i32, offset: i64 },
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttribDivisor { index: u32, divisor: u32 },

    // Drawing
    DrawArrays { mode: u32, first: i32, count: i32 },
    DrawElements { mode: u32, count: i32, ty: u32, offset: i64 },
    DrawArraysInstanced { mode: u32, first: i32, count: i32, instances: i32 },
    DrawElementsInstanced { mode: u32, count: i32, ty: u32, offset: i64, instances: i32 },

    // Queries, samplers, transform feedback
    BeginQuery { target: u32, query: NativeId },
    EndQuery(u32),
    SamplerParameteri { sampler: NativeId, pname: u32, param: i32 },
    SamplerParameterf { sampler: NativeId, pname: u32, param: f32 },
    BeginTransformFeedback(u32),
    EndTransformFeedback,
    PauseTransformFeedback,
    ResumeTransformFeedback,
}

/// The native graphics API as seen from the execution thread.
///
/// Name `0` means "no object" everywhere, as in GL.
pub trait GlBackend: Send {
    /// Generates one object of `kind` (not shaders).
    fn create(&mut self, kind: ObjectKind) -> NativeId;

    /// Creates a shader of `shader_type`.
    fn create_shader(&mut self, shader_type: u32) -> NativeId;

    /// Deletes an object. Deleting `0` or an unknown name is ignored.
    fn delete(&mut self, kind: ObjectKind, name: NativeId);

    /// True if `name` currently names a live object of `kind`.
    fn is_object(&mut self, kind: ObjectKind, name: NativeId) -> bool;

    /// Binds `name` to `target`. Kinds without a target (programs, vertex
    /// arrays) ignore it; samplers treat it as the texture unit.
    fn bind(&mut self, kind: ObjectKind, target: u32, name: NativeId);

    /// Runs a fire-and-forget call.
    fn execute(&mut self, command: GlCommand);

    /// `glGetString`
    fn get_string(&mut self, pname: u32) -> String;

    /// `glGetIntegerv`, filling `out`.
    fn get_integers(&mut self, pname: u32, out: &mut [i32]);

    /// `glGetFloatv`, filling `out`.
    fn get_floats(&mut self, pname: u32, out: &mut [f32]);

    /// `glGetBooleanv`, filling `out`.
    fn get_booleans(&mut self, pname: u32, out: &mut [bool]);

    /// Pops the oldest recorded error, or `NO_ERROR`.
    fn get_error(&mut self) -> u32;

    /// `glIsEnabled`
    fn is_enabled(&mut self, cap: u32) -> bool;

    /// `glCheckFramebufferStatus`
    fn check_framebuffer_status(&mut self, target: u32) -> u32;

    /// `glGetBufferParameteriv` for the buffer bound to `target`.
    fn get_buffer_parameter(&mut self, target: u32, pname: u32) -> i32;

    /// `glGetProgramiv`
    fn get_program_parameter(&mut self, program: NativeId, pname: u32) -> i32;

    /// `glGetShaderiv`
    fn get_shader_parameter(&mut self, shader: NativeId, pname: u32) -> i32;

    /// `glGetProgramInfoLog`
    fn get_program_info_log(&mut self, program: NativeId) -> String;

    /// `glGetShaderInfoLog`
    fn get_shader_info_log(&mut self, shader: NativeId) -> String;

    /// `glGetShaderSource`
    fn get_shader_source(&mut self, shader: NativeId) -> String;

    /// `glGetAttachedShaders`
    fn get_attached_shaders(&mut self, program: NativeId) -> Vec<NativeId>;

    /// `glGetUniformLocation`, `-1` when absent.
    fn get_uniform_location(&mut self, program: NativeId, name: &str) -> i32;

    /// `glGetAttribLocation`, `-1` when absent.
    fn get_attrib_location(&mut self, program: NativeId, name: &str) -> i32;

    /// `glGetActiveAttrib` / `glGetActiveUniform`. An out-of-range index
    /// yields an empty name.
    fn get_active_info(&mut self, program: NativeId, kind: ActiveKind, index: u32) -> ActiveInfo;

    /// `glReadPixels` from the bound read framebuffer into `out`.
    #[allow(clippy::too_many_arguments)]
    fn read_pixels(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        out: &mut [u8],
    );

    /// `glGetQueryObjectuiv`
    fn get_query_parameter(&mut self, query: NativeId, pname: u32) -> u32;
}
