//! Headless backend that records every call and keeps just enough state to
//! answer queries. Cloning shares the state, so a test can keep one clone
//! and hand the other to a context.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use glrelay_shared::constants as gl;
use glrelay_shared::NativeId;
use parking_lot::{Mutex, MutexGuard};

use super::{ActiveInfo, ActiveKind, GlBackend, GlCommand, ObjectKind};

/// One call as seen by the backend, in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub enum GlCall {
    /// An object was generated.
    Create {
        /// Namespace.
        kind: ObjectKind,
        /// Name handed out.
        name: NativeId,
    },
    /// An object was deleted.
    Delete {
        /// Namespace.
        kind: ObjectKind,
        /// Name deleted.
        name: NativeId,
    },
    /// An object was bound.
    Bind {
        /// Namespace.
        kind: ObjectKind,
        /// Binding point.
        target: u32,
        /// Name bound, `0` to unbind.
        name: NativeId,
    },
    /// A fire-and-forget command.
    Command(GlCommand),
}

/// Shader bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct ShaderRecord {
    /// `VERTEX_SHADER` or `FRAGMENT_SHADER`.
    pub shader_type: u32,
    /// Last source set.
    pub source: String,
    /// Result of the last compile.
    pub compiled: bool,
    /// Log of the last compile.
    pub info_log: String,
}

/// Program bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct ProgramRecord {
    /// Attached shaders, in attach order.
    pub attached: Vec<NativeId>,
    /// Result of the last link.
    pub linked: bool,
    /// Result of the last validate.
    pub validated: bool,
    /// Log of the last link.
    pub info_log: String,
    /// Uniform names in location order.
    pub uniforms: Vec<String>,
    /// Attribute locations, explicit or assigned.
    pub attribs: Vec<(String, i32)>,
    /// Active attributes found at the last successful link.
    pub active_attribs: Vec<ActiveInfo>,
    /// Active uniforms found at the last successful link.
    pub active_uniforms: Vec<ActiveInfo>,
}

/// Everything [`RecordingGl`] remembers.
#[derive(Debug)]
#[allow(missing_docs)]
pub struct RecordingState {
    pub version: String,
    /// Whether name `0` is an incomplete framebuffer (no surface attached).
    pub headless: bool,
    pub calls: Vec<GlCall>,
    pub objects: HashMap<NativeId, ObjectKind>,
    /// Bound name per binding target.
    pub bindings: HashMap<u32, NativeId>,
    pub current_program: NativeId,
    pub vertex_array: NativeId,
    pub active_texture: u32,
    pub enabled: HashSet<u32>,
    pub errors: VecDeque<u32>,
    pub viewport: [i32; 4],
    pub scissor: [i32; 4],
    pub clear_color: [f32; 4],
    pub blend_color: [f32; 4],
    pub color_mask: [bool; 4],
    pub depth_clear: f32,
    pub depth_range: [f32; 2],
    pub line_width: f32,
    pub polygon_offset: [f32; 2],
    /// Color the last color clear left in the framebuffer.
    pub framebuffer_color: [u8; 4],
    pub buffer_sizes: HashMap<NativeId, usize>,
    pub attachments: HashMap<NativeId, usize>,
    pub shaders: HashMap<NativeId, ShaderRecord>,
    pub programs: HashMap<NativeId, ProgramRecord>,
    next_name: NativeId,
}

impl RecordingState {
    fn new(version: &str) -> Self {
        Self {
            version: version.to_owned(),
            headless: true,
            calls: Vec::new(),
            objects: HashMap::new(),
            bindings: HashMap::new(),
            current_program: 0,
            vertex_array: 0,
            active_texture: gl::TEXTURE0,
            enabled: HashSet::from([gl::DITHER]),
            errors: VecDeque::new(),
            viewport: [0; 4],
            scissor: [0; 4],
            clear_color: [0.0; 4],
            blend_color: [0.0; 4],
            color_mask: [true; 4],
            depth_clear: 1.0,
            depth_range: [0.0, 1.0],
            line_width: 1.0,
            polygon_offset: [0.0; 2],
            framebuffer_color: [0; 4],
            buffer_sizes: HashMap::new(),
            attachments: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            next_name: 1,
        }
    }

    /// Names are unique across kinds, which keeps reverse lookups
    /// unambiguous in tests.
    fn gen_name(&mut self, kind: ObjectKind) -> NativeId {
        let name = self.next_name;
        self.next_name += 1;
        self.objects.insert(name, kind);
        self.calls.push(GlCall::Create { kind, name });
        name
    }

    fn is_kind(&self, name: NativeId, kind: ObjectKind) -> bool {
        self.objects.get(&name) == Some(&kind)
    }

    fn error(&mut self, code: u32) {
        self.errors.push_back(code);
    }

    fn bound(&self, target: u32) -> NativeId {
        self.bindings.get(&target).copied().unwrap_or(0)
    }

    fn apply(&mut self, command: &GlCommand) {
        match command {
            GlCommand::ActiveTexture(unit) => self.active_texture = *unit,
            GlCommand::BlendColor(rgba) => self.blend_color = *rgba,
            GlCommand::ClearColor(rgba) => self.clear_color = *rgba,
            GlCommand::ClearDepth(depth) => self.depth_clear = *depth,
            GlCommand::Clear(mask) => {
                if mask & gl::COLOR_BUFFER_BIT != 0 {
                    for (i, channel) in self.framebuffer_color.iter_mut().enumerate() {
                        if self.color_mask[i] {
                            *channel = (self.clear_color[i].clamp(0.0, 1.0) * 255.0).round() as u8;
                        }
                    }
                }
            }
            GlCommand::ColorMask(mask) => self.color_mask = *mask,
            GlCommand::DepthRange { near, far } => self.depth_range = [*near, *far],
            GlCommand::Enable(cap) => {
                self.enabled.insert(*cap);
            }
            GlCommand::Disable(cap) => {
                self.enabled.remove(cap);
            }
            GlCommand::LineWidth(width) => self.line_width = *width,
            GlCommand::PolygonOffset { factor, units } => self.polygon_offset = [*factor, *units],
            GlCommand::Scissor { x, y, width, height } => self.scissor = [*x, *y, *width, *height],
            GlCommand::Viewport { x, y, width, height } => {
                self.viewport = [*x, *y, *width, *height];
            }
            GlCommand::BufferData { target, size, data, .. } => {
                let buffer = self.bound(*target);
                if buffer == 0 {
                    self.error(gl::INVALID_OPERATION);
                } else {
                    let size = data.as_ref().map_or(*size, Vec::len);
                    self.buffer_sizes.insert(buffer, size);
                }
            }
            GlCommand::FramebufferTexture2D { target, texture: attached, .. }
            | GlCommand::FramebufferRenderbuffer { target, renderbuffer: attached, .. } => {
                let framebuffer = self.bound(*target);
                if framebuffer == 0 {
                    self.error(gl::INVALID_OPERATION);
                } else if *attached != 0 {
                    *self.attachments.entry(framebuffer).or_default() += 1;
                }
            }
            GlCommand::ShaderSource { shader, source } => match self.shaders.get_mut(shader) {
                Some(record) => record.source.clone_from(source),
                None => self.error(gl::INVALID_VALUE),
            },
            GlCommand::CompileShader(shader) => match self.shaders.get_mut(shader) {
                Some(record) => {
                    record.compiled = record.source.contains("main");
                    record.info_log = if record.compiled {
                        String::new()
                    } else {
                        "ERROR: 0:1: 'main' : function not defined".to_owned()
                    };
                }
                None => self.error(gl::INVALID_VALUE),
            },
            GlCommand::AttachShader { program, shader } => {
                match (self.programs.get_mut(program), self.shaders.contains_key(shader)) {
                    (Some(record), true) if !record.attached.contains(shader) => {
                        record.attached.push(*shader);
                    }
                    _ => self.error(gl::INVALID_OPERATION),
                }
            }
            GlCommand::DetachShader { program, shader } => match self.programs.get_mut(program) {
                Some(record) => record.attached.retain(|s| s != shader),
                None => self.error(gl::INVALID_VALUE),
            },
            GlCommand::LinkProgram(program) => self.link(*program),
            GlCommand::ValidateProgram(program) => match self.programs.get_mut(program) {
                Some(record) => record.validated = record.linked,
                None => self.error(gl::INVALID_VALUE),
            },
            GlCommand::BindAttribLocation { program, index, name } => {
                match self.programs.get_mut(program) {
                    Some(record) => {
                        record.attribs.retain(|(n, _)| n != name);
                        record.attribs.push((name.clone(), *index as i32));
                    }
                    None => self.error(gl::INVALID_VALUE),
                }
            }
            GlCommand::DrawArrays { .. }
            | GlCommand::DrawElements { .. }
            | GlCommand::DrawArraysInstanced { .. }
            | GlCommand::DrawElementsInstanced { .. } => {
                if self.current_program == 0 {
                    self.error(gl::INVALID_OPERATION);
                }
            }
            _ => {}
        }
    }

    fn link(&mut self, program: NativeId) {
        let Some(record) = self.programs.get(&program) else {
            self.error(gl::INVALID_VALUE);
            return;
        };
        let shaders: Vec<&ShaderRecord> = record
            .attached
            .iter()
            .filter_map(|s| self.shaders.get(s))
            .collect();
        let linked = shaders.len() >= 2 && shaders.iter().all(|s| s.compiled);
        let info_log = if linked {
            String::new()
        } else {
            "ERROR: program has missing or uncompiled shaders".to_owned()
        };
        let (mut active_attribs, mut active_uniforms) = (Vec::new(), Vec::<ActiveInfo>::new());
        if linked {
            for shader in &shaders {
                for uniform in declarations(&shader.source, &["uniform"]) {
                    if !active_uniforms.iter().any(|u| u.name == uniform.name) {
                        active_uniforms.push(uniform);
                    }
                }
                if shader.shader_type == gl::VERTEX_SHADER {
                    active_attribs.extend(declarations(&shader.source, &["attribute", "in"]));
                }
            }
        }
        if let Some(record) = self.programs.get_mut(&program) {
            record.linked = linked;
            record.info_log = info_log;
            record.uniforms.clear();
            record.active_attribs = active_attribs;
            record.active_uniforms = active_uniforms;
        }
    }

    fn attached_sources(&self, program: NativeId, shader_type: Option<u32>) -> Vec<&str> {
        self.programs
            .get(&program)
            .map(|record| {
                record
                    .attached
                    .iter()
                    .filter_map(|s| self.shaders.get(s))
                    .filter(|s| shader_type.map_or(true, |t| s.shader_type == t))
                    .map(|s| s.source.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Pulls `qualifier [precision] type name[len];` declarations out of a
/// shader source. Good enough for the sources tests feed it.
fn declarations(source: &str, qualifiers: &[&str]) -> Vec<ActiveInfo> {
    source
        .split(';')
        .filter_map(|statement| {
            let tokens: Vec<&str> = statement.split_whitespace().collect();
            let (first, rest) = tokens.split_first()?;
            if !qualifiers.contains(first) || rest.len() < 2 {
                return None;
            }
            let declared = rest[rest.len() - 1];
            let (name, size) = match declared.split_once('[') {
                Some((name, len)) => (name, len.trim_end_matches(']').parse().ok()?),
                None => (declared, 1),
            };
            Some(ActiveInfo {
                name: name.to_owned(),
                size,
                ty: glsl_type(rest[rest.len() - 2]),
            })
        })
        .collect()
}

fn glsl_type(name: &str) -> u32 {
    match name {
        "float" => gl::FLOAT,
        "vec2" => gl::FLOAT_VEC2,
        "vec3" => gl::FLOAT_VEC3,
        "vec4" => gl::FLOAT_VEC4,
        "int" => gl::INT,
        "ivec2" => gl::INT_VEC2,
        "ivec3" => gl::INT_VEC3,
        "ivec4" => gl::INT_VEC4,
        "bool" => gl::BOOL,
        "mat2" => gl::FLOAT_MAT2,
        "mat3" => gl::FLOAT_MAT3,
        "mat4" => gl::FLOAT_MAT4,
        "sampler2D" => gl::SAMPLER_2D,
        "samplerCube" => gl::SAMPLER_CUBE,
        _ => 0,
    }
}

/// Headless [`GlBackend`] that records calls instead of rendering.
#[derive(Clone)]
pub struct RecordingGl {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingGl {
    /// A WebGL2-capable (OpenGL ES 3.0) backend with no surface.
    #[must_use]
    pub fn new() -> Self {
        Self::with_version("OpenGL ES 3.0 GLRELAY-recording")
    }

    /// An OpenGL ES 2.0 backend with no surface.
    #[must_use]
    pub fn gles2() -> Self {
        Self::with_version("OpenGL ES 2.0 GLRELAY-recording")
    }

    /// A backend reporting `version` from `getString(VERSION)`.
    #[must_use]
    pub fn with_version(version: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(RecordingState::new(version))),
        }
    }

    /// Makes framebuffer `0` complete, as if a surface were attached.
    #[must_use]
    pub fn with_surface(self) -> Self {
        self.state.lock().headless = false;
        self
    }

    /// Locks the recorded state for inspection.
    pub fn state(&self) -> MutexGuard<'_, RecordingState> {
        self.state.lock()
    }

    /// Every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.lock().calls.clone()
    }

    /// Only the fire-and-forget commands so far.
    #[must_use]
    pub fn commands(&self) -> Vec<GlCommand> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                GlCall::Command(command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    /// Queues an error for `getError` to report.
    pub fn push_error(&self, code: u32) {
        self.state.lock().error(code);
    }
}

impl Default for RecordingGl {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecordingGl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RecordingGl")
            .field("version", &state.version)
            .field("calls", &state.calls.len())
            .finish_non_exhaustive()
    }
}

fn fill<T: Copy>(out: &mut [T], values: &[T]) {
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = *value;
    }
}

impl GlBackend for RecordingGl {
    fn create(&mut self, kind: ObjectKind) -> NativeId {
        let mut state = self.state.lock();
        let name = state.gen_name(kind);
        if kind == ObjectKind::Program {
            state.programs.insert(name, ProgramRecord::default());
        }
        name
    }

    fn create_shader(&mut self, shader_type: u32) -> NativeId {
        let mut state = self.state.lock();
        if shader_type != gl::VERTEX_SHADER && shader_type != gl::FRAGMENT_SHADER {
            state.error(gl::INVALID_ENUM);
            return 0;
        }
        let name = state.gen_name(ObjectKind::Shader);
        state.shaders.insert(
            name,
            ShaderRecord {
                shader_type,
                ..ShaderRecord::default()
            },
        );
        name
    }

    fn delete(&mut self, kind: ObjectKind, name: NativeId) {
        let mut state = self.state.lock();
        state.calls.push(GlCall::Delete { kind, name });
        if name == 0 || !state.is_kind(name, kind) {
            return;
        }
        state.objects.remove(&name);
        state.bindings.retain(|_, bound| *bound != name);
        if state.current_program == name {
            state.current_program = 0;
        }
        if state.vertex_array == name {
            state.vertex_array = 0;
        }
        state.buffer_sizes.remove(&name);
        state.attachments.remove(&name);
        state.shaders.remove(&name);
        state.programs.remove(&name);
    }

    fn is_object(&mut self, kind: ObjectKind, name: NativeId) -> bool {
        name != 0 && self.state.lock().is_kind(name, kind)
    }

    fn bind(&mut self, kind: ObjectKind, target: u32, name: NativeId) {
        let mut state = self.state.lock();
        state.calls.push(GlCall::Bind { kind, target, name });
        if name != 0 && !state.is_kind(name, kind) {
            state.error(gl::INVALID_OPERATION);
            return;
        }
        match kind {
            ObjectKind::Program => {
                if name != 0 && !state.programs.get(&name).is_some_and(|p| p.linked) {
                    state.error(gl::INVALID_OPERATION);
                    return;
                }
                state.current_program = name;
            }
            ObjectKind::VertexArray => state.vertex_array = name,
            _ => {
                state.bindings.insert(target, name);
            }
        }
    }

    fn execute(&mut self, command: GlCommand) {
        let mut state = self.state.lock();
        state.apply(&command);
        state.calls.push(GlCall::Command(command));
    }

    fn get_string(&mut self, pname: u32) -> String {
        let state = self.state.lock();
        match pname {
            gl::VERSION => state.version.clone(),
            gl::VENDOR => "GLRELAY".to_owned(),
            gl::RENDERER => "GLRELAY recording backend".to_owned(),
            gl::SHADING_LANGUAGE_VERSION => {
                if state.version.contains("ES 3") {
                    "OpenGL ES GLSL ES 3.00".to_owned()
                } else {
                    "OpenGL ES GLSL ES 1.00".to_owned()
                }
            }
            _ => String::new(),
        }
    }

    fn get_integers(&mut self, pname: u32, out: &mut [i32]) {
        let state = self.state.lock();
        let name = |target| state.bound(target) as i32;
        match pname {
            gl::ARRAY_BUFFER_BINDING => fill(out, &[name(gl::ARRAY_BUFFER)]),
            gl::ELEMENT_ARRAY_BUFFER_BINDING => fill(out, &[name(gl::ELEMENT_ARRAY_BUFFER)]),
            gl::CURRENT_PROGRAM => fill(out, &[state.current_program as i32]),
            gl::DRAW_FRAMEBUFFER_BINDING => fill(out, &[name(gl::FRAMEBUFFER)]),
            gl::RENDERBUFFER_BINDING => fill(out, &[name(gl::RENDERBUFFER)]),
            gl::TEXTURE_BINDING_2D => fill(out, &[name(gl::TEXTURE_2D)]),
            gl::VERTEX_ARRAY_BINDING => fill(out, &[state.vertex_array as i32]),
            gl::ACTIVE_TEXTURE => fill(out, &[state.active_texture as i32]),
            gl::VIEWPORT => fill(out, &state.viewport),
            gl::SCISSOR_BOX => fill(out, &state.scissor),
            gl::MAX_VIEWPORT_DIMS => fill(out, &[4096, 4096]),
            gl::MAX_TEXTURE_SIZE => fill(out, &[4096]),
            gl::MAX_VERTEX_ATTRIBS => fill(out, &[16]),
            gl::UNPACK_ALIGNMENT => fill(out, &[4]),
            _ => out.fill(0),
        }
    }

    fn get_floats(&mut self, pname: u32, out: &mut [f32]) {
        let state = self.state.lock();
        match pname {
            gl::COLOR_CLEAR_VALUE => fill(out, &state.clear_color),
            gl::BLEND_COLOR => fill(out, &state.blend_color),
            gl::DEPTH_RANGE => fill(out, &state.depth_range),
            gl::DEPTH_CLEAR_VALUE => fill(out, &[state.depth_clear]),
            gl::LINE_WIDTH => fill(out, &[state.line_width]),
            gl::ALIASED_LINE_WIDTH_RANGE => fill(out, &[1.0, 1.0]),
            gl::ALIASED_POINT_SIZE_RANGE => fill(out, &[1.0, 1024.0]),
            gl::POLYGON_OFFSET_FACTOR => fill(out, &state.polygon_offset[..1]),
            gl::POLYGON_OFFSET_UNITS => fill(out, &state.polygon_offset[1..]),
            gl::SAMPLE_COVERAGE_VALUE => fill(out, &[1.0]),
            gl::MAX_TEXTURE_LOD_BIAS => fill(out, &[2.0]),
            _ => out.fill(0.0),
        }
    }

    fn get_booleans(&mut self, pname: u32, out: &mut [bool]) {
        let state = self.state.lock();
        match pname {
            gl::COLOR_WRITEMASK => fill(out, &state.color_mask),
            _ => fill(out, &[state.enabled.contains(&pname)]),
        }
    }

    fn get_error(&mut self) -> u32 {
        self.state.lock().errors.pop_front().unwrap_or(gl::NO_ERROR)
    }

    fn is_enabled(&mut self, cap: u32) -> bool {
        self.state.lock().enabled.contains(&cap)
    }

    fn check_framebuffer_status(&mut self, target: u32) -> u32 {
        let state = self.state.lock();
        let framebuffer = state.bound(target);
        if framebuffer == 0 {
            if state.headless {
                gl::FRAMEBUFFER_UNDEFINED
            } else {
                gl::FRAMEBUFFER_COMPLETE
            }
        } else if state.attachments.get(&framebuffer).copied().unwrap_or(0) > 0 {
            gl::FRAMEBUFFER_COMPLETE
        } else {
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
        }
    }

    fn get_buffer_parameter(&mut self, target: u32, pname: u32) -> i32 {
        let mut state = self.state.lock();
        let buffer = state.bound(target);
        if buffer == 0 {
            state.error(gl::INVALID_OPERATION);
            return 0;
        }
        match pname {
            gl::BUFFER_SIZE => state.buffer_sizes.get(&buffer).copied().unwrap_or(0) as i32,
            gl::BUFFER_USAGE => gl::STATIC_DRAW as i32,
            _ => {
                state.error(gl::INVALID_ENUM);
                0
            }
        }
    }

    fn get_program_parameter(&mut self, program: NativeId, pname: u32) -> i32 {
        let mut state = self.state.lock();
        let Some(record) = state.programs.get(&program) else {
            state.error(gl::INVALID_VALUE);
            return 0;
        };
        match pname {
            gl::LINK_STATUS => i32::from(record.linked),
            gl::VALIDATE_STATUS => i32::from(record.validated),
            gl::DELETE_STATUS => 0,
            gl::ATTACHED_SHADERS => record.attached.len() as i32,
            gl::INFO_LOG_LENGTH if record.info_log.is_empty() => 0,
            gl::INFO_LOG_LENGTH => record.info_log.len() as i32 + 1,
            _ => 0,
        }
    }

    fn get_shader_parameter(&mut self, shader: NativeId, pname: u32) -> i32 {
        let mut state = self.state.lock();
        let Some(record) = state.shaders.get(&shader) else {
            state.error(gl::INVALID_VALUE);
            return 0;
        };
        match pname {
            gl::COMPILE_STATUS => i32::from(record.compiled),
            gl::SHADER_TYPE => record.shader_type as i32,
            gl::DELETE_STATUS => 0,
            gl::SHADER_SOURCE_LENGTH if record.source.is_empty() => 0,
            gl::SHADER_SOURCE_LENGTH => record.source.len() as i32 + 1,
            gl::INFO_LOG_LENGTH if record.info_log.is_empty() => 0,
            gl::INFO_LOG_LENGTH => record.info_log.len() as i32 + 1,
            _ => 0,
        }
    }

    fn get_program_info_log(&mut self, program: NativeId) -> String {
        let state = self.state.lock();
        state
            .programs
            .get(&program)
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn get_shader_info_log(&mut self, shader: NativeId) -> String {
        let state = self.state.lock();
        state
            .shaders
            .get(&shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn get_shader_source(&mut self, shader: NativeId) -> String {
        let state = self.state.lock();
        state
            .shaders
            .get(&shader)
            .map(|s| s.source.clone())
            .unwrap_or_default()
    }

    fn get_attached_shaders(&mut self, program: NativeId) -> Vec<NativeId> {
        let state = self.state.lock();
        state
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    fn get_uniform_location(&mut self, program: NativeId, name: &str) -> i32 {
        let mut state = self.state.lock();
        if !state.programs.get(&program).is_some_and(|p| p.linked) {
            state.error(gl::INVALID_OPERATION);
            return -1;
        }
        let declared = state
            .attached_sources(program, None)
            .iter()
            .any(|source| !name.is_empty() && source.contains(name));
        if !declared {
            return -1;
        }
        let Some(record) = state.programs.get_mut(&program) else {
            return -1;
        };
        if let Some(index) = record.uniforms.iter().position(|u| u == name) {
            return index as i32;
        }
        record.uniforms.push(name.to_owned());
        record.uniforms.len() as i32 - 1
    }

    fn get_attrib_location(&mut self, program: NativeId, name: &str) -> i32 {
        let mut state = self.state.lock();
        if !state.programs.get(&program).is_some_and(|p| p.linked) {
            state.error(gl::INVALID_OPERATION);
            return -1;
        }
        let declared = state
            .attached_sources(program, Some(gl::VERTEX_SHADER))
            .iter()
            .any(|source| !name.is_empty() && source.contains(name));
        let Some(record) = state.programs.get_mut(&program) else {
            return -1;
        };
        if let Some((_, location)) = record.attribs.iter().find(|(n, _)| n == name) {
            return *location;
        }
        if !declared {
            return -1;
        }
        let location = record.attribs.iter().map(|(_, l)| l + 1).max().unwrap_or(0);
        record.attribs.push((name.to_owned(), location));
        location
    }

    fn get_active_info(&mut self, program: NativeId, kind: ActiveKind, index: u32) -> ActiveInfo {
        let mut state = self.state.lock();
        let Some(record) = state.programs.get(&program) else {
            state.error(gl::INVALID_VALUE);
            return ActiveInfo::default();
        };
        let list = match kind {
            ActiveKind::Attribute => &record.active_attribs,
            ActiveKind::Uniform => &record.active_uniforms,
        };
        match usize::try_from(index).ok().and_then(|i| list.get(i)) {
            Some(info) => info.clone(),
            None => {
                state.error(gl::INVALID_VALUE);
                ActiveInfo::default()
            }
        }
    }

    fn read_pixels(
        &mut self,
        _x: i32,
        _y: i32,
        _width: i32,
        _height: i32,
        format: u32,
        ty: u32,
        out: &mut [u8],
    ) {
        let state = self.state.lock();
        if format == gl::RGBA && ty == gl::UNSIGNED_BYTE {
            for pixel in out.chunks_exact_mut(4) {
                pixel.copy_from_slice(&state.framebuffer_color);
            }
        } else {
            out.fill(0);
        }
    }

    fn get_query_parameter(&mut self, _query: NativeId, pname: u32) -> u32 {
        u32::from(pname == gl::QUERY_RESULT_AVAILABLE)
    }
}
