//! # GL Constants
//!
//! The subset of OpenGL ES / WebGL enum values the engine inspects, plus the
//! WebGL-only values that OpenGL ES lacks.
//!
//! Every constant is also listed in [`ALL`] so the binding layer can install
//! them on the script-side context object by name.

macro_rules! gl_constants {
    ($($name:ident = $value:expr),* $(,)?) => {
        $(
            #[doc = concat!("`GL_", stringify!($name), "`")]
            pub const $name: u32 = $value;
        )*

        /// Every constant by its script-visible name.
        pub const ALL: &[(&str, u32)] = &[$((stringify!($name), $name)),*];
    };
}

gl_constants! {
    // Errors
    NO_ERROR = 0,
    INVALID_ENUM = 0x0500,
    INVALID_VALUE = 0x0501,
    INVALID_OPERATION = 0x0502,

    // Clear masks
    DEPTH_BUFFER_BIT = 0x0100,
    STENCIL_BUFFER_BIT = 0x0400,
    COLOR_BUFFER_BIT = 0x4000,

    // Primitives
    POINTS = 0x0000,
    LINES = 0x0001,
    LINE_STRIP = 0x0003,
    TRIANGLES = 0x0004,
    TRIANGLE_STRIP = 0x0005,
    TRIANGLE_FAN = 0x0006,

    // Blending / depth
    ZERO = 0,
    ONE = 1,
    SRC_ALPHA = 0x0302,
    ONE_MINUS_SRC_ALPHA = 0x0303,
    FUNC_ADD = 0x8006,
    NEVER = 0x0200,
    LESS = 0x0201,
    EQUAL = 0x0202,
    LEQUAL = 0x0203,
    ALWAYS = 0x0207,
    FRONT = 0x0404,
    BACK = 0x0405,
    FRONT_AND_BACK = 0x0408,
    CW = 0x0900,
    CCW = 0x0901,

    // Capabilities
    CULL_FACE = 0x0B44,
    DEPTH_TEST = 0x0B71,
    STENCIL_TEST = 0x0B90,
    DITHER = 0x0BD0,
    BLEND = 0x0BE2,
    SCISSOR_TEST = 0x0C11,
    POLYGON_OFFSET_FILL = 0x8037,
    SAMPLE_ALPHA_TO_COVERAGE = 0x809E,
    SAMPLE_COVERAGE = 0x80A0,
    RASTERIZER_DISCARD = 0x8C89,

    // getParameter names
    LINE_WIDTH = 0x0B21,
    DEPTH_RANGE = 0x0B70,
    DEPTH_CLEAR_VALUE = 0x0B73,
    VIEWPORT = 0x0BA2,
    SCISSOR_BOX = 0x0C10,
    COLOR_CLEAR_VALUE = 0x0C22,
    COLOR_WRITEMASK = 0x0C23,
    UNPACK_ALIGNMENT = 0x0CF5,
    MAX_TEXTURE_SIZE = 0x0D33,
    MAX_VIEWPORT_DIMS = 0x0D3A,
    POLYGON_OFFSET_UNITS = 0x2A00,
    BLEND_COLOR = 0x8005,
    POLYGON_OFFSET_FACTOR = 0x8038,
    SAMPLE_COVERAGE_VALUE = 0x80AA,
    ALIASED_POINT_SIZE_RANGE = 0x846D,
    ALIASED_LINE_WIDTH_RANGE = 0x846E,
    ACTIVE_TEXTURE = 0x84E0,
    MAX_TEXTURE_LOD_BIAS = 0x84FD,
    COMPRESSED_TEXTURE_FORMATS = 0x86A3,
    VENDOR = 0x1F00,
    RENDERER = 0x1F01,
    VERSION = 0x1F02,
    SHADING_LANGUAGE_VERSION = 0x8B8C,
    TRANSFORM_FEEDBACK_PAUSED = 0x8E23,
    TRANSFORM_FEEDBACK_ACTIVE = 0x8E24,

    // Binding queries
    ARRAY_BUFFER_BINDING = 0x8894,
    ELEMENT_ARRAY_BUFFER_BINDING = 0x8895,
    CURRENT_PROGRAM = 0x8B8D,
    TEXTURE_BINDING_2D = 0x8069,
    TEXTURE_BINDING_3D = 0x806A,
    TEXTURE_BINDING_CUBE_MAP = 0x8514,
    TEXTURE_BINDING_2D_ARRAY = 0x8C1D,
    VERTEX_ARRAY_BINDING = 0x85B5,
    SAMPLER_BINDING = 0x8919,
    UNIFORM_BUFFER_BINDING = 0x8A28,
    TRANSFORM_FEEDBACK_BUFFER_BINDING = 0x8C8F,
    TRANSFORM_FEEDBACK_BINDING = 0x8E25,
    COPY_READ_BUFFER_BINDING = 0x8F36,
    COPY_WRITE_BUFFER_BINDING = 0x8F37,
    DRAW_FRAMEBUFFER_BINDING = 0x8CA6,
    RENDERBUFFER_BINDING = 0x8CA7,
    READ_FRAMEBUFFER_BINDING = 0x8CAA,

    // Buffers
    BUFFER_SIZE = 0x8764,
    BUFFER_USAGE = 0x8765,
    ARRAY_BUFFER = 0x8892,
    ELEMENT_ARRAY_BUFFER = 0x8893,
    STREAM_DRAW = 0x88E0,
    STATIC_DRAW = 0x88E4,
    DYNAMIC_DRAW = 0x88E8,
    UNIFORM_BUFFER = 0x8A11,
    TRANSFORM_FEEDBACK_BUFFER = 0x8C8E,

    // Data types
    BYTE = 0x1400,
    UNSIGNED_BYTE = 0x1401,
    SHORT = 0x1402,
    UNSIGNED_SHORT = 0x1403,
    INT = 0x1404,
    UNSIGNED_INT = 0x1405,
    FLOAT = 0x1406,
    HALF_FLOAT = 0x140B,
    UNSIGNED_SHORT_4_4_4_4 = 0x8033,
    UNSIGNED_SHORT_5_5_5_1 = 0x8034,
    UNSIGNED_SHORT_5_6_5 = 0x8363,
    UNSIGNED_INT_24_8 = 0x84FA,

    // Pixel formats
    STENCIL_INDEX = 0x1901,
    DEPTH_COMPONENT = 0x1902,
    RED = 0x1903,
    ALPHA = 0x1906,
    RGB = 0x1907,
    RGBA = 0x1908,
    LUMINANCE = 0x1909,
    LUMINANCE_ALPHA = 0x190A,
    RG = 0x8227,
    RG_INTEGER = 0x8228,
    DEPTH_STENCIL = 0x84F9,
    RED_INTEGER = 0x8D94,
    RGB_INTEGER = 0x8D98,
    RGBA_INTEGER = 0x8D99,
    RGBA4 = 0x8056,
    DEPTH_COMPONENT16 = 0x81A5,

    // Textures
    NEAREST = 0x2600,
    LINEAR = 0x2601,
    TEXTURE_MAG_FILTER = 0x2800,
    TEXTURE_MIN_FILTER = 0x2801,
    TEXTURE_WRAP_S = 0x2802,
    TEXTURE_WRAP_T = 0x2803,
    TEXTURE_2D = 0x0DE1,
    TEXTURE_CUBE_MAP = 0x8513,
    TEXTURE0 = 0x84C0,
    CLAMP_TO_EDGE = 0x812F,

    // Framebuffers
    FRAMEBUFFER_UNDEFINED = 0x8219,
    FRAMEBUFFER_COMPLETE = 0x8CD5,
    FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT = 0x8CD7,
    COLOR_ATTACHMENT0 = 0x8CE0,
    DEPTH_ATTACHMENT = 0x8D00,
    STENCIL_ATTACHMENT = 0x8D20,
    READ_FRAMEBUFFER = 0x8CA8,
    DRAW_FRAMEBUFFER = 0x8CA9,
    RGBA8 = 0x8058,
    FRAMEBUFFER = 0x8D40,
    RENDERBUFFER = 0x8D41,

    // Shaders and programs
    FRAGMENT_SHADER = 0x8B30,
    VERTEX_SHADER = 0x8B31,
    SHADER_TYPE = 0x8B4F,
    DELETE_STATUS = 0x8B80,
    COMPILE_STATUS = 0x8B81,
    LINK_STATUS = 0x8B82,
    VALIDATE_STATUS = 0x8B83,
    INFO_LOG_LENGTH = 0x8B84,
    ATTACHED_SHADERS = 0x8B85,
    ACTIVE_UNIFORMS = 0x8B86,
    SHADER_SOURCE_LENGTH = 0x8B88,
    ACTIVE_ATTRIBUTES = 0x8B89,

    // Active uniform and attribute types
    FLOAT_VEC2 = 0x8B50,
    FLOAT_VEC3 = 0x8B51,
    FLOAT_VEC4 = 0x8B52,
    INT_VEC2 = 0x8B53,
    INT_VEC3 = 0x8B54,
    INT_VEC4 = 0x8B55,
    BOOL = 0x8B56,
    FLOAT_MAT2 = 0x8B5A,
    FLOAT_MAT3 = 0x8B5B,
    FLOAT_MAT4 = 0x8B5C,
    SAMPLER_2D = 0x8B5E,
    SAMPLER_CUBE = 0x8B60,
    MAX_VERTEX_ATTRIBS = 0x8869,

    // Queries
    CURRENT_QUERY = 0x8865,
    QUERY_RESULT = 0x8866,
    QUERY_RESULT_AVAILABLE = 0x8867,
    ANY_SAMPLES_PASSED = 0x8C2F,
    TRANSFORM_FEEDBACK = 0x8E22,

    // WebGL-only
    UNPACK_FLIP_Y_WEBGL = 0x9240,
    UNPACK_PREMULTIPLY_ALPHA_WEBGL = 0x9241,
    CONTEXT_LOST_WEBGL = 0x9242,
    UNPACK_COLORSPACE_CONVERSION_WEBGL = 0x9243,
    BROWSER_DEFAULT_WEBGL = 0x9244,
}

/// Looks up a constant by its script-visible name.
#[must_use]
pub fn by_name(name: &str) -> Option<u32> {
    ALL.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(by_name("ARRAY_BUFFER"), Some(ARRAY_BUFFER));
        assert_eq!(by_name("UNPACK_FLIP_Y_WEBGL"), Some(0x9240));
        assert_eq!(by_name("NOT_A_CONSTANT"), None);
    }
}
