//! Context creation attributes reported by `getContextAttributes`.

use serde::{Deserialize, Serialize};

/// Drawing-buffer attributes of a context.
///
/// The defaults match what the native surfaces actually provide; they are
/// reported, not negotiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextAttributes {
    /// Drawing buffer has an alpha channel.
    pub alpha: bool,
    /// Drawing buffer has a depth buffer.
    pub depth: bool,
    /// Drawing buffer has a stencil buffer.
    pub stencil: bool,
    /// Drawing buffer is multisampled.
    pub antialias: bool,
    /// Colors in the drawing buffer are premultiplied by alpha.
    pub premultiplied_alpha: bool,
}

impl Default for ContextAttributes {
    fn default() -> Self {
        Self {
            alpha: true,
            depth: true,
            stencil: false,
            antialias: false,
            premultiplied_alpha: false,
        }
    }
}
