//! # Identifiers
//!
//! Every id crosses the scripting boundary as a plain number. `0` is
//! reserved in all three id spaces to mean "nothing".

use std::fmt;

/// Name the graphics driver gave to a resource (`GLuint`).
pub type NativeId = u32;

/// Caller-visible resource handle, allocated before the resource exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The "no resource" handle.
    pub const NULL: Self = Self(0);

    /// Returns true for the "no resource" handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Opaque id of a rendering context inside a registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(pub u32);

impl ContextId {
    /// Returned when a context could not be created.
    pub const INVALID: Self = Self(0);

    /// Returns true unless this is [`ContextId::INVALID`].
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_reserved() {
        assert!(ObjectId::NULL.is_null());
        assert!(!ObjectId(7).is_null());
        assert!(!ContextId::INVALID.is_valid());
        assert!(ContextId(1).is_valid());
    }

    #[test]
    fn test_display() {
        assert_eq!(ObjectId(3).to_string(), "object#3");
        assert_eq!(ContextId(12).to_string(), "context#12");
    }
}
