//! # Dynamic Values
//!
//! The scripting layer hands every method a list of untyped values and
//! expects one untyped value back. [`Value`] is that currency. Conversion to
//! strongly typed arguments happens in `glrelay_core::args`, never here.

use std::collections::BTreeMap;
use std::mem::size_of;

use bytemuck::Pod;

use crate::ids::ObjectId;

/// Element type of a [`TypedArray`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
    /// `Int8Array`
    Int8,
    /// `Uint8Array`
    Uint8,
    /// `Uint8ClampedArray`
    Uint8Clamped,
    /// `Int16Array`
    Int16,
    /// `Uint16Array`
    Uint16,
    /// `Int32Array`
    Int32,
    /// `Uint32Array`
    Uint32,
    /// `Float32Array`
    Float32,
    /// `Float64Array`
    Float64,
}

impl TypedArrayKind {
    /// Size of one element in bytes.
    #[must_use]
    pub const fn element_size(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 | Self::Uint8Clamped => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }
}

/// A typed view over an owned byte buffer.
///
/// Bytes are stored in native endianness, exactly as a script engine would
/// expose the backing `ArrayBuffer`.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedArray {
    /// Element type.
    pub kind: TypedArrayKind,
    /// Backing bytes.
    pub bytes: Vec<u8>,
}

impl TypedArray {
    /// Creates a `Float32Array`.
    #[must_use]
    pub fn from_f32s(values: &[f32]) -> Self {
        Self {
            kind: TypedArrayKind::Float32,
            bytes: bytemuck::cast_slice(values).to_vec(),
        }
    }

    /// Creates an `Int32Array`.
    #[must_use]
    pub fn from_i32s(values: &[i32]) -> Self {
        Self {
            kind: TypedArrayKind::Int32,
            bytes: bytemuck::cast_slice(values).to_vec(),
        }
    }

    /// Creates a `Uint8Array`.
    #[must_use]
    pub fn from_u8s(values: &[u8]) -> Self {
        Self {
            kind: TypedArrayKind::Uint8,
            bytes: values.to_vec(),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() / self.kind.element_size()
    }

    /// Returns true if the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reinterprets the backing bytes as elements of `T`.
    ///
    /// Trailing bytes that do not form a whole element are ignored.
    #[must_use]
    pub fn elements<T: Pod>(&self) -> Vec<T> {
        self.bytes
            .chunks_exact(size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }
}

/// An untyped value as seen by the scripting layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// A boolean.
    Bool(bool),
    /// Any number. Scripts have no integer type.
    Number(f64),
    /// A UTF-8 string.
    String(String),
    /// An untyped `ArrayBuffer`.
    ArrayBuffer(Vec<u8>),
    /// A typed view (`Float32Array`, ...).
    TypedArray(TypedArray),
    /// A plain array.
    Array(Vec<Value>),
    /// A plain object with string keys.
    Object(BTreeMap<String, Value>),
    /// A resource handle tagged as such by the binding layer.
    Handle(ObjectId),
}

impl Value {
    /// Returns true for `null` and `undefined`.
    #[inline]
    #[must_use]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Returns the number if this is a [`Value::Number`].
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the bytes behind an `ArrayBuffer` or any typed array.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ArrayBuffer(bytes) => Some(bytes),
            Self::TypedArray(array) => Some(&array.bytes),
            _ => None,
        }
    }

    /// Short name of the variant, used in usage-error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::ArrayBuffer(_) => "ArrayBuffer",
            Self::TypedArray(_) => "TypedArray",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Handle(_) => "handle",
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Handles cross the boundary as plain numbers; the null handle is `null`.
impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        if id.is_null() {
            Self::Null
        } else {
            Self::Number(f64::from(id.0))
        }
    }
}

impl From<TypedArray> for Value {
    fn from(array: TypedArray) -> Self {
        Self::TypedArray(array)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::Array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_array_roundtrips_floats() {
        let array = TypedArray::from_f32s(&[1.0, -2.5, 3.25]);
        assert_eq!(array.kind, TypedArrayKind::Float32);
        assert_eq!(array.len(), 3);
        assert_eq!(array.elements::<f32>(), vec![1.0, -2.5, 3.25]);
    }

    #[test]
    fn test_elements_ignores_trailing_bytes() {
        let array = TypedArray {
            kind: TypedArrayKind::Uint8,
            bytes: vec![1, 0, 0, 0, 9],
        };
        assert_eq!(array.elements::<u32>(), vec![1]);
    }

    #[test]
    fn test_null_handle_becomes_null() {
        assert_eq!(Value::from(ObjectId::NULL), Value::Null);
        assert_eq!(Value::from(ObjectId(4)), Value::Number(4.0));
    }

    #[test]
    fn test_as_bytes_accepts_both_buffer_kinds() {
        let raw = Value::ArrayBuffer(vec![1, 2]);
        let typed = Value::from(TypedArray::from_u8s(&[3, 4]));
        assert_eq!(raw.as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(typed.as_bytes(), Some(&[3u8, 4][..]));
        assert_eq!(Value::Null.as_bytes(), None);
    }
}
