//! Argument unpacking for script calls.
//!
//! All checks happen on the issuing thread, before anything is enqueued.
//! Failures name the method and the argument position.

use glrelay_shared::{ObjectId, TypedArrayKind, Value};

use crate::error::{MethodError, MethodResult};

/// The arguments of one call, tagged with the method name.
#[derive(Clone, Copy, Debug)]
pub struct Args<'a> {
    method: &'static str,
    values: &'a [Value],
}

static UNDEFINED: Value = Value::Undefined;

impl<'a> Args<'a> {
    /// Wraps `values` for `method`.
    #[must_use]
    pub fn new(method: &'static str, values: &'a [Value]) -> Self {
        Self { method, values }
    }

    /// Method these arguments belong to.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Number of supplied arguments.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no arguments were supplied.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw argument, `undefined` past the end.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> &'a Value {
        self.values.get(index).unwrap_or(&UNDEFINED)
    }

    /// Builds the error for a bad argument at `index`.
    #[must_use]
    pub fn invalid(&self, index: usize, expected: &'static str) -> MethodError {
        MethodError::InvalidArgument {
            method: self.method,
            index,
            expected,
            got: self.get(index).type_name().to_owned(),
        }
    }

    /// A number. Booleans coerce to 0 or 1.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] for anything else.
    pub fn number(&self, index: usize) -> MethodResult<f64> {
        match self.get(index) {
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(f64::from(u8::from(*b))),
            _ => Err(self.invalid(index, "number")),
        }
    }

    /// A `GLenum`: a non-negative integral number.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] for anything else.
    pub fn glenum(&self, index: usize) -> MethodResult<u32> {
        let n = self.number(index)?;
        if n.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&n) {
            return Err(self.invalid(index, "GLenum"));
        }
        Ok(n as u32)
    }

    /// A `GLuint`, truncated.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] if not a number.
    pub fn uint(&self, index: usize) -> MethodResult<u32> {
        Ok(self.number(index)? as u32)
    }

    /// A `GLint`, truncated.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] if not a number.
    pub fn int(&self, index: usize) -> MethodResult<i32> {
        Ok(self.number(index)? as i32)
    }

    /// A `GLintptr` / `GLsizeiptr`, truncated.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] if not a number.
    pub fn intptr(&self, index: usize) -> MethodResult<i64> {
        Ok(self.number(index)? as i64)
    }

    /// A `GLfloat`.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] if not a number.
    pub fn float(&self, index: usize) -> MethodResult<f32> {
        Ok(self.number(index)? as f32)
    }

    /// A `GLboolean`. `null`/`undefined` are false, numbers are true when
    /// non-zero.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] for strings and objects.
    pub fn boolean(&self, index: usize) -> MethodResult<bool> {
        let value = self.get(index);
        if value.is_nullish() {
            return Ok(false);
        }
        value
            .as_bool()
            .or_else(|| value.as_number().map(|n| n != 0.0))
            .ok_or_else(|| self.invalid(index, "boolean"))
    }

    /// An object handle. `null`/`undefined` are the null handle.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] if not a handle or an integral
    /// number.
    pub fn object(&self, index: usize) -> MethodResult<ObjectId> {
        match self.get(index) {
            Value::Null | Value::Undefined => Ok(ObjectId::NULL),
            Value::Handle(id) => Ok(*id),
            Value::Number(n) if n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(n) => {
                Ok(ObjectId(*n as u32))
            }
            _ => Err(self.invalid(index, "object handle")),
        }
    }

    /// A string.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] if not a string.
    pub fn string(&self, index: usize) -> MethodResult<String> {
        self.get(index)
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.invalid(index, "string"))
    }

    /// The bytes of an `ArrayBuffer` or typed array, copied.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] for anything else.
    pub fn bytes(&self, index: usize) -> MethodResult<Vec<u8>> {
        self.get(index)
            .as_bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| self.invalid(index, "ArrayBuffer or typed array"))
    }

    /// Like [`bytes`](Self::bytes) but `null` gives `None`.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] for non-buffer values.
    pub fn optional_bytes(&self, index: usize) -> MethodResult<Option<Vec<u8>>> {
        if self.get(index).is_nullish() {
            Ok(None)
        } else {
            self.bytes(index).map(Some)
        }
    }

    /// A `Float32Array` or a plain array of numbers.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] for anything else.
    pub fn floats(&self, index: usize) -> MethodResult<Vec<f32>> {
        match self.get(index) {
            Value::TypedArray(array) if array.kind == TypedArrayKind::Float32 => {
                Ok(array.elements::<f32>())
            }
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_number().map(|n| n as f32))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| self.invalid(index, "Float32Array or number[]")),
            _ => Err(self.invalid(index, "Float32Array or number[]")),
        }
    }

    /// An `Int32Array` or a plain array of numbers.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] for anything else.
    pub fn ints(&self, index: usize) -> MethodResult<Vec<i32>> {
        match self.get(index) {
            Value::TypedArray(array) if array.kind == TypedArrayKind::Int32 => {
                Ok(array.elements::<i32>())
            }
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_number().map(|n| n as i32))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| self.invalid(index, "Int32Array or number[]")),
            _ => Err(self.invalid(index, "Int32Array or number[]")),
        }
    }

    /// An array of `GLenum`s.
    ///
    /// # Errors
    ///
    /// [`MethodError::InvalidArgument`] for anything else.
    pub fn enums(&self, index: usize) -> MethodResult<Vec<u32>> {
        match self.get(index) {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_number().map(|n| n as u32))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| self.invalid(index, "GLenum[]")),
            Value::TypedArray(array) if array.kind == TypedArrayKind::Uint32 => {
                Ok(array.elements::<u32>())
            }
            _ => Err(self.invalid(index, "GLenum[]")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glrelay_shared::TypedArray;

    #[test]
    fn test_numbers_and_coercions() {
        let values = [Value::Number(3.9), Value::Bool(true), Value::from("x")];
        let args = Args::new("lineWidth", &values);

        assert_eq!(args.int(0).unwrap(), 3);
        assert!((args.number(1).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(args.boolean(0).unwrap());
        assert!(!args.boolean(5).unwrap());

        let err = args.float(2).unwrap_err();
        assert_eq!(
            err,
            MethodError::InvalidArgument {
                method: "lineWidth",
                index: 2,
                expected: "number",
                got: "string".into(),
            }
        );
    }

    #[test]
    fn test_glenum_rejects_fractions_and_negatives() {
        let values = [Value::Number(0x8892 as f64), Value::Number(1.5), Value::Number(-1.0)];
        let args = Args::new("bindBuffer", &values);
        assert_eq!(args.glenum(0).unwrap(), 0x8892);
        assert!(args.glenum(1).is_err());
        assert!(args.glenum(2).is_err());
    }

    #[test]
    fn test_object_accepts_null_numbers_and_handles() {
        let values = [Value::Null, Value::Number(7.0), Value::Handle(ObjectId(9)), Value::Bool(true)];
        let args = Args::new("bindBuffer", &values);
        assert_eq!(args.object(0).unwrap(), ObjectId::NULL);
        assert_eq!(args.object(1).unwrap(), ObjectId(7));
        assert_eq!(args.object(2).unwrap(), ObjectId(9));
        assert!(args.object(3).is_err());
    }

    #[test]
    fn test_float_arrays() {
        let values = [
            Value::TypedArray(TypedArray::from_f32s(&[1.0, 2.0])),
            Value::Array(vec![Value::Number(3.0), Value::Number(4.0)]),
            Value::TypedArray(TypedArray::from_i32s(&[1])),
        ];
        let args = Args::new("uniform2fv", &values);
        assert_eq!(args.floats(0).unwrap(), vec![1.0, 2.0]);
        assert_eq!(args.floats(1).unwrap(), vec![3.0, 4.0]);
        assert!(args.floats(2).is_err());
        assert_eq!(args.ints(2).unwrap(), vec![1]);
    }
}
