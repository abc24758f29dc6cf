//! # GLRELAY Shared
//!
//! Types that cross the boundary between the scripting layer and the
//! command engine.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - threading primitives
//! - a graphics backend
//!
//! If you need either, put it in `glrelay_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod attributes;
pub mod constants;
pub mod ids;
pub mod value;

pub use attributes::ContextAttributes;
pub use ids::{ContextId, NativeId, ObjectId};
pub use value::{TypedArray, TypedArrayKind, Value};
