//! Formkit Schema
//!
//! Describes registered functions in terms the form engine understands:
//! declared [`TypeAnnotation`]s, the closed set of [`FieldKind`]s they resolve
//! to, and the per-function [`FormSchema`] derived once at registration.
//!
//! Resolution is a pure, total function: every annotation maps onto some kind,
//! with [`FieldKind::Fallback`] catching everything the engine cannot
//! represent.

mod annotation;
mod kind;
mod param;
mod schema;
mod value;

pub use annotation::{Literal, TypeAnnotation};
pub use kind::{FieldKind, resolve, resolve_optional};
pub use param::ParameterSpec;
pub use schema::{FieldSpec, FormSchema};
pub use value::{Table, Value};
