//! Formkit Coerce
//!
//! The two directions of value coercion between widgets and functions:
//!
//! - [`bind`]: a [`RawValue`] handed back by an input widget becomes a typed
//!   [`Value`](formkit_schema::Value) matching the parameter's field kind, or a
//!   [`BindError`] explaining why it cannot.
//! - [`present`]: a function's return value becomes a [`RenderSpec`] telling the
//!   renderer which view to use.

mod bind;
mod error;
mod present;
mod raw;

pub use bind::bind;
pub use error::{BindError, CoercionError};
pub use present::{RenderSpec, present};
pub use raw::{RawInputs, RawValue};
