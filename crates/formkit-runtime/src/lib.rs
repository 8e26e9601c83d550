//! Form runtime for formkit.
//!
//! Wraps plain functions as [`ComponentForm`]s, collects their inputs through
//! a [`Renderer`], calls them at an [`Invoker`] boundary that never lets an
//! error escape, and optionally captures the log records they emit.
//!
//! ```ignore
//! let mut app = App::new(AppConfig::new("Tools").use_logging(true));
//! app.register(
//!   FunctionDef::new("add", |args| Ok(Value::Int(args.int("a")? + args.int("b")?)))
//!     .param("a", TypeAnnotation::Int)
//!     .param("b", TypeAnnotation::Int)
//!     .returns(TypeAnnotation::Int),
//! )?;
//! app.render(&mut my_renderer)?;
//! ```

mod app;
mod capture;
mod config;
mod error;
mod form;
mod function;
mod invoker;
mod renderer;

pub use app::App;
pub use capture::{LogCapture, LogRecord};
pub use config::{AppConfig, Layout, LogLevel};
pub use error::{FieldError, InvocationError, RegistryError};
pub use form::{ComponentForm, Outcome, Submission, display_name};
pub use function::{Arguments, FunctionBody, FunctionDef, FunctionError};
pub use invoker::{ExecutionResult, Invoker};
pub use renderer::{NavEntry, Renderer, Sidebar};
