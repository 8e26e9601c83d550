//! The invoker boundary: the one place errors from user code are caught.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use formkit_schema::Value;
use serde::Serialize;

use crate::error::InvocationError;
use crate::function::{Arguments, FunctionDef};

/// Outcome of one call to a registered function.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ExecutionResult {
  Success(Value),
  Failure(InvocationError),
}

impl ExecutionResult {
  pub fn is_success(&self) -> bool {
    matches!(self, ExecutionResult::Success(_))
  }

  pub fn value(&self) -> Option<&Value> {
    match self {
      ExecutionResult::Success(value) => Some(value),
      ExecutionResult::Failure(_) => None,
    }
  }

  pub fn error(&self) -> Option<&InvocationError> {
    match self {
      ExecutionResult::Success(_) => None,
      ExecutionResult::Failure(error) => Some(error),
    }
  }
}

/// Calls registered functions.
///
/// Whatever the function does, `invoke` returns: a raised [`FunctionError`]
/// and a panic both come back as [`ExecutionResult::Failure`].
///
/// [`FunctionError`]: crate::FunctionError
#[derive(Debug, Clone, Copy, Default)]
pub struct Invoker;

impl Invoker {
  pub fn new() -> Self {
    Self
  }

  /// Call `function` exactly once with `args`.
  pub fn invoke(&self, function: &FunctionDef, args: &Arguments) -> ExecutionResult {
    match catch_unwind(AssertUnwindSafe(|| function.call(args))) {
      Ok(Ok(value)) => ExecutionResult::Success(value),
      Ok(Err(error)) => ExecutionResult::Failure(InvocationError {
        message: error.message().to_string(),
        kind: error.kind().to_string(),
      }),
      Err(payload) => ExecutionResult::Failure(InvocationError {
        message: panic_message(payload.as_ref()),
        kind: "panic".to_string(),
      }),
    }
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "function panicked".to_string()
  }
}

#[cfg(test)]
mod tests {
  use formkit_schema::TypeAnnotation;

  use super::*;
  use crate::function::FunctionError;

  #[test]
  fn test_invoke_success() {
    let add = FunctionDef::new("add", |args| Ok(Value::Int(args.int("a")? + args.int("b")?)))
      .param("a", TypeAnnotation::Int)
      .param("b", TypeAnnotation::Int);

    let args = Arguments::new().with("a", 2i64).with("b", 3i64);
    assert_eq!(Invoker::new().invoke(&add, &args), ExecutionResult::Success(Value::Int(5)));
  }

  #[test]
  fn test_invoke_raised_error() {
    let bad = FunctionDef::new("bad", |_| Err(FunctionError::value_error("bad input")));

    let result = Invoker::new().invoke(&bad, &Arguments::new());
    assert_eq!(
      result,
      ExecutionResult::Failure(InvocationError {
        message: "bad input".to_string(),
        kind: "ValueError".to_string(),
      })
    );
  }

  #[test]
  fn test_invoke_catches_panics() {
    let divide = FunctionDef::new("divide", |args| {
      let b = args.int("b")?;
      if b == 0 {
        panic!("attempt to divide by zero");
      }
      Ok(Value::Int(args.int("a")? / b))
    });

    let args = Arguments::new().with("a", 1i64).with("b", 0i64);
    let result = Invoker::new().invoke(&divide, &args);

    let error = result.error().expect("panic should become a failure");
    assert_eq!(error.kind, "panic");
    assert_eq!(error.message, "attempt to divide by zero");
  }
}
