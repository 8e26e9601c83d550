//! A registered function together with its derived form schema.

use formkit_coerce::{BindError, RawInputs, RenderSpec, bind, present};
use formkit_schema::{FieldSpec, FormSchema, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::capture::{LogCapture, LogRecord};
use crate::error::FieldError;
use crate::function::{Arguments, FunctionDef, FunctionError};
use crate::invoker::{ExecutionResult, Invoker};
use crate::renderer::Renderer;

/// The result of one completed invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
  pub result: ExecutionResult,
  /// How to display a successful result. `None` on failure.
  pub output: Option<RenderSpec>,
  /// Records captured during the call, in emission order.
  pub logs: Vec<LogRecord>,
}

/// What one submission cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
  /// At least one field failed to bind; the function was not called.
  Rejected(Vec<FieldError>),
  /// The function was called.
  Completed(Outcome),
}

impl Submission {
  pub fn outcome(&self) -> Option<&Outcome> {
    match self {
      Submission::Completed(outcome) => Some(outcome),
      Submission::Rejected(_) => None,
    }
  }

  pub fn field_errors(&self) -> &[FieldError] {
    match self {
      Submission::Rejected(errors) => errors,
      Submission::Completed(_) => &[],
    }
  }
}

/// One function exposed as a form.
///
/// The schema is derived once here and never changes afterwards. Nothing from
/// one submission carries over to the next.
#[derive(Debug, Clone)]
pub struct ComponentForm {
  label: String,
  function: FunctionDef,
  schema: FormSchema,
  invoker: Invoker,
}

impl ComponentForm {
  pub fn new(function: FunctionDef) -> Self {
    let schema = FormSchema::derive(function.params(), function.return_annotation());

    for field in schema.unsupported_inputs() {
      warn!(
        form = function.name(),
        param = field.name(),
        kind = %field.kind,
        "parameter cannot be collected as input"
      );
    }

    Self {
      label: display_name(function.name()),
      function,
      schema,
      invoker: Invoker::new(),
    }
  }

  /// Form identifier: the function name.
  pub fn id(&self) -> &str {
    self.function.name()
  }

  /// Navigation label, e.g. `Count words` for `count_words`.
  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn description(&self) -> Option<&str> {
    self.function.doc()
  }

  pub fn schema(&self) -> &FormSchema {
    &self.schema
  }

  pub fn function(&self) -> &FunctionDef {
    &self.function
  }

  /// Call the wrapped function directly, bypassing the form.
  pub fn call(&self, args: &Arguments) -> Result<Value, FunctionError> {
    self.function.call(args)
  }

  /// Bind every field's raw value, in declared order.
  ///
  /// Reports every failing field rather than stopping at the first.
  pub fn bind(&self, mut raw: RawInputs) -> Result<Arguments, Vec<FieldError>> {
    let mut args = Arguments::new();
    let mut errors = Vec::new();

    for field in self.schema.fields() {
      match bind_field(field, raw.take(field.name())) {
        Ok(value) => args.push(field.name(), value),
        Err(error) => errors.push(FieldError {
          name: field.name().to_string(),
          error,
        }),
      }
    }

    if errors.is_empty() {
      Ok(args)
    } else {
      Err(errors)
    }
  }

  /// Run one submission: bind, invoke, present.
  ///
  /// With `capture`, log records emitted by the function are collected for
  /// exactly the duration of the call.
  #[instrument(
    name = "form_submit",
    skip(self, raw, capture),
    fields(form = %self.id(), submission_id = %Uuid::new_v4())
  )]
  pub fn submit(&self, raw: RawInputs, capture: Option<&LogCapture>) -> Submission {
    let args = match self.bind(raw) {
      Ok(args) => args,
      Err(errors) => {
        let fields: Vec<&str> = errors.iter().map(|e| e.name.as_str()).collect();
        warn!(fields = ?fields, "submission rejected");
        return Submission::Rejected(errors);
      }
    };

    info!(args = ?args.names(), "invocation started");

    let (result, logs) = match capture {
      Some(capture) => capture.run(|| self.invoker.invoke(&self.function, &args)),
      None => (self.invoker.invoke(&self.function, &args), Vec::new()),
    };

    let output = match &result {
      ExecutionResult::Success(value) => {
        info!(captured = logs.len(), "invocation completed");
        Some(present(self.schema.return_kind(), value))
      }
      ExecutionResult::Failure(error) => {
        warn!(kind = %error.kind, error = %error.message, "invocation failed");
        None
      }
    };

    Submission::Completed(Outcome {
      result,
      output,
      logs,
    })
  }

  /// One full render pass of this form.
  ///
  /// Returns `None` when the form was drawn but not submitted.
  pub fn render(&self, renderer: &mut dyn Renderer, capture: Option<&LogCapture>) -> Option<Submission> {
    renderer.draw_header(&self.label, self.description());

    let mut raw = RawInputs::new();
    for field in self.schema.fields() {
      if field.collectable() {
        let value = renderer.draw_input(&field.kind, field.name(), field.param.default.as_ref());
        raw.insert(field.name(), value);
      } else {
        let reason = format!("{} parameters are not supported as input", field.kind);
        renderer.draw_disabled(field.name(), &reason);
      }
    }

    if !renderer.submitted() {
      return None;
    }

    let submission = self.submit(raw, capture);
    match &submission {
      Submission::Rejected(errors) => {
        for error in errors {
          renderer.draw_field_error(&error.name, &error.error);
        }
      }
      Submission::Completed(outcome) => {
        match (&outcome.result, &outcome.output) {
          (ExecutionResult::Success(_), Some(spec)) => renderer.draw_output(spec),
          (ExecutionResult::Failure(error), _) => renderer.draw_error(&error.to_string()),
          (ExecutionResult::Success(_), None) => renderer.draw_output(&RenderSpec::Empty),
        }
        renderer.draw_logs(&outcome.logs);
      }
    }

    Some(submission)
  }
}

fn bind_field(field: &FieldSpec, raw: formkit_coerce::RawValue) -> Result<Value, BindError> {
  let default = field.param.default.as_ref();

  // A field no widget can collect still works when it has a default.
  if !field.collectable() {
    return match default {
      Some(value) => Ok(value.clone()),
      None => Err(BindError::UnsupportedOperation {
        kind: field.kind.name(),
      }),
    };
  }

  match (raw.is_missing(), default) {
    (true, Some(value)) => Ok(value.clone()),
    _ => bind(&field.kind, raw),
  }
}

/// Humanize a function name: `count__words` and `count_words` both become
/// `Count words`.
pub fn display_name(name: &str) -> String {
  let spaced = name.replace("__", "_").replace('_', " ");
  let mut chars = spaced.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use formkit_coerce::{CoercionError, RawValue};
  use formkit_schema::TypeAnnotation;

  use super::*;

  fn add() -> FunctionDef {
    FunctionDef::new("add", |args| Ok(Value::Int(args.int("a")? + args.int("b")?)))
      .param("a", TypeAnnotation::Int)
      .param("b", TypeAnnotation::Int)
      .returns(TypeAnnotation::Int)
      .with_doc("Adds two numbers together")
  }

  #[test]
  fn test_display_name() {
    assert_eq!(display_name("count_words"), "Count words");
    assert_eq!(display_name("get_datetime_diff"), "Get datetime diff");
    assert_eq!(display_name("Add"), "Add");
    assert_eq!(display_name("count__words"), "Count words");
    assert_eq!(display_name(""), "");
  }

  #[test]
  fn test_submit_add() {
    let form = ComponentForm::new(add());
    let raw = RawInputs::new()
      .with("a", RawValue::text("2"))
      .with("b", RawValue::text("3"));

    let submission = form.submit(raw, None);
    let outcome = submission.outcome().expect("should complete");
    assert_eq!(outcome.result, ExecutionResult::Success(Value::Int(5)));
    assert_eq!(outcome.output, Some(RenderSpec::Value(Value::Int(5))));
    assert!(outcome.logs.is_empty());
  }

  #[test]
  fn test_bind_reports_every_failing_field() {
    let form = ComponentForm::new(add());
    let raw = RawInputs::new().with("a", RawValue::text("two"));

    let errors = form.bind(raw).unwrap_err();
    let names: Vec<&str> = errors.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(errors[1].error, BindError::Coercion(CoercionError::Missing));
  }

  #[test]
  fn test_missing_value_uses_default() {
    let function = FunctionDef::new("greet", |args| {
      Ok(Value::Text(format!("{}, {}", args.text("greeting")?, args.text("name")?)))
    })
    .param("name", TypeAnnotation::Str)
    .param_with_default("greeting", TypeAnnotation::Str, "Hello");
    let form = ComponentForm::new(function);

    let raw = RawInputs::new().with("name", RawValue::text("Ada"));
    let outcome = form.submit(raw, None);
    assert_eq!(
      outcome.outcome().map(|o| &o.result),
      Some(&ExecutionResult::Success(Value::Text("Hello, Ada".to_string())))
    );
  }

  #[test]
  fn test_unsupported_parameter_without_default_blocks_invocation() {
    let function = FunctionDef::new("store", |_| Ok(Value::Null)).param("data", TypeAnnotation::Bytes);
    let form = ComponentForm::new(function);

    assert_eq!(form.schema().unsupported_inputs().count(), 1);

    let submission = form.submit(RawInputs::new(), None);
    assert_eq!(
      submission.field_errors()[0].error,
      BindError::UnsupportedOperation { kind: "fallback" }
    );
  }

  #[test]
  fn test_unsupported_parameter_with_default_binds_default() {
    let function = FunctionDef::new("echo", |args| Ok(args.get("target").cloned().unwrap_or(Value::Null)))
      .param_with_default("target", TypeAnnotation::Path, std::path::PathBuf::from("/tmp/out"));
    let form = ComponentForm::new(function);

    let outcome = form.submit(RawInputs::new(), None);
    assert_eq!(
      outcome.outcome().map(|o| &o.result),
      Some(&ExecutionResult::Success(Value::Path("/tmp/out".into())))
    );
  }

  #[test]
  fn test_form_still_callable_directly() {
    let form = ComponentForm::new(add());
    let args = Arguments::new().with("a", 1i64).with("b", 5i64);
    assert_eq!(form.call(&args).unwrap(), Value::Int(6));
    assert_eq!(form.id(), "add");
    assert_eq!(form.label(), "Add");
    assert_eq!(form.description(), Some("Adds two numbers together"));
  }
}
