//! Registered functions, their arguments, and the errors they raise.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use formkit_schema::{ParameterSpec, TypeAnnotation, Value};

/// The body of a registered function.
pub type FunctionBody = dyn Fn(&Arguments) -> Result<Value, FunctionError> + Send + Sync;

/// An error raised by a registered function.
///
/// Raising is how a function rejects input it considers invalid. Any
/// [`std::error::Error`] converts into a `FunctionError` with `?`, taking the
/// error's type name as its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionError {
  kind: String,
  message: String,
}

impl FunctionError {
  pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      message: message.into(),
    }
  }

  /// An argument had the right type but an unacceptable value.
  pub fn value_error(message: impl Into<String>) -> Self {
    Self::new("ValueError", message)
  }

  /// An argument had the wrong type.
  pub fn type_error(message: impl Into<String>) -> Self {
    Self::new("TypeError", message)
  }

  pub fn kind(&self) -> &str {
    &self.kind
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

impl fmt::Display for FunctionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.kind, self.message)
  }
}

impl<E> From<E> for FunctionError
where
  E: std::error::Error + 'static,
{
  fn from(error: E) -> Self {
    Self::new(short_type_name::<E>(), error.to_string())
  }
}

/// `core::num::error::ParseIntError` -> `ParseIntError`.
fn short_type_name<T: ?Sized>() -> &'static str {
  let full = std::any::type_name::<T>();
  let base = full.split('<').next().unwrap_or(full);
  base.rsplit("::").next().unwrap_or(base)
}

/// Bound arguments, in declared parameter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
  values: Vec<(String, Value)>,
}

impl Arguments {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, name: impl Into<String>, value: Value) {
    self.values.push((name.into(), value));
  }

  /// Builder-style push.
  pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.push(name, value.into());
    self
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self
      .values
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.values.iter().map(|(n, v)| (n.as_str(), v))
  }

  pub fn names(&self) -> Vec<&str> {
    self.values.iter().map(|(n, _)| n.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  fn require(&self, name: &str) -> Result<&Value, FunctionError> {
    self
      .get(name)
      .ok_or_else(|| FunctionError::new("KeyError", format!("missing argument '{}'", name)))
  }

  pub fn int(&self, name: &str) -> Result<i64, FunctionError> {
    let value = self.require(name)?;
    value.as_int().ok_or_else(|| wrong_type(name, "int", value))
  }

  /// Integers are accepted and widened.
  pub fn float(&self, name: &str) -> Result<f64, FunctionError> {
    let value = self.require(name)?;
    value.as_float().ok_or_else(|| wrong_type(name, "float", value))
  }

  pub fn text(&self, name: &str) -> Result<&str, FunctionError> {
    let value = self.require(name)?;
    value.as_str().ok_or_else(|| wrong_type(name, "str", value))
  }

  pub fn bool(&self, name: &str) -> Result<bool, FunctionError> {
    let value = self.require(name)?;
    value.as_bool().ok_or_else(|| wrong_type(name, "bool", value))
  }

  pub fn date(&self, name: &str) -> Result<NaiveDate, FunctionError> {
    match self.require(name)? {
      Value::Date(d) => Ok(*d),
      other => Err(wrong_type(name, "date", other)),
    }
  }

  pub fn datetime(&self, name: &str) -> Result<NaiveDateTime, FunctionError> {
    match self.require(name)? {
      Value::DateTime(dt) => Ok(*dt),
      other => Err(wrong_type(name, "datetime", other)),
    }
  }

  pub fn list(&self, name: &str) -> Result<&[Value], FunctionError> {
    match self.require(name)? {
      Value::List(items) => Ok(items),
      other => Err(wrong_type(name, "list", other)),
    }
  }

  /// A list whose elements are all strings.
  pub fn text_list(&self, name: &str) -> Result<Vec<&str>, FunctionError> {
    self
      .list(name)?
      .iter()
      .map(|item| {
        item
          .as_str()
          .ok_or_else(|| wrong_type(name, "list[str]", item))
      })
      .collect()
  }

  pub fn object(&self, name: &str) -> Result<&serde_json::Map<String, serde_json::Value>, FunctionError> {
    match self.require(name)? {
      Value::Object(map) => Ok(map),
      other => Err(wrong_type(name, "dict", other)),
    }
  }

  pub fn path(&self, name: &str) -> Result<&Path, FunctionError> {
    match self.require(name)? {
      Value::Path(p) => Ok(p),
      Value::Text(s) => Ok(Path::new(s)),
      other => Err(wrong_type(name, "path", other)),
    }
  }
}

fn wrong_type(name: &str, expected: &str, got: &Value) -> FunctionError {
  FunctionError::type_error(format!(
    "argument '{}' must be {}, got {}",
    name,
    expected,
    got.type_name()
  ))
}

impl<K: Into<String>> FromIterator<(K, Value)> for Arguments {
  fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
    let mut args = Arguments::new();
    for (name, value) in iter {
      args.push(name, value);
    }
    args
  }
}

/// A function that can be registered as a form.
///
/// Built once with the builder methods, then never mutated: registering it
/// wraps it in a [`ComponentForm`](crate::ComponentForm) without changing how
/// it behaves when called directly.
#[derive(Clone)]
pub struct FunctionDef {
  name: String,
  doc: Option<String>,
  source: Option<String>,
  params: Vec<ParameterSpec>,
  returns: Option<TypeAnnotation>,
  body: Arc<FunctionBody>,
}

impl FunctionDef {
  pub fn new<F>(name: impl Into<String>, body: F) -> Self
  where
    F: Fn(&Arguments) -> Result<Value, FunctionError> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      doc: None,
      source: None,
      params: Vec::new(),
      returns: None,
      body: Arc::new(body),
    }
  }

  /// Declare the next parameter.
  pub fn param(mut self, name: impl Into<String>, annotation: TypeAnnotation) -> Self {
    self.params.push(ParameterSpec::new(name, annotation));
    self
  }

  /// Declare the next parameter, with a default value.
  pub fn param_with_default(
    mut self,
    name: impl Into<String>,
    annotation: TypeAnnotation,
    default: impl Into<Value>,
  ) -> Self {
    self
      .params
      .push(ParameterSpec::with_default(name, annotation, default.into()));
    self
  }

  /// Declare the next parameter without a type annotation.
  pub fn untyped_param(mut self, name: impl Into<String>) -> Self {
    self.params.push(ParameterSpec::untyped(name));
    self
  }

  pub fn returns(mut self, annotation: TypeAnnotation) -> Self {
    self.returns = Some(annotation);
    self
  }

  /// Docstring, shown verbatim as the form description.
  pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
    self.doc = Some(doc.into());
    self
  }

  /// Source text, shown above the form when the app renders code.
  pub fn with_source(mut self, source: impl Into<String>) -> Self {
    self.source = Some(source.into());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn doc(&self) -> Option<&str> {
    self.doc.as_deref()
  }

  pub fn source(&self) -> Option<&str> {
    self.source.as_deref()
  }

  pub fn params(&self) -> &[ParameterSpec] {
    &self.params
  }

  pub fn return_annotation(&self) -> Option<&TypeAnnotation> {
    self.returns.as_ref()
  }

  /// Call the function directly.
  pub fn call(&self, args: &Arguments) -> Result<Value, FunctionError> {
    (self.body)(args)
  }
}

impl fmt::Debug for FunctionDef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FunctionDef")
      .field("name", &self.name)
      .field("params", &self.params)
      .field("returns", &self.returns)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_conversion_uses_type_name() {
    fn parse(text: &str) -> Result<i64, FunctionError> {
      Ok(text.parse::<i64>()?)
    }

    let err = parse("x").unwrap_err();
    assert_eq!(err.kind(), "ParseIntError");
    assert_eq!(err.message(), "invalid digit found in string");
  }

  #[test]
  fn test_argument_accessors() {
    let args = Arguments::new()
      .with("a", 2i64)
      .with("b", 0.5)
      .with("text", "hi");

    assert_eq!(args.int("a").unwrap(), 2);
    assert_eq!(args.float("a").unwrap(), 2.0);
    assert_eq!(args.float("b").unwrap(), 0.5);
    assert_eq!(args.text("text").unwrap(), "hi");
    assert_eq!(args.names(), vec!["a", "b", "text"]);

    let err = args.int("text").unwrap_err();
    assert_eq!(err.kind(), "TypeError");
    assert_eq!(err.message(), "argument 'text' must be int, got str");

    assert_eq!(args.int("missing").unwrap_err().kind(), "KeyError");
  }

  #[test]
  fn test_call_directly() {
    let add = FunctionDef::new("add", |args| Ok(Value::Int(args.int("a")? + args.int("b")?)))
      .param("a", TypeAnnotation::Int)
      .param("b", TypeAnnotation::Int)
      .returns(TypeAnnotation::Int);

    let args = Arguments::new().with("a", 2i64).with("b", 3i64);
    assert_eq!(add.call(&args).unwrap(), Value::Int(5));
    assert_eq!(add.params().len(), 2);
  }
}
