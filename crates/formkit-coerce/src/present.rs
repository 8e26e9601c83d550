//! Output side: classify a return value into a rendering instruction.

use std::path::PathBuf;

use formkit_schema::{FieldKind, Table, Value};
use serde::Serialize;

use crate::raw::RawValue;

/// How the renderer should display a function's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum RenderSpec {
  /// Structured JSON view.
  Json(serde_json::Value),
  /// Tabular view.
  Table(Table),
  /// Offer the file for download.
  File { path: PathBuf, file_name: String },
  /// Plain text.
  Text(String),
  /// Generic scalar view (numbers, booleans, dates).
  Value(Value),
  /// Read-only representation of something without a structured view.
  ReadOnly(String),
  /// The function returned nothing.
  Empty,
}

impl RenderSpec {
  /// Turn a rendered result back into what a widget would submit for it.
  ///
  /// Used to feed one form's output into another form's input: for every
  /// input-supported kind, `bind(kind, present(kind, v).to_raw())` yields `v`.
  pub fn to_raw(&self) -> RawValue {
    match self {
      RenderSpec::Json(json) => RawValue::Text(json.to_string()),
      RenderSpec::Text(s) | RenderSpec::ReadOnly(s) => RawValue::Text(s.clone()),
      RenderSpec::File { path, .. } => RawValue::Text(path.display().to_string()),
      RenderSpec::Value(value) => match value {
        Value::Int(i) => RawValue::Int(*i),
        Value::Float(f) => RawValue::Float(*f),
        Value::Bool(b) => RawValue::Bool(*b),
        Value::Date(d) => RawValue::Date(*d),
        Value::DateTime(dt) => RawValue::date_time(RawValue::Date(dt.date()), RawValue::Time(dt.time())),
        Value::Null => RawValue::Missing,
        other => RawValue::Text(other.to_string()),
      },
      RenderSpec::Table(_) | RenderSpec::Empty => RawValue::Missing,
    }
  }
}

/// Classify a return value for display.
///
/// The declared return kind wins when the value actually has that shape;
/// otherwise (no annotation, Fallback, or a value that disagrees with its
/// annotation) the value's runtime type decides.
pub fn present(kind: &FieldKind, value: &Value) -> RenderSpec {
  if matches!(value, Value::Null) {
    return RenderSpec::Empty;
  }

  match (kind, value) {
    (FieldKind::ListOfText | FieldKind::ListOfEnum(_), Value::List(_))
    | (FieldKind::JsonObject, Value::Object(_)) => RenderSpec::Json(value.to_json()),

    (FieldKind::TabularFrame, Value::Frame(table)) => RenderSpec::Table(table.clone()),

    (FieldKind::FilePath, Value::Path(path)) => file(path.clone()),
    (FieldKind::FilePath, Value::Text(path)) => file(PathBuf::from(path)),

    (FieldKind::Text, Value::Text(s)) => RenderSpec::Text(s.clone()),

    (FieldKind::Enum(_), Value::Text(_) | Value::Int(_) | Value::Bool(_))
    | (FieldKind::Integer, Value::Int(_))
    | (FieldKind::Float, Value::Float(_) | Value::Int(_))
    | (FieldKind::Boolean, Value::Bool(_))
    | (FieldKind::Date, Value::Date(_))
    | (FieldKind::DateTime, Value::DateTime(_)) => RenderSpec::Value(value.clone()),

    _ => present_runtime(value),
  }
}

fn present_runtime(value: &Value) -> RenderSpec {
  match value {
    Value::Null => RenderSpec::Empty,
    Value::List(_) | Value::Object(_) => RenderSpec::Json(value.to_json()),
    Value::Frame(table) => RenderSpec::Table(table.clone()),
    Value::Path(path) => file(path.clone()),
    Value::Text(s) => RenderSpec::Text(s.clone()),
    Value::Opaque(repr) => RenderSpec::ReadOnly(repr.clone()),
    Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::Date(_) | Value::DateTime(_) => {
      RenderSpec::Value(value.clone())
    }
  }
}

fn file(path: PathBuf) -> RenderSpec {
  let file_name = path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.display().to_string());
  RenderSpec::File { path, file_name }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use formkit_schema::Literal;
  use serde_json::json;

  use super::*;
  use crate::bind::bind;

  #[test]
  fn test_present_scalars() {
    assert_eq!(present(&FieldKind::Integer, &Value::Int(5)), RenderSpec::Value(Value::Int(5)));
    assert_eq!(
      present(&FieldKind::Text, &Value::Text("TEXT".to_string())),
      RenderSpec::Text("TEXT".to_string())
    );
  }

  #[test]
  fn test_present_structured() {
    let words = Value::from(vec!["Hello".to_string(), "World".to_string()]);
    assert_eq!(
      present(&FieldKind::ListOfText, &words),
      RenderSpec::Json(json!(["Hello", "World"]))
    );

    let mut hosts = serde_json::Map::new();
    hosts.insert("test".to_string(), json!(254));
    assert_eq!(
      present(&FieldKind::JsonObject, &Value::Object(hosts)),
      RenderSpec::Json(json!({"test": 254}))
    );
  }

  #[test]
  fn test_present_file() {
    let spec = present(&FieldKind::FilePath, &Value::Path(PathBuf::from("/tmp/out/numbers.txt")));
    assert_eq!(
      spec,
      RenderSpec::File {
        path: PathBuf::from("/tmp/out/numbers.txt"),
        file_name: "numbers.txt".to_string(),
      }
    );
  }

  #[test]
  fn test_present_falls_back_to_runtime_type() {
    let mut table = Table::new(vec!["year".to_string()]);
    table.push_row(vec![json!(2021)]);

    assert_eq!(
      present(&FieldKind::Fallback, &Value::Frame(table.clone())),
      RenderSpec::Table(table)
    );
    assert_eq!(
      present(&FieldKind::Fallback, &Value::Opaque("<object>".to_string())),
      RenderSpec::ReadOnly("<object>".to_string())
    );
    // Annotated as int, returned a list: the list wins.
    assert_eq!(
      present(&FieldKind::Integer, &Value::List(vec![Value::Int(1)])),
      RenderSpec::Json(json!([1]))
    );
    assert_eq!(present(&FieldKind::Integer, &Value::Null), RenderSpec::Empty);
  }

  #[test]
  fn test_present_then_bind_round_trips() {
    let at = NaiveDate::from_ymd_opt(2023, 1, 7).unwrap();
    let mut object = serde_json::Map::new();
    object.insert("days".to_string(), json!(6));

    let cases = vec![
      (FieldKind::Integer, Value::Int(-4)),
      (FieldKind::Float, Value::Float(0.5)),
      (FieldKind::Text, Value::Text("hello world".to_string())),
      (FieldKind::Boolean, Value::Bool(true)),
      (FieldKind::Date, Value::Date(at)),
      (FieldKind::DateTime, Value::DateTime(at.and_hms_opt(12, 0, 0).unwrap())),
      (
        FieldKind::Enum(vec!["upper".into(), "lower".into()]),
        Value::Text("lower".to_string()),
      ),
      (
        FieldKind::Enum(vec![Literal::Int(2020), Literal::Int(2021)]),
        Value::Int(2021),
      ),
      (FieldKind::ListOfText, Value::from(vec!["a".to_string(), "b".to_string()])),
      (
        FieldKind::ListOfEnum(vec!["a".into(), "b".into()]),
        Value::List(vec![Value::Text("b".to_string())]),
      ),
      (FieldKind::JsonObject, Value::Object(object)),
    ];

    for (kind, value) in cases {
      let raw = present(&kind, &value).to_raw();
      assert_eq!(bind(&kind, raw).unwrap(), value, "{}", kind);
    }
  }
}
