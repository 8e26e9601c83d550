//! Typed values passed to and returned from registered functions.

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::annotation::Literal;

/// A tabular data frame: named columns and rows of JSON cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
  pub columns: Vec<String>,
  pub rows: Vec<Vec<serde_json::Value>>,
}

impl Table {
  pub fn new(columns: Vec<String>) -> Self {
    Self {
      columns,
      rows: Vec::new(),
    }
  }

  /// Append a row. Short rows are padded with nulls, long rows truncated.
  pub fn push_row(&mut self, mut row: Vec<serde_json::Value>) {
    row.resize(self.columns.len(), serde_json::Value::Null);
    self.rows.push(row);
  }

  /// Index of a column by name.
  pub fn column(&self, name: &str) -> Option<usize> {
    self.columns.iter().position(|c| c == name)
  }

  /// Keep only the rows for which `predicate` holds.
  pub fn filter<F>(&self, predicate: F) -> Table
  where
    F: Fn(&[serde_json::Value]) -> bool,
  {
    Table {
      columns: self.columns.clone(),
      rows: self.rows.iter().filter(|row| predicate(row)).cloned().collect(),
    }
  }

  /// Rows as JSON objects keyed by column name (the "records" orientation).
  pub fn to_records(&self) -> serde_json::Value {
    let records = self
      .rows
      .iter()
      .map(|row| {
        let object: serde_json::Map<String, serde_json::Value> = self
          .columns
          .iter()
          .cloned()
          .zip(row.iter().cloned())
          .collect();
        serde_json::Value::Object(object)
      })
      .collect();
    serde_json::Value::Array(records)
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

/// A typed argument or return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
  Null,
  Int(i64),
  Float(f64),
  Text(String),
  Bool(bool),
  Date(NaiveDate),
  DateTime(NaiveDateTime),
  Path(PathBuf),
  List(Vec<Value>),
  Object(serde_json::Map<String, serde_json::Value>),
  Frame(Table),
  /// A value with no structured representation, kept as its debug text.
  Opaque(String),
}

impl Value {
  /// Name of the runtime type, for messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Int(_) => "int",
      Value::Float(_) => "float",
      Value::Text(_) => "str",
      Value::Bool(_) => "bool",
      Value::Date(_) => "date",
      Value::DateTime(_) => "datetime",
      Value::Path(_) => "path",
      Value::List(_) => "list",
      Value::Object(_) => "dict",
      Value::Frame(_) => "DataFrame",
      Value::Opaque(_) => "object",
    }
  }

  /// Plain JSON rendering of this value.
  ///
  /// Dates are ISO-8601 strings, paths are strings, frames are a list of
  /// records. Non-finite floats become null.
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      Value::Null => serde_json::Value::Null,
      Value::Int(i) => serde_json::Value::from(*i),
      Value::Float(f) => serde_json::Number::from_f64(*f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null),
      Value::Text(s) => serde_json::Value::String(s.clone()),
      Value::Bool(b) => serde_json::Value::Bool(*b),
      Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
      Value::DateTime(dt) => serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
      Value::Path(p) => serde_json::Value::String(p.display().to_string()),
      Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
      Value::Object(map) => serde_json::Value::Object(map.clone()),
      Value::Frame(table) => table.to_records(),
      Value::Opaque(repr) => serde_json::Value::String(repr.clone()),
    }
  }

  /// Lift a JSON value into a typed value. Whole numbers become `Int`.
  pub fn from_json(json: serde_json::Value) -> Self {
    match json {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(b),
      serde_json::Value::Number(n) => match n.as_i64() {
        Some(i) => Value::Int(i),
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
      },
      serde_json::Value::String(s) => Value::Text(s),
      serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from_json).collect()),
      serde_json::Value::Object(map) => Value::Object(map),
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_float(&self) -> Option<f64> {
    match self {
      Value::Float(f) => Some(*f),
      Value::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => f.write_str("None"),
      Value::Int(i) => write!(f, "{}", i),
      Value::Float(v) => write!(f, "{}", v),
      Value::Text(s) => f.write_str(s),
      Value::Bool(b) => write!(f, "{}", b),
      Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
      Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
      Value::Path(p) => write!(f, "{}", p.display()),
      Value::Opaque(repr) => f.write_str(repr),
      Value::List(_) | Value::Object(_) | Value::Frame(_) => write!(f, "{}", self.to_json()),
    }
  }
}

impl From<Literal> for Value {
  fn from(literal: Literal) -> Self {
    match literal {
      Literal::Bool(b) => Value::Bool(b),
      Literal::Int(i) => Value::Int(i),
      Literal::Str(s) => Value::Text(s),
    }
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::Int(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Float(value)
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::Text(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::Text(value)
  }
}

impl From<NaiveDate> for Value {
  fn from(value: NaiveDate) -> Self {
    Value::Date(value)
  }
}

impl From<NaiveDateTime> for Value {
  fn from(value: NaiveDateTime) -> Self {
    Value::DateTime(value)
  }
}

impl From<PathBuf> for Value {
  fn from(value: PathBuf) -> Self {
    Value::Path(value)
  }
}

impl From<Table> for Value {
  fn from(value: Table) -> Self {
    Value::Frame(value)
  }
}

impl From<Vec<String>> for Value {
  fn from(value: Vec<String>) -> Self {
    Value::List(value.into_iter().map(Value::Text).collect())
  }
}

impl From<serde_json::Map<String, serde_json::Value>> for Value {
  fn from(value: serde_json::Map<String, serde_json::Value>) -> Self {
    Value::Object(value)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_to_json_dates() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let dt = date.and_hms_opt(9, 30, 0).unwrap();
    assert_eq!(Value::Date(date).to_json(), json!("2024-01-01"));
    assert_eq!(Value::DateTime(dt).to_json(), json!("2024-01-01T09:30:00"));
  }

  #[test]
  fn test_from_json_numbers() {
    assert_eq!(Value::from_json(json!(5)), Value::Int(5));
    assert_eq!(Value::from_json(json!(0.5)), Value::Float(0.5));
    assert_eq!(
      Value::from_json(json!(["a", 1])),
      Value::List(vec![Value::Text("a".to_string()), Value::Int(1)])
    );
  }

  #[test]
  fn test_table_filter_and_records() {
    let mut table = Table::new(vec!["year".to_string(), "title".to_string()]);
    table.push_row(vec![json!(2020), json!("outage")]);
    table.push_row(vec![json!(2021)]);

    let year = table.column("year").unwrap();
    let filtered = table.filter(|row| row[year] == json!(2021));

    assert_eq!(filtered.len(), 1);
    assert_eq!(
      filtered.to_records(),
      json!([{ "year": 2021, "title": null }])
    );
  }

  #[test]
  fn test_display() {
    assert_eq!(Value::Int(6).to_string(), "6");
    assert_eq!(Value::Float(0.5).to_string(), "0.5");
    assert_eq!(Value::from(vec!["a".to_string()]).to_string(), r#"["a"]"#);
  }
}
