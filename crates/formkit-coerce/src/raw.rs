//! Raw values as handed back by input widgets.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use formkit_schema::Literal;

/// What a widget hands back for one field, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
  /// The widget produced nothing.
  Missing,
  Int(i64),
  Float(f64),
  Text(String),
  Bool(bool),
  Date(NaiveDate),
  Time(NaiveTime),
  /// The two sub-widgets of a date-time field.
  DateTimeParts {
    date: Box<RawValue>,
    time: Box<RawValue>,
  },
  /// Options picked from a select or multiselect widget.
  Selection(Vec<Literal>),
}

impl RawValue {
  pub fn text(value: impl Into<String>) -> Self {
    RawValue::Text(value.into())
  }

  pub fn date_time(date: RawValue, time: RawValue) -> Self {
    RawValue::DateTimeParts {
      date: Box::new(date),
      time: Box::new(time),
    }
  }

  /// Short description of the raw type, for messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      RawValue::Missing => "nothing",
      RawValue::Int(_) => "an integer",
      RawValue::Float(_) => "a float",
      RawValue::Text(_) => "text",
      RawValue::Bool(_) => "a boolean",
      RawValue::Date(_) => "a date",
      RawValue::Time(_) => "a time",
      RawValue::DateTimeParts { .. } => "a date and time",
      RawValue::Selection(_) => "a selection",
    }
  }

  pub fn is_missing(&self) -> bool {
    matches!(self, RawValue::Missing)
  }
}

/// Raw values for one submission, keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
  values: HashMap<String, RawValue>,
}

impl RawInputs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style insert.
  pub fn with(mut self, name: impl Into<String>, value: RawValue) -> Self {
    self.insert(name, value);
    self
  }

  pub fn insert(&mut self, name: impl Into<String>, value: RawValue) {
    self.values.insert(name.into(), value);
  }

  pub fn get(&self, name: &str) -> Option<&RawValue> {
    self.values.get(name)
  }

  /// Take a value out, leaving `Missing` behind.
  pub fn take(&mut self, name: &str) -> RawValue {
    self.values.remove(name).unwrap_or(RawValue::Missing)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawInputs {
  fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
    let mut inputs = RawInputs::new();
    for (name, value) in iter {
      inputs.insert(name, value);
    }
    inputs
  }
}
