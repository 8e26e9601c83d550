//! Input side: raw widget values to typed arguments.
//!
//! Widgets for primitive kinds normally hand back the right primitive already,
//! in which case the value passes straight through. Text is accepted for every
//! scalar kind too and parsed the way a template-rendered string would be:
//! `"2"` binds to `Integer 2`, `"TRUE"` to `Boolean true`.
//!
//! JSON-backed kinds (`ListOfText`, `JsonObject`) are typed into a text area.
//! Empty text means an empty list/object.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use formkit_schema::{FieldKind, Literal, Value};

use crate::error::{BindError, CoercionError};
use crate::raw::RawValue;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Convert one raw widget value into a typed argument for `kind`.
pub fn bind(kind: &FieldKind, raw: RawValue) -> Result<Value, BindError> {
  if !kind.input_supported() {
    return Err(BindError::UnsupportedOperation { kind: kind.name() });
  }
  if raw.is_missing() {
    return Err(CoercionError::Missing.into());
  }

  let value = match kind {
    FieldKind::Integer => bind_integer(raw)?,
    FieldKind::Float => bind_float(raw)?,
    FieldKind::Text => bind_text(raw)?,
    FieldKind::Boolean => bind_boolean(raw)?,
    FieldKind::Date => Value::Date(bind_date(raw)?),
    FieldKind::DateTime => Value::DateTime(bind_date_time(raw)?),
    FieldKind::Enum(allowed) => bind_enum(allowed, raw)?,
    FieldKind::ListOfText => bind_text_list(raw)?,
    FieldKind::ListOfEnum(allowed) => bind_enum_list(allowed, raw)?,
    FieldKind::JsonObject => bind_object(raw)?,
    FieldKind::FilePath | FieldKind::TabularFrame | FieldKind::Fallback => {
      return Err(BindError::UnsupportedOperation { kind: kind.name() });
    }
  };

  Ok(value)
}

fn bind_integer(raw: RawValue) -> Result<Value, CoercionError> {
  match raw {
    RawValue::Int(i) => Ok(Value::Int(i)),
    RawValue::Text(s) => s
      .trim()
      .parse::<i64>()
      .map(Value::Int)
      .map_err(|_| CoercionError::Parse {
        expected: "integer",
        input: s,
      }),
    other => Err(mismatch("integer", &other)),
  }
}

fn bind_float(raw: RawValue) -> Result<Value, CoercionError> {
  let non_finite = |input: String| CoercionError::Parse {
    expected: "number",
    input,
  };
  match raw {
    RawValue::Float(f) if f.is_finite() => Ok(Value::Float(f)),
    RawValue::Float(f) => Err(non_finite(f.to_string())),
    RawValue::Int(i) => Ok(Value::Float(i as f64)),
    // `f64::from_str` accepts "NaN" and "inf", which are not numbers a form
    // can submit.
    RawValue::Text(s) => match s.trim().parse::<f64>() {
      Ok(f) if f.is_finite() => Ok(Value::Float(f)),
      _ => Err(non_finite(s)),
    },
    other => Err(mismatch("number", &other)),
  }
}

fn bind_text(raw: RawValue) -> Result<Value, CoercionError> {
  match raw {
    RawValue::Text(s) => Ok(Value::Text(s)),
    other => Err(mismatch("text", &other)),
  }
}

fn bind_boolean(raw: RawValue) -> Result<Value, CoercionError> {
  match raw {
    RawValue::Bool(b) => Ok(Value::Bool(b)),
    RawValue::Text(s) => match s.trim().to_lowercase().as_str() {
      "true" => Ok(Value::Bool(true)),
      "false" => Ok(Value::Bool(false)),
      _ => Err(CoercionError::Parse {
        expected: "boolean",
        input: s,
      }),
    },
    other => Err(mismatch("boolean", &other)),
  }
}

fn bind_date(raw: RawValue) -> Result<NaiveDate, CoercionError> {
  match raw {
    RawValue::Date(d) => Ok(d),
    RawValue::Text(s) => {
      NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| CoercionError::Parse {
        expected: "date (YYYY-MM-DD)",
        input: s,
      })
    }
    other => Err(mismatch("date", &other)),
  }
}

fn bind_time(raw: RawValue) -> Result<NaiveTime, CoercionError> {
  match raw {
    RawValue::Time(t) => Ok(t),
    RawValue::Text(s) => TIME_FORMATS
      .iter()
      .find_map(|format| NaiveTime::parse_from_str(s.trim(), format).ok())
      .ok_or(CoercionError::Parse {
        expected: "time (HH:MM[:SS])",
        input: s,
      }),
    other => Err(mismatch("time", &other)),
  }
}

/// Combine the date and time sub-widgets into one timestamp.
fn bind_date_time(raw: RawValue) -> Result<NaiveDateTime, CoercionError> {
  match raw {
    RawValue::DateTimeParts { date, time } => {
      if is_blank(&date) || is_blank(&time) {
        return Err(CoercionError::IncompleteDateTime);
      }
      let date = bind_date(*date)?;
      let time = bind_time(*time)?;
      Ok(date.and_time(time))
    }
    RawValue::Text(s) => DATE_TIME_FORMATS
      .iter()
      .find_map(|format| NaiveDateTime::parse_from_str(s.trim(), format).ok())
      .ok_or(CoercionError::Parse {
        expected: "datetime (YYYY-MM-DDTHH:MM:SS)",
        input: s,
      }),
    // A lone date is half of the pair.
    RawValue::Date(_) => Err(CoercionError::IncompleteDateTime),
    other => Err(mismatch("date and time", &other)),
  }
}

fn is_blank(raw: &RawValue) -> bool {
  match raw {
    RawValue::Missing => true,
    RawValue::Text(s) => s.trim().is_empty(),
    _ => false,
  }
}

/// The widget only ever offers `allowed`, so a miss here means the renderer
/// and the schema disagree. It is still rejected rather than passed on.
fn bind_enum(allowed: &[Literal], raw: RawValue) -> Result<Value, CoercionError> {
  let picked = match raw {
    RawValue::Selection(mut picked) if picked.len() == 1 => picked.remove(0),
    RawValue::Selection(picked) => {
      return Err(CoercionError::Parse {
        expected: "exactly one option",
        input: format!("{} options", picked.len()),
      });
    }
    RawValue::Text(s) => {
      return lookup_text(allowed, &s).map(|literal| Value::from(literal.clone()));
    }
    RawValue::Int(i) => Literal::Int(i),
    RawValue::Bool(b) => Literal::Bool(b),
    other => return Err(mismatch("one of the allowed options", &other)),
  };

  member(allowed, picked).map(Value::from)
}

fn bind_enum_list(allowed: &[Literal], raw: RawValue) -> Result<Value, CoercionError> {
  let picked = match raw {
    RawValue::Selection(picked) => picked,
    RawValue::Text(s) => {
      let items = match parse_json(&s, serde_json::Value::Array(Vec::new()))? {
        serde_json::Value::Array(items) => items,
        other => {
          return Err(CoercionError::UnexpectedJson {
            expected: "a JSON array",
            found: json_type(&other),
          });
        }
      };
      items
        .iter()
        .map(|item| json_literal(allowed, item))
        .collect::<Result<Vec<_>, _>>()?
    }
    other => return Err(mismatch("a selection", &other)),
  };

  picked
    .into_iter()
    .map(|literal| member(allowed, literal).map(Value::from))
    .collect::<Result<Vec<_>, _>>()
    .map(Value::List)
}

fn bind_text_list(raw: RawValue) -> Result<Value, CoercionError> {
  let s = match raw {
    RawValue::Text(s) => s,
    other => return Err(mismatch("a JSON list of strings", &other)),
  };

  let items = match parse_json(&s, serde_json::Value::Array(Vec::new()))? {
    serde_json::Value::Array(items) => items,
    other => {
      return Err(CoercionError::UnexpectedJson {
        expected: "a JSON array",
        found: json_type(&other),
      });
    }
  };

  items
    .into_iter()
    .enumerate()
    .map(|(index, item)| match item {
      serde_json::Value::String(s) => Ok(Value::Text(s)),
      other => Err(CoercionError::NotText {
        index,
        found: json_type(&other),
      }),
    })
    .collect::<Result<Vec<_>, _>>()
    .map(Value::List)
}

fn bind_object(raw: RawValue) -> Result<Value, CoercionError> {
  let s = match raw {
    RawValue::Text(s) => s,
    other => return Err(mismatch("a JSON object", &other)),
  };

  match parse_json(&s, serde_json::Value::Object(serde_json::Map::new()))? {
    serde_json::Value::Object(map) => Ok(Value::Object(map)),
    other => Err(CoercionError::UnexpectedJson {
      expected: "a JSON object",
      found: json_type(&other),
    }),
  }
}

fn parse_json(text: &str, empty: serde_json::Value) -> Result<serde_json::Value, CoercionError> {
  if text.trim().is_empty() {
    return Ok(empty);
  }
  serde_json::from_str(text).map_err(|e| CoercionError::InvalidJson {
    reason: e.to_string(),
  })
}

fn lookup_text<'a>(allowed: &'a [Literal], text: &str) -> Result<&'a Literal, CoercionError> {
  // An exact string literal wins over a numeric/boolean spelling.
  allowed
    .iter()
    .find(|literal| matches!(literal, Literal::Str(s) if s == text))
    .or_else(|| allowed.iter().find(|literal| literal.matches_text(text)))
    .ok_or_else(|| out_of_domain(allowed, text))
}

fn json_literal(allowed: &[Literal], item: &serde_json::Value) -> Result<Literal, CoercionError> {
  match item {
    serde_json::Value::String(s) => lookup_text(allowed, s).cloned(),
    serde_json::Value::Bool(b) => Ok(Literal::Bool(*b)),
    serde_json::Value::Number(n) => n
      .as_i64()
      .map(Literal::Int)
      .ok_or_else(|| out_of_domain(allowed, &n.to_string())),
    other => Err(CoercionError::UnexpectedJson {
      expected: "a scalar option",
      found: json_type(other),
    }),
  }
}

fn member(allowed: &[Literal], literal: Literal) -> Result<Literal, CoercionError> {
  if allowed.contains(&literal) {
    Ok(literal)
  } else {
    Err(out_of_domain(allowed, &literal.to_string()))
  }
}

fn out_of_domain(allowed: &[Literal], value: &str) -> CoercionError {
  let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
  CoercionError::OutOfDomain {
    value: value.to_string(),
    allowed: allowed.join(", "),
  }
}

fn mismatch(expected: &'static str, raw: &RawValue) -> CoercionError {
  CoercionError::Mismatch {
    expected,
    found: raw.type_name(),
  }
}

fn json_type(value: &serde_json::Value) -> &'static str {
  match value {
    serde_json::Value::Null => "null",
    serde_json::Value::Bool(_) => "a boolean",
    serde_json::Value::Number(_) => "a number",
    serde_json::Value::String(_) => "a string",
    serde_json::Value::Array(_) => "an array",
    serde_json::Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn change_kind() -> FieldKind {
    FieldKind::Enum(vec!["upper".into(), "lower".into(), "title".into()])
  }

  #[test]
  fn test_bind_integer_from_text() {
    assert_eq!(bind(&FieldKind::Integer, RawValue::text("2")).unwrap(), Value::Int(2));
    assert_eq!(bind(&FieldKind::Integer, RawValue::Int(3)).unwrap(), Value::Int(3));
  }

  #[test]
  fn test_bind_integer_invalid() {
    let err = bind(&FieldKind::Integer, RawValue::text("two")).unwrap_err();
    assert_eq!(err.to_string(), "expected integer, got 'two'");
  }

  #[test]
  fn test_bind_float_widens_integers() {
    assert_eq!(bind(&FieldKind::Float, RawValue::Int(2)).unwrap(), Value::Float(2.0));
    assert_eq!(bind(&FieldKind::Float, RawValue::text("19.99")).unwrap(), Value::Float(19.99));
  }

  #[test]
  fn test_bind_float_rejects_non_finite() {
    for text in ["NaN", "inf", "-infinity"] {
      assert!(matches!(
        bind(&FieldKind::Float, RawValue::text(text)),
        Err(BindError::Coercion(CoercionError::Parse { expected: "number", input })) if input == text
      ));
    }
    assert!(matches!(
      bind(&FieldKind::Float, RawValue::Float(f64::NAN)),
      Err(BindError::Coercion(CoercionError::Parse { expected: "number", .. }))
    ));
    assert!(bind(&FieldKind::Float, RawValue::text("1e3")).is_ok());
  }

  #[test]
  fn test_bind_boolean() {
    assert_eq!(bind(&FieldKind::Boolean, RawValue::text("TRUE")).unwrap(), Value::Bool(true));
    assert!(bind(&FieldKind::Boolean, RawValue::text("yes")).is_err());
  }

  #[test]
  fn test_bind_text_rejects_numbers() {
    let err = bind(&FieldKind::Text, RawValue::Int(1)).unwrap_err();
    assert_eq!(
      err,
      BindError::Coercion(CoercionError::Mismatch {
        expected: "text",
        found: "an integer",
      })
    );
  }

  #[test]
  fn test_bind_missing() {
    let err = bind(&FieldKind::Text, RawValue::Missing).unwrap_err();
    assert_eq!(err, BindError::Coercion(CoercionError::Missing));
  }

  #[test]
  fn test_bind_date_time_combines_parts() {
    let raw = RawValue::date_time(RawValue::text("2024-01-01"), RawValue::text("09:30"));
    let value = bind(&FieldKind::DateTime, raw).unwrap();

    let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
      .unwrap()
      .and_hms_opt(9, 30, 0)
      .unwrap();
    assert_eq!(value, Value::DateTime(expected));
    assert_eq!(value.to_json(), json!("2024-01-01T09:30:00"));
  }

  #[test]
  fn test_bind_date_time_missing_time() {
    let raw = RawValue::date_time(RawValue::text("2024-01-01"), RawValue::Missing);
    let err = bind(&FieldKind::DateTime, raw).unwrap_err();
    assert_eq!(err, BindError::Coercion(CoercionError::IncompleteDateTime));
    assert_eq!(err.to_string(), "incomplete datetime");
  }

  #[test]
  fn test_bind_date_time_lone_date_is_incomplete() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let err = bind(&FieldKind::DateTime, RawValue::Date(date)).unwrap_err();
    assert_eq!(err, BindError::Coercion(CoercionError::IncompleteDateTime));
  }

  #[test]
  fn test_bind_enum_membership() {
    let kind = change_kind();
    assert_eq!(
      bind(&kind, RawValue::Selection(vec!["lower".into()])).unwrap(),
      Value::Text("lower".to_string())
    );
    assert_eq!(bind(&kind, RawValue::text("title")).unwrap(), Value::Text("title".to_string()));

    let err = bind(&kind, RawValue::text("shout")).unwrap_err();
    assert_eq!(err.to_string(), "'shout' is not one of [upper, lower, title]");
  }

  #[test]
  fn test_bind_enum_integer_literals() {
    let kind = FieldKind::Enum(vec![Literal::Int(2020), Literal::Int(2021)]);
    assert_eq!(bind(&kind, RawValue::text("2021")).unwrap(), Value::Int(2021));
    assert_eq!(bind(&kind, RawValue::Int(2020)).unwrap(), Value::Int(2020));
    assert!(bind(&kind, RawValue::Int(1999)).is_err());
  }

  #[test]
  fn test_bind_text_list() {
    let value = bind(&FieldKind::ListOfText, RawValue::text(r#"["a","b"]"#)).unwrap();
    assert_eq!(
      value,
      Value::List(vec![Value::Text("a".to_string()), Value::Text("b".to_string())])
    );
  }

  #[test]
  fn test_bind_text_list_invalid_json() {
    let err = bind(&FieldKind::ListOfText, RawValue::text("[a,b]")).unwrap_err();
    assert!(matches!(
      err,
      BindError::Coercion(CoercionError::InvalidJson { .. })
    ));
  }

  #[test]
  fn test_bind_text_list_non_text_element() {
    let err = bind(&FieldKind::ListOfText, RawValue::text(r#"["a", 1]"#)).unwrap_err();
    assert_eq!(
      err,
      BindError::Coercion(CoercionError::NotText {
        index: 1,
        found: "a number",
      })
    );
  }

  #[test]
  fn test_bind_text_list_empty_text() {
    assert_eq!(
      bind(&FieldKind::ListOfText, RawValue::text("")).unwrap(),
      Value::List(Vec::new())
    );
  }

  #[test]
  fn test_bind_enum_list_keeps_selection_order() {
    let kind = FieldKind::ListOfEnum(vec!["a".into(), "b".into(), "c".into()]);
    let value = bind(&kind, RawValue::Selection(vec!["c".into(), "a".into()])).unwrap();
    assert_eq!(
      value,
      Value::List(vec![Value::Text("c".to_string()), Value::Text("a".to_string())])
    );

    assert!(bind(&kind, RawValue::Selection(vec!["d".into()])).is_err());
  }

  #[test]
  fn test_bind_object() {
    let value = bind(&FieldKind::JsonObject, RawValue::text(r#"{"test": "192.168.0.0/24"}"#)).unwrap();
    assert_eq!(value.to_json(), json!({"test": "192.168.0.0/24"}));

    assert_eq!(
      bind(&FieldKind::JsonObject, RawValue::text("")).unwrap(),
      Value::Object(serde_json::Map::new())
    );
  }

  #[test]
  fn test_bind_object_rejects_arrays() {
    let err = bind(&FieldKind::JsonObject, RawValue::text("[1]")).unwrap_err();
    assert_eq!(err.to_string(), "expected a JSON object, got an array");
  }

  #[test]
  fn test_bind_unsupported_kinds() {
    for kind in [FieldKind::FilePath, FieldKind::TabularFrame, FieldKind::Fallback] {
      let err = bind(&kind, RawValue::text("x")).unwrap_err();
      assert!(matches!(err, BindError::UnsupportedOperation { .. }), "{}", kind);
    }
  }
}
