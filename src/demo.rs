//! The demo app: a handful of everyday functions exposed as forms.

use std::net::IpAddr;
use std::path::PathBuf;

use chrono::{Datelike, Duration, Local, Weekday};
use formkit_runtime::{AppConfig, Arguments, FunctionDef, FunctionError, LogLevel};
use formkit_schema::{Table, TypeAnnotation, Value};
use serde_json::json;
use tracing::info;

pub fn config() -> AppConfig {
  AppConfig::new("Example App")
    .description("This is my app")
    .use_wide(true)
    .use_logging(true)
    .log_level(LogLevel::Debug)
}

pub fn functions() -> Vec<FunctionDef> {
  vec![
    FunctionDef::new("add", add)
      .param("a", TypeAnnotation::Int)
      .param("b", TypeAnnotation::Int)
      .returns(TypeAnnotation::Int)
      .with_doc("Adds two numbers together"),
    FunctionDef::new("divide", divide)
      .param("a", TypeAnnotation::Float)
      .param("b", TypeAnnotation::Float)
      .returns(TypeAnnotation::Float)
      .with_doc("Divides two numbers."),
    FunctionDef::new("count_words", count_words)
      .param("text", TypeAnnotation::Str)
      .returns(TypeAnnotation::Int)
      .with_doc("Count the number of words in a given text."),
    FunctionDef::new("capitalize_words", capitalize_words)
      .param("text", TypeAnnotation::list(TypeAnnotation::Str))
      .returns(TypeAnnotation::list(TypeAnnotation::Str))
      .with_doc("Capitalizes the words in a list."),
    FunctionDef::new("change_string", change_string)
      .param("text", TypeAnnotation::Str)
      .param("change", TypeAnnotation::literal(["upper", "lower", "title"]))
      .returns(TypeAnnotation::Str)
      .with_doc("Change the case of the input text based on the specified change."),
    FunctionDef::new("count_hosts", count_hosts)
      .param(
        "payload",
        TypeAnnotation::mapping(TypeAnnotation::Str, TypeAnnotation::Str),
      )
      .returns(TypeAnnotation::mapping(TypeAnnotation::Str, TypeAnnotation::Int))
      .with_doc("Counts the number of hosts in each CIDR."),
    FunctionDef::new("count_weekend_days", count_weekend_days)
      .param("start_date", TypeAnnotation::Date)
      .param("end_date", TypeAnnotation::Date)
      .returns(TypeAnnotation::Int)
      .with_doc("Counts the number of weekend days between two given dates."),
    FunctionDef::new("get_datetime_diff", get_datetime_diff)
      .param("start_dt", TypeAnnotation::DateTime)
      .param("end_dt", TypeAnnotation::DateTime)
      .returns(TypeAnnotation::mapping(
        TypeAnnotation::Str,
        TypeAnnotation::Union(vec![TypeAnnotation::Int, TypeAnnotation::Float]),
      ))
      .with_doc("Calculate the difference between two datetime objects."),
    FunctionDef::new("get_incidents_from_year", get_incidents_from_year)
      .param(
        "year",
        TypeAnnotation::literal(["2020", "2021", "2022", "2023"]),
      )
      .returns(TypeAnnotation::Frame)
      .with_doc("Retrieve incidents from a specific year."),
    FunctionDef::new("generate_random_numbers_file", generate_random_numbers_file)
      .param("size", TypeAnnotation::Int)
      .param("path_to_save", TypeAnnotation::Str)
      .returns(TypeAnnotation::Path)
      .with_doc("Generate a file with random numbers."),
    FunctionDef::new("get_current_datetime", get_current_datetime)
      .returns(TypeAnnotation::DateTime)
      .with_doc("Get the current datetime."),
  ]
}

fn add(args: &Arguments) -> Result<Value, FunctionError> {
  args
    .int("a")?
    .checked_add(args.int("b")?)
    .map(Value::Int)
    .ok_or_else(|| FunctionError::new("OverflowError", "integer addition overflowed"))
}

fn divide(args: &Arguments) -> Result<Value, FunctionError> {
  let b = args.float("b")?;
  if b == 0.0 {
    return Err(FunctionError::new("ZeroDivisionError", "float division by zero"));
  }
  Ok(Value::Float(args.float("a")? / b))
}

fn count_words(args: &Arguments) -> Result<Value, FunctionError> {
  Ok(Value::Int(args.text("text")?.split_whitespace().count() as i64))
}

fn capitalize_words(args: &Arguments) -> Result<Value, FunctionError> {
  let words: Vec<String> = args.text_list("text")?.into_iter().map(capitalize).collect();
  Ok(Value::from(words))
}

fn change_string(args: &Arguments) -> Result<Value, FunctionError> {
  let text = args.text("text")?;
  let changed = match args.text("change")? {
    "upper" => text.to_uppercase(),
    "lower" => text.to_lowercase(),
    "title" => title_case(text),
    other => return Err(FunctionError::value_error(format!("unknown change '{}'", other))),
  };
  Ok(Value::Text(changed))
}

fn count_hosts(args: &Arguments) -> Result<Value, FunctionError> {
  let mut counts = serde_json::Map::new();
  for (name, cidr) in args.object("payload")? {
    let cidr = cidr
      .as_str()
      .ok_or_else(|| FunctionError::type_error(format!("CIDR for '{}' must be a string", name)))?;
    let hosts = host_count(cidr)?;
    let value = u64::try_from(hosts).map_or_else(|_| json!(hosts.to_string()), |n| json!(n));
    counts.insert(name.clone(), value);
  }
  Ok(Value::Object(counts))
}

fn count_weekend_days(args: &Arguments) -> Result<Value, FunctionError> {
  let start = args.date("start_date")?;
  let end = args.date("end_date")?;

  let diff = (end - start).num_days();
  info!("There are {} day(s) difference between {} and {}", diff, start, end);

  let weekend = (0..=diff)
    .filter_map(|offset| start.checked_add_signed(Duration::days(offset)))
    .filter(|day| matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
    .count();
  Ok(Value::Int(weekend as i64))
}

const MICROS_PER_SECOND: i128 = 1_000_000;
const MICROS_PER_DAY: i128 = 86_400 * MICROS_PER_SECOND;

/// Days, seconds and microseconds, normalized so that only `days` is ever
/// negative.
fn get_datetime_diff(args: &Arguments) -> Result<Value, FunctionError> {
  let delta = args.datetime("end_dt")? - args.datetime("start_dt")?;
  let micros = i128::from(delta.num_seconds()) * MICROS_PER_SECOND
    + i128::from(delta.subsec_nanos() / 1_000);

  let days = micros.div_euclid(MICROS_PER_DAY);
  let rest = micros.rem_euclid(MICROS_PER_DAY);

  let mut diff = serde_json::Map::new();
  diff.insert("days".to_string(), json!(days as i64));
  diff.insert("seconds".to_string(), json!((rest / MICROS_PER_SECOND) as i64));
  diff.insert("microseconds".to_string(), json!((rest % MICROS_PER_SECOND) as i64));
  Ok(Value::Object(diff))
}

const INCIDENTS: &[(i64, &str, &str)] = &[
  (2020, "Database outage", "high"),
  (2020, "Expired TLS certificate", "medium"),
  (2021, "Phishing campaign", "high"),
  (2021, "Disk full on build server", "low"),
  (2021, "DNS misconfiguration", "medium"),
  (2022, "Leaked API token", "high"),
  (2022, "Load balancer failover", "medium"),
  (2023, "Ransomware attempt", "critical"),
  (2023, "Backup job failures", "low"),
];

fn get_incidents_from_year(args: &Arguments) -> Result<Value, FunctionError> {
  let year: i64 = args.text("year")?.parse()?;

  let mut table = Table::new(vec![
    "year".to_string(),
    "title".to_string(),
    "severity".to_string(),
  ]);
  for (incident_year, title, severity) in INCIDENTS {
    table.push_row(vec![json!(incident_year), json!(title), json!(severity)]);
  }

  let Some(column) = table.column("year") else {
    return Ok(Value::Frame(table));
  };
  Ok(Value::Frame(table.filter(|row| row[column] == json!(year))))
}

fn generate_random_numbers_file(args: &Arguments) -> Result<Value, FunctionError> {
  let size = args.int("size")?;
  if size < 0 {
    return Err(FunctionError::value_error("size must not be negative"));
  }
  let path = PathBuf::from(args.text("path_to_save")?);

  let values: Vec<String> = (0..size).map(|_| rand::random::<f64>().to_string()).collect();
  std::fs::write(&path, values.join("\n"))?;
  Ok(Value::Path(path))
}

fn get_current_datetime(_args: &Arguments) -> Result<Value, FunctionError> {
  Ok(Value::DateTime(Local::now().naive_local()))
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    None => String::new(),
  }
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
fn title_case(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut in_word = false;
  for c in text.chars() {
    if c.is_alphabetic() {
      if in_word {
        out.extend(c.to_lowercase());
      } else {
        out.extend(c.to_uppercase());
      }
      in_word = true;
    } else {
      out.push(c);
      in_word = false;
    }
  }
  out
}

/// Usable hosts in a network given in CIDR notation.
///
/// IPv4 excludes the network and broadcast addresses except for /31 and /32;
/// IPv6 excludes only the subnet-router anycast address, except for /127 and
/// /128. Host bits must be zero.
fn host_count(cidr: &str) -> Result<u128, FunctionError> {
  let invalid = || FunctionError::value_error(format!("'{}' does not appear to be an IPv4 or IPv6 network", cidr));

  let (addr, prefix) = match cidr.split_once('/') {
    Some((addr, prefix)) => (addr, Some(prefix)),
    None => (cidr, None),
  };
  let addr: IpAddr = addr.trim().parse().map_err(|_| invalid())?;

  let (bits, value) = match addr {
    IpAddr::V4(v4) => (32u32, u128::from(u32::from(v4))),
    IpAddr::V6(v6) => (128u32, u128::from(v6)),
  };
  let prefix = match prefix {
    Some(p) => p.trim().parse::<u32>().map_err(|_| invalid())?,
    None => bits,
  };
  if prefix > bits {
    return Err(invalid());
  }

  let host_bits = bits - prefix;
  let host_mask = if host_bits == 128 { u128::MAX } else { (1u128 << host_bits) - 1 };
  if value & host_mask != 0 {
    return Err(FunctionError::value_error(format!("{} has host bits set", cidr)));
  }

  let total = if host_bits == 128 { u128::MAX } else { 1u128 << host_bits };
  let count = match (addr, host_bits) {
    (_, 0) => 1,
    (_, 1) => 2,
    (IpAddr::V4(_), _) => total - 2,
    (IpAddr::V6(_), _) => total - 1,
  };
  Ok(count)
}
