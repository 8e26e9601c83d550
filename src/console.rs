//! A terminal renderer driven by command-line arguments.

use std::collections::HashMap;
use std::io::{self, Write};

use formkit_coerce::{BindError, RawValue, RenderSpec};
use formkit_runtime::{Layout, LogLevel, LogRecord, Renderer, Sidebar};
use formkit_schema::{FieldKind, Table, Value};

/// Renders to stdout. Field values come from `--arg name=value` pairs and
/// the form is always submitted.
pub struct ConsoleRenderer<W: Write = io::Stdout> {
  out: W,
  form: Option<String>,
  args: HashMap<String, String>,
}

impl ConsoleRenderer {
  pub fn new(form: Option<String>, args: HashMap<String, String>) -> Self {
    Self::with_writer(io::stdout(), form, args)
  }
}

impl<W: Write> ConsoleRenderer<W> {
  pub fn with_writer(out: W, form: Option<String>, args: HashMap<String, String>) -> Self {
    Self { out, form, args }
  }

  #[cfg(test)]
  pub fn into_inner(self) -> W {
    self.out
  }

  /// Arguments that no field asked for.
  pub fn unused_args(&self) -> impl Iterator<Item = &str> {
    self.args.keys().map(String::as_str)
  }

  fn line(&mut self, text: impl AsRef<str>) {
    // Nothing useful to do if stdout is gone.
    let _ = writeln!(self.out, "{}", text.as_ref());
  }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
  fn draw_sidebar(&mut self, sidebar: &Sidebar<'_>) -> Option<String> {
    let rule = match sidebar.layout {
      Layout::Wide => "=".repeat(72),
      Layout::Centered => "=".repeat(40),
    };
    self.line(&rule);
    self.line(sidebar.title);
    if let Some(description) = sidebar.description {
      self.line(description);
    }
    self.line(&rule);
    self.form.take()
  }

  fn draw_code(&mut self, _form_id: &str, source: &str) {
    for line in source.lines() {
      self.line(format!("    {}", line));
    }
    self.line("");
  }

  fn draw_header(&mut self, title: &str, description: Option<&str>) {
    self.line(format!("## {}", title));
    if let Some(description) = description {
      self.line(description);
    }
    self.line("");
  }

  fn draw_input(&mut self, kind: &FieldKind, name: &str, default: Option<&Value>) -> RawValue {
    let raw = match self.args.remove(name) {
      Some(text) => RawValue::Text(text),
      None => RawValue::Missing,
    };

    let shown = match (&raw, default) {
      (RawValue::Text(text), _) => text.clone(),
      (_, Some(default)) => format!("{} (default)", default),
      _ => "<missing>".to_string(),
    };
    match kind.allowed() {
      Some(allowed) => {
        let options: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        self.line(format!("  {} [{}: {}] = {}", name, kind, options.join(" | "), shown));
      }
      None => self.line(format!("  {} [{}] = {}", name, kind, shown)),
    }
    raw
  }

  fn draw_disabled(&mut self, name: &str, reason: &str) {
    self.line(format!("  {} (disabled: {})", name, reason));
  }

  fn submitted(&mut self) -> bool {
    self.line("");
    true
  }

  fn draw_field_error(&mut self, name: &str, error: &BindError) {
    self.line(format!("invalid value for '{}': {}", name, error));
  }

  fn draw_output(&mut self, spec: &RenderSpec) {
    match spec {
      RenderSpec::Json(json) => {
        let text = serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string());
        self.line(text);
      }
      RenderSpec::Table(table) => {
        for row in format_table(table) {
          self.line(row);
        }
      }
      RenderSpec::File { path, file_name } => {
        self.line(format!("Download {} ({})", file_name, path.display()));
      }
      RenderSpec::Text(text) | RenderSpec::ReadOnly(text) => self.line(text),
      RenderSpec::Value(value) => self.line(value.to_string()),
      RenderSpec::Empty => self.line("(no result)"),
    }
  }

  fn draw_error(&mut self, message: &str) {
    self.line(format!("error: {}", message));
  }

  fn draw_log(&mut self, record: &LogRecord) {
    let tag = match record.level {
      LogLevel::Error => "ERROR",
      LogLevel::Warn => "WARN ",
      LogLevel::Info => "INFO ",
      LogLevel::Debug => "DEBUG",
      LogLevel::Trace => "TRACE",
    };
    self.line(format!("[{}] {}", tag, record.message));
  }
}

fn format_table(table: &Table) -> Vec<String> {
  let cells: Vec<Vec<String>> = table
    .rows
    .iter()
    .map(|row| row.iter().map(cell).collect())
    .collect();

  let widths: Vec<usize> = table
    .columns
    .iter()
    .enumerate()
    .map(|(i, column)| {
      cells
        .iter()
        .filter_map(|row| row.get(i))
        .map(|c| c.chars().count())
        .chain(std::iter::once(column.chars().count()))
        .max()
        .unwrap_or(0)
    })
    .collect();

  let mut lines = vec![padded(table.columns.iter().map(String::as_str), &widths)];
  let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
  lines.push(padded(rules.iter().map(String::as_str), &widths));
  for row in &cells {
    lines.push(padded(row.iter().map(String::as_str), &widths));
  }
  lines
}

fn padded<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
  values
    .zip(widths)
    .map(|(v, w)| format!("{:<width$}", v, width = *w))
    .collect::<Vec<_>>()
    .join("  ")
    .trim_end()
    .to_string()
}

fn cell(value: &serde_json::Value) -> String {
  match value {
    serde_json::Value::String(s) => s.clone(),
    serde_json::Value::Null => String::new(),
    other => other.to_string(),
  }
}
