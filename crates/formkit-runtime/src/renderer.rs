//! The widget-rendering boundary.
//!
//! The engine never draws anything itself. A [`Renderer`] is handed field
//! kinds and render specs and answers with raw values; it may be a GUI
//! toolkit, a terminal, or a scripted test double.

use formkit_coerce::{BindError, RawValue, RenderSpec};
use formkit_schema::{FieldKind, Value};

use crate::capture::LogRecord;
use crate::config::Layout;

/// One entry of the navigation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry<'a> {
  /// Form identifier (the function name).
  pub id: &'a str,
  /// Human-readable label.
  pub label: &'a str,
}

/// Everything the navigation sidebar shows.
#[derive(Debug, Clone)]
pub struct Sidebar<'a> {
  pub title: &'a str,
  pub description: Option<&'a str>,
  pub layout: Layout,
  /// Registered forms, in registration order.
  pub entries: Vec<NavEntry<'a>>,
  /// Id of the form currently shown.
  pub selected: Option<&'a str>,
}

pub trait Renderer {
  /// Draw title, description and navigation. Returns the id the user picked,
  /// or `None` to keep the current form.
  fn draw_sidebar(&mut self, sidebar: &Sidebar<'_>) -> Option<String>;

  /// Show a function's source above its form.
  fn draw_code(&mut self, _form_id: &str, _source: &str) {}

  /// Form title and description.
  fn draw_header(&mut self, title: &str, description: Option<&str>);

  /// Draw one input widget and return what it currently holds.
  fn draw_input(&mut self, kind: &FieldKind, name: &str, default: Option<&Value>) -> RawValue;

  /// Draw a field that cannot be collected.
  fn draw_disabled(&mut self, name: &str, reason: &str);

  /// Whether the form was submitted on this pass.
  fn submitted(&mut self) -> bool;

  /// Show a binding error next to its field.
  fn draw_field_error(&mut self, name: &str, error: &BindError);

  fn draw_output(&mut self, spec: &RenderSpec);

  fn draw_error(&mut self, message: &str);

  /// Show one captured log record. Renderers are expected to style it by level.
  fn draw_log(&mut self, record: &LogRecord);

  fn draw_logs(&mut self, records: &[LogRecord]) {
    for record in records {
      self.draw_log(record);
    }
  }
}
