//! The application: a registry of forms plus navigation between them.

use formkit_coerce::RawInputs;
use tracing::{error, info, instrument, warn};

use crate::capture::LogCapture;
use crate::config::AppConfig;
use crate::error::RegistryError;
use crate::form::{ComponentForm, Submission};
use crate::function::FunctionDef;
use crate::renderer::{NavEntry, Renderer, Sidebar};

/// Holds registered forms in registration order and tracks which one is
/// shown.
///
/// Forms are immutable once registered. The only state carried between
/// render passes is the current selection.
#[derive(Debug)]
pub struct App {
  config: AppConfig,
  forms: Vec<ComponentForm>,
  selected: usize,
  capture: Option<LogCapture>,
}

impl App {
  pub fn new(config: AppConfig) -> Self {
    let capture = config.use_logging.then(|| LogCapture::new(config.log_level));
    Self {
      config,
      forms: Vec::new(),
      selected: 0,
      capture,
    }
  }

  pub fn config(&self) -> &AppConfig {
    &self.config
  }

  /// Register a function as a form. Ids must be unique.
  pub fn register(&mut self, function: FunctionDef) -> Result<&ComponentForm, RegistryError> {
    if self.form(function.name()).is_some() {
      return Err(RegistryError::DuplicateForm {
        id: function.name().to_string(),
      });
    }

    let form = ComponentForm::new(function);
    info!(
      form = form.id(),
      fields = form.schema().fields().len(),
      "form registered"
    );
    self.forms.push(form);

    let index = self.forms.len() - 1;
    Ok(&self.forms[index])
  }

  /// Register several functions, stopping at the first duplicate.
  pub fn register_all(&mut self, functions: impl IntoIterator<Item = FunctionDef>) -> Result<(), RegistryError> {
    for function in functions {
      self.register(function)?;
    }
    Ok(())
  }

  pub fn forms(&self) -> &[ComponentForm] {
    &self.forms
  }

  pub fn form(&self, id: &str) -> Option<&ComponentForm> {
    self.forms.iter().find(|f| f.id() == id)
  }

  /// Navigation entries, in registration order.
  pub fn navigation(&self) -> Vec<NavEntry<'_>> {
    self
      .forms
      .iter()
      .map(|f| NavEntry {
        id: f.id(),
        label: f.label(),
      })
      .collect()
  }

  /// The form currently shown. The first registered form until another is
  /// selected.
  pub fn selected(&self) -> Option<&ComponentForm> {
    self.forms.get(self.selected)
  }

  pub fn select(&mut self, id: &str) -> Result<&ComponentForm, RegistryError> {
    let index = self
      .forms
      .iter()
      .position(|f| f.id() == id)
      .ok_or_else(|| RegistryError::UnknownForm { id: id.to_string() })?;
    self.selected = index;
    Ok(&self.forms[index])
  }

  /// Submit raw inputs to a form without rendering anything.
  pub fn submit(&self, id: &str, raw: RawInputs) -> Result<Submission, RegistryError> {
    let form = self
      .form(id)
      .ok_or_else(|| RegistryError::UnknownForm { id: id.to_string() })?;
    Ok(form.submit(raw, self.capture.as_ref()))
  }

  /// One full render pass: sidebar, optional source, then the selected form.
  ///
  /// Returns the submission, if the form was submitted on this pass.
  #[instrument(name = "app_render", skip(self, renderer), fields(title = %self.config.title))]
  pub fn render(&mut self, renderer: &mut dyn Renderer) -> Result<Option<Submission>, RegistryError> {
    let choice = {
      let sidebar = Sidebar {
        title: &self.config.title,
        description: self.config.description.as_deref(),
        layout: self.config.layout(),
        entries: self.navigation(),
        selected: self.selected().map(ComponentForm::id),
      };
      renderer.draw_sidebar(&sidebar)
    };

    if self.forms.is_empty() {
      error!("no forms registered");
      renderer.draw_error(&RegistryError::Empty.to_string());
      return Err(RegistryError::Empty);
    }

    // An unknown choice keeps the current form on screen.
    if let Some(id) = choice
      && let Err(err) = self.select(&id)
    {
      warn!(form = %id, "sidebar chose an unknown form");
      renderer.draw_error(&err.to_string());
    }

    let form = &self.forms[self.selected];
    if self.config.render_code
      && let Some(source) = form.function().source()
    {
      renderer.draw_code(form.id(), source);
    }

    Ok(form.render(renderer, self.capture.as_ref()))
  }
}

#[cfg(test)]
mod tests {
  use formkit_schema::{TypeAnnotation, Value};

  use super::*;

  fn constant(name: &str) -> FunctionDef {
    FunctionDef::new(name, |_| Ok(Value::Int(1))).returns(TypeAnnotation::Int)
  }

  #[test]
  fn test_first_form_selected_by_default() {
    let mut app = App::new(AppConfig::new("Tools"));
    assert!(app.selected().is_none());

    app.register(constant("first")).unwrap();
    app.register(constant("second")).unwrap();
    assert_eq!(app.selected().map(ComponentForm::id), Some("first"));

    app.select("second").unwrap();
    assert_eq!(app.selected().map(ComponentForm::id), Some("second"));
  }

  #[test]
  fn test_duplicate_registration_rejected() {
    let mut app = App::new(AppConfig::new("Tools"));
    app.register(constant("add")).unwrap();

    let err = app.register(constant("add")).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateForm { id } if id == "add"));
    assert_eq!(app.forms().len(), 1);
  }

  #[test]
  fn test_unknown_form() {
    let mut app = App::new(AppConfig::new("Tools"));
    app.register(constant("add")).unwrap();

    assert!(matches!(app.select("nope"), Err(RegistryError::UnknownForm { .. })));
    assert!(matches!(
      app.submit("nope", RawInputs::new()),
      Err(RegistryError::UnknownForm { .. })
    ));
    assert_eq!(app.selected().map(ComponentForm::id), Some("add"));
  }

  #[test]
  fn test_capture_follows_config() {
    let app = App::new(AppConfig::new("Tools"));
    assert!(app.capture.is_none());

    let app = App::new(AppConfig::new("Tools").use_logging(true));
    assert!(app.capture.is_some());
  }
}
