//! App configuration.
//!
//! Loadable from JSON:
//!
//! ```json
//! {
//!   "title": "Example App",
//!   "description": "This is my app",
//!   "use_logging": true,
//!   "log_level": "info",
//!   "use_wide": true,
//!   "render_code": false
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Severity of a captured log record, and the minimum captured severity.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Trace,
  #[default]
  Debug,
  Info,
  Warn,
  Error,
}

impl From<LogLevel> for tracing::Level {
  fn from(level: LogLevel) -> Self {
    match level {
      LogLevel::Trace => tracing::Level::TRACE,
      LogLevel::Debug => tracing::Level::DEBUG,
      LogLevel::Info => tracing::Level::INFO,
      LogLevel::Warn => tracing::Level::WARN,
      LogLevel::Error => tracing::Level::ERROR,
    }
  }
}

impl From<tracing::Level> for LogLevel {
  fn from(level: tracing::Level) -> Self {
    match level {
      tracing::Level::TRACE => LogLevel::Trace,
      tracing::Level::DEBUG => LogLevel::Debug,
      tracing::Level::INFO => LogLevel::Info,
      tracing::Level::WARN => LogLevel::Warn,
      _ => LogLevel::Error,
    }
  }
}

/// Page layout hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
  Centered,
  Wide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
  /// Shown at the top of the navigation sidebar.
  pub title: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  /// Capture log records emitted while a function runs and show them with
  /// its result.
  #[serde(default)]
  pub use_logging: bool,

  /// Minimum captured level when `use_logging` is set.
  #[serde(default)]
  pub log_level: LogLevel,

  #[serde(default)]
  pub use_wide: bool,

  /// Show each function's source (when it has one) above its form.
  #[serde(default)]
  pub render_code: bool,
}

impl AppConfig {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      description: None,
      use_logging: false,
      log_level: LogLevel::default(),
      use_wide: false,
      render_code: false,
    }
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn use_logging(mut self, enabled: bool) -> Self {
    self.use_logging = enabled;
    self
  }

  pub fn log_level(mut self, level: LogLevel) -> Self {
    self.log_level = level;
    self
  }

  pub fn use_wide(mut self, enabled: bool) -> Self {
    self.use_wide = enabled;
    self
  }

  pub fn render_code(mut self, enabled: bool) -> Self {
    self.render_code = enabled;
    self
  }

  pub fn layout(&self) -> Layout {
    if self.use_wide {
      Layout::Wide
    } else {
      Layout::Centered
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_minimal() {
    let config: AppConfig = serde_json::from_str(r#"{"title": "Example App"}"#).unwrap();
    assert_eq!(config, AppConfig::new("Example App"));
    assert_eq!(config.layout(), Layout::Centered);
  }

  #[test]
  fn test_deserialize_full() {
    let config: AppConfig = serde_json::from_str(
      r#"{
        "title": "Example App",
        "description": "This is my app",
        "use_logging": true,
        "log_level": "info",
        "use_wide": true,
        "render_code": true
      }"#,
    )
    .unwrap();

    assert_eq!(config.description.as_deref(), Some("This is my app"));
    assert!(config.use_logging);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.layout(), Layout::Wide);
    assert!(config.render_code);
  }
}
