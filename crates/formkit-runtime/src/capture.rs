//! Scoped log capture around a single invocation.
//!
//! A [`LogCapture`] installs a collecting subscriber as the thread's default
//! dispatcher, runs a closure, and uninstalls it again. The subscriber guard
//! is dropped on every exit path, including unwinding, so records emitted by
//! one invocation never show up in another.
//!
//! Capturing adds to whatever was listening before: every event is also
//! handed on to the dispatcher that was the default when the capture started.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::config::LogLevel;

/// One log record emitted during an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
  pub level: LogLevel,
  pub target: String,
  pub message: String,
}

/// Captures log records for the duration of one call.
///
/// Capture is scoped to the calling thread. Records emitted on threads the
/// call spawns are not captured; they go to the global subscriber, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogCapture {
  level: LogLevel,
}

impl LogCapture {
  /// Capture records at `level` and above.
  pub fn new(level: LogLevel) -> Self {
    Self { level }
  }

  pub fn level(&self) -> LogLevel {
    self.level
  }

  /// Run `f` with capture attached, returning its output and the records it
  /// emitted, in emission order.
  pub fn run<T>(&self, f: impl FnOnce() -> T) -> (T, Vec<LogRecord>) {
    let records = Arc::new(Mutex::new(Vec::new()));
    let layer = CaptureLayer {
      records: Arc::clone(&records),
      level: self.level.into(),
    };
    let forward = ForwardLayer {
      outer: tracing::dispatcher::get_default(Dispatch::clone),
    };
    let subscriber = tracing_subscriber::registry().with(layer).with(forward);

    let output = {
      let _guard = tracing::subscriber::set_default(subscriber);
      f()
    };

    let captured = std::mem::take(&mut *records.lock().unwrap_or_else(PoisonError::into_inner));
    (output, captured)
  }
}

/// Records events at `level` and above.
///
/// The level is checked here rather than through a per-layer filter, which
/// keeps nested captures on one thread independent of each other.
struct CaptureLayer {
  records: Arc<Mutex<Vec<LogRecord>>>,
  level: Level,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    if *event.metadata().level() > self.level {
      return;
    }

    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);

    let metadata = event.metadata();
    let record = LogRecord {
      level: LogLevel::from(*metadata.level()),
      target: metadata.target().to_string(),
      message: visitor.finish(),
    };

    self
      .records
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(record);
  }
}

/// Hands every event to the dispatcher that was active before capture began.
///
/// Sits outermost so it runs after the capture layer has recorded the event.
/// Events with an explicit parent are not forwarded, since that span only
/// exists in the capturing registry.
struct ForwardLayer {
  outer: Dispatch,
}

impl<S: Subscriber> Layer<S> for ForwardLayer {
  fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
    if event.parent().is_none() && self.outer.enabled(event.metadata()) {
      self.outer.event(event);
    }
  }
}

/// Flattens an event into `message key=value key=value`.
#[derive(Default)]
struct MessageVisitor {
  message: String,
  fields: Vec<String>,
}

impl MessageVisitor {
  fn finish(self) -> String {
    if self.fields.is_empty() {
      return self.message;
    }
    let fields = self.fields.join(" ");
    if self.message.is_empty() {
      fields
    } else {
      format!("{} {}", self.message, fields)
    }
  }
}

impl Visit for MessageVisitor {
  fn record_str(&mut self, field: &Field, value: &str) {
    if field.name() == "message" {
      self.message = value.to_string();
    } else {
      self.fields.push(format!("{}={}", field.name(), value));
    }
  }

  fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
    if field.name() == "message" {
      self.message = format!("{:?}", value);
    } else {
      self.fields.push(format!("{}={:?}", field.name(), value));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_captures_in_emission_order() {
    let capture = LogCapture::new(LogLevel::Debug);
    let (value, records) = capture.run(|| {
      tracing::info!("first");
      tracing::warn!(days = 6, "second");
      42
    });

    assert_eq!(value, 42);
    let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second days=6"]);
    assert_eq!(records[0].level, LogLevel::Info);
    assert_eq!(records[1].level, LogLevel::Warn);
  }

  #[test]
  fn test_respects_minimum_level() {
    let capture = LogCapture::new(LogLevel::Warn);
    let ((), records) = capture.run(|| {
      tracing::debug!("noise");
      tracing::info!("more noise");
      tracing::error!("boom");
    });

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "boom");
  }

  #[test]
  fn test_detaches_after_run() {
    let capture = LogCapture::new(LogLevel::Debug);
    let ((), first) = capture.run(|| tracing::info!("inside"));
    tracing::info!("outside");
    let ((), second) = capture.run(|| ());

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
  }

  fn explode() -> u32 {
    tracing::info!("before panic");
    panic!("boom");
  }

  #[test]
  fn test_outer_subscriber_still_receives_records() {
    let outer = LogCapture::new(LogLevel::Info);
    let (((), inner), outer_records) = outer.run(|| {
      LogCapture::new(LogLevel::Debug).run(|| {
        tracing::debug!("detail");
        tracing::info!(target: "user_fn", "starting");
      })
    });

    let inner: Vec<&str> = inner.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(inner, vec!["detail", "starting"]);

    // The outer capture keeps its own minimum level.
    assert_eq!(outer_records.len(), 1);
    assert_eq!(outer_records[0].target, "user_fn");
    assert_eq!(outer_records[0].message, "starting");
  }

  #[test]
  fn test_spawned_threads_are_not_captured() {
    let capture = LogCapture::new(LogLevel::Debug);
    let ((), records) = capture.run(|| {
      tracing::info!("on caller");
      std::thread::spawn(|| tracing::info!("on worker"))
        .join()
        .unwrap();
    });

    let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["on caller"]);
  }

  #[test]
  fn test_detaches_when_closure_panics() {
    let capture = LogCapture::new(LogLevel::Debug);
    let result = std::panic::catch_unwind(|| capture.run(explode));
    assert!(result.is_err());

    let ((), records) = capture.run(|| tracing::info!("next call"));
    let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["next call"]);
  }
}
