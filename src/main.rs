mod console;
mod demo;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use formkit_runtime::{App, AppConfig, Submission};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::ConsoleRenderer;

/// Formkit - turn plain functions into forms
#[derive(Parser)]
#[command(name = "formkit")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the app config file (default: <config dir>/formkit/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List the registered forms
  List,

  /// Print the derived schema of a form as JSON
  Schema {
    /// Form id (the function name)
    form: String,
  },

  /// Render a form once and submit it
  Run {
    /// Form id (the function name)
    form: String,

    /// Field value, as name=value. Repeatable.
    #[arg(long = "arg", value_parser = parse_field)]
    args: Vec<(String, String)>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formkit=info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let config = load_config(cli.config)?;
  let mut app = App::new(config);
  app
    .register_all(demo::functions())
    .context("failed to register demo functions")?;

  match cli.command {
    Some(Commands::List) => list(&app),
    Some(Commands::Schema { form }) => schema(&app, &form)?,
    Some(Commands::Run { form, args }) => run(&mut app, form, args.into_iter().collect())?,
    None => {
      println!("formkit - use --help to see available commands");
    }
  }

  Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
  let path = match path {
    Some(path) => path,
    None => match dirs::config_dir().map(|dir| dir.join("formkit").join("config.json")) {
      Some(path) if path.exists() => path,
      _ => {
        info!("no config file found, using the demo config");
        return Ok(demo::config());
      }
    },
  };

  let content = std::fs::read_to_string(&path)
    .with_context(|| format!("failed to read config file: {}", path.display()))?;
  let config: AppConfig = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse config file: {}", path.display()))?;

  info!(path = %path.display(), title = %config.title, "loaded config");
  Ok(config)
}

fn list(app: &App) {
  for form in app.forms() {
    let fields: Vec<String> = form
      .schema()
      .fields()
      .iter()
      .map(|f| format!("{}: {}", f.name(), f.kind))
      .collect();
    println!("{:<30} {} ({})", form.id(), form.label(), fields.join(", "));
  }
}

fn schema(app: &App, id: &str) -> Result<()> {
  let form = app
    .form(id)
    .with_context(|| format!("form not found: {}", id))?;
  println!("{}", serde_json::to_string_pretty(form.schema())?);
  Ok(())
}

fn run(app: &mut App, form: String, args: HashMap<String, String>) -> Result<()> {
  let mut renderer = ConsoleRenderer::new(Some(form.clone()), args);
  let submission = app
    .render(&mut renderer)
    .with_context(|| format!("failed to render form: {}", form))?;

  let unused: Vec<&str> = renderer.unused_args().collect();
  if !unused.is_empty() {
    warn!(form = %form, args = ?unused, "ignored arguments");
  }

  match submission {
    Some(Submission::Rejected(errors)) => bail!("{} field(s) failed to bind", errors.len()),
    Some(Submission::Completed(outcome)) => match outcome.result.error() {
      Some(error) => bail!("{} failed: {}", form, error),
      None => Ok(()),
    },
    None => Ok(()),
  }
}

fn parse_field(s: &str) -> Result<(String, String), String> {
  s.split_once('=')
    .map(|(name, value)| (name.trim().to_string(), value.to_string()))
    .ok_or_else(|| format!("expected name=value, got '{}'", s))
}
