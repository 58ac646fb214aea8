//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use journal_nav::core::config::Config;
use journal_nav::core::errors::NavError;
use journal_nav::logger::jsonl::JsonlWriter;
use journal_nav::logger::{ActivitySink, NullSink};
use journal_nav::nav::{HeadlessController, ViewSnapshot};
use journal_nav::history::MemoryHistory;
use journal_nav::route::Route;
use journal_nav::store::EntryStore;
use journal_nav::view::MemoryDocument;

/// Journal navigation engine: replay clicks and history walks headlessly.
#[derive(Debug, Parser)]
#[command(
    name = "jnav",
    author,
    version,
    about = "Journal navigation engine - headless route and view replay",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Drive the engine through a sequence of steps and print each view.
    Replay(ReplayArgs),
    /// Parse a URL fragment into a route.
    Parse(ParseArgs),
    /// List the journal entries in a store file.
    Entries(EntriesArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct ReplayArgs {
    /// JSON file holding the entry array (defaults to `store.entries_file`).
    #[arg(long, value_name = "FILE")]
    entries: Option<PathBuf>,
    /// Fragment the session starts on (defaults to `history.initial_fragment`).
    #[arg(long, value_name = "FRAGMENT", allow_hyphen_values = true)]
    initial: Option<String>,
    /// Steps: `click:<i>` (0-based summary), `settings`, `back`, `forward`,
    /// `goto:<fragment>`.
    #[arg(value_name = "STEP")]
    steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, Args)]
struct ParseArgs {
    /// Fragment to parse, with or without the leading `#`.
    #[arg(allow_hyphen_values = true)]
    fragment: String,
}

#[derive(Debug, Clone, Args)]
struct EntriesArgs {
    /// JSON file holding the entry array (defaults to `store.entries_file`).
    #[arg(long, value_name = "FILE")]
    entries: Option<PathBuf>,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

/// One user action in a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplayStep {
    /// Click the summary element at this 0-based DOM index.
    Click(usize),
    Settings,
    Back,
    Forward,
    /// Type a fragment into the address bar.
    Goto(String),
}

impl FromStr for ReplayStep {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "settings" => return Ok(Self::Settings),
            "back" => return Ok(Self::Back),
            "forward" => return Ok(Self::Forward),
            _ => {}
        }
        if let Some(index) = raw.strip_prefix("click:") {
            return index
                .parse::<usize>()
                .map(Self::Click)
                .map_err(|e| format!("invalid click index {index:?}: {e}"));
        }
        if let Some(fragment) = raw.strip_prefix("goto:") {
            return Ok(Self::Goto(fragment.to_string()));
        }
        Err(format!(
            "unknown step {raw:?} (expected click:<i>, settings, back, forward, goto:<fragment>)"
        ))
    }
}

impl std::fmt::Display for ReplayStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Click(index) => write!(f, "click:{index}"),
            Self::Settings => f.write_str("settings"),
            Self::Back => f.write_str("back"),
            Self::Forward => f.write_str("forward"),
            Self::Goto(fragment) => write!(f, "goto:{fragment}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<NavError> for CliError {
    fn from(err: NavError) -> Self {
        match err {
            NavError::NotFound { .. } | NavError::ChannelClosed { .. } => {
                Self::Internal(err.to_string())
            }
            NavError::Io { .. } | NavError::Host { .. } => Self::Runtime(err.to_string()),
            _ => Self::User(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Replay(args) => run_replay(cli, args),
        Command::Parse(args) => run_parse(cli, args),
        Command::Entries(args) => run_entries(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn load_store(config: &Config, explicit: Option<&Path>) -> Result<EntryStore, CliError> {
    let path = explicit
        .or(config.store.entries_file.as_deref())
        .ok_or_else(|| {
            CliError::User(
                "no entries file: pass --entries or set store.entries_file".to_string(),
            )
        })?;
    Ok(EntryStore::load(path)?)
}

fn activity_sink(config: &Config) -> Box<dyn ActivitySink> {
    if config.log.enabled {
        Box::new(JsonlWriter::open(config.log.jsonl_config()))
    } else {
        Box::new(NullSink)
    }
}

fn run_replay(cli: &Cli, args: &ReplayArgs) -> Result<(), CliError> {
    let mode = output_mode(cli);
    let config = Config::load(cli.config.as_deref())?;
    let store = load_store(&config, args.entries.as_deref())?;
    let initial = args
        .initial
        .as_deref()
        .unwrap_or(&config.history.initial_fragment);
    let hash = config.stable_hash()?;

    let mut engine = HeadlessController::with_config_hash(
        store,
        MemoryHistory::new(&config.history.origin, initial),
        MemoryDocument::new(),
        activity_sink(&config),
        Some(hash),
    )?;

    emit_snapshot(mode, 0, "start", &engine.snapshot())?;
    for (offset, step) in args.steps.iter().enumerate() {
        apply_step(&mut engine, step)?;
        engine.run_until_idle()?;
        emit_snapshot(mode, offset + 1, &step.to_string(), &engine.snapshot())?;
    }
    Ok(())
}

fn apply_step(engine: &mut HeadlessController, step: &ReplayStep) -> Result<(), CliError> {
    match step {
        ReplayStep::Click(element) => {
            if !engine.click_summary(*element) {
                let shown = engine.document().summaries().len();
                return Err(CliError::User(format!(
                    "step click:{element}: the current view shows {shown} summaries"
                )));
            }
        }
        ReplayStep::Settings => {
            if !engine.click_settings() {
                return Err(CliError::Internal(
                    "settings affordance is not bound".to_string(),
                ));
            }
        }
        ReplayStep::Back => {
            engine.back();
        }
        ReplayStep::Forward => {
            engine.forward();
        }
        ReplayStep::Goto(fragment) => {
            engine.go_to_fragment(fragment)?;
        }
    }
    Ok(())
}

fn emit_snapshot(
    mode: OutputMode,
    step_no: usize,
    step: &str,
    snapshot: &ViewSnapshot,
) -> Result<(), CliError> {
    match mode {
        OutputMode::Human => {
            let view = match (&snapshot.entry, snapshot.settings_panel) {
                (Some(entry), _) => format!("entry-page {:?}", entry.title),
                (None, true) => "settings panel".to_string(),
                (None, false) => format!("{} summaries", snapshot.summary_count),
            };
            println!(
                "[{step_no:>2}] {:<14} {}",
                step.bold(),
                snapshot.url.cyan()
            );
            println!(
                "     h1={:?} class={:?} {view} depth={}",
                snapshot.header, snapshot.body_class, snapshot.depth
            );
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "replay",
                "step_no": step_no,
                "step": step,
                "view": serde_json::to_value(snapshot)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_parse(cli: &Cli, args: &ParseArgs) -> Result<(), CliError> {
    let mode = output_mode(cli);
    match Route::parse(&args.fragment) {
        Ok(route) => {
            match mode {
                OutputMode::Human => {
                    println!("{} -> {route:?}", args.fragment);
                    println!("  canonical: {route}");
                    println!("  h1: {:?}", route.header_title());
                    println!("  class: {:?}", route.body_class().as_str());
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "parse",
                        "fragment": args.fragment,
                        "valid": true,
                        "route": serde_json::to_value(route)?,
                        "canonical": route.to_fragment(),
                        "header": route.header_title(),
                        "body_class": route.body_class().as_str(),
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Err(err) => {
            if mode == OutputMode::Json {
                let payload = json!({
                    "command": "parse",
                    "fragment": args.fragment,
                    "valid": false,
                    "error_code": err.code(),
                    "error": err.to_string(),
                    "fallback": serde_json::to_value(Route::Home)?,
                });
                write_json_line(&payload)?;
            }
            Err(err.into())
        }
    }
}

fn run_entries(cli: &Cli, args: &EntriesArgs) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let store = load_store(&config, args.entries.as_deref())?;

    match output_mode(cli) {
        OutputMode::Human => {
            println!("{} entries", store.size());
            for (offset, entry) in store.all().iter().enumerate() {
                println!(
                    "  {:>3}. {:<10} {}",
                    offset + 1,
                    entry.date,
                    entry.title.bold()
                );
            }
        }
        OutputMode::Json => {
            let entries: Vec<Value> = store
                .all()
                .iter()
                .enumerate()
                .map(|(offset, entry)| {
                    json!({
                        "index": offset + 1,
                        "fragment": Route::Entry { index: offset + 1 }.to_fragment(),
                        "entry": entry,
                    })
                })
                .collect();
            let payload = json!({
                "command": "entries",
                "count": store.size(),
                "entries": entries,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())
                .map_err(|e| CliError::Runtime(e.to_string()))?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config
                    .stable_hash()
                    .map_err(|e| CliError::Runtime(e.to_string()))?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("{}", "Configuration is valid.".green());
                        println!("  Source: {}", config.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("{} {e}", "Configuration is INVALID:".red());
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "error_code": e.code(),
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("JNAV_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
