//! JSONL activity log: one JSON object per line.
//!
//! A line is serialized whole before it is written, so a reader tailing the
//! file never sees half an event. When the log file cannot be written the
//! writer steps down, never back up: primary file, fallback file, stderr
//! (prefixed `[JNAV-JSONL]`), then nothing. Navigation never fails because
//! logging did.

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::errors::{NavError, Result};

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Log event types for the navigation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStart,
    RoutePushed,
    RouteCommitted,
    RouteFallback,
    PushFailed,
    ChangeSuperseded,
    ClickDeferred,
    Render,
    RenderFailed,
    HistoryBack,
    HistoryForward,
}

/// A single JSONL log entry. Only `ts`, `event`, `severity` are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    /// Route in fragment form (`#entry1`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Route that was active before the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Raw fragment reported by the history backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    /// What caused a history change (`push`, `back`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// History depth after the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    /// JNAV error code when the event reports a failure or recovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Freeform details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: format_utc_now(),
            event,
            severity,
            route: None,
            from: None,
            fragment: None,
            cause: None,
            url: None,
            depth: None,
            error_code: None,
            error_message: None,
            details: None,
        }
    }
}

/// Configuration for the JSONL writer.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    pub fallback_path: Option<PathBuf>,
    /// Size at which the active file is rotated (bytes). Default: 10 MiB.
    pub max_size_bytes: u64,
    /// Rotated generations kept next to the active file. Default: 3.
    pub max_rotated_files: u32,
    /// Minimum seconds between `sync_data` calls. Default: 10.
    pub fsync_interval_secs: u64,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            path: std::env::temp_dir().join("jnav").join("activity.jsonl"),
            fallback_path: None,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
            fsync_interval_secs: 10,
        }
    }
}

/// Which configured file a [`LogFile`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Primary,
    Fallback,
}

/// An open log file and the bytes it holds.
struct LogFile {
    tier: Tier,
    path: PathBuf,
    out: BufWriter<File>,
    len: u64,
}

impl LogFile {
    fn open(path: &Path, tier: Tier) -> Result<Self> {
        let (file, len) = open_append(path)?;
        Ok(Self {
            tier,
            path: path.to_path_buf(),
            out: BufWriter::with_capacity(16 * 1024, file),
            len,
        })
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.len += line.len() as u64;
        Ok(())
    }
}

/// Where lines currently go.
enum Destination {
    File(LogFile),
    Stderr,
    Discard,
}

/// Append-only JSONL writer with size rotation and a one-way fallback chain.
pub struct JsonlWriter {
    config: JsonlConfig,
    dest: Destination,
    last_sync: Instant,
}

impl JsonlWriter {
    /// Open the primary file, stepping down the chain if it cannot be opened.
    pub fn open(config: JsonlConfig) -> Self {
        let dest = match LogFile::open(&config.path, Tier::Primary) {
            Ok(file) => Destination::File(file),
            Err(err) => {
                note(&format!("cannot open {}: {err}", config.path.display()));
                fallback_destination(&config)
            }
        };
        Self {
            config,
            dest,
            last_sync: Instant::now(),
        }
    }

    /// Serialize `entry` and append it as one line.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        match serde_json::to_string(entry) {
            Ok(mut line) => {
                line.push('\n');
                self.write_line(&line);
            }
            Err(e) => note(&format!("serialize error: {e}")),
        }
    }

    pub fn flush(&mut self) {
        if let Destination::File(file) = &mut self.dest {
            let _ = file.out.flush();
        }
    }

    /// Current destination: `normal`, `fallback`, `stderr` or `discard`.
    pub fn state(&self) -> &str {
        match &self.dest {
            Destination::File(file) if file.tier == Tier::Primary => "normal",
            Destination::File(_) => "fallback",
            Destination::Stderr => "stderr",
            Destination::Discard => "discard",
        }
    }

    /// Bytes in the active file, zero when not writing to a file.
    pub fn bytes_written(&self) -> u64 {
        match &self.dest {
            Destination::File(file) => file.len,
            Destination::Stderr | Destination::Discard => 0,
        }
    }

    fn write_line(&mut self, line: &str) {
        while let Destination::File(file) = &mut self.dest {
            if file.len > 0 && file.len + line.len() as u64 > self.config.max_size_bytes {
                self.rotate();
                continue;
            }
            if file.append(line).is_ok() {
                self.sync_if_due();
                return;
            }
            self.step_down();
        }
        if matches!(self.dest, Destination::Stderr)
            && write!(io::stderr(), "[JNAV-JSONL] {line}").is_err()
        {
            self.dest = Destination::Discard;
        }
    }

    fn sync_if_due(&mut self) {
        let interval = Duration::from_secs(self.config.fsync_interval_secs);
        if self.last_sync.elapsed() < interval {
            return;
        }
        if let Destination::File(file) = &mut self.dest {
            let _ = file.out.flush();
            let _ = file.out.get_ref().sync_data();
        }
        self.last_sync = Instant::now();
    }

    /// Move one step down the chain after a failed write.
    fn step_down(&mut self) {
        let dest = std::mem::replace(&mut self.dest, Destination::Discard);
        self.dest = match dest {
            Destination::File(file) if file.tier == Tier::Primary => {
                note(&format!("write to {} failed", file.path.display()));
                fallback_destination(&self.config)
            }
            Destination::File(file) => {
                note(&format!("write to {} failed, using stderr", file.path.display()));
                Destination::Stderr
            }
            Destination::Stderr | Destination::Discard => Destination::Discard,
        };
    }

    /// Close the active file, shift its generations, and reopen it empty.
    fn rotate(&mut self) {
        if !matches!(self.dest, Destination::File(_)) {
            return;
        }
        let Destination::File(file) = std::mem::replace(&mut self.dest, Destination::Discard)
        else {
            return;
        };
        let LogFile {
            tier,
            path,
            mut out,
            ..
        } = file;
        let _ = out.flush();
        drop(out);

        shift_generations(&path, self.config.max_rotated_files);
        self.dest = match LogFile::open(&path, tier) {
            Ok(reopened) => Destination::File(reopened),
            Err(err) => {
                note(&format!("cannot reopen {} after rotation: {err}", path.display()));
                match tier {
                    Tier::Primary => fallback_destination(&self.config),
                    Tier::Fallback => Destination::Stderr,
                }
            }
        };
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        self.flush();
    }
}

// ──────────────────────── helpers ────────────────────────

/// Fallback file if one is configured and opens, stderr otherwise.
fn fallback_destination(config: &JsonlConfig) -> Destination {
    let Some(path) = config.fallback_path.as_deref() else {
        note("no fallback path configured, using stderr");
        return Destination::Stderr;
    };
    match LogFile::open(path, Tier::Fallback) {
        Ok(file) => {
            note(&format!("using fallback {}", path.display()));
            Destination::File(file)
        }
        Err(err) => {
            note(&format!("cannot open fallback {}: {err}, using stderr", path.display()));
            Destination::Stderr
        }
    }
}

fn note(message: &str) {
    let _ = writeln!(io::stderr(), "[JNAV-JSONL] {message}");
}

/// `activity.jsonl` becomes `activity.jsonl.1`, `.1` becomes `.2`, and the
/// generation past `keep` is deleted.
fn shift_generations(path: &Path, keep: u32) {
    let _ = fs::remove_file(generation(path, keep));
    for index in (1..keep).rev() {
        let _ = fs::rename(generation(path, index), generation(path, index + 1));
    }
    let _ = fs::rename(path, generation(path, 1));
}

fn generation(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Open `path` for appending, creating parent directories. Returns the file
/// and its current length.
fn open_append(path: &Path) -> Result<(File, u64)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| NavError::io(parent, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| NavError::io(path, source))?;
    let len = file.metadata().map_or(0, |m| m.len());
    Ok((file, len))
}

fn format_utc_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
