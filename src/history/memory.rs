//! In-memory history stack with browser semantics.
//!
//! Pushing truncates any forward tail; `back`/`forward` move a cursor and
//! never underflow or overflow. Every change is queued on the subscribed sink
//! instead of being delivered inline, the same way a browser delivers
//! `hashchange` on a later turn of its event loop.

use crossbeam_channel::Sender;

use crate::core::errors::Result;

use super::{ChangeCause, DEFAULT_ORIGIN, HistoryBackend, HistoryEvent, bare_fragment, compose_url};

/// Headless history backend.
#[derive(Debug)]
pub struct MemoryHistory {
    origin: String,
    entries: Vec<String>,
    cursor: usize,
    sink: Option<Sender<HistoryEvent>>,
}

impl MemoryHistory {
    /// Start a session at `origin` with `initial_fragment` as the page's own
    /// entry.
    #[must_use]
    pub fn new(origin: &str, initial_fragment: &str) -> Self {
        Self {
            origin: origin.to_string(),
            entries: vec![bare_fragment(initial_fragment).to_string()],
            cursor: 0,
            sink: None,
        }
    }

    /// Simulate the user typing a new fragment into the address bar.
    pub fn edit(&mut self, fragment: &str) {
        self.push_entry(bare_fragment(fragment), ChangeCause::External);
    }

    /// All entries in stack order, bottom first.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Index of the active entry.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn push_entry(&mut self, fragment: &str, cause: ChangeCause) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment.to_string());
        self.cursor = self.entries.len() - 1;
        self.emit(cause);
    }

    fn emit(&self, cause: ChangeCause) {
        if let Some(sink) = &self.sink {
            // Receiver lives in the bridge that owns this backend.
            let _ = sink.send(HistoryEvent {
                fragment: self.current_fragment(),
                cause,
            });
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN, "")
    }
}

impl HistoryBackend for MemoryHistory {
    fn subscribe(&mut self, sink: Sender<HistoryEvent>) {
        self.sink = Some(sink);
    }

    fn current_fragment(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn url(&self) -> String {
        compose_url(&self.origin, &self.entries[self.cursor])
    }

    fn push(&mut self, fragment: &str) -> Result<()> {
        self.push_entry(bare_fragment(fragment), ChangeCause::Push);
        Ok(())
    }

    fn replace(&mut self, fragment: &str) {
        self.entries[self.cursor] = bare_fragment(fragment).to_string();
        self.emit(ChangeCause::Replace);
    }

    fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.emit(ChangeCause::Back);
        true
    }

    fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        self.emit(ChangeCause::Forward);
        true
    }

    fn depth(&self) -> usize {
        self.cursor + 1
    }
}
