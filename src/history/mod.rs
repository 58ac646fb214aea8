//! History bridge: the only component that touches the history stack.
//!
//! The stack itself belongs to the host environment and is reached through
//! [`HistoryBackend`]. Backends never call back into the engine directly;
//! every fragment change is queued as a [`HistoryEvent`] on a
//! `crossbeam-channel` and delivered when the bridge is pumped. That queue is
//! the commit signal: a pushed fragment is only rendered once its event comes
//! back out of the bridge.

pub mod bridge;
pub mod memory;

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use crate::core::errors::Result;
use crate::route::Route;

pub use bridge::HistoryBridge;
pub use memory::MemoryHistory;

/// Default application origin used by headless backends.
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:5500";

/// Why the active fragment changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    /// A new entry was pushed by the engine.
    Push,
    /// The current entry was rewritten in place.
    Replace,
    /// The user walked one entry back.
    Back,
    /// The user walked one entry forward.
    Forward,
    /// The host reported a change it did not attribute (manual URL edit,
    /// browser chrome).
    External,
}

/// Raw notification emitted by a backend once a fragment change committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEvent {
    /// Active fragment after the change, without `#`.
    pub fragment: String,
    /// What moved the stack.
    pub cause: ChangeCause,
}

/// Parsed notification handed to the registered route-change handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChange {
    /// Route for the new fragment; `Home` when the fragment was malformed.
    pub route: Route,
    /// Fragment as reported by the backend.
    pub fragment: String,
    /// What moved the stack.
    pub cause: ChangeCause,
    /// The fragment did not match the grammar and `route` is the Home fallback.
    pub malformed: bool,
}

/// Narrow contract over a host history stack.
pub trait HistoryBackend {
    /// Install the queue every committed fragment change is reported on.
    fn subscribe(&mut self, sink: Sender<HistoryEvent>);

    /// Active fragment, without `#`.
    fn current_fragment(&self) -> String;

    /// Full URL of the active entry.
    fn url(&self) -> String;

    /// Push a new entry. The commit is reported asynchronously on the sink;
    /// an `Err` means nothing was pushed and no commit will follow.
    fn push(&mut self, fragment: &str) -> Result<()>;

    /// Rewrite the active entry without growing the stack.
    fn replace(&mut self, fragment: &str);

    /// Walk one entry back. Returns `false` without moving at the bottom of
    /// the stack.
    fn back(&mut self) -> bool;

    /// Walk one entry forward. Returns `false` without moving at the top of
    /// the stack.
    fn forward(&mut self) -> bool;

    /// Number of entries from the bottom of the stack up to the active one.
    fn depth(&self) -> usize;
}

/// Strip a single leading `#`.
#[must_use]
pub fn bare_fragment(fragment: &str) -> &str {
    fragment.strip_prefix('#').unwrap_or(fragment)
}

/// Compose a page URL from an origin and a bare fragment.
///
/// An empty fragment yields the bare origin with a trailing slash.
#[must_use]
pub fn compose_url(origin: &str, fragment: &str) -> String {
    let origin = origin.trim_end_matches('/');
    if fragment.is_empty() {
        format!("{origin}/")
    } else {
        format!("{origin}/#{fragment}")
    }
}
