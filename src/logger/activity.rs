//! Navigation activity events and the sinks that record them.

#![allow(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;

use crate::history::ChangeCause;
use crate::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};
use crate::route::Route;

/// Everything the engine reports while it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    SessionStarted {
        route: Route,
        url: String,
        entries: usize,
        config_hash: Option<String>,
    },
    RoutePushed {
        from: Route,
        to: Route,
        depth: usize,
    },
    RouteCommitted {
        from: Route,
        to: Route,
        cause: ChangeCause,
        url: String,
        depth: usize,
    },
    /// A fragment change could not be honored and Home was rendered instead.
    RouteFallback {
        fragment: String,
        error_code: &'static str,
        reason: String,
    },
    /// The backend refused a push; the navigation was dropped.
    PushFailed {
        to: Route,
        error_code: &'static str,
        reason: String,
    },
    /// A committed change was overtaken by a later one before it could
    /// render; the location no longer shows `fragment`.
    ChangeSuperseded {
        fragment: String,
        cause: ChangeCause,
    },
    /// A click arrived while a push was awaiting its commit.
    ClickDeferred {
        pending: Route,
        queued: usize,
    },
    Rendered {
        route: Route,
    },
    RenderFailed {
        route: Route,
        error_code: &'static str,
        reason: String,
    },
    HistoryBack {
        depth: usize,
    },
    HistoryForward {
        depth: usize,
    },
}

impl ActivityEvent {
    /// Flatten into a JSONL entry.
    #[must_use]
    pub fn to_log_entry(&self) -> LogEntry {
        match self {
            Self::SessionStarted {
                route,
                url,
                entries,
                config_hash,
            } => {
                let mut e = LogEntry::new(EventType::SessionStart, Severity::Info);
                e.route = Some(route.to_string());
                e.url = Some(url.clone());
                e.details = Some(match config_hash {
                    Some(hash) => format!("entries={entries} config_hash={hash}"),
                    None => format!("entries={entries}"),
                });
                e
            }
            Self::RoutePushed { from, to, depth } => {
                let mut e = LogEntry::new(EventType::RoutePushed, Severity::Info);
                e.from = Some(from.to_string());
                e.route = Some(to.to_string());
                e.depth = Some(*depth);
                e
            }
            Self::RouteCommitted {
                from,
                to,
                cause,
                url,
                depth,
            } => {
                let mut e = LogEntry::new(EventType::RouteCommitted, Severity::Info);
                e.from = Some(from.to_string());
                e.route = Some(to.to_string());
                e.cause = Some(cause_label(*cause).to_string());
                e.url = Some(url.clone());
                e.depth = Some(*depth);
                e
            }
            Self::RouteFallback {
                fragment,
                error_code,
                reason,
            } => {
                let mut e = LogEntry::new(EventType::RouteFallback, Severity::Warning);
                e.fragment = Some(fragment.clone());
                e.route = Some(Route::Home.to_string());
                e.error_code = Some((*error_code).to_string());
                e.error_message = Some(reason.clone());
                e
            }
            Self::PushFailed {
                to,
                error_code,
                reason,
            } => {
                let mut e = LogEntry::new(EventType::PushFailed, Severity::Warning);
                e.route = Some(to.to_string());
                e.error_code = Some((*error_code).to_string());
                e.error_message = Some(reason.clone());
                e
            }
            Self::ChangeSuperseded { fragment, cause } => {
                let mut e = LogEntry::new(EventType::ChangeSuperseded, Severity::Info);
                e.fragment = Some(fragment.clone());
                e.cause = Some(cause_label(*cause).to_string());
                e
            }
            Self::ClickDeferred { pending, queued } => {
                let mut e = LogEntry::new(EventType::ClickDeferred, Severity::Info);
                e.route = Some(pending.to_string());
                e.details = Some(format!("queued={queued}"));
                e
            }
            Self::Rendered { route } => {
                let mut e = LogEntry::new(EventType::Render, Severity::Info);
                e.route = Some(route.to_string());
                e
            }
            Self::RenderFailed {
                route,
                error_code,
                reason,
            } => {
                let mut e = LogEntry::new(EventType::RenderFailed, Severity::Critical);
                e.route = Some(route.to_string());
                e.error_code = Some((*error_code).to_string());
                e.error_message = Some(reason.clone());
                e
            }
            Self::HistoryBack { depth } => {
                let mut e = LogEntry::new(EventType::HistoryBack, Severity::Info);
                e.depth = Some(*depth);
                e
            }
            Self::HistoryForward { depth } => {
                let mut e = LogEntry::new(EventType::HistoryForward, Severity::Info);
                e.depth = Some(*depth);
                e
            }
        }
    }
}

const fn cause_label(cause: ChangeCause) -> &'static str {
    match cause {
        ChangeCause::Push => "push",
        ChangeCause::Replace => "replace",
        ChangeCause::Back => "back",
        ChangeCause::Forward => "forward",
        ChangeCause::External => "external",
    }
}

/// Destination for activity events. Recording must never fail the caller.
pub trait ActivitySink {
    fn record(&mut self, event: &ActivityEvent);
}

impl ActivitySink for JsonlWriter {
    fn record(&mut self, event: &ActivityEvent) {
        self.write_entry(&event.to_log_entry());
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ActivitySink for NullSink {
    fn record(&mut self, _event: &ActivityEvent) {}
}

/// Sink that keeps events in a shared buffer, for inspection after the
/// engine has taken ownership of the sink.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Rc<RefCell<Vec<ActivityEvent>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events.borrow().clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&ActivityEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }
}

impl ActivitySink for MemorySink {
    fn record(&mut self, event: &ActivityEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
