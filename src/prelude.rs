//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use journal_nav::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{NavError, Result};

// Routes and entries
pub use crate::route::{BodyClass, Route};
pub use crate::store::{EntryImage, EntryStore, JournalEntry};

// History
pub use crate::history::memory::MemoryHistory;
pub use crate::history::{
    ChangeCause, DEFAULT_ORIGIN, HistoryBackend, HistoryBridge, HistoryEvent, RouteChange,
};

// View
pub use crate::view::{ClickSink, ClickTarget, DocumentSurface, MemoryDocument, ViewSynchronizer};

// Navigation
pub use crate::nav::{HeadlessController, NavigationController, ViewSnapshot};

// Logging
pub use crate::logger::jsonl::{JsonlConfig, JsonlWriter};
pub use crate::logger::{ActivityEvent, ActivitySink, MemorySink, NullSink};
