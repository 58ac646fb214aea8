#![forbid(unsafe_code)]

//! Journal navigation engine: client-side routing and view synchronization
//! for a single-page journal.
//!
//! The page has three views (the entry list, one entry's detail, settings),
//! each addressed by a URL fragment. The engine keeps the document, the
//! fragment and the history stack in agreement:
//! 1. **Routes**: fragment grammar and the per-view header/class projection
//! 2. **History bridge**: pushes, back/forward, committed-change delivery
//! 3. **View synchronizer**: the only writer of header text, body class and content
//! 4. **Navigation controller**: Elm-style loop binding clicks to navigations
//!
//! # Library usage
//!
//! ```rust,no_run
//! use journal_nav::prelude::*;
//!
//! # fn main() -> journal_nav::core::errors::Result<()> {
//! let store = EntryStore::load(std::path::Path::new("entries.json"))?;
//! let mut engine = HeadlessController::headless(store, DEFAULT_ORIGIN, "", Box::new(NullSink))?;
//! engine.click_summary(0);
//! engine.run_until_idle()?;
//! assert_eq!(engine.route(), Route::Entry { index: 1 });
//! # Ok(())
//! # }
//! ```

pub mod prelude;

pub mod core;
pub mod history;
pub mod logger;
pub mod nav;
pub mod route;
pub mod store;
pub mod view;
#[cfg(feature = "web")]
pub mod web;
