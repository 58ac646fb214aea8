//! View synchronizer: projects the active [`Route`] onto the document.
//!
//! The projection is a pure function ([`ViewState::resolve`]); the
//! synchronizer computes it in full before touching the document, then
//! applies header, body class, and main content in that order. Nothing else
//! in the crate writes header text or the body class.

pub mod memory;

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::core::errors::Result;
use crate::route::{BodyClass, Route};
use crate::store::{EntryStore, JournalEntry};

pub use memory::{DocumentSnapshot, MainContent, MemoryDocument, SummaryElement};

/// Something on the page a user can click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ClickTarget {
    /// The entry summary at 1-based `position` in store order.
    Summary {
        /// 1-based store position.
        position: usize,
    },
    /// The settings affordance in the header.
    Settings,
}

/// Cloneable click callback handed to each element when it is bound.
#[derive(Clone)]
pub struct ClickSink(Rc<dyn Fn(ClickTarget)>);

impl ClickSink {
    /// Wrap `callback`.
    pub fn new(callback: impl Fn(ClickTarget) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Fire the callback for `target`.
    pub fn click(&self, target: ClickTarget) {
        (self.0)(target);
    }
}

impl fmt::Debug for ClickSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClickSink")
    }
}

/// Host document the engine renders into.
///
/// Implementations replace main content wholesale on each `show_*` call and
/// must drop any click bindings that belonged to replaced elements.
pub trait DocumentSurface {
    /// Set the `h1` text.
    fn set_header_text(&mut self, text: &str);

    /// Replace the body `class` attribute with exactly `class`.
    fn set_body_class(&mut self, class: BodyClass);

    /// Render one summary element per entry, in order, each bound to
    /// `ClickTarget::Summary` with its own 1-based position.
    fn show_summaries(&mut self, entries: &[JournalEntry], clicks: &ClickSink);

    /// Render the detail element for `entry`.
    fn show_entry_detail(&mut self, entry: &JournalEntry);

    /// Render the settings panel.
    fn show_settings(&mut self);

    /// Bind the header's settings affordance.
    fn bind_settings(&mut self, clicks: &ClickSink);
}

/// Main-content part of a view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum ViewBody<'a> {
    /// Every entry, as summaries.
    Summaries(&'a [JournalEntry]),
    /// One entry's detail page.
    Detail(&'a JournalEntry),
    /// The settings panel.
    Settings,
}

/// Everything the document shows for one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState<'a> {
    /// `h1` text.
    pub header_title: String,
    /// Body `class` attribute.
    pub body_class: BodyClass,
    /// Main-area content.
    pub body: ViewBody<'a>,
}

impl<'a> ViewState<'a> {
    /// Project `route` against `store`. Fails with `NotFound` for an entry
    /// index outside the store.
    pub fn resolve(route: Route, store: &'a EntryStore) -> Result<Self> {
        let body = match route {
            Route::Home => ViewBody::Summaries(store.all()),
            Route::Entry { index } => ViewBody::Detail(store.get(index)?),
            Route::Settings => ViewBody::Settings,
        };
        Ok(Self {
            header_title: route.header_title(),
            body_class: route.body_class(),
            body,
        })
    }
}

/// Owns the document surface and the entry store it renders from.
#[derive(Debug)]
pub struct ViewSynchronizer<D: DocumentSurface> {
    store: EntryStore,
    document: D,
    clicks: ClickSink,
    renders: u64,
}

impl<D: DocumentSurface> ViewSynchronizer<D> {
    /// Take ownership of the document; nothing is rendered yet.
    pub fn new(store: EntryStore, document: D, clicks: ClickSink) -> Self {
        Self {
            store,
            document,
            clicks,
            renders: 0,
        }
    }

    /// Apply the view state for `route`.
    ///
    /// On `NotFound` the document is left untouched and the error is
    /// returned; callers only construct indices from the live store, so this
    /// is an invariant violation rather than a user-facing condition.
    pub fn render(&mut self, route: Route) -> Result<()> {
        let state = ViewState::resolve(route, &self.store)?;
        self.document.set_header_text(&state.header_title);
        self.document.set_body_class(state.body_class);
        match state.body {
            ViewBody::Summaries(entries) => self.document.show_summaries(entries, &self.clicks),
            ViewBody::Detail(entry) => self.document.show_entry_detail(entry),
            ViewBody::Settings => self.document.show_settings(),
        }
        self.renders += 1;
        Ok(())
    }

    /// Bind the settings affordance to this synchronizer's click sink.
    pub fn bind_settings(&mut self) {
        self.document.bind_settings(&self.clicks);
    }

    /// Entries rendered from.
    #[must_use]
    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// The owned document surface.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Completed renders since construction.
    #[must_use]
    pub fn renders(&self) -> u64 {
        self.renders
    }
}
