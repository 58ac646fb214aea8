//! Headless document surface.
//!
//! Mirrors the parts of the journal page the engine owns: the `h1`, the body
//! `class`, and the main area holding either `<journal-entry>` summaries, one
//! `<entry-page>`, or the settings panel.

use serde::Serialize;

use super::{ClickSink, ClickTarget, DocumentSurface};
use crate::route::BodyClass;
use crate::store::JournalEntry;

/// One rendered `<journal-entry>` element.
#[derive(Debug, Clone)]
pub struct SummaryElement {
    /// The element's `entry` property.
    pub entry: JournalEntry,
    position: usize,
    on_click: ClickSink,
}

impl SummaryElement {
    /// 1-based position this element was bound to.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Dispatch this element's own click binding.
    pub fn click(&self) {
        self.on_click.click(ClickTarget::Summary {
            position: self.position,
        });
    }
}

/// Contents of the main area.
#[derive(Debug, Clone, Default)]
pub enum MainContent {
    /// Nothing rendered yet.
    #[default]
    Empty,
    /// `<journal-entry>` elements in store order.
    Summaries(Vec<SummaryElement>),
    /// `<entry-page>` with its `entry` property.
    EntryPage(JournalEntry),
    /// The settings panel.
    Settings,
}

/// Comparable copy of the document's visible state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSnapshot {
    /// `h1` text.
    pub header: String,
    /// Body `class` attribute.
    pub body_class: String,
    /// `entry` properties of the rendered summaries.
    pub summaries: Vec<JournalEntry>,
    /// `entry` property of the rendered detail page.
    pub entry_page: Option<JournalEntry>,
    /// Whether the settings panel is rendered.
    pub settings_panel: bool,
}

/// In-memory [`DocumentSurface`].
#[derive(Debug, Default)]
pub struct MemoryDocument {
    header: String,
    body_class: String,
    main: MainContent,
    settings_click: Option<ClickSink>,
    writes: u64,
}

impl MemoryDocument {
    /// Blank document with nothing bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current `h1` text.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Current body `class` attribute.
    #[must_use]
    pub fn body_class(&self) -> &str {
        &self.body_class
    }

    /// Current main area.
    #[must_use]
    pub fn main(&self) -> &MainContent {
        &self.main
    }

    /// Rendered `<journal-entry>` elements; empty unless the list is shown.
    #[must_use]
    pub fn summaries(&self) -> &[SummaryElement] {
        match &self.main {
            MainContent::Summaries(elements) => elements,
            _ => &[],
        }
    }

    /// `entry` property of the rendered `<entry-page>`, if one is shown.
    #[must_use]
    pub fn entry_page(&self) -> Option<&JournalEntry> {
        match &self.main {
            MainContent::EntryPage(entry) => Some(entry),
            _ => None,
        }
    }

    /// Whether the settings panel occupies the main area.
    #[must_use]
    pub fn settings_panel_shown(&self) -> bool {
        matches!(self.main, MainContent::Settings)
    }

    /// Click the summary element at 0-based DOM `element` index. Returns
    /// `false` when no such element is rendered.
    pub fn click_summary(&self, element: usize) -> bool {
        self.summaries()
            .get(element)
            .map(SummaryElement::click)
            .is_some()
    }

    /// Click the header's settings affordance. Returns `false` if unbound.
    pub fn click_settings(&self) -> bool {
        self.settings_click
            .as_ref()
            .map(|sink| sink.click(ClickTarget::Settings))
            .is_some()
    }

    /// Number of surface writes applied so far.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Copy of the visible state.
    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            header: self.header.clone(),
            body_class: self.body_class.clone(),
            summaries: self.summaries().iter().map(|s| s.entry.clone()).collect(),
            entry_page: self.entry_page().cloned(),
            settings_panel: self.settings_panel_shown(),
        }
    }
}

impl DocumentSurface for MemoryDocument {
    fn set_header_text(&mut self, text: &str) {
        text.clone_into(&mut self.header);
        self.writes += 1;
    }

    fn set_body_class(&mut self, class: BodyClass) {
        class.as_str().clone_into(&mut self.body_class);
        self.writes += 1;
    }

    fn show_summaries(&mut self, entries: &[JournalEntry], clicks: &ClickSink) {
        let elements = entries
            .iter()
            .enumerate()
            .map(|(offset, entry)| SummaryElement {
                entry: entry.clone(),
                position: offset + 1,
                on_click: clicks.clone(),
            })
            .collect();
        self.main = MainContent::Summaries(elements);
        self.writes += 1;
    }

    fn show_entry_detail(&mut self, entry: &JournalEntry) {
        self.main = MainContent::EntryPage(entry.clone());
        self.writes += 1;
    }

    fn show_settings(&mut self) {
        self.main = MainContent::Settings;
        self.writes += 1;
    }

    fn bind_settings(&mut self, clicks: &ClickSink) {
        self.settings_click = Some(clicks.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn entries() -> Vec<JournalEntry> {
        vec![
            JournalEntry::new("a", "1/1/2021", "x", "https://s/a.jpg", "a"),
            JournalEntry::new("b", "1/2/2021", "y", "https://s/b.jpg", "b"),
        ]
    }

    #[test]
    fn new_document_is_blank() {
        let doc = MemoryDocument::new();
        assert_eq!(doc.header(), "");
        assert_eq!(doc.body_class(), "");
        assert!(matches!(doc.main(), MainContent::Empty));
        assert!(!doc.click_summary(0));
        assert!(!doc.click_settings());
    }

    #[test]
    fn rerender_drops_stale_bindings() {
        let fired = Rc::new(Cell::new(0_usize));
        let counter = Rc::clone(&fired);
        let clicks = ClickSink::new(move |_| counter.set(counter.get() + 1));

        let mut doc = MemoryDocument::new();
        doc.show_summaries(&entries(), &clicks);
        assert_eq!(doc.summaries()[1].position(), 2);
        doc.show_settings();
        assert!(!doc.click_summary(0));
        assert_eq!(fired.get(), 0);
        assert!(doc.settings_panel_shown());
    }

    #[test]
    fn snapshot_reflects_detail() {
        let mut doc = MemoryDocument::new();
        let entry = entries().remove(0);
        doc.show_entry_detail(&entry);
        let snap = doc.snapshot();
        assert_eq!(snap.entry_page, Some(entry));
        assert!(snap.summaries.is_empty());
        assert!(!snap.settings_panel);
        assert_eq!(doc.writes(), 1);
    }
}
