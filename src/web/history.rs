//! [`HistoryBackend`] over the browser's `location` and `history`.
//!
//! Every entry the app walks through is stamped with its position in
//! `history.state`. The position bounds `back`/`forward` to the entries the
//! app created, so walking back from the first one never leaves the page.

use std::cell::Cell;
use std::rc::Rc;

use crossbeam_channel::Sender;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, Window};

use super::{drive, host_error, warn};
use crate::core::errors::Result;
use crate::history::{ChangeCause, HistoryBackend, HistoryEvent};

/// Position of the active entry and of the newest entry ahead of it.
#[derive(Debug, Default)]
struct Cursor {
    position: Cell<u32>,
    top: Cell<u32>,
}

impl Cursor {
    /// Record arrival at `position`. A fresh entry drops everything ahead.
    fn arrive(&self, position: u32, fresh: bool) {
        self.position.set(position);
        if fresh || position > self.top.get() {
            self.top.set(position);
        }
    }
}

/// Browser history. Commits arrive as `hashchange` events, which the browser
/// dispatches after the navigation has landed.
pub struct WebHistory {
    window: Window,
    /// Cause of the navigation this backend started, claimed by the next
    /// `hashchange`. Empty means the user drove the change.
    cause: Rc<Cell<Option<ChangeCause>>>,
    cursor: Rc<Cursor>,
    sink: Option<Sender<HistoryEvent>>,
    on_hash_change: Option<Closure<dyn FnMut(Event)>>,
}

impl WebHistory {
    /// Take over the page's current entry as position 0.
    pub fn new(window: Window) -> Self {
        let history = Self {
            window,
            cause: Rc::new(Cell::new(None)),
            cursor: Rc::new(Cursor::default()),
            sink: None,
            on_hash_change: None,
        };
        if let Err(err) = stamp(&history.window, 0) {
            warn(&err);
        }
        history
    }

    fn history(&self) -> Result<web_sys::History> {
        self.window.history().map_err(|e| host_error("window.history", &e))
    }

    /// Address without any fragment, for entries whose fragment is empty.
    fn bare_address(&self) -> String {
        let location = self.window.location();
        let path = location.pathname().unwrap_or_else(|_| "/".to_string());
        let search = location.search().unwrap_or_default();
        format!("{path}{search}")
    }

    /// Report a change the browser will not announce with `hashchange`.
    fn emit_now(&self, cause: ChangeCause) {
        self.cause.set(None);
        if let Some(sink) = &self.sink {
            let _ = sink.send(HistoryEvent {
                fragment: self.current_fragment(),
                cause,
            });
        }
    }

    /// Start a traversal unless `allowed` is false. The cause is only armed
    /// when the browser is actually asked to move.
    fn traverse(
        &self,
        allowed: bool,
        cause: ChangeCause,
        go: impl FnOnce(&web_sys::History) -> std::result::Result<(), JsValue>,
        api: &str,
    ) -> bool {
        if !allowed {
            self.cause.set(None);
            return false;
        }
        self.cause.set(Some(cause));
        match self
            .history()
            .and_then(|h| go(&h).map_err(|e| host_error(api, &e)))
        {
            Ok(()) => true,
            Err(err) => {
                self.cause.set(None);
                warn(&err);
                false
            }
        }
    }
}

fn current_hash(window: &Window) -> String {
    let hash = window.location().hash().unwrap_or_default();
    hash.strip_prefix('#').unwrap_or(&hash).to_string()
}

/// Position stamped on the active entry, if the app stamped it.
fn stamped_position(window: &Window) -> Option<u32> {
    let state = window.history().ok()?.state().ok()?;
    state.as_f64().map(|n| n as u32)
}

/// Stamp the active entry with `position`, keeping its URL.
fn stamp(window: &Window, position: u32) -> Result<()> {
    window
        .history()
        .and_then(|h| h.replace_state(&JsValue::from(position), ""))
        .map_err(|e| host_error("history.replaceState", &e))
}

impl HistoryBackend for WebHistory {
    fn subscribe(&mut self, sink: Sender<HistoryEvent>) {
        if let Some(previous) = self.on_hash_change.take() {
            let _ = self.window.remove_event_listener_with_callback(
                "hashchange",
                previous.as_ref().unchecked_ref(),
            );
        }

        let window = self.window.clone();
        let cause = Rc::clone(&self.cause);
        let cursor = Rc::clone(&self.cursor);
        let events = sink.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            // Traversals land on stamped entries; anything unstamped was just
            // created by a hash assignment or an address-bar edit.
            match stamped_position(&window) {
                Some(position) => cursor.arrive(position, false),
                None => {
                    let position = cursor.position.get() + 1;
                    if let Err(err) = stamp(&window, position) {
                        warn(&err);
                    }
                    cursor.arrive(position, true);
                }
            }
            let event = HistoryEvent {
                fragment: current_hash(&window),
                cause: cause.take().unwrap_or(ChangeCause::External),
            };
            if events.send(event).is_ok() {
                drive();
            }
        });
        if let Err(e) = self
            .window
            .add_event_listener_with_callback("hashchange", callback.as_ref().unchecked_ref())
        {
            warn(&host_error("addEventListener(hashchange)", &e));
        }
        self.on_hash_change = Some(callback);
        self.sink = Some(sink);
    }

    fn current_fragment(&self) -> String {
        current_hash(&self.window)
    }

    fn url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn push(&mut self, fragment: &str) -> Result<()> {
        if fragment.is_empty() {
            // Assigning an empty hash leaves a dangling `#`; push the bare
            // address instead. `pushState` never fires `hashchange`.
            let position = self.cursor.position.get() + 1;
            let address = self.bare_address();
            self.history().and_then(|h| {
                h.push_state_with_url(&JsValue::from(position), "", Some(&address))
                    .map_err(|e| host_error("history.pushState", &e))
            })?;
            self.cursor.arrive(position, true);
            self.emit_now(ChangeCause::Push);
            return Ok(());
        }
        self.cause.set(Some(ChangeCause::Push));
        self.window.location().set_hash(fragment).map_err(|e| {
            self.cause.set(None);
            host_error("location.hash", &e)
        })
    }

    fn replace(&mut self, fragment: &str) {
        let address = if fragment.is_empty() {
            self.bare_address()
        } else {
            format!("#{fragment}")
        };
        let position = JsValue::from(self.cursor.position.get());
        match self.history().and_then(|h| {
            h.replace_state_with_url(&position, "", Some(&address))
                .map_err(|e| host_error("history.replaceState", &e))
        }) {
            Ok(()) => self.emit_now(ChangeCause::Replace),
            Err(err) => warn(&err),
        }
    }

    fn back(&mut self) -> bool {
        let allowed = self.cursor.position.get() > 0;
        self.traverse(allowed, ChangeCause::Back, web_sys::History::back, "history.back")
    }

    fn forward(&mut self) -> bool {
        let allowed = self.cursor.position.get() < self.cursor.top.get();
        self.traverse(
            allowed,
            ChangeCause::Forward,
            web_sys::History::forward,
            "history.forward",
        )
    }

    /// Entries the app walked through since it started, up to the active one.
    fn depth(&self) -> usize {
        self.cursor.position.get() as usize + 1
    }
}

impl Drop for WebHistory {
    fn drop(&mut self) {
        if let Some(callback) = self.on_hash_change.take() {
            let _ = self.window.remove_event_listener_with_callback(
                "hashchange",
                callback.as_ref().unchecked_ref(),
            );
        }
    }
}
