//! Browser binding: runs the engine against the live page.
//!
//! `start(entries_json)` wires a [`NavigationController`] over
//! [`WebHistory`] and [`WebDocument`] and parks it in a thread-local slot.
//! Event listeners (summary clicks, the settings affordance, `hashchange`)
//! enqueue their message and then [`drive`] the engine until idle.

pub mod document;
pub mod history;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::core::errors::NavError;
use crate::logger::jsonl::Severity;
use crate::logger::{ActivityEvent, ActivitySink};
use crate::nav::NavigationController;
use crate::store::EntryStore;

pub use document::WebDocument;
pub use history::WebHistory;

type WebController = NavigationController<WebHistory, WebDocument>;

thread_local! {
    static ENGINE: RefCell<Option<WebController>> = const { RefCell::new(None) };
}

/// Activity sink writing JSON lines to the browser console.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ActivitySink for ConsoleSink {
    fn record(&mut self, event: &ActivityEvent) {
        let entry = event.to_log_entry();
        let line = serde_json::to_string(&entry).unwrap_or_else(|e| format!("{entry:?} ({e})"));
        let line = JsValue::from_str(&line);
        match entry.severity {
            Severity::Info => web_sys::console::log_1(&line),
            Severity::Warning => web_sys::console::warn_1(&line),
            Severity::Critical => web_sys::console::error_1(&line),
        }
    }
}

/// Boot the engine on the current page with a JSON array of entries.
#[wasm_bindgen]
pub fn start(entries_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let store = EntryStore::from_json_str(entries_json).map_err(to_js)?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = WebDocument::new(&window).map_err(to_js)?;
    let history = WebHistory::new(window);
    let engine = NavigationController::new(store, history, document, Box::new(ConsoleSink))
        .map_err(to_js)?;

    ENGINE.with(|slot| {
        *slot.borrow_mut() = Some(engine);
    });
    Ok(())
}

/// Route currently rendered, as `{ "view": ..., "index"?: ... }`.
#[wasm_bindgen(js_name = currentRoute)]
pub fn current_route() -> Result<JsValue, JsValue> {
    let route = ENGINE.with(|slot| slot.borrow().as_ref().map(WebController::route));
    let route = route.ok_or_else(|| JsValue::from_str("engine not started"))?;
    serde_wasm_bindgen::to_value(&route).map_err(JsValue::from)
}

/// Handle everything queued for the engine. A no-op when the engine is not
/// started or is already running further up the stack; the running loop
/// drains the new message itself.
pub(crate) fn drive() {
    ENGINE.with(|slot| {
        let Ok(mut guard) = slot.try_borrow_mut() else {
            return;
        };
        if let Some(engine) = guard.as_mut()
            && let Err(err) = engine.run_until_idle()
        {
            web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
        }
    });
}

pub(crate) fn host_error(context: &str, value: &JsValue) -> NavError {
    NavError::Host {
        details: format!("{context}: {value:?}"),
    }
}

pub(crate) fn warn(err: &NavError) {
    web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
}

fn to_js(err: NavError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
