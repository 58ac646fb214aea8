//! [`DocumentSurface`] over the live DOM.
//!
//! Summaries are `<journal-entry>` elements and the detail view is one
//! `<entry-page>`; both receive the entry object through their `entry`
//! property. Each summary carries its own click listener.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, Window};

use super::{drive, host_error, warn};
use crate::core::errors::{NavError, Result};
use crate::route::BodyClass;
use crate::store::JournalEntry;
use crate::view::{ClickSink, ClickTarget, DocumentSurface};

type Listener = Closure<dyn FnMut(Event)>;

/// Live page surface.
pub struct WebDocument {
    document: Document,
    header: Element,
    main: Element,
    settings_affordance: Option<Element>,
    /// Listeners for the summaries currently in `main`.
    summary_listeners: Vec<Listener>,
    settings_listener: Option<Listener>,
}

impl WebDocument {
    /// Locate the page regions the engine owns: the `h1`, `main`, and the
    /// settings image in the `header`.
    pub fn new(window: &Window) -> Result<Self> {
        let document = window.document().ok_or_else(|| NavError::Host {
            details: "window has no document".to_string(),
        })?;
        let header = required(&document, "h1")?;
        let main = required(&document, "main")?;
        let settings_affordance = document
            .query_selector("header img")
            .map_err(|e| host_error("querySelector(header img)", &e))?;
        Ok(Self {
            document,
            header,
            main,
            settings_affordance,
            summary_listeners: Vec::new(),
            settings_listener: None,
        })
    }

    fn entry_element(&self, tag: &str, entry: &JournalEntry) -> Result<Element> {
        let element = self
            .document
            .create_element(tag)
            .map_err(|e| host_error("createElement", &e))?;
        let value = serde_wasm_bindgen::to_value(entry).map_err(|e| NavError::Serialization {
            context: "entry property",
            details: e.to_string(),
        })?;
        js_sys::Reflect::set(&element, &JsValue::from_str("entry"), &value)
            .map_err(|e| host_error("set entry property", &e))?;
        Ok(element)
    }

    fn clear_main(&mut self) {
        self.main.set_inner_html("");
        self.summary_listeners.clear();
    }

    fn append(&self, element: &Element) {
        if let Err(e) = self.main.append_child(element) {
            warn(&host_error("appendChild", &e));
        }
    }
}

fn required(document: &Document, selector: &str) -> Result<Element> {
    document
        .query_selector(selector)
        .map_err(|e| host_error("querySelector", &e))?
        .ok_or_else(|| NavError::Host {
            details: format!("page has no {selector} element"),
        })
}

fn click_listener(clicks: &ClickSink, target: ClickTarget) -> Listener {
    let clicks = clicks.clone();
    Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        clicks.click(target);
        drive();
    })
}

impl DocumentSurface for WebDocument {
    fn set_header_text(&mut self, text: &str) {
        self.header.set_text_content(Some(text));
    }

    fn set_body_class(&mut self, class: BodyClass) {
        match self.document.body() {
            Some(body) => body.set_class_name(class.as_str()),
            None => warn(&NavError::Host {
                details: "page has no body".to_string(),
            }),
        }
    }

    fn show_summaries(&mut self, entries: &[JournalEntry], clicks: &ClickSink) {
        self.clear_main();
        for (offset, entry) in entries.iter().enumerate() {
            let element = match self.entry_element("journal-entry", entry) {
                Ok(element) => element,
                Err(err) => {
                    warn(&err);
                    continue;
                }
            };
            let listener = click_listener(clicks, ClickTarget::Summary {
                position: offset + 1,
            });
            if let Err(e) =
                element.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            {
                warn(&host_error("addEventListener(click)", &e));
            }
            self.append(&element);
            self.summary_listeners.push(listener);
        }
    }

    fn show_entry_detail(&mut self, entry: &JournalEntry) {
        self.clear_main();
        match self.entry_element("entry-page", entry) {
            Ok(element) => self.append(&element),
            Err(err) => warn(&err),
        }
    }

    fn show_settings(&mut self) {
        self.clear_main();
        match self.document.create_element("section") {
            Ok(panel) => {
                panel.set_class_name("settings-panel");
                self.append(&panel);
            }
            Err(e) => warn(&host_error("createElement(section)", &e)),
        }
    }

    fn bind_settings(&mut self, clicks: &ClickSink) {
        let Some(affordance) = &self.settings_affordance else {
            warn(&NavError::Host {
                details: "page has no settings affordance in its header".to_string(),
            });
            return;
        };
        if let Some(previous) = self.settings_listener.take() {
            let _ = affordance
                .remove_event_listener_with_callback("click", previous.as_ref().unchecked_ref());
        }
        let listener = click_listener(clicks, ClickTarget::Settings);
        if let Err(e) =
            affordance.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
        {
            warn(&host_error("addEventListener(click)", &e));
        }
        self.settings_listener = Some(listener);
    }
}
