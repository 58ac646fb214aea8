//! Navigation controller: the runtime that drives [`update`] and executes the
//! commands it returns.
//!
//! Every input reaches the controller as a [`NavMsg`] on one FIFO inbox:
//! summary and settings clicks through the [`ClickSink`] bound into the
//! document, committed fragment changes through the history bridge's
//! route-change handler. [`NavigationController::run_until_idle`] drains the
//! inbox without blocking.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use serde::Serialize;

use super::model::{NavCmd, NavModel, NavMsg};
use super::update::{resolve_committed, update};
use crate::core::errors::{NavError, Result};
use crate::history::memory::MemoryHistory;
use crate::history::{ChangeCause, HistoryBackend, HistoryBridge, RouteChange};
use crate::logger::{ActivityEvent, ActivitySink};
use crate::route::Route;
use crate::store::{EntryStore, JournalEntry};
use crate::view::{ClickSink, DocumentSurface, MemoryDocument, ViewSynchronizer};

/// Controller over in-memory history and document, used by the CLI and tests.
pub type HeadlessController = NavigationController<MemoryHistory, MemoryDocument>;

/// Serializable view of the page after a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    /// Route the document shows.
    pub route: Route,
    /// Address bar contents.
    pub url: String,
    /// Active fragment, without `#`.
    pub fragment: String,
    /// History depth up to the active entry.
    pub depth: usize,
    /// `h1` text.
    pub header: String,
    /// Body `class` attribute.
    pub body_class: String,
    /// Number of `<journal-entry>` summaries in `main`.
    pub summary_count: usize,
    /// Entry bound to the `<entry-page>` detail, if shown.
    pub entry: Option<JournalEntry>,
    /// Whether the settings panel is shown.
    pub settings_panel: bool,
    /// Completed renders.
    pub renders: u64,
    /// History entries pushed.
    pub pushes: u64,
    /// Route changes that fell back to Home.
    pub fallbacks: u64,
}

/// Owns the model, the history bridge and the view synchronizer.
pub struct NavigationController<H: HistoryBackend, D: DocumentSurface> {
    model: NavModel,
    bridge: HistoryBridge<H>,
    view: ViewSynchronizer<D>,
    inbox: Receiver<NavMsg>,
    sink: Box<dyn ActivitySink>,
}

impl<H: HistoryBackend, D: DocumentSurface> NavigationController<H, D> {
    /// Wire the engine together and render the current fragment without
    /// pushing a history entry.
    pub fn new(
        store: EntryStore,
        history: H,
        document: D,
        sink: Box<dyn ActivitySink>,
    ) -> Result<Self> {
        Self::with_config_hash(store, history, document, sink, None)
    }

    /// Like [`new`](Self::new), tagging the session-start record with the
    /// hash of the effective configuration.
    pub fn with_config_hash(
        store: EntryStore,
        history: H,
        document: D,
        sink: Box<dyn ActivitySink>,
        config_hash: Option<String>,
    ) -> Result<Self> {
        let (tx, inbox) = unbounded::<NavMsg>();

        let mut bridge = HistoryBridge::new(history);
        let changes = tx.clone();
        bridge.on_route_change(move |change| {
            // The inbox outlives the bridge; a failed send means the
            // controller is being dropped.
            let _ = changes.send(NavMsg::RouteChanged(change));
        });

        let mut view = ViewSynchronizer::new(store, document, click_sink(tx));
        view.bind_settings();

        let fragment = bridge.current_fragment();
        let (parsed, parse_err) = Route::parse_or_home(&fragment);
        let initial = RouteChange {
            route: parsed,
            fragment,
            cause: ChangeCause::External,
            malformed: parse_err.is_some(),
        };
        let entry_count = view.store().size();
        let (route, fallback) = resolve_committed(entry_count, &initial);

        let mut model = NavModel::new(route, entry_count);
        if fallback.is_some() {
            model.fallbacks += 1;
        }
        let mut controller = Self {
            model,
            bridge,
            view,
            inbox,
            sink,
        };
        if let Some(err) = fallback {
            controller.record_fallback(initial.fragment, &err);
        }

        let event = ActivityEvent::SessionStarted {
            route,
            url: controller.bridge.url(),
            entries: entry_count,
            config_hash,
        };
        controller.sink.record(&event);
        controller.render(route)?;
        Ok(controller)
    }

    /// Drain the inbox, handling messages until nothing is queued.
    ///
    /// Committed history changes are pumped into the inbox before every
    /// message, and deferred clicks are replayed ahead of newer input once
    /// the awaited commit has rendered. A committed change whose fragment is
    /// no longer the active one has been overtaken and is not rendered.
    /// Returns the number of messages handled.
    pub fn run_until_idle(&mut self) -> Result<usize> {
        let mut handled = 0;
        loop {
            self.bridge.pump();
            let Some(msg) = self.next_message()? else {
                break;
            };
            let msg = match msg {
                NavMsg::RouteChanged(change)
                    if change.fragment != self.bridge.current_fragment() =>
                {
                    NavMsg::RouteSuperseded(change)
                }
                msg => msg,
            };
            let cmd = update(&mut self.model, msg);
            self.execute(cmd)?;
            handled += 1;
        }
        Ok(handled)
    }

    fn next_message(&mut self) -> Result<Option<NavMsg>> {
        if self.model.awaiting_commit.is_none()
            && let Some(target) = self.model.deferred.pop_front()
        {
            return Ok(Some(NavMsg::Clicked(target)));
        }
        match self.inbox.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(NavError::ChannelClosed {
                component: "navigation inbox",
            }),
        }
    }

    fn execute(&mut self, cmd: NavCmd) -> Result<()> {
        match cmd {
            NavCmd::None => {}
            NavCmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute(cmd)?;
                }
            }
            NavCmd::Record(event) => self.sink.record(&event),
            NavCmd::Navigate { from, to } => match self.bridge.navigate(to) {
                Ok(true) => {
                    self.model.pushes += 1;
                    let depth = self.bridge.depth();
                    self.sink
                        .record(&ActivityEvent::RoutePushed { from, to, depth });
                }
                Ok(false) => {
                    let cmd = update(&mut self.model, NavMsg::NavigationSkipped(to));
                    self.execute(cmd)?;
                }
                Err(err) => {
                    self.sink.record(&ActivityEvent::PushFailed {
                        to,
                        error_code: err.code(),
                        reason: err.to_string(),
                    });
                    let cmd = update(&mut self.model, NavMsg::NavigationSkipped(to));
                    self.execute(cmd)?;
                }
            },
            NavCmd::Commit { from, to, cause } => {
                let event = ActivityEvent::RouteCommitted {
                    from,
                    to,
                    cause,
                    url: self.bridge.url(),
                    depth: self.bridge.depth(),
                };
                self.sink.record(&event);
                self.render(to)?;
            }
        }
        Ok(())
    }

    fn render(&mut self, route: Route) -> Result<()> {
        match self.view.render(route) {
            Ok(()) => {
                self.sink.record(&ActivityEvent::Rendered { route });
                Ok(())
            }
            Err(err) => {
                self.sink.record(&ActivityEvent::RenderFailed {
                    route,
                    error_code: err.code(),
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn record_fallback(&mut self, fragment: String, err: &NavError) {
        self.sink.record(&ActivityEvent::RouteFallback {
            fragment,
            error_code: err.code(),
            reason: err.to_string(),
        });
    }

    /// Walk one history entry back. The resulting route renders on the next
    /// [`run_until_idle`](Self::run_until_idle). Returns `false` at the
    /// bottom of the stack.
    pub fn back(&mut self) -> bool {
        if !self.bridge.back() {
            return false;
        }
        let depth = self.bridge.depth();
        self.sink.record(&ActivityEvent::HistoryBack { depth });
        // Queue the change behind clicks already received, not ahead of them.
        self.bridge.pump();
        true
    }

    /// Walk one history entry forward. Returns `false` at the top of the
    /// stack.
    pub fn forward(&mut self) -> bool {
        if !self.bridge.forward() {
            return false;
        }
        let depth = self.bridge.depth();
        self.sink.record(&ActivityEvent::HistoryForward { depth });
        self.bridge.pump();
        true
    }

    /// Push a raw fragment as a manual address edit would. Returns
    /// `Ok(false)` when the fragment is already active.
    pub fn go_to_fragment(&mut self, fragment: &str) -> Result<bool> {
        let from = self.model.route;
        if !self.bridge.navigate_fragment(fragment)? {
            return Ok(false);
        }
        self.model.pushes += 1;
        let (to, _) = Route::parse_or_home(fragment);
        let depth = self.bridge.depth();
        self.sink
            .record(&ActivityEvent::RoutePushed { from, to, depth });
        self.bridge.pump();
        Ok(true)
    }

    /// Route the document currently shows.
    #[must_use]
    pub fn route(&self) -> Route {
        self.model.route
    }

    /// Full navigation state, counters included.
    #[must_use]
    pub fn model(&self) -> &NavModel {
        &self.model
    }

    /// History bridge the engine navigates through.
    #[must_use]
    pub fn bridge(&self) -> &HistoryBridge<H> {
        &self.bridge
    }

    /// Mutable bridge, for driving the history stack behind the engine's
    /// back the way browser chrome does.
    pub fn bridge_mut(&mut self) -> &mut HistoryBridge<H> {
        &mut self.bridge
    }

    /// Entries the views render.
    #[must_use]
    pub fn store(&self) -> &EntryStore {
        self.view.store()
    }

    /// Document surface as last rendered.
    #[must_use]
    pub fn document(&self) -> &D {
        self.view.document()
    }

    /// Completed renders, the initial one included.
    #[must_use]
    pub fn renders(&self) -> u64 {
        self.view.renders()
    }
}

impl<H: HistoryBackend> NavigationController<H, MemoryDocument> {
    /// Click the summary element at 0-based DOM `element` index.
    pub fn click_summary(&self, element: usize) -> bool {
        self.document().click_summary(element)
    }

    /// Click the header's settings affordance.
    pub fn click_settings(&self) -> bool {
        self.document().click_settings()
    }

    /// Capture the page for reporting.
    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        let doc = self.document();
        ViewSnapshot {
            route: self.model.route,
            url: self.bridge.url(),
            fragment: self.bridge.current_fragment(),
            depth: self.bridge.depth(),
            header: doc.header().to_string(),
            body_class: doc.body_class().to_string(),
            summary_count: doc.summaries().len(),
            entry: doc.entry_page().cloned(),
            settings_panel: doc.settings_panel_shown(),
            renders: self.view.renders(),
            pushes: self.model.pushes,
            fallbacks: self.model.fallbacks,
        }
    }
}

impl HeadlessController {
    /// Headless engine over fresh in-memory history at `origin`, starting
    /// from `initial_fragment`.
    pub fn headless(
        store: EntryStore,
        origin: &str,
        initial_fragment: &str,
        sink: Box<dyn ActivitySink>,
    ) -> Result<Self> {
        Self::new(
            store,
            MemoryHistory::new(origin, initial_fragment),
            MemoryDocument::new(),
            sink,
        )
    }
}

fn click_sink(tx: Sender<NavMsg>) -> ClickSink {
    ClickSink::new(move |target| {
        let _ = tx.send(NavMsg::Clicked(target));
    })
}

/// Recorded commits whose route disagrees with the URL they were recorded
/// at, as `(route, url)` pairs.
#[cfg(test)]
pub(super) fn commits_off_location(
    events: &[ActivityEvent],
    entry_count: usize,
) -> Vec<(Route, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            ActivityEvent::RouteCommitted { to, url, .. } => {
                let fragment = url.split_once('#').map_or("", |(_, fragment)| fragment);
                let (shown, _) = Route::parse_or_home(fragment);
                let expected = match shown.entry_index() {
                    Some(index) if !(1..=entry_count).contains(&index) => Route::Home,
                    _ => shown,
                };
                (expected != *to).then(|| (*to, url.clone()))
            }
            _ => None,
        })
        .collect()
}
