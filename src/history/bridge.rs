//! Route-level wrapper over a [`HistoryBackend`].

use crossbeam_channel::{Receiver, unbounded};

use super::{HistoryBackend, HistoryEvent, RouteChange, bare_fragment};
use crate::core::errors::Result;
use crate::route::Route;

type RouteChangeHandler = Box<dyn FnMut(RouteChange)>;

/// Owns the history backend and the queue of committed fragment changes.
pub struct HistoryBridge<H: HistoryBackend> {
    backend: H,
    events: Receiver<HistoryEvent>,
    handler: Option<RouteChangeHandler>,
}

impl<H: HistoryBackend> HistoryBridge<H> {
    /// Take ownership of `backend` and subscribe to its change queue.
    pub fn new(mut backend: H) -> Self {
        let (tx, rx) = unbounded();
        backend.subscribe(tx);
        Self {
            backend,
            events: rx,
            handler: None,
        }
    }

    /// Push `route` unless it is already the active fragment.
    ///
    /// Returns `Ok(true)` if an entry was pushed; the matching
    /// [`RouteChange`] arrives on a later [`pump`](Self::pump). A backend
    /// failure pushes nothing and no change will follow.
    pub fn navigate(&mut self, route: Route) -> Result<bool> {
        self.navigate_fragment(&route.to_fragment())
    }

    /// Push a raw fragment unless it is already active. Used for manual
    /// address edits, which may not parse.
    pub fn navigate_fragment(&mut self, fragment: &str) -> Result<bool> {
        let fragment = bare_fragment(fragment);
        if fragment == self.backend.current_fragment() {
            return Ok(false);
        }
        self.backend.push(fragment)?;
        Ok(true)
    }

    /// Rewrite the active entry to `route` without adding history.
    pub fn replace(&mut self, route: Route) {
        self.backend.replace(&route.to_fragment());
    }

    /// Register the route-change handler. Last registration wins.
    pub fn on_route_change(&mut self, handler: impl FnMut(RouteChange) + 'static) {
        self.handler = Some(Box::new(handler));
    }

    /// Walk one entry back; the resulting change arrives on the next pump.
    /// Returns `false` at the bottom of the stack, where nothing moves.
    pub fn back(&mut self) -> bool {
        self.backend.back()
    }

    /// Walk one entry forward. Returns `false` at the top of the stack.
    pub fn forward(&mut self) -> bool {
        self.backend.forward()
    }

    /// Deliver every queued change to the handler, in commit order.
    ///
    /// Changes pumped with no handler registered are discarded. Returns the
    /// number of changes drained.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.events.try_recv() {
            delivered += 1;
            let (route, recovered) = Route::parse_or_home(&event.fragment);
            let change = RouteChange {
                route,
                fragment: event.fragment,
                cause: event.cause,
                malformed: recovered.is_some(),
            };
            if let Some(handler) = self.handler.as_mut() {
                handler(change);
            }
        }
        delivered
    }

    /// Number of committed changes not yet pumped.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.events.len()
    }

    /// Route for the active fragment, with the Home fallback applied.
    #[must_use]
    pub fn current_route(&self) -> Route {
        Route::parse_or_home(&self.backend.current_fragment()).0
    }

    /// Active fragment, without `#`.
    #[must_use]
    pub fn current_fragment(&self) -> String {
        self.backend.current_fragment()
    }

    /// Full URL of the active entry.
    #[must_use]
    pub fn url(&self) -> String {
        self.backend.url()
    }

    /// Entries from the bottom of the stack up to the active one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.backend.depth()
    }

    /// The wrapped backend.
    #[must_use]
    pub fn backend(&self) -> &H {
        &self.backend
    }

    /// The wrapped backend, for simulating host-driven changes.
    pub fn backend_mut(&mut self) -> &mut H {
        &mut self.backend
    }
}
