//! Elm-style state model for the navigation engine.
//!
//! All navigation state lives in [`NavModel`]. Clicks and committed history
//! changes arrive as [`NavMsg`] values; side-effects are described by
//! [`NavCmd`] values returned from [`update`](super::update::update).
//!
//! The model performs no I/O and never touches the history stack or the
//! document.

use std::collections::VecDeque;

use crate::history::{ChangeCause, RouteChange};
use crate::logger::ActivityEvent;
use crate::route::Route;
use crate::view::ClickTarget;

// ──────────────────── model ────────────────────

/// Navigation state. `route` is the single authoritative view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavModel {
    /// Route the document currently shows.
    pub route: Route,
    /// Size of the entry store; bounds valid `Entry` indices.
    pub entry_count: usize,
    /// Route pushed to history whose commit has not arrived yet.
    pub awaiting_commit: Option<Route>,
    /// Clicks received while awaiting a commit, oldest first.
    pub deferred: VecDeque<ClickTarget>,
    /// History entries pushed by clicks and fragment edits.
    pub pushes: u64,
    /// Committed route changes applied so far.
    pub commits: u64,
    /// Route changes that fell back to Home.
    pub fallbacks: u64,
}

impl NavModel {
    /// Settled model showing `route` over a store of `entry_count` entries.
    #[must_use]
    pub fn new(route: Route, entry_count: usize) -> Self {
        Self {
            route,
            entry_count,
            awaiting_commit: None,
            deferred: VecDeque::new(),
            pushes: 0,
            commits: 0,
            fallbacks: 0,
        }
    }

    /// Whether `route` can be rendered against the current store.
    #[must_use]
    pub fn is_renderable(&self, route: Route) -> bool {
        route
            .entry_index()
            .is_none_or(|index| (1..=self.entry_count).contains(&index))
    }

    /// Route a click should navigate to, if the click is meaningful.
    #[must_use]
    pub fn click_destination(&self, target: ClickTarget) -> Option<Route> {
        match target {
            ClickTarget::Summary { position } => {
                Route::entry(position).filter(|route| self.is_renderable(*route))
            }
            ClickTarget::Settings => Some(Route::Settings),
        }
    }

    /// No push in flight and nothing deferred.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.awaiting_commit.is_none() && self.deferred.is_empty()
    }
}

// ──────────────────── messages ────────────────────

/// Inputs that drive state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavMsg {
    /// A bound element was clicked.
    Clicked(ClickTarget),
    /// The history bridge reported a committed fragment change.
    RouteChanged(RouteChange),
    /// A committed change that a later change overtook before it was
    /// handled. It must not render.
    RouteSuperseded(RouteChange),
    /// A requested navigation did not push, either because its fragment was
    /// already active or because the backend refused it.
    NavigationSkipped(Route),
}

impl From<ClickTarget> for NavMsg {
    fn from(target: ClickTarget) -> Self {
        Self::Clicked(target)
    }
}

impl From<RouteChange> for NavMsg {
    fn from(change: RouteChange) -> Self {
        Self::RouteChanged(change)
    }
}

// ──────────────────── commands ────────────────────

/// Side-effects returned by the update function for the controller to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCmd {
    /// No side-effect.
    None,
    /// Push `to` onto history. Rendering waits for the commit.
    Navigate {
        /// Route shown when the click landed.
        from: Route,
        /// Destination.
        to: Route,
    },
    /// Apply a committed route: log it and render the document.
    Commit {
        /// Route shown before the commit.
        from: Route,
        /// Route to render.
        to: Route,
        /// What moved the history stack.
        cause: ChangeCause,
    },
    /// Record an activity event.
    Record(ActivityEvent),
    /// Execute multiple commands in order.
    Batch(Vec<Self>),
}
