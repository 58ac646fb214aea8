//! Pure update function for the navigation engine.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing the side-effects the controller should run.
//!
//! **Design invariant:** this module performs zero I/O. Pushes, renders and
//! log records are all described as [`NavCmd`] values.

use super::model::{NavCmd, NavModel, NavMsg};
use crate::core::errors::NavError;
use crate::history::{ChangeCause, RouteChange};
use crate::logger::ActivityEvent;
use crate::route::Route;
use crate::view::ClickTarget;

/// Apply a message to the model and return the next command for the controller.
pub fn update(model: &mut NavModel, msg: NavMsg) -> NavCmd {
    match msg {
        NavMsg::Clicked(target) => handle_click(model, target),
        NavMsg::RouteChanged(change) => handle_route_change(model, change),
        NavMsg::RouteSuperseded(change) => {
            release_if_awaited(model, &change);
            NavCmd::Record(ActivityEvent::ChangeSuperseded {
                fragment: change.fragment,
                cause: change.cause,
            })
        }
        NavMsg::NavigationSkipped(route) => {
            if model.awaiting_commit == Some(route) {
                model.awaiting_commit = None;
            }
            NavCmd::None
        }
    }
}

fn handle_click(model: &mut NavModel, target: ClickTarget) -> NavCmd {
    if let Some(pending) = model.awaiting_commit {
        model.deferred.push_back(target);
        return NavCmd::Record(ActivityEvent::ClickDeferred {
            pending,
            queued: model.deferred.len(),
        });
    }
    let Some(to) = model.click_destination(target) else {
        return NavCmd::None;
    };
    model.awaiting_commit = Some(to);
    NavCmd::Navigate {
        from: model.route,
        to,
    }
}

fn handle_route_change(model: &mut NavModel, change: RouteChange) -> NavCmd {
    let from = model.route;
    let (to, fallback) = resolve_committed(model.entry_count, &change);
    release_if_awaited(model, &change);
    model.route = to;
    model.commits += 1;

    let commit = NavCmd::Commit {
        from,
        to,
        cause: change.cause,
    };
    match fallback {
        Some(err) => {
            model.fallbacks += 1;
            NavCmd::Batch(vec![
                NavCmd::Record(ActivityEvent::RouteFallback {
                    fragment: change.fragment,
                    error_code: err.code(),
                    reason: err.to_string(),
                }),
                commit,
            ])
        }
        None => commit,
    }
}

/// Only the commit of the push being awaited ends the wait; back, forward
/// and edits that land in between leave it in place.
fn release_if_awaited(model: &mut NavModel, change: &RouteChange) {
    if change.cause == ChangeCause::Push && model.awaiting_commit == Some(change.route) {
        model.awaiting_commit = None;
    }
}

/// Route the document should show for a committed change. Malformed
/// fragments and entry indices outside the store both resolve to Home.
pub(super) fn resolve_committed(
    entry_count: usize,
    change: &RouteChange,
) -> (Route, Option<NavError>) {
    if change.malformed {
        return (Route::Home, Some(NavError::malformed(change.fragment.as_str())));
    }
    match change.route.entry_index() {
        Some(index) if !(1..=entry_count).contains(&index) => (
            Route::Home,
            Some(NavError::NotFound {
                index,
                size: entry_count,
            }),
        ),
        _ => (change.route, None),
    }
}
