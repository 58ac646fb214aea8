//! Property-based tests for navigation invariants.
//!
//! Uses `proptest` to check that the fragment grammar round-trips and that
//! arbitrary sequences of clicks, history walks and address edits leave the
//! document consistent with the committed route.

use proptest::prelude::*;

use super::controller::{HeadlessController, commits_off_location};
use super::model::{NavModel, NavMsg};
use super::update;
use crate::history::{ChangeCause, DEFAULT_ORIGIN, RouteChange};
use crate::logger::{MemorySink, NullSink};
use crate::route::Route;
use crate::store::{EntryStore, JournalEntry};
use crate::view::ClickTarget;

const STORE_SIZE: usize = 10;

// ──────────────────── strategies ────────────────────

fn arb_route() -> impl Strategy<Value = Route> {
    prop_oneof![
        Just(Route::Home),
        Just(Route::Settings),
        (1usize..=usize::MAX).prop_map(|index| Route::Entry { index }),
    ]
}

fn arb_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("/".to_string()),
        Just("settings".to_string()),
        Just("entry0".to_string()),
        Just("entry01".to_string()),
        (1usize..=15).prop_map(|n| format!("entry{n}")),
        "[a-z0-9#/]{0,12}",
    ]
}

fn arb_click() -> impl Strategy<Value = ClickTarget> {
    prop_oneof![
        (0usize..=12).prop_map(|position| ClickTarget::Summary { position }),
        Just(ClickTarget::Settings),
    ]
}

fn arb_msg() -> impl Strategy<Value = NavMsg> {
    prop_oneof![
        arb_click().prop_map(NavMsg::Clicked),
        arb_fragment().prop_map(|fragment| NavMsg::RouteChanged(change_for(&fragment))),
        arb_route().prop_map(|route| NavMsg::RouteChanged(pushed(route))),
        arb_route().prop_map(|route| NavMsg::RouteSuperseded(pushed(route))),
        arb_route().prop_map(NavMsg::NavigationSkipped),
    ]
}

#[derive(Debug, Clone)]
enum Action {
    ClickSummary(usize),
    ClickSettings,
    Back,
    Forward,
    /// Back/forward buttons moving the stack without telling the engine.
    ChromeBack,
    ChromeForward,
    Edit(String),
    Settle,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0usize..12).prop_map(Action::ClickSummary),
        2 => Just(Action::ClickSettings),
        2 => Just(Action::Back),
        1 => Just(Action::Forward),
        1 => Just(Action::ChromeBack),
        1 => Just(Action::ChromeForward),
        1 => arb_fragment().prop_map(Action::Edit),
        3 => Just(Action::Settle),
    ]
}

// ──────────────────── helpers ────────────────────

fn change_for(fragment: &str) -> RouteChange {
    let (route, err) = Route::parse_or_home(fragment);
    RouteChange {
        route,
        fragment: fragment.to_string(),
        cause: ChangeCause::External,
        malformed: err.is_some(),
    }
}

fn pushed(route: Route) -> RouteChange {
    RouteChange {
        route,
        fragment: route.to_fragment(),
        cause: ChangeCause::Push,
        malformed: false,
    }
}

fn store() -> EntryStore {
    let entries = (1..=STORE_SIZE)
        .map(|i| {
            JournalEntry::new(
                &format!("entry title {i}"),
                &format!("4/{i}/2021"),
                &format!("body {i}"),
                &format!("https://img.example/{i}.jpg"),
                &format!("picture {i}"),
            )
        })
        .collect();
    EntryStore::new(entries).unwrap()
}

/// Route a fragment should display once committed.
fn displayed_route(fragment: &str) -> Route {
    match Route::parse(fragment) {
        Ok(Route::Entry { index }) if index > STORE_SIZE => Route::Home,
        Ok(route) => route,
        Err(_) => Route::Home,
    }
}

/// Apply one user action. Returns `false` for `Settle`, which the caller
/// handles.
fn apply(ctl: &mut HeadlessController, action: &Action) -> bool {
    match action {
        Action::ClickSummary(element) => {
            let _ = ctl.click_summary(*element);
        }
        Action::ClickSettings => {
            let _ = ctl.click_settings();
        }
        Action::Back => {
            let _ = ctl.back();
        }
        Action::Forward => {
            let _ = ctl.forward();
        }
        Action::ChromeBack => {
            let _ = ctl.bridge_mut().back();
        }
        Action::ChromeForward => {
            let _ = ctl.bridge_mut().forward();
        }
        Action::Edit(fragment) => {
            let _ = ctl.go_to_fragment(fragment);
        }
        Action::Settle => return false,
    }
    true
}

fn assert_document_matches(ctl: &HeadlessController) {
    let route = ctl.route();
    let doc = ctl.document();
    assert_eq!(doc.header(), route.header_title());
    assert_eq!(doc.body_class(), route.body_class().as_str());
    match route {
        Route::Home => assert_eq!(doc.summaries().len(), STORE_SIZE),
        Route::Entry { index } => {
            assert_eq!(doc.entry_page(), Some(ctl.store().get(index).unwrap()));
        }
        Route::Settings => assert!(doc.settings_panel_shown()),
    }
}

// ──────────────────── property tests ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every route survives serialize then parse.
    #[test]
    fn route_round_trips(route in arb_route()) {
        prop_assert_eq!(Route::parse(&route.to_fragment()).unwrap(), route);
        prop_assert_eq!(Route::parse(&route.to_string()).unwrap(), route);
    }

    /// Parsing never panics, and anything that parses re-serializes to the
    /// canonical fragment.
    #[test]
    fn parse_is_total(fragment in arb_fragment()) {
        let bare = fragment.strip_prefix('#').unwrap_or(&fragment);
        if let Ok(route) = Route::parse(&fragment) {
            let canonical = if bare == "/" { "" } else { bare };
            prop_assert_eq!(route.to_fragment(), canonical);
        }
    }

    /// Any message sequence keeps the committed route renderable and the
    /// counters consistent.
    #[test]
    fn reducer_preserves_invariants(
        msgs in prop::collection::vec(arb_msg(), 1..50)
    ) {
        let mut model = NavModel::new(Route::Home, STORE_SIZE);
        let mut commits = 0;
        for msg in msgs {
            let _ = update::update(&mut model, msg);
            prop_assert!(model.is_renderable(model.route));
            prop_assert!(model.commits >= commits);
            prop_assert!(model.fallbacks <= model.commits);
            if let Some(pending) = model.awaiting_commit {
                prop_assert!(model.is_renderable(pending));
            }
            commits = model.commits;
        }
    }

    /// After the engine settles, the document always shows the route the
    /// address names.
    #[test]
    fn settled_document_tracks_address(
        actions in prop::collection::vec(arb_action(), 1..40)
    ) {
        let mut ctl = HeadlessController::headless(store(), DEFAULT_ORIGIN, "", Box::new(NullSink))
            .unwrap();
        for action in &actions {
            if apply(&mut ctl, action) {
                continue;
            }
            ctl.run_until_idle().unwrap();
            prop_assert!(ctl.model().is_settled());
            prop_assert_eq!(
                ctl.route(),
                displayed_route(&ctl.bridge().current_fragment())
            );
            assert_document_matches(&ctl);
        }
        ctl.run_until_idle().unwrap();
        prop_assert!(ctl.model().is_settled());
        prop_assert_eq!(ctl.route(), displayed_route(&ctl.bridge().current_fragment()));
        assert_document_matches(&ctl);
    }

    /// Every commit renders the route named by the URL at the moment it is
    /// applied, however clicks and history walks interleave before a settle.
    #[test]
    fn every_commit_matches_its_location(
        actions in prop::collection::vec(arb_action(), 1..40)
    ) {
        let sink = MemorySink::new();
        let mut ctl =
            HeadlessController::headless(store(), DEFAULT_ORIGIN, "", Box::new(sink.clone()))
                .unwrap();
        for action in &actions {
            if !apply(&mut ctl, action) {
                ctl.run_until_idle().unwrap();
            }
        }
        ctl.run_until_idle().unwrap();
        let off = commits_off_location(&sink.events(), STORE_SIZE);
        prop_assert!(off.is_empty(), "renders out of sync with location: {:?}", off);
    }

    /// Clicking into a route and walking back restores the previous view.
    #[test]
    fn click_then_back_returns(position in 1usize..=STORE_SIZE, via_settings in any::<bool>()) {
        let mut ctl = HeadlessController::headless(store(), DEFAULT_ORIGIN, "", Box::new(NullSink))
            .unwrap();
        if via_settings {
            ctl.click_settings();
            ctl.run_until_idle().unwrap();
        }
        let before = ctl.route();
        let depth = ctl.bridge().depth();
        ctl.go_to_fragment(&Route::Entry { index: position }.to_fragment()).unwrap();
        ctl.run_until_idle().unwrap();
        prop_assert_eq!(ctl.route(), Route::Entry { index: position });
        prop_assert_eq!(ctl.bridge().depth(), depth + 1);

        prop_assert!(ctl.back());
        ctl.run_until_idle().unwrap();
        prop_assert_eq!(ctl.route(), before);
        prop_assert_eq!(ctl.bridge().depth(), depth);
        assert_document_matches(&ctl);
    }
}
