//! Route model: the closed set of view states and their URL-fragment form.
//!
//! Fragment grammar:
//!
//! | fragment            | route           |
//! |---------------------|-----------------|
//! | `""`, `"/"`         | `Home`          |
//! | `entry<N>`, N >= 1  | `Entry { N }`   |
//! | `settings`          | `Settings`      |
//!
//! `N` is a decimal literal without sign, separator, or leading zero.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{NavError, Result};

const ENTRY_PREFIX: &str = "entry";
const SETTINGS_FRAGMENT: &str = "settings";

/// Header text for the home view.
pub const HOME_TITLE: &str = "Journal Entries";
/// Header text for the settings view.
pub const SETTINGS_TITLE: &str = "Settings";

/// Active view of the journal page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Route {
    /// List of entry summaries.
    #[default]
    Home,
    /// Single entry detail; `index` is the 1-based store position.
    Entry {
        /// 1-based store position.
        index: usize,
    },
    /// Settings panel.
    Settings,
}

/// Body `class` attribute carried by each view. Exactly one value at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyClass {
    /// No class: the entry list.
    #[serde(rename = "")]
    None,
    /// `single-entry`: one entry's detail.
    #[serde(rename = "single-entry")]
    SingleEntry,
    /// `settings`: the settings panel.
    #[serde(rename = "settings")]
    Settings,
}

impl BodyClass {
    /// Attribute value as written to the document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::SingleEntry => "single-entry",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for BodyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Route {
    /// Parse a URL fragment. A single leading `#` is ignored so raw
    /// `location.hash` values can be passed through.
    pub fn parse(fragment: &str) -> Result<Self> {
        let bare = fragment.strip_prefix('#').unwrap_or(fragment);
        match bare {
            "" | "/" => Ok(Self::Home),
            SETTINGS_FRAGMENT => Ok(Self::Settings),
            _ => bare
                .strip_prefix(ENTRY_PREFIX)
                .and_then(parse_entry_index)
                .map(|index| Self::Entry { index })
                .ok_or_else(|| NavError::malformed(fragment)),
        }
    }

    /// Parse with the boundary policy applied: anything malformed becomes
    /// `Home`, and the recovered error is handed back for logging.
    #[must_use]
    pub fn parse_or_home(fragment: &str) -> (Self, Option<NavError>) {
        match Self::parse(fragment) {
            Ok(route) => (route, None),
            Err(err) => (Self::Home, Some(err)),
        }
    }

    /// Fragment form, without the leading `#`.
    #[must_use]
    pub fn to_fragment(self) -> String {
        match self {
            Self::Home => String::new(),
            Self::Entry { index } => format!("{ENTRY_PREFIX}{index}"),
            Self::Settings => SETTINGS_FRAGMENT.to_string(),
        }
    }

    /// Route for the entry at 1-based `index`. `None` for index 0.
    #[must_use]
    pub const fn entry(index: usize) -> Option<Self> {
        if index == 0 {
            None
        } else {
            Some(Self::Entry { index })
        }
    }

    /// Header (`h1`) text for this view.
    #[must_use]
    pub fn header_title(self) -> String {
        match self {
            Self::Home => HOME_TITLE.to_string(),
            Self::Entry { index } => format!("Entry {index}"),
            Self::Settings => SETTINGS_TITLE.to_string(),
        }
    }

    /// Body state-class for this view.
    #[must_use]
    pub const fn body_class(self) -> BodyClass {
        match self {
            Self::Home => BodyClass::None,
            Self::Entry { .. } => BodyClass::SingleEntry,
            Self::Settings => BodyClass::Settings,
        }
    }

    /// Entry index carried by the route, if any.
    #[must_use]
    pub const fn entry_index(self) -> Option<usize> {
        match self {
            Self::Entry { index } => Some(index),
            Self::Home | Self::Settings => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_fragment())
    }
}

fn parse_entry_index(digits: &str) -> Option<usize> {
    let first = digits.bytes().next()?;
    if first == b'0' || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Overflowing literals are malformed, not clamped.
    digits.parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_home_forms() {
        assert_eq!(Route::parse("").unwrap(), Route::Home);
        assert_eq!(Route::parse("/").unwrap(), Route::Home);
        assert_eq!(Route::parse("#").unwrap(), Route::Home);
        assert_eq!(Route::parse("#/").unwrap(), Route::Home);
    }

    #[test]
    fn parse_entry_and_settings() {
        assert_eq!(Route::parse("entry1").unwrap(), Route::Entry { index: 1 });
        assert_eq!(Route::parse("entry10").unwrap(), Route::Entry { index: 10 });
        assert_eq!(Route::parse("#entry2").unwrap(), Route::Entry { index: 2 });
        assert_eq!(Route::parse("settings").unwrap(), Route::Settings);
        assert_eq!(Route::parse("#settings").unwrap(), Route::Settings);
    }

    #[test]
    fn parse_rejects_everything_else() {
        for bad in [
            "foobar",
            "entry",
            "entry0",
            "entry01",
            "entry-1",
            "entry+1",
            "entry 1",
            "entry1a",
            "entry/1",
            "Entry1",
            "settings/",
            "SETTINGS",
            "//",
            "##settings",
            "entry99999999999999999999999999",
        ] {
            let err = Route::parse(bad).expect_err(bad);
            assert_eq!(err.code(), "JNAV-2002", "{bad}");
        }
    }

    #[test]
    fn parse_or_home_recovers() {
        let (route, err) = Route::parse_or_home("foobar");
        assert_eq!(route, Route::Home);
        assert!(matches!(err, Some(NavError::MalformedRoute { .. })));

        let (route, err) = Route::parse_or_home("settings");
        assert_eq!(route, Route::Settings);
        assert!(err.is_none());
    }

    #[test]
    fn serialize_forms() {
        assert_eq!(Route::Home.to_fragment(), "");
        assert_eq!(Route::Entry { index: 3 }.to_fragment(), "entry3");
        assert_eq!(Route::Settings.to_fragment(), "settings");
        assert_eq!(Route::Entry { index: 12 }.to_string(), "#entry12");
    }

    #[test]
    fn display_writes_hash_prefixed_fragment() {
        let routes = [Route::Home, Route::Entry { index: 7 }, Route::Settings];
        let shown: Vec<String> = routes.iter().map(|route| format!("{route}")).collect();
        assert_eq!(shown, ["#", "#entry7", "#settings"]);
        assert_eq!((&Route::Settings).to_string(), "#settings");
    }

    #[test]
    fn view_projection_tables() {
        assert_eq!(Route::Home.header_title(), "Journal Entries");
        assert_eq!(Route::Entry { index: 4 }.header_title(), "Entry 4");
        assert_eq!(Route::Settings.header_title(), "Settings");

        assert_eq!(Route::Home.body_class().as_str(), "");
        assert_eq!(Route::Entry { index: 4 }.body_class().as_str(), "single-entry");
        assert_eq!(Route::Settings.body_class().as_str(), "settings");
    }

    #[test]
    fn entry_constructor_rejects_zero() {
        assert_eq!(Route::entry(0), None);
        assert_eq!(Route::entry(5), Some(Route::Entry { index: 5 }));
        assert_eq!(Route::entry(5).and_then(Route::entry_index), Some(5));
    }

    #[test]
    fn route_serde_is_tagged() {
        let value = serde_json::to_value(Route::Entry { index: 2 }).unwrap();
        assert_eq!(value["view"], "entry");
        assert_eq!(value["index"], 2);
        let body = serde_json::to_value(BodyClass::None).unwrap();
        assert_eq!(body, "");
    }
}
