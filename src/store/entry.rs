//! Journal entry value type.

use serde::{Deserialize, Serialize};

use crate::core::errors::{NavError, Result};

/// Image attached to a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryImage {
    /// Image URL.
    pub src: String,
    /// Alternate text.
    pub alt: String,
}

/// One journal entry, exactly as exposed on the `entry` property of the
/// `<journal-entry>` and `<entry-page>` elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Headline shown on the summary and the detail page.
    pub title: String,
    /// Free-form display date; never parsed.
    pub date: String,
    /// Body text.
    pub content: String,
    /// Illustration shown with the entry.
    pub image: EntryImage,
}

impl JournalEntry {
    /// Build an entry from borrowed parts.
    #[must_use]
    pub fn new(title: &str, date: &str, content: &str, src: &str, alt: &str) -> Self {
        Self {
            title: title.to_string(),
            date: date.to_string(),
            content: content.to_string(),
            image: EntryImage {
                src: src.to_string(),
                alt: alt.to_string(),
            },
        }
    }

    /// Reject entries with any empty field. `position` is 1-based and only
    /// used for the error report.
    pub fn validate(&self, position: usize) -> Result<()> {
        let fields = [
            ("title", &self.title),
            ("date", &self.date),
            ("content", &self.content),
            ("image.src", &self.image.src),
            ("image.alt", &self.image.alt),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(NavError::InvalidEntry { position, field });
            }
        }
        Ok(())
    }
}
