//! Page tags identifying which surface generated a counted event.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted length of a page tag.
pub const MAX_PAGE_TAG_LEN: usize = 64;

/// A validated analytics page tag.
///
/// Tags are restricted to `[A-Za-z0-9_.-]` so they can be embedded in
/// estimator keys without escaping.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageTag(String);

impl PageTag {
    /// Reserved tag for the global aggregate.
    pub const ALL: &'static str = "_ALL";

    /// Create from a string, validating format.
    pub fn new(tag: impl Into<String>) -> crate::Result<Self> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(crate::Error::InvalidPageTag(
                "page tag cannot be empty".to_string(),
            ));
        }
        if tag.len() > MAX_PAGE_TAG_LEN {
            return Err(crate::Error::InvalidPageTag(format!(
                "page tag exceeds {MAX_PAGE_TAG_LEN} characters"
            )));
        }
        if let Some(c) = tag
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.' | '-'))
        {
            return Err(crate::Error::InvalidPageTag(format!(
                "invalid character in page tag: {c:?}"
            )));
        }
        Ok(Self(tag))
    }

    /// The `_ALL` aggregate tag.
    pub fn all() -> Self {
        Self(Self::ALL.to_string())
    }

    /// Whether this is the `_ALL` aggregate tag.
    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }

    /// Get the tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PageTag {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::new(value)
    }
}

impl From<PageTag> for String {
    fn from(tag: PageTag) -> Self {
        tag.0
    }
}

impl fmt::Debug for PageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageTag({self})")
    }
}

impl fmt::Display for PageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
