//! Upstream story boards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A story listing exposed by the upstream news API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Board {
    #[serde(rename = "topstories")]
    Top,
    #[serde(rename = "newstories")]
    New,
    #[serde(rename = "beststories")]
    Best,
    #[serde(rename = "askstories")]
    Ask,
    #[serde(rename = "showstories")]
    Show,
    #[serde(rename = "jobstories")]
    Job,
}

impl Board {
    /// All boards in upstream order.
    pub const ALL: [Board; 6] = [
        Board::Top,
        Board::New,
        Board::Best,
        Board::Ask,
        Board::Show,
        Board::Job,
    ];

    /// Upstream listing name, also used as the analytics page tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "topstories",
            Self::New => "newstories",
            Self::Best => "beststories",
            Self::Ask => "askstories",
            Self::Show => "showstories",
            Self::Job => "jobstories",
        }
    }

    /// Whether resolving this board assigns top-rank marks.
    pub fn assigns_top_rank(&self) -> bool {
        matches!(self, Self::Top)
    }
}

impl FromStr for Board {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        // Short aliases ("top", "new", ...) are accepted alongside upstream names.
        let name = s.strip_suffix(".json").unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|board| {
                let full = board.as_str();
                name == full || Some(name) == full.strip_suffix("stories")
            })
            .ok_or_else(|| crate::Error::UnknownBoard(s.to_string()))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
