//! Reconciled analytics report types.

use readom_core::PageTag;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use time::Date;

/// Counts for one page on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DailyCounts {
    #[serde(rename = "PV")]
    pub page_views: u64,
    #[serde(rename = "UV")]
    pub unique_visitors: u64,
}

/// Per-day counts for a single page, newest date first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReport {
    days: Vec<(Date, DailyCounts)>,
}

impl PageReport {
    /// Build from unordered days; sorts newest first.
    pub fn new(mut days: Vec<(Date, DailyCounts)>) -> Self {
        days.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        Self { days }
    }

    pub fn days(&self) -> &[(Date, DailyCounts)] {
        &self.days
    }

    pub fn get(&self, date: Date) -> Option<DailyCounts> {
        self.days
            .iter()
            .find(|(day, _)| *day == date)
            .map(|(_, counts)| *counts)
    }

    pub fn latest(&self) -> Option<(Date, DailyCounts)> {
        self.days.first().copied()
    }

    /// Sum of page views across all days.
    pub fn total_page_views(&self) -> u64 {
        self.days.iter().map(|(_, c)| c.page_views).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl Serialize for PageReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (date, counts) in &self.days {
            map.serialize_entry(&date.to_string(), counts)?;
        }
        map.end()
    }
}

/// Full report: page tag (ascending) to per-day counts (descending).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Report {
    pages: BTreeMap<PageTag, PageReport>,
}

impl Report {
    pub fn insert(&mut self, page: PageTag, report: PageReport) {
        self.pages.insert(page, report);
    }

    pub fn page(&self, page: &PageTag) -> Option<&PageReport> {
        self.pages.get(page)
    }

    /// Look up a page by its tag string.
    pub fn page_named(&self, page: &str) -> Option<&PageReport> {
        self.pages
            .iter()
            .find(|(tag, _)| tag.as_str() == page)
            .map(|(_, report)| report)
    }

    pub fn counts(&self, page: &str, date: Date) -> Option<DailyCounts> {
        self.page_named(page).and_then(|report| report.get(date))
    }

    pub fn pages(&self) -> impl Iterator<Item = (&PageTag, &PageReport)> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
