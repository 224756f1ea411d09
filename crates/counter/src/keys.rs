//! Backend key layout.

use readom_core::PageTag;

/// Builds backend keys under a common prefix.
///
/// | key                               | kind      | contents                          |
/// |-----------------------------------|-----------|-----------------------------------|
/// | `page_list`                       | set       | every page tag ever recorded      |
/// | `date_list:{page}`                | set       | dates with activity on the page   |
/// | `pv:{page}`                       | hash      | date -> page view count           |
/// | `uv_estimator:{page}:{date}`      | estimator | visitor ids seen that day         |
/// | `uv:{page}`                       | hash      | date -> reconciled visitor count  |
#[derive(Debug, Clone)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn page_list(&self) -> String {
        format!("{}page_list", self.prefix)
    }

    pub fn date_list(&self, page: &PageTag) -> String {
        format!("{}date_list:{page}", self.prefix)
    }

    pub fn page_views(&self, page: &PageTag) -> String {
        format!("{}pv:{page}", self.prefix)
    }

    pub fn unique_visitors(&self, page: &PageTag) -> String {
        format!("{}uv:{page}", self.prefix)
    }

    pub fn visitor_estimator(&self, page: &PageTag, date: &str) -> String {
        format!("{}uv_estimator:{page}:{date}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = KeySpace::new("readom:");
        let home = PageTag::new("home").unwrap();
        assert_eq!(keys.page_list(), "readom:page_list");
        assert_eq!(keys.date_list(&home), "readom:date_list:home");
        assert_eq!(keys.page_views(&home), "readom:pv:home");
        assert_eq!(keys.unique_visitors(&home), "readom:uv:home");
        assert_eq!(
            keys.visitor_estimator(&home, "2024-01-01"),
            "readom:uv_estimator:home:2024-01-01"
        );
    }

    #[test]
    fn test_empty_prefix() {
        let keys = KeySpace::new("");
        assert_eq!(keys.page_views(&PageTag::all()), "pv:_ALL");
    }
}
