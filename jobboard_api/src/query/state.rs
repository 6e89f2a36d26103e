//! The canonical list query: search, filter, sort and pagination intent.

use serde::{Deserialize, Serialize};
use url::Url;

use super::SortDirection;
use crate::section::ListSection;

/// Page size used when a session starts without an explicit one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Search/filter/sort/pagination intent for one list session.
///
/// Updates consume `self` and return the next state. Every update except
/// [`QueryState::with_page`] moves back to page 1, since changing the
/// filter, the ordering or the page size invalidates the old page number.
/// Nothing here knows how many pages exist; out-of-range pages are the
/// resolver's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    search_text: String,
    status_filter: Option<String>,
    sort_field: String,
    sort_direction: SortDirection,
    page: u32,
    page_size: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new("created_at")
    }
}

impl QueryState {
    /// Fresh session state sorted by `default_sort`, descending.
    pub fn new(default_sort: &str) -> Self {
        Self {
            search_text: String::new(),
            status_filter: None,
            sort_field: default_sort.to_string(),
            sort_direction: SortDirection::Desc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Fresh session state using the section's default sort field.
    pub fn for_section(section: &ListSection) -> Self {
        Self::new(section.default_sort)
    }

    /// Sets the raw search text. Surrounding whitespace is kept here and
    /// trimmed when the query is sent.
    pub fn with_search(mut self, search: &str) -> Self {
        self.search_text = search.to_string();
        self.page = 1;
        self
    }

    /// Sets or clears the filter label. Blank labels clear the filter.
    pub fn with_status(mut self, status: Option<&str>) -> Self {
        self.status_filter = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.page = 1;
        self
    }

    /// Selects a sort field. Re-selecting the current field flips the
    /// direction; a different field starts out descending.
    pub fn with_sort(mut self, field: &str) -> Self {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = field.to_string();
            self.sort_direction = SortDirection::Desc;
        }
        self.page = 1;
        self
    }

    /// Moves to `page` (1-indexed). Zero is treated as the first page.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the number of items per page. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self.page = 1;
        self
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// The trimmed search term, or `None` when no search is active.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search_text.trim();
        (!term.is_empty()).then_some(term)
    }

    pub fn status_filter(&self) -> Option<&str> {
        self.status_filter.as_deref()
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// True when a search term or a filter label narrows the result set.
    pub fn has_active_filter(&self) -> bool {
        self.search_term().is_some() || self.status_filter.is_some()
    }

    /// Request parameters for `section`, in wire order. Filter labels the
    /// section does not know are left out rather than sent raw.
    pub fn to_query_pairs(&self, section: &ListSection) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if let Some(term) = self.search_term() {
            pairs.push(("search".to_string(), term.to_string()));
        }
        if let Some(label) = self.status_filter() {
            match section.filter_code(label) {
                Some(code) => pairs.push((section.filter_param.to_string(), code.to_string())),
                None => tracing::warn!(
                    "Filter label {:?} is not known to section {}; omitting it",
                    label,
                    section.key
                ),
            }
        }
        pairs.push(("sort_by".to_string(), self.sort_field.clone()));
        pairs.push(("sort_order".to_string(), self.sort_direction.to_string()));
        pairs
    }

    /// Appends this query's parameters to the given URL, returning the modified URL.
    pub fn add_to_url(&self, url: &Url, section: &ListSection) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .extend_pairs(self.to_query_pairs(section));
        url
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::query::{QueryState, SortDirection};
    use crate::section::{COMPANIES, USERS};

    #[test]
    fn test_company_query() {
        let url = Url::parse("https://example.com/companies/").unwrap();

        insta::assert_snapshot!(
            QueryState::for_section(&COMPANIES)
                .with_search("  acme corp ")
                .with_status(Some("approved"))
                .with_page_size(25)
                .with_page(3)
                .add_to_url(&url, &COMPANIES)
                .to_string(),
            @"https://example.com/companies/?page=3&page_size=25&search=acme+corp&status=A&sort_by=created_at&sort_order=desc"
        );

        insta::assert_snapshot!(
            QueryState::for_section(&COMPANIES)
                .with_sort("name")
                .with_sort("name")
                .add_to_url(&url, &COMPANIES)
                .to_string(),
            @"https://example.com/companies/?page=1&page_size=10&sort_by=name&sort_order=asc"
        );
    }

    #[test]
    fn test_user_query_uses_section_filter_param() {
        let url = Url::parse("https://example.com/users/").unwrap();

        insta::assert_snapshot!(
            QueryState::for_section(&USERS)
                .with_status(Some("employer"))
                .add_to_url(&url, &USERS)
                .to_string(),
            @"https://example.com/users/?page=1&page_size=10&user_type=EM&sort_by=joined_date&sort_order=desc"
        );
    }

    #[test]
    fn unknown_filter_label_is_omitted() {
        let pairs = QueryState::for_section(&COMPANIES)
            .with_status(Some("archived"))
            .to_query_pairs(&COMPANIES);
        assert!(pairs.iter().all(|(k, _)| k != "status"));
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn mutations_reset_page() {
        let base = QueryState::default().with_page(7);
        assert_eq!(base.page(), 7);
        assert_eq!(base.clone().with_search("x").page(), 1);
        assert_eq!(base.clone().with_status(Some("pending")).page(), 1);
        assert_eq!(base.clone().with_sort("name").page(), 1);
        assert_eq!(base.clone().with_page_size(50).page(), 1);
        assert_eq!(base.with_page(2).page(), 2);
    }

    #[test]
    fn sort_toggles_on_same_field_and_resets_on_new_field() {
        let q = QueryState::default().with_sort("name");
        assert_eq!(q.sort_direction(), SortDirection::Desc);
        let q = q.with_sort("name");
        assert_eq!(q.sort_direction(), SortDirection::Asc);
        let q = q.with_sort("email");
        assert_eq!(q.sort_field(), "email");
        assert_eq!(q.sort_direction(), SortDirection::Desc);
    }

    #[test]
    fn local_invariants_are_clamped() {
        let q = QueryState::default().with_page(0).with_page_size(0);
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 1);
    }

    #[test]
    fn blank_search_and_status_are_inactive() {
        let q = QueryState::default()
            .with_search("   ")
            .with_status(Some("  "));
        assert_eq!(q.search_term(), None);
        assert_eq!(q.status_filter(), None);
        assert!(!q.has_active_filter());
        assert!(q.with_search("acme").has_active_filter());
    }
}
