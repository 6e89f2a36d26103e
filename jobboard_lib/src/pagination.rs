//! Page arithmetic: total pages, page correction, and client-side slicing.

use jobboard_api::types::ListResponse;
use jobboard_api::QueryState;
use serde::Serialize;

/// Where a published item list sits in the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl PaginationView {
    /// The view before anything has been fetched.
    pub fn initial(query: &QueryState) -> Self {
        Self {
            page: query.page(),
            total_pages: 1,
            page_size: query.page_size(),
        }
    }
}

/// The items to publish for one response, with the page they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    pub items: Vec<T>,
    pub view: PaginationView,
    /// Set when the server paginated and the requested page lay past the
    /// end. The items are still the ones the server sent for the requested
    /// page; a fetch at this page is needed to get the right slice.
    pub correction: Option<u32>,
}

/// `ceil(total / page_size)`, never less than one.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Resolves a normalized response against the query that requested it.
///
/// A server-paginated response is published as-is with the page clamped to
/// the last page, flagging a correction. A raw collection is sliced here:
/// with a search or filter active the first page is shown, otherwise the
/// requested page clamped to the last one.
pub fn resolve<T>(response: ListResponse<T>, query: &QueryState) -> Resolution<T> {
    let page_size = query.page_size().max(1);
    match response.total_count {
        Some(count) => {
            let total_pages = total_pages(count, page_size);
            let requested = query.page();
            let (page, correction) = if requested > total_pages {
                (total_pages, Some(total_pages))
            } else {
                (requested.max(1), None)
            };
            Resolution {
                items: response.items,
                view: PaginationView {
                    page,
                    total_pages,
                    page_size,
                },
                correction,
            }
        }
        None => {
            let total_pages = total_pages(response.items.len() as u64, page_size);
            let page = if query.has_active_filter() {
                1
            } else {
                query.page().clamp(1, total_pages)
            };
            let start = (page as usize - 1).saturating_mul(page_size as usize);
            let items = response
                .items
                .into_iter()
                .skip(start)
                .take(page_size as usize)
                .collect();
            Resolution {
                items,
                view: PaginationView {
                    page,
                    total_pages,
                    page_size,
                },
                correction: None,
            }
        }
    }
}
