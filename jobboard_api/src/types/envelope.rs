use serde::{Deserialize, Serialize};

/// A list body exactly as the endpoint sent it.
///
/// Paginating endpoints answer with a `{results, count}` envelope; the
/// others return the whole collection as a bare array. The variants are
/// tried in that order, so an object must carry both keys to count as an
/// envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawListResponse<T> {
    Envelope { results: Vec<T>, count: u64 },
    Collection(Vec<T>),
}

/// A list body after normalization.
///
/// `total_count` is `None` when the endpoint did not paginate, in which case
/// `items` holds the full collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total_count: Option<u64>,
}

impl<T> ListResponse<T> {
    /// One server-side page out of `total_count` matching items.
    pub fn paginated(items: Vec<T>, total_count: u64) -> Self {
        Self {
            items,
            total_count: Some(total_count),
        }
    }

    /// The complete, unpaginated collection.
    pub fn unpaginated(items: Vec<T>) -> Self {
        Self {
            items,
            total_count: None,
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.total_count.is_some()
    }
}

impl<T> From<RawListResponse<T>> for ListResponse<T> {
    fn from(raw: RawListResponse<T>) -> Self {
        match raw {
            RawListResponse::Envelope { results, count } => ListResponse::paginated(results, count),
            RawListResponse::Collection(items) => ListResponse::unpaginated(items),
        }
    }
}
