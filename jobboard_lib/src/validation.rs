//! Input validation for values entering a session from the outside.

use jobboard_api::ListSection;

use crate::error::SyncError;

pub const MAX_SEARCH_LENGTH: usize = 100;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim
/// whitespace, and enforce a byte-length limit. An empty result is allowed
/// and means "clear the search".
pub fn sanitize_search(input: &str) -> Result<String, SyncError> {
    if input.len() > MAX_SEARCH_LENGTH {
        return Err(SyncError::InvalidInput(format!(
            "search exceeds maximum length of {} bytes",
            MAX_SEARCH_LENGTH
        )));
    }
    Ok(input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string())
}

/// Validate page number (must be >= 1).
pub fn validate_page(page: u32) -> Result<u32, SyncError> {
    if page < 1 {
        return Err(SyncError::InvalidInput("page must be >= 1".to_string()));
    }
    Ok(page)
}

/// Validate page size (must be 1..=100).
pub fn validate_page_size(page_size: u32) -> Result<u32, SyncError> {
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(SyncError::InvalidInput(format!(
            "page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(page_size)
}

/// Validate a filter label against the section vocabulary, case-insensitive.
/// Returns the canonical lowercase label.
pub fn validate_status(section: &ListSection, input: &str) -> Result<String, SyncError> {
    if section.filter_code(input).is_some() {
        return Ok(input.trim().to_lowercase());
    }
    Err(SyncError::InvalidInput(format!(
        "unknown {} filter '{}'. Valid values: {}",
        section.key,
        input,
        section.filter_labels().collect::<Vec<_>>().join(", ")
    )))
}

/// Resolve a section key such as `companies` or `jobs`.
pub fn validate_section(input: &str) -> Result<&'static ListSection, SyncError> {
    let key = input.trim().to_lowercase();
    ListSection::by_key(&key).ok_or_else(|| {
        SyncError::InvalidInput(format!(
            "unknown section '{}'. Valid values: {}",
            input,
            jobboard_api::section::ALL_SECTIONS
                .iter()
                .map(|s| s.key)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}
