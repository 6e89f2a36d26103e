//! Company records returned by the `/companies/` endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReviewStatus;

/// A company profile as listed in the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// UUID primary key.
    pub id: String,

    /// Registered company name. Unique across the board.
    pub name: String,

    /// Moderation state. Older records may omit it.
    pub status: Option<ReviewStatus>,

    pub email: Option<String>,
    pub website: Option<String>,
    pub phone_number: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}
