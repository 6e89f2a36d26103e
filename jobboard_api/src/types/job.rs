//! Job advertisement records returned by the `/ads/job/` endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ReviewStatus;

/// A job advertisement as listed in the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAd {
    pub id: String,
    pub title: String,
    pub status: Option<ReviewStatus>,
    /// Name of the hiring company, flattened by the serializer.
    pub company_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
