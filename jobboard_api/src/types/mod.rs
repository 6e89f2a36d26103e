mod envelope;
pub use self::envelope::{ListResponse, RawListResponse};

mod company;
pub use self::company::Company;

mod job;
pub use self::job::JobAd;

use serde::{Deserialize, Serialize};

/// Moderation state shared by companies and job ads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[serde(rename = "P")]
    Pending,
    #[serde(rename = "A")]
    Approved,
    #[serde(rename = "R")]
    Rejected,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ReviewStatus::Pending => "pending",
                ReviewStatus::Approved => "approved",
                ReviewStatus::Rejected => "rejected",
            }
        )
    }
}
