//! Static descriptions of the admin list views backed by the sync engine.

/// One list view of the admin panel: where its endpoint lives, how its
/// filter is spelled on the wire, and which fragment key deep-links to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSection {
    /// Fragment section key, e.g. `companies` for `#companies?search=...`.
    pub key: &'static str,
    /// Endpoint path relative to the API base URL.
    pub path: &'static str,
    /// Query parameter carrying the mapped filter code.
    pub filter_param: &'static str,
    /// Sort field used when a session starts.
    pub default_sort: &'static str,
    /// Filter vocabulary as `(label, code)` pairs.
    pub vocabulary: &'static [(&'static str, &'static str)],
}

const REVIEW_VOCABULARY: &[(&str, &str)] = &[("pending", "P"), ("approved", "A"), ("rejected", "R")];

pub const COMPANIES: ListSection = ListSection {
    key: "companies",
    path: "/companies/",
    filter_param: "status",
    default_sort: "created_at",
    vocabulary: REVIEW_VOCABULARY,
};

pub const JOBS: ListSection = ListSection {
    key: "jobs",
    path: "/ads/job/",
    filter_param: "status",
    default_sort: "created_at",
    vocabulary: REVIEW_VOCABULARY,
};

pub const USERS: ListSection = ListSection {
    key: "users",
    path: "/users/",
    filter_param: "user_type",
    default_sort: "joined_date",
    vocabulary: &[
        ("jobseeker", "JS"),
        ("employer", "EM"),
        ("admin", "AD"),
        ("support", "SU"),
    ],
};

pub const PAYMENTS: ListSection = ListSection {
    key: "payments",
    path: "/orders/subscriptions/",
    filter_param: "payment_status",
    default_sort: "created_at",
    vocabulary: &[
        ("pending", "pending"),
        ("paid", "paid"),
        ("failed", "failed"),
        ("canceled", "canceled"),
    ],
};

/// Every section known to the admin panel.
pub const ALL_SECTIONS: &[ListSection] = &[COMPANIES, JOBS, USERS, PAYMENTS];

impl ListSection {
    /// Looks up a built-in section by its fragment key.
    pub fn by_key(key: &str) -> Option<&'static ListSection> {
        ALL_SECTIONS.iter().find(|s| s.key == key)
    }

    /// Maps a filter label to its wire code. Lookup ignores ASCII case;
    /// labels outside the vocabulary map to `None`.
    pub fn filter_code(&self, label: &str) -> Option<&'static str> {
        let label = label.trim();
        self.vocabulary
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|(_, code)| *code)
    }

    /// Reverse of [`ListSection::filter_code`], for display.
    pub fn filter_label(&self, code: &str) -> Option<&'static str> {
        self.vocabulary
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(label, _)| *label)
    }

    /// The labels accepted by [`ListSection::filter_code`].
    pub fn filter_labels(&self) -> impl Iterator<Item = &'static str> {
        self.vocabulary.iter().map(|(label, _)| *label)
    }
}
