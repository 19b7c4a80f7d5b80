//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL with its visit counter.
///
/// `code` is the primary key. `target_url` never changes after creation;
/// only `clicks` and `last_clicked` are updated, and only by recording a visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub code: String,
    pub target_url: String,
    pub clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        code: String,
        target_url: String,
        clicks: i64,
        last_clicked: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            target_url,
            clicks,
            last_clicked,
            created_at,
        }
    }

    /// Builds the in-memory shape of a link that has never been visited.
    ///
    /// Used for links that exist only in memory (degraded-mode allocations
    /// and test stores); persisted links come back from the store instead.
    pub fn unvisited(new_link: NewLink, created_at: DateTime<Utc>) -> Self {
        Self::new(new_link.code, new_link.target_url, 0, None, created_at)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub target_url: String,
}

/// Outcome of allocating a short code.
#[derive(Debug, Clone)]
pub enum Allocation {
    /// The link was written to the store.
    Persisted(Link),
    /// The store failed and degraded mode synthesized a link that exists
    /// nowhere but in this response.
    Provisional(Link),
}

impl Allocation {
    pub fn link(&self) -> &Link {
        match self {
            Allocation::Persisted(link) | Allocation::Provisional(link) => link,
        }
    }

    pub fn into_link(self) -> Link {
        match self {
            Allocation::Persisted(link) | Allocation::Provisional(link) => link,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Allocation::Persisted(_))
    }
}
