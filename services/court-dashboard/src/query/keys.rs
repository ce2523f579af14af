//! Hierarchical query keys
//!
//! Every key starts with the [`ROOT`] segment; each level is a prefix of the
//! levels below it, so a key can address one entry or a whole subtree:
//!
//! ```text
//! tennis-scheduler
//! ├── health
//! ├── schedules
//! │   ├── list/{filters}
//! │   ├── upcoming/{days}
//! │   └── detail/{id}
//! ├── stats
//! ├── scheduler/status
//! └── token/status
//! ```

use std::fmt;

use court_api::{ScheduleId, SchedulesFilters, DEFAULT_UPCOMING_DAYS};

pub const ROOT: &str = "tennis-scheduler";

/// One level of a [`QueryKey`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeySegment {
    Scope(&'static str),
    Filters(SchedulesFilters),
    Days(u32),
    Id(ScheduleId),
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySegment::Scope(name) => f.write_str(name),
            KeySegment::Filters(filters) if filters.is_empty() => f.write_str("all"),
            KeySegment::Filters(filters) => {
                f.write_str(filters.to_query_string().trim_start_matches('?'))
            }
            KeySegment::Days(days) => write!(f, "{}d", days),
            KeySegment::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Structured identifier of a cache entry
///
/// Keys built from structurally equal parameters are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn all() -> Self {
        QueryKey(vec![KeySegment::Scope(ROOT)])
    }

    fn child(mut self, segment: KeySegment) -> Self {
        self.0.push(segment);
        self
    }

    fn scope(self, name: &'static str) -> Self {
        self.child(KeySegment::Scope(name))
    }

    pub fn health() -> Self {
        Self::all().scope("health")
    }

    pub fn schedules() -> Self {
        Self::all().scope("schedules")
    }

    pub fn schedules_list(filters: &SchedulesFilters) -> Self {
        Self::schedules()
            .scope("list")
            .child(KeySegment::Filters(filters.clone()))
    }

    /// Days default to seven before keying, so `None` and `Some(7)` coincide
    pub fn schedules_upcoming(days: Option<u32>) -> Self {
        Self::schedules()
            .scope("upcoming")
            .child(KeySegment::Days(days.unwrap_or(DEFAULT_UPCOMING_DAYS)))
    }

    pub fn schedules_detail(id: ScheduleId) -> Self {
        Self::schedules().scope("detail").child(KeySegment::Id(id))
    }

    pub fn stats() -> Self {
        Self::all().scope("stats")
    }

    pub fn scheduler() -> Self {
        Self::all().scope("scheduler")
    }

    pub fn scheduler_status() -> Self {
        Self::scheduler().scope("status")
    }

    pub fn token() -> Self {
        Self::all().scope("token")
    }

    pub fn token_status() -> Self {
        Self::token().scope("status")
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    /// True if `prefix` addresses this key or one of its ancestors
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
