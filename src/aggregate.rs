//! Status-count roll-up for collapsed cells.

use crate::model::{Build, Row, Task, TaskStatusCount};

/// Summary chip kinds, in display priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryStatus {
    Success,
    Dispatched,
    SystemFailed,
    Undispatched,
    Inactive,
    Failed,
}

impl SummaryStatus {
    pub const ORDER: [SummaryStatus; 6] = [
        SummaryStatus::Success,
        SummaryStatus::Dispatched,
        SummaryStatus::SystemFailed,
        SummaryStatus::Undispatched,
        SummaryStatus::Inactive,
        SummaryStatus::Failed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SummaryStatus::Success => "success",
            SummaryStatus::Dispatched => "dispatched",
            SummaryStatus::SystemFailed => "system-failed",
            SummaryStatus::Undispatched => "undispatched",
            SummaryStatus::Inactive => "inactive",
            SummaryStatus::Failed => "failed",
        }
    }

    /// The count bucket each chip reads from.
    pub fn count_in(self, counts: &TaskStatusCount) -> u32 {
        match self {
            SummaryStatus::Success => counts.succeeded,
            SummaryStatus::Dispatched => counts.started,
            SummaryStatus::SystemFailed => counts.timed_out,
            SummaryStatus::Undispatched => counts.undispatched,
            SummaryStatus::Inactive => counts.inactive,
            SummaryStatus::Failed => counts.failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSummary {
    pub status: SummaryStatus,
    pub count: u32,
}

impl StatusSummary {
    pub fn label(&self) -> &'static str {
        self.status.label()
    }
}

/// Statuses that are always listed task by task, never folded into a count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveStatuses(Vec<String>);

impl ActiveStatuses {
    pub fn new<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(statuses.into_iter().map(Into::into).collect())
    }

    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, status: &str) -> bool {
        self.0.iter().any(|s| s == status)
    }

    pub fn is_active(&self, task: &Task) -> bool {
        self.contains(task.status.as_str())
    }

    /// Tasks of `build` whose status is active, in their original order.
    pub fn active_tasks<'a>(&self, build: &'a Build) -> Vec<&'a Task> {
        build.tasks.iter().filter(|t| self.is_active(t)).collect()
    }

    /// True when no build in the row has a single active task.
    pub fn row_has_no_active(&self, row: &Row) -> bool {
        row.builds
            .values()
            .all(|build| !build.tasks.iter().any(|t| self.is_active(t)))
    }
}

impl Default for ActiveStatuses {
    fn default() -> Self {
        Self::new(["failed", "system-failed"])
    }
}

/// Non-empty buckets in priority order, leaving out any whose label is in
/// `excluded`.
pub fn summarize(counts: &TaskStatusCount, excluded: &ActiveStatuses) -> Vec<StatusSummary> {
    SummaryStatus::ORDER
        .iter()
        .map(|&status| StatusSummary {
            status,
            count: status.count_in(counts),
        })
        .filter(|s| s.count > 0 && !excluded.contains(s.label()))
        .collect()
}
