//! Waterfall page data as delivered by the server.
//!
//! Everything here is immutable for the lifetime of a page: the server decides
//! which versions, builds and tasks exist, and this crate only projects them.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

/// One grid column. When `rolled_up` is set the parallel arrays hold one
/// entry per folded-in inactive version, otherwise exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Version {
    pub ids: Vec<String>,
    pub messages: Vec<String>,
    pub authors: Vec<String>,
    pub revisions: Vec<String>,
    pub create_times: Vec<DateTime<Utc>>,
    pub revision_order: i64,
    #[serde(default)]
    pub rolled_up: bool,
}

impl Version {
    /// Number of real versions this column stands for.
    pub fn entry_count(&self) -> usize {
        self.authors.len()
    }

    pub fn primary_id(&self) -> &str {
        self.ids.first().map_or("", String::as_str)
    }

    /// Borrowed view of the `i`th folded entry, if all arrays reach that far.
    pub fn entry(&self, i: usize) -> Option<VersionEntry<'_>> {
        Some(VersionEntry {
            id: self.ids.get(i)?,
            message: self.messages.get(i)?,
            author: self.authors.get(i)?,
            revision: self.revisions.get(i)?,
            create_time: *self.create_times.get(i)?,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = VersionEntry<'_>> {
        (0..self.ids.len()).map_while(|i| self.entry(i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionEntry<'a> {
    pub id: &'a str,
    pub message: &'a str,
    pub author: &'a str,
    pub revision: &'a str,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct BuildVariant {
    pub id: String,
    pub display_name: String,
}

/// One grid row: a build variant and its builds keyed by version id.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Row {
    pub build_variant: BuildVariant,
    pub versions: Vec<String>,
    #[serde(default)]
    pub builds: HashMap<String, Build>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Build {
    pub id: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(rename = "taskStatusCount", default)]
    pub task_status_count: TaskStatusCount,
}

/// Per-bucket task counts, used by the collapsed view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct TaskStatusCount {
    pub succeeded: u32,
    pub started: u32,
    pub timed_out: u32,
    pub undispatched: u32,
    pub inactive: u32,
    pub failed: u32,
}

impl TaskStatusCount {
    pub fn total(&self) -> u32 {
        self.succeeded
            + self.started
            + self.timed_out
            + self.undispatched
            + self.inactive
            + self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Task {
    pub id: String,
    pub display_name: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(from = "String")]
pub enum TaskStatus {
    Success,
    Failed,
    SystemFailed,
    Started,
    Dispatched,
    Undispatched,
    Inactive,
    /// Anything outside the known vocabulary, kept verbatim.
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Success => "success",
            TaskStatus::Failed => "failed",
            TaskStatus::SystemFailed => "system-failed",
            TaskStatus::Started => "started",
            TaskStatus::Dispatched => "dispatched",
            TaskStatus::Undispatched => "undispatched",
            TaskStatus::Inactive => "inactive",
            TaskStatus::Other(s) => s,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "success" => TaskStatus::Success,
            "failed" => TaskStatus::Failed,
            "system-failed" => TaskStatus::SystemFailed,
            "started" => TaskStatus::Started,
            "dispatched" => TaskStatus::Dispatched,
            "undispatched" => TaskStatus::Undispatched,
            "inactive" => TaskStatus::Inactive,
            _ => TaskStatus::Other(s),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A full waterfall page plus its pagination context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct WaterfallPage {
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub versions: HashMap<String, Version>,
    #[serde(default)]
    pub current_skip: u64,
    #[serde(default)]
    pub previous_page_count: u64,
    #[serde(default)]
    pub total_versions: u64,
}

impl WaterfallPage {
    pub fn version(&self, id: &str) -> Option<&Version> {
        self.versions.get(id)
    }

    /// Versions ordered for header display, newest first, each with the key
    /// rows use to refer to it.
    pub fn sorted_versions(&self) -> Vec<(&str, &Version)> {
        let mut versions: Vec<(&str, &Version)> = self
            .versions
            .iter()
            .map(|(key, version)| (key.as_str(), version))
            .collect();
        versions.sort_by(|(ka, a), (kb, b)| {
            b.revision_order.cmp(&a.revision_order).then_with(|| ka.cmp(kb))
        });
        versions
    }
}
