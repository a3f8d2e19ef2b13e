//! Projection of a waterfall page plus view state into a render model.
//!
//! [`GridProjector::project`] is pure: it reads the page and the view state and
//! returns a fully resolved [`RenderModel`] borrowing from the page. Each user
//! action re-runs it from scratch; nothing is cached between calls.
//!
//! Per row, the collapsed view needs to know whether any build in the row has
//! an active task (`no_active`). It is computed once per row and passed down
//! to that row's cells as a plain value.

use crate::aggregate::{self, ActiveStatuses, StatusSummary};
use crate::filter;
use crate::links;
use crate::model::{Build, BuildVariant, Row, Task, Version, WaterfallPage};
use crate::pagination::PageNav;
use crate::timefmt::{TimestampFormatter, HEADER_TIME_PATTERN};
use crate::view_state::ViewState;

pub const EMPTY_MESSAGE: &str = "There are no builds for this project.";

/// Longest commit message shown in a header without a more/less toggle.
pub const MAX_MESSAGE_CHARS: usize = 44;
const ELLIPSIS: &str = "...";
const SHORT_HASH_CHARS: usize = 5;
const ROLLED_UP_HASH_CHARS: usize = 10;

/// Render state of one cell, driven only by `(rolled_up, collapsed, no_active)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    RolledUp,
    UnrolledExpanded,
    UnrolledCollapsedNoActive,
    UnrolledCollapsedHasActive,
}

impl CellState {
    pub fn resolve(rolled_up: bool, collapsed: bool, no_active: bool) -> Self {
        match (rolled_up, collapsed, no_active) {
            (true, _, _) => CellState::RolledUp,
            (false, false, _) => CellState::UnrolledExpanded,
            (false, true, true) => CellState::UnrolledCollapsedNoActive,
            (false, true, false) => CellState::UnrolledCollapsedHasActive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellMode<'a> {
    /// The column is a rolled-up run of inactive versions; no task detail.
    Inactive,
    /// Counts over every status; the row has no active tasks.
    CollapsedSummary {
        build: &'a Build,
        summary: Vec<StatusSummary>,
    },
    /// Counts over the non-active statuses, plus the active tasks themselves.
    CollapsedWithActive {
        build: &'a Build,
        summary: Vec<StatusSummary>,
        active_tasks: Vec<&'a Task>,
    },
    /// Every task that passes the task filter.
    Expanded {
        build: &'a Build,
        tasks: Vec<&'a Task>,
    },
    /// The page lists the version for this row but carries no build for it.
    Missing,
}

impl<'a> CellMode<'a> {
    pub fn state(&self) -> Option<CellState> {
        match self {
            CellMode::Inactive => Some(CellState::RolledUp),
            CellMode::CollapsedSummary { .. } => Some(CellState::UnrolledCollapsedNoActive),
            CellMode::CollapsedWithActive { .. } => Some(CellState::UnrolledCollapsedHasActive),
            CellMode::Expanded { .. } => Some(CellState::UnrolledExpanded),
            CellMode::Missing => None,
        }
    }

    pub fn build(&self) -> Option<&'a Build> {
        match self {
            CellMode::CollapsedSummary { build, .. }
            | CellMode::CollapsedWithActive { build, .. }
            | CellMode::Expanded { build, .. } => Some(*build),
            CellMode::Inactive | CellMode::Missing => None,
        }
    }

    /// Tasks drawn individually in this cell.
    pub fn listed_tasks(&self) -> &[&'a Task] {
        match self {
            CellMode::CollapsedWithActive { active_tasks, .. } => active_tasks.as_slice(),
            CellMode::Expanded { tasks, .. } => tasks.as_slice(),
            _ => &[],
        }
    }

    pub fn summary(&self) -> &[StatusSummary] {
        match self {
            CellMode::CollapsedSummary { summary, .. }
            | CellMode::CollapsedWithActive { summary, .. } => summary.as_slice(),
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell<'a> {
    pub version_id: &'a str,
    /// Build page, when the cell shows a build.
    pub link: Option<String>,
    pub mode: CellMode<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow<'a> {
    pub variant: &'a BuildVariant,
    pub link: String,
    /// Only computed in collapsed mode.
    pub no_active: Option<bool>,
    pub cells: Vec<GridCell<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageToggle {
    More,
    Less,
}

impl MessageToggle {
    pub fn label(self) -> &'static str {
        match self {
            MessageToggle::More => "more",
            MessageToggle::Less => "less",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub text: String,
    pub toggle: Option<MessageToggle>,
}

/// Header text for a commit message. Over [`MAX_MESSAGE_CHARS`] characters a
/// toggle is offered and, while shortening, the text is cut to fit exactly.
pub fn commit_message(message: &str, shorten: bool) -> CommitMessage {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return CommitMessage {
            text: message.to_string(),
            toggle: None,
        };
    }
    if shorten {
        let keep = MAX_MESSAGE_CHARS - ELLIPSIS.len();
        let mut text: String = message.chars().take(keep).collect();
        text.push_str(ELLIPSIS);
        CommitMessage {
            text,
            toggle: Some(MessageToggle::More),
        }
    } else {
        CommitMessage {
            text: message.to_string(),
            toggle: Some(MessageToggle::Less),
        }
    }
}

fn prefix(s: &str, chars: usize) -> String {
    s.chars().take(chars).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveHeader<'a> {
    pub column_key: &'a str,
    pub version_id: &'a str,
    pub link: String,
    pub short_hash: String,
    pub author: &'a str,
    pub time: String,
    pub message: CommitMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolledUpEntry<'a> {
    pub version_id: &'a str,
    pub link: String,
    pub short_revision: String,
    pub author: &'a str,
    pub message: &'a str,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolledUpHeader<'a> {
    pub column_key: &'a str,
    pub label: String,
    pub entries: Vec<RolledUpEntry<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionHeader<'a> {
    Active(ActiveHeader<'a>),
    RolledUp(RolledUpHeader<'a>),
}

impl VersionHeader<'_> {
    /// Key of the column in the page's version map, which is what each
    /// row's cells refer to.
    pub fn column_key(&self) -> &str {
        match self {
            VersionHeader::Active(h) => h.column_key,
            VersionHeader::RolledUp(h) => h.column_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolbar {
    pub collapsed: bool,
    /// The task filter box is disabled in collapsed mode.
    pub task_filter_enabled: bool,
    pub nav: PageNav,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<'a> {
    pub toolbar: Toolbar,
    pub headers: Vec<VersionHeader<'a>>,
    pub rows: Vec<GridRow<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderModel<'a> {
    Empty { message: &'static str },
    Grid(Grid<'a>),
}

impl<'a> RenderModel<'a> {
    pub fn grid(&self) -> Option<&Grid<'a>> {
        match self {
            RenderModel::Grid(grid) => Some(grid),
            RenderModel::Empty { .. } => None,
        }
    }
}

pub struct GridProjector<'p> {
    project: &'p str,
    user_tz: &'p str,
    formatter: &'p dyn TimestampFormatter,
    active: ActiveStatuses,
}

impl<'p> GridProjector<'p> {
    pub fn new(project: &'p str, user_tz: &'p str, formatter: &'p dyn TimestampFormatter) -> Self {
        Self {
            project,
            user_tz,
            formatter,
            active: ActiveStatuses::default(),
        }
    }

    pub fn with_active_statuses(mut self, active: ActiveStatuses) -> Self {
        self.active = active;
        self
    }

    pub fn project<'a>(&self, page: &'a WaterfallPage, view: &ViewState) -> RenderModel<'a> {
        if page.rows.is_empty() {
            return RenderModel::Empty {
                message: EMPTY_MESSAGE,
            };
        }

        let nav = PageNav::for_page(page);
        let toolbar = Toolbar {
            collapsed: view.collapsed(),
            task_filter_enabled: !view.collapsed(),
            prev_url: nav.prev_url(self.project),
            next_url: nav.next_url(self.project),
            nav,
        };

        let headers = self.headers(page, view.shorten_commit_message());

        let task_filter = view.effective_task_filter();
        let rows: Vec<GridRow<'a>> = filter::visible_rows(&page.rows, view.build_variant_filter())
            .into_iter()
            .map(|row| self.project_row(page, row, view.collapsed(), task_filter))
            .collect();

        tracing::debug!(
            "projected {} of {} rows over {} columns (collapsed: {})",
            rows.len(),
            page.rows.len(),
            headers.len(),
            view.collapsed()
        );

        RenderModel::Grid(Grid {
            toolbar,
            headers,
            rows,
        })
    }

    /// Column headers, newest version first.
    pub fn headers<'a>(&self, page: &'a WaterfallPage, shorten: bool) -> Vec<VersionHeader<'a>> {
        page.sorted_versions()
            .into_iter()
            .map(|(key, version)| {
                if version.rolled_up {
                    VersionHeader::RolledUp(self.rolled_up_header(key, version))
                } else {
                    VersionHeader::Active(self.active_header(key, version, shorten))
                }
            })
            .collect()
    }

    fn format_time(&self, instant: chrono::DateTime<chrono::Utc>) -> String {
        self.formatter
            .format(instant, self.user_tz, HEADER_TIME_PATTERN)
    }

    fn active_header<'a>(&self, key: &'a str, version: &'a Version, shorten: bool) -> ActiveHeader<'a> {
        let id = version.primary_id();
        let entry = version.entry(0);
        ActiveHeader {
            column_key: key,
            version_id: id,
            link: links::version(id),
            short_hash: entry.map_or_else(String::new, |e| prefix(e.revision, SHORT_HASH_CHARS)),
            author: entry.map_or("", |e| e.author),
            time: entry.map_or_else(String::new, |e| self.format_time(e.create_time)),
            message: commit_message(entry.map_or("", |e| e.message), shorten),
        }
    }

    fn rolled_up_header<'a>(&self, key: &'a str, version: &'a Version) -> RolledUpHeader<'a> {
        let n = version.messages.len();
        let noun = if n > 1 { "versions" } else { "version" };
        RolledUpHeader {
            column_key: key,
            label: format!("{n} inactive {noun}"),
            entries: version
                .entries()
                .map(|e| RolledUpEntry {
                    version_id: e.id,
                    link: links::version(e.id),
                    short_revision: prefix(e.revision, ROLLED_UP_HASH_CHARS),
                    author: e.author,
                    message: e.message,
                    time: self.format_time(e.create_time),
                })
                .collect(),
        }
    }

    fn project_row<'a>(
        &self,
        page: &'a WaterfallPage,
        row: &'a Row,
        collapsed: bool,
        task_filter: Option<&str>,
    ) -> GridRow<'a> {
        let no_active = collapsed.then(|| self.active.row_has_no_active(row));
        let cells = row
            .versions
            .iter()
            .map(|version_id| {
                let mode = self.project_cell(
                    page.version(version_id),
                    row.builds.get(version_id),
                    collapsed,
                    no_active.unwrap_or(false),
                    task_filter,
                );
                GridCell {
                    version_id,
                    link: mode.build().map(|b| links::build(&b.id)),
                    mode,
                }
            })
            .collect();
        GridRow {
            variant: &row.build_variant,
            link: links::build_variant(self.project, &row.build_variant.id),
            no_active,
            cells,
        }
    }

    /// Content of a single cell. `no_active` is the row-wide flag and is only
    /// consulted in collapsed mode.
    pub fn project_cell<'a>(
        &self,
        version: Option<&Version>,
        build: Option<&'a Build>,
        collapsed: bool,
        no_active: bool,
        task_filter: Option<&str>,
    ) -> CellMode<'a> {
        let rolled_up = version.is_some_and(|v| v.rolled_up);
        match (CellState::resolve(rolled_up, collapsed, no_active), build) {
            (CellState::RolledUp, _) => CellMode::Inactive,
            (_, None) => CellMode::Missing,
            (CellState::UnrolledCollapsedNoActive, Some(build)) => CellMode::CollapsedSummary {
                build,
                summary: aggregate::summarize(&build.task_status_count, &ActiveStatuses::none()),
            },
            (CellState::UnrolledCollapsedHasActive, Some(build)) => CellMode::CollapsedWithActive {
                build,
                summary: aggregate::summarize(&build.task_status_count, &self.active),
                active_tasks: self.active.active_tasks(build),
            },
            (CellState::UnrolledExpanded, Some(build)) => CellMode::Expanded {
                build,
                tasks: filter::visible_tasks(&build.tasks, task_filter),
            },
        }
    }
}
