use crate::filter;
use crate::links;
use crate::model::WaterfallPage;
use crate::pagination::PageNav;
use crate::projector::{GridProjector, RenderModel, VersionHeader};
use crate::timefmt::{ChronoTzFormatter, TimestampFormatter};
use crate::view_state::ViewState;

// UI constants
pub const SPINNER_FRAME_COUNT: usize = 10;
pub const NARROW_WIDTH_THRESHOLD: u16 = 60;
pub const ERROR_TTL_SECS: u64 = 10;

/// Which text box, if any, is receiving keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    VariantFilter,
    TaskFilter,
}

pub struct DetailOverlay {
    pub title: String,
    pub lines: Vec<(String, String)>,
}

/// Immutable configuration set at startup.
pub struct AppConfig {
    pub project: String,
    pub user_tz: String,
}

pub struct AppState {
    pub config: AppConfig,

    // Page data
    pub page: Option<WaterfallPage>,
    pub view: ViewState,
    pub requested_skip: u64,

    // Grid navigation
    pub cursor: usize,
    pub column: usize,
    pub input_mode: InputMode,

    // Transient UI
    pub overlay: Option<DetailOverlay>,
    pub error: Option<(String, std::time::Instant)>,
    pub spinner_frame: usize,
    pub is_loading: bool,
    pub should_quit: bool,

    formatter: Box<dyn TimestampFormatter>,
}

impl AppState {
    pub fn new(project: String, user_tz: String, view: ViewState) -> Self {
        Self {
            config: AppConfig { project, user_tz },
            page: None,
            view,
            requested_skip: 0,
            cursor: 0,
            column: 0,
            input_mode: InputMode::Normal,
            overlay: None,
            error: None,
            spinner_frame: 0,
            is_loading: false,
            should_quit: false,
            formatter: Box::new(ChronoTzFormatter),
        }
    }

    pub fn with_formatter(mut self, formatter: Box<dyn TimestampFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn projector(&self) -> GridProjector<'_> {
        GridProjector::new(
            &self.config.project,
            &self.config.user_tz,
            self.formatter.as_ref(),
        )
    }

    /// Fresh projection of the loaded page; `None` until the first page arrives.
    pub fn project(&self) -> Option<RenderModel<'_>> {
        let page = self.page.as_ref()?;
        Some(self.projector().project(page, &self.view))
    }

    pub fn set_page(&mut self, page: WaterfallPage) {
        tracing::debug!(
            "page loaded: skip={} rows={} versions={}",
            page.current_skip,
            page.rows.len(),
            page.versions.len()
        );
        self.requested_skip = page.current_skip;
        self.page = Some(page);
        self.is_loading = false;
        self.overlay = None;
        self.clamp_cursor();
    }

    pub fn begin_load(&mut self, skip: u64) {
        self.requested_skip = skip;
        self.is_loading = true;
    }

    pub fn page_nav(&self) -> PageNav {
        self.page.as_ref().map(PageNav::for_page).unwrap_or_default()
    }

    pub fn next_page_skip(&self) -> Option<u64> {
        self.page_nav().next_skip
    }

    pub fn prev_page_skip(&self) -> Option<u64> {
        self.page_nav().prev_skip
    }

    pub fn visible_row_count(&self) -> usize {
        self.page.as_ref().map_or(0, |page| {
            filter::visible_rows(&page.rows, self.view.build_variant_filter()).len()
        })
    }

    pub fn column_count(&self) -> usize {
        self.page.as_ref().map_or(0, |page| page.versions.len())
    }

    fn clamp_cursor(&mut self) {
        let rows = self.visible_row_count();
        if self.cursor >= rows {
            self.cursor = rows.saturating_sub(1);
        }
        let columns = self.column_count();
        if self.column >= columns {
            self.column = columns.saturating_sub(1);
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_down(&mut self) {
        let rows = self.visible_row_count();
        if rows > 0 && self.cursor < rows - 1 {
            self.cursor += 1;
        }
    }

    pub fn move_column_left(&mut self) {
        if self.column > 0 {
            self.column -= 1;
        }
    }

    pub fn move_column_right(&mut self) {
        let columns = self.column_count();
        if columns > 0 && self.column < columns - 1 {
            self.column += 1;
        }
    }

    pub fn toggle_collapsed(&mut self) {
        self.view.toggle_collapsed();
        if self.view.collapsed() && self.input_mode == InputMode::TaskFilter {
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn toggle_commit_message(&mut self) {
        self.view.toggle_commit_message_shortening();
    }

    /// Starts editing a filter box. The task filter box is disabled while
    /// collapsed, so asking for it then does nothing.
    pub fn begin_filter_edit(&mut self, mode: InputMode) {
        if mode == InputMode::TaskFilter && self.view.collapsed() {
            return;
        }
        self.input_mode = mode;
    }

    pub fn finish_filter_edit(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn push_filter_char(&mut self, c: char) {
        match self.input_mode {
            InputMode::VariantFilter => {
                let mut text = self.view.build_variant_filter().to_string();
                text.push(c);
                self.view.set_build_variant_filter(text);
                self.clamp_cursor();
            }
            InputMode::TaskFilter => {
                let mut text = self.view.task_filter().to_string();
                text.push(c);
                self.view.set_task_filter(text);
            }
            InputMode::Normal => {}
        }
    }

    pub fn pop_filter_char(&mut self) {
        match self.input_mode {
            InputMode::VariantFilter => {
                let mut text = self.view.build_variant_filter().to_string();
                text.pop();
                self.view.set_build_variant_filter(text);
                self.clamp_cursor();
            }
            InputMode::TaskFilter => {
                let mut text = self.view.task_filter().to_string();
                text.pop();
                self.view.set_task_filter(text);
            }
            InputMode::Normal => {}
        }
    }

    /// Opens the details of the selected column: every folded entry for a
    /// rolled-up column, the full header otherwise.
    pub fn open_column_details(&mut self) {
        let Some(page) = self.page.as_ref() else {
            return;
        };
        let headers = self.projector().headers(page, false);
        let Some(header) = headers.get(self.column) else {
            return;
        };
        let (title, lines) = match header {
            VersionHeader::RolledUp(h) => {
                let mut lines = Vec::new();
                for entry in &h.entries {
                    lines.push((entry.time.clone(), entry.short_revision.clone()));
                    lines.push(("author".to_string(), entry.author.to_string()));
                    lines.push(("message".to_string(), entry.message.to_string()));
                    lines.push(("link".to_string(), entry.link.clone()));
                }
                (h.label.clone(), lines)
            }
            VersionHeader::Active(h) => (
                format!("version {}", h.short_hash),
                vec![
                    ("time".to_string(), h.time.clone()),
                    ("author".to_string(), h.author.to_string()),
                    ("message".to_string(), h.message.text.clone()),
                    ("link".to_string(), h.link.clone()),
                ],
            ),
        };
        self.overlay = Some(DetailOverlay { title, lines });
    }

    /// Opens the build under the cursor: its link, the summary chips when
    /// collapsed and every listed task with its own link.
    pub fn open_cell_details(&mut self) {
        if let Some(overlay) = self.cell_details() {
            self.overlay = Some(overlay);
        }
    }

    fn cell_details(&self) -> Option<DetailOverlay> {
        let model = self.project()?;
        let grid = model.grid()?;
        let row = grid.rows.get(self.cursor)?;
        let version_id = grid.headers.get(self.column)?.column_key();
        let cell = row.cells.iter().find(|c| c.version_id == version_id)?;

        let mut lines = vec![("build".to_string(), cell.link.clone()?)];
        let summary = cell.mode.summary();
        if !summary.is_empty() {
            let chips: Vec<String> = summary
                .iter()
                .map(|s| format!("{} {}", s.label(), s.count))
                .collect();
            lines.push(("summary".to_string(), chips.join(", ")));
        }
        for task in cell.mode.listed_tasks() {
            lines.push((
                task.status.to_string(),
                format!("{}  {}", task.display_name, links::task(&task.id)),
            ));
        }
        let title = format!("{} @ {}", row.variant.display_name, cell.version_id);
        Some(DetailOverlay { title, lines })
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAME_COUNT;
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some((msg, std::time::Instant::now()));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn prune_error(&mut self) {
        if let Some((_, ts)) = &self.error {
            if ts.elapsed().as_secs() >= ERROR_TTL_SECS {
                self.error = None;
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|(msg, _)| msg.as_str())
    }
}
