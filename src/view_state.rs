//! User-adjustable view state for the waterfall grid.

use crate::store::KeyValueStore;

/// Store key for the persisted collapsed flag.
pub const COLLAPSED_KEY: &str = "collapsed";

/// Collapsed mode, the two filters and commit-message shortening.
///
/// Only `collapsed` outlives the page: it is read from the store once at
/// construction and written back on every change. Everything else starts
/// fresh (messages shortened, filters empty).
pub struct ViewState {
    collapsed: bool,
    shorten_commit_message: bool,
    build_variant_filter: String,
    task_filter: String,
    store: Box<dyn KeyValueStore>,
}

impl ViewState {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        let collapsed = store.get(COLLAPSED_KEY).as_deref() == Some("true");
        Self {
            collapsed,
            shorten_commit_message: true,
            build_variant_filter: String::new(),
            task_filter: String::new(),
            store,
        }
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn shorten_commit_message(&self) -> bool {
        self.shorten_commit_message
    }

    pub fn build_variant_filter(&self) -> &str {
        &self.build_variant_filter
    }

    /// Raw task filter text, regardless of mode.
    pub fn task_filter(&self) -> &str {
        &self.task_filter
    }

    /// The task filter as it applies to the grid: absent in collapsed mode.
    pub fn effective_task_filter(&self) -> Option<&str> {
        (!self.collapsed).then_some(self.task_filter.as_str())
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
        let value = if collapsed { "true" } else { "false" };
        if let Err(e) = self.store.set(COLLAPSED_KEY, value) {
            tracing::warn!("failed to persist collapsed flag: {e}");
        }
    }

    pub fn toggle_collapsed(&mut self) {
        self.set_collapsed(!self.collapsed);
    }

    pub fn set_build_variant_filter(&mut self, filter: impl Into<String>) {
        self.build_variant_filter = filter.into();
    }

    pub fn set_task_filter(&mut self, filter: impl Into<String>) {
        self.task_filter = filter.into();
    }

    pub fn toggle_commit_message_shortening(&mut self) {
        self.shorten_commit_message = !self.shorten_commit_message;
    }
}

impl std::fmt::Debug for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewState")
            .field("collapsed", &self.collapsed)
            .field("shorten_commit_message", &self.shorten_commit_message)
            .field("build_variant_filter", &self.build_variant_filter)
            .field("task_filter", &self.task_filter)
            .finish_non_exhaustive()
    }
}
