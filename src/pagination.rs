//! Newer/older page offsets for the waterfall toolbar.

use crate::links;
use crate::model::{Version, WaterfallPage};

/// Offsets for the neighbouring pages. `None` disables that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageNav {
    pub next_skip: Option<u64>,
    pub prev_skip: Option<u64>,
}

impl PageNav {
    /// `next_skip = current_skip + versions_on_page`, valid while it stays below
    /// `total_versions`. `prev_skip = current_skip - previous_page_count`, valid
    /// whenever `current_skip > 0`; it saturates at zero rather than going negative.
    pub fn compute(
        current_skip: u64,
        total_versions: u64,
        versions_on_page: u64,
        previous_page_count: u64,
    ) -> Self {
        let next = current_skip.saturating_add(versions_on_page);
        let next_skip = (next < total_versions).then_some(next);
        let prev_skip =
            (current_skip > 0).then(|| current_skip.saturating_sub(previous_page_count));
        Self {
            next_skip,
            prev_skip,
        }
    }

    pub fn for_page(page: &WaterfallPage) -> Self {
        Self::compute(
            page.current_skip,
            page.total_versions,
            versions_on_page(page.versions.values()),
            page.previous_page_count,
        )
    }

    pub fn next_url(&self, project: &str) -> Option<String> {
        self.next_skip.map(|skip| links::waterfall_page(project, skip))
    }

    pub fn prev_url(&self, project: &str) -> Option<String> {
        self.prev_skip.map(|skip| links::waterfall_page(project, skip))
    }
}

/// Real versions shown on a page: a rolled-up column counts once per folded entry.
pub fn versions_on_page<'a>(versions: impl IntoIterator<Item = &'a Version>) -> u64 {
    versions.into_iter().map(|v| v.entry_count() as u64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn version(authors: usize) -> Version {
        Version {
            ids: (0..authors).map(|i| format!("v{i}")).collect(),
            messages: vec!["m".to_string(); authors],
            authors: vec!["a".to_string(); authors],
            revisions: vec!["r".to_string(); authors],
            create_times: vec![Utc::now(); authors],
            revision_order: 1,
            rolled_up: authors > 1,
        }
    }

    #[test]
    fn first_page_has_no_prev() {
        let nav = PageNav::compute(0, 100, 10, 0);
        assert_eq!(nav.prev_skip, None);
        assert_eq!(nav.next_skip, Some(10));
    }

    #[test]
    fn next_disabled_when_page_reaches_total() {
        let nav = PageNav::compute(0, 10, 10, 0);
        assert_eq!(nav.next_skip, None);
        assert_eq!(nav.prev_skip, None);
    }

    #[test]
    fn next_enabled_one_below_total() {
        let nav = PageNav::compute(0, 11, 10, 0);
        assert_eq!(nav.next_skip, Some(10));
    }

    #[test]
    fn prev_uses_previous_page_count() {
        let nav = PageNav::compute(20, 100, 10, 7);
        assert_eq!(nav.prev_skip, Some(13));
        assert_eq!(nav.next_skip, Some(30));
    }

    #[test]
    fn prev_never_negative() {
        let nav = PageNav::compute(3, 100, 10, 10);
        assert_eq!(nav.prev_skip, Some(0));
    }

    #[test]
    fn validity_rule_holds_across_grid() {
        for current in 0..6u64 {
            for total in 0..12u64 {
                for on_page in 0..6u64 {
                    let nav = PageNav::compute(current, total, on_page, 2);
                    assert_eq!(nav.next_skip.is_some(), current + on_page < total);
                    assert_eq!(nav.prev_skip.is_some(), current > 0);
                }
            }
        }
    }

    #[test]
    fn rolled_up_columns_count_every_entry() {
        let versions = [version(1), version(3), version(1)];
        assert_eq!(versions_on_page(versions.iter()), 5);
    }

    #[test]
    fn urls_follow_offsets() {
        let nav = PageNav::compute(10, 50, 10, 10);
        assert_eq!(nav.next_url("mci").as_deref(), Some("/waterfall/mci?skip=20"));
        assert_eq!(nav.prev_url("mci").as_deref(), Some("/waterfall/mci?skip=0"));
        let first = PageNav::compute(0, 5, 5, 0);
        assert_eq!(first.next_url("mci"), None);
        assert_eq!(first.prev_url("mci"), None);
    }
}
