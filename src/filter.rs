//! Case-insensitive substring filters over variants and tasks.

use crate::model::{Row, Task};

/// `filter` is a case-insensitive substring of `name`. The empty filter
/// matches everything.
pub fn matches(name: &str, filter: &str) -> bool {
    filter.is_empty() || name.to_lowercase().contains(&filter.to_lowercase())
}

/// Rows whose variant display name matches, in dataset order.
pub fn visible_rows<'a>(rows: &'a [Row], filter: &str) -> Vec<&'a Row> {
    rows.iter()
        .filter(|row| matches(&row.build_variant.display_name, filter))
        .collect()
}

/// Tasks whose display name matches. `None` (collapsed mode) keeps them all.
pub fn visible_tasks<'a>(tasks: &'a [Task], filter: Option<&str>) -> Vec<&'a Task> {
    match filter {
        Some(f) => tasks.iter().filter(|t| matches(&t.display_name, f)).collect(),
        None => tasks.iter().collect(),
    }
}
