
use fixtures::*;
use pretty_assertions::assert_eq;
use waterfall::aggregate::{StatusSummary, SummaryStatus};
use waterfall::app::{AppState, InputMode};
use waterfall::input::{self, Action, InputContext};
use waterfall::model::TaskStatusCount;
use waterfall::pagination::PageNav;
use waterfall::parser;
use waterfall::projector::{CellMode, MessageToggle, RenderModel, VersionHeader, EMPTY_MESSAGE};
use waterfall::store::FileStore;
use waterfall::view_state::ViewState;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

/// Feeds a key through the input map and applies the state-only actions.
fn send_key(state: &mut AppState, code: KeyCode) -> Action {
    let ctx = InputContext {
        has_error: state.error.is_some(),
        is_loading: state.is_loading,
        has_overlay: state.has_overlay(),
        input_mode: state.input_mode,
    };
    let action = input::map_key(press(code), &ctx);
    match action {
        Action::MoveUp => state.move_cursor_up(),
        Action::MoveDown => state.move_cursor_down(),
        Action::MoveLeft => state.move_column_left(),
        Action::MoveRight => state.move_column_right(),
        Action::ToggleCollapsed => state.toggle_collapsed(),
        Action::ToggleCommitMessage => state.toggle_commit_message(),
        Action::EditVariantFilter => state.begin_filter_edit(InputMode::VariantFilter),
        Action::EditTaskFilter => state.begin_filter_edit(InputMode::TaskFilter),
        Action::FilterInput(c) => state.push_filter_char(c),
        Action::FilterBackspace => state.pop_filter_char(),
        Action::FinishFilter => state.finish_filter_edit(),
        Action::ShowDetails => state.open_column_details(),
        Action::ShowCellDetails => state.open_cell_details(),
        Action::CloseOverlay => state.close_overlay(),
        Action::DismissError => state.clear_error(),
        _ => {}
    }
    action
}

fn fixture_state() -> AppState {
    state_with_page(parser::parse_page(PAGE_JSON).expect("fixture parses"))
}

fn row_names(state: &AppState) -> Vec<String> {
    let model = state.project().expect("page loaded");
    model
        .grid()
        .expect("grid")
        .rows
        .iter()
        .map(|r| r.variant.display_name.clone())
        .collect()
}

fn task_names(mode: &CellMode<'_>) -> Vec<String> {
    mode.listed_tasks()
        .iter()
        .map(|t| t.display_name.clone())
        .collect()
}

fn summary(pairs: &[(SummaryStatus, u32)]) -> Vec<StatusSummary> {
    pairs
        .iter()
        .map(|&(status, count)| StatusSummary { status, count })
        .collect()
}

// ========== Data flow ==========

#[test]
fn json_to_expanded_grid() {
    let state = fixture_state();
    let model = state.project().unwrap();
    let grid = model.grid().unwrap();

    assert_eq!(grid.headers.len(), 3);
    assert_eq!(grid.rows.len(), 3);
    assert!(!grid.toolbar.collapsed);
    assert!(grid.toolbar.task_filter_enabled);

    let ubuntu = &grid.rows[0];
    assert_eq!(ubuntu.link, "/build_variant/mci/ubuntu1604");
    assert_eq!(ubuntu.no_active, None);
    assert_eq!(
        task_names(&ubuntu.cells[0].mode),
        vec!["compile", "lint", "unit_tests"]
    );
    assert_eq!(ubuntu.cells[1].mode, CellMode::Inactive);
    assert_eq!(task_names(&ubuntu.cells[2].mode), vec!["compile"]);

    // Linux has no build for v1
    assert_eq!(grid.rows[2].cells[2].mode, CellMode::Missing);
}

#[test]
fn headers_sorted_newest_first() {
    let state = fixture_state();
    let model = state.project().unwrap();
    let headers = &model.grid().unwrap().headers;

    let VersionHeader::Active(newest) = &headers[0] else {
        panic!("v3 should be active");
    };
    assert_eq!(newest.short_hash, "33333");
    assert_eq!(newest.author, "alice");
    assert_eq!(newest.link, "/version/v3");
    assert_eq!(newest.time, "2024-06-01T10:05:00+00:00@America/New_York");
    assert_eq!(newest.message.text.chars().count(), 44);
    assert!(newest.message.text.ends_with("..."));
    assert_eq!(newest.message.toggle, Some(MessageToggle::More));

    let VersionHeader::RolledUp(folded) = &headers[1] else {
        panic!("v2 should be rolled up");
    };
    assert_eq!(folded.label, "2 inactive versions");
    assert_eq!(folded.entries[0].short_revision, "2222222222");
    assert_eq!(folded.entries[1].author, "carol");

    assert_eq!(headers[2].column_key(), "v1");
}

#[test]
fn message_toggle_shows_full_text() {
    let mut state = fixture_state();
    send_key(&mut state, KeyCode::Char('m'));
    let model = state.project().unwrap();
    let VersionHeader::Active(newest) = &model.grid().unwrap().headers[0] else {
        panic!("v3 should be active");
    };
    assert_eq!(newest.message.toggle, Some(MessageToggle::Less));
    assert!(newest.message.text.ends_with("replication path"));
}

#[test]
fn collapsed_grid_rolls_up_counts() {
    let mut state = fixture_state();
    send_key(&mut state, KeyCode::Char('c'));
    let model = state.project().unwrap();
    let grid = model.grid().unwrap();
    assert!(grid.toolbar.collapsed);
    assert!(!grid.toolbar.task_filter_enabled);

    // Ubuntu has a failed task: counts skip active statuses, lint is listed
    let ubuntu = &grid.rows[0];
    assert_eq!(ubuntu.no_active, Some(false));
    assert!(matches!(ubuntu.cells[0].mode, CellMode::CollapsedWithActive { .. }));
    assert_eq!(
        ubuntu.cells[0].mode.summary(),
        summary(&[(SummaryStatus::Success, 2)]).as_slice()
    );
    assert_eq!(task_names(&ubuntu.cells[0].mode), vec!["lint"]);
    assert_eq!(ubuntu.cells[1].mode, CellMode::Inactive);

    // Windows has nothing active: plain summary over every status
    let windows = &grid.rows[1];
    assert_eq!(windows.no_active, Some(true));
    assert!(matches!(windows.cells[0].mode, CellMode::CollapsedSummary { .. }));
    assert_eq!(
        windows.cells[0].mode.summary(),
        summary(&[(SummaryStatus::Success, 1), (SummaryStatus::Dispatched, 1)]).as_slice()
    );

    // Linux only has a system failure, which is never counted
    let linux = &grid.rows[2];
    assert!(linux.cells[0].mode.summary().is_empty());
    assert_eq!(task_names(&linux.cells[0].mode), vec!["compile"]);
}

#[test]
fn collapse_round_trip_restores_tasks() {
    let mut state = fixture_state();
    let before = task_names(&state.project().unwrap().grid().unwrap().rows[0].cells[0].mode);
    send_key(&mut state, KeyCode::Char('c'));
    send_key(&mut state, KeyCode::Char('c'));
    let model = state.project().unwrap();
    assert_eq!(task_names(&model.grid().unwrap().rows[0].cells[0].mode), before);
}

#[test]
fn summary_counts_with_only_failed_active() {
    let counts = TaskStatusCount {
        succeeded: 3,
        timed_out: 1,
        failed: 2,
        ..TaskStatusCount::default()
    };
    let chips = waterfall::aggregate::summarize(
        &counts,
        &waterfall::aggregate::ActiveStatuses::new(["failed"]),
    );
    let labels: Vec<(&str, u32)> = chips.iter().map(|c| (c.label(), c.count)).collect();
    assert_eq!(labels, vec![("success", 3), ("system-failed", 1)]);
}

// ========== Filters through the keyboard ==========

#[test]
fn variant_filter_typed_case_insensitively() {
    let mut state = fixture_state();
    send_key(&mut state, KeyCode::Char('/'));
    for c in "WIN".chars() {
        send_key(&mut state, KeyCode::Char(c));
    }
    assert_eq!(row_names(&state), vec!["Windows 2019"]);

    send_key(&mut state, KeyCode::Backspace);
    send_key(&mut state, KeyCode::Backspace);
    send_key(&mut state, KeyCode::Backspace);
    send_key(&mut state, KeyCode::Enter);
    assert_eq!(state.input_mode, InputMode::Normal);
    assert_eq!(row_names(&state).len(), 3);
}

#[test]
fn filter_mode_captures_command_keys() {
    let mut state = fixture_state();
    send_key(&mut state, KeyCode::Char('/'));
    // 'c' is text here, not the collapse toggle
    assert_eq!(send_key(&mut state, KeyCode::Char('c')), Action::FilterInput('c'));
    assert!(!state.view.collapsed());
    send_key(&mut state, KeyCode::Esc);
    assert_eq!(send_key(&mut state, KeyCode::Char('c')), Action::ToggleCollapsed);
    assert!(state.view.collapsed());
}

#[test]
fn task_filter_narrows_expanded_cells() {
    let mut state = fixture_state();
    send_key(&mut state, KeyCode::Char('t'));
    for c in "UNIT".chars() {
        send_key(&mut state, KeyCode::Char(c));
    }
    send_key(&mut state, KeyCode::Enter);

    let model = state.project().unwrap();
    let grid = model.grid().unwrap();
    assert_eq!(task_names(&grid.rows[0].cells[0].mode), vec!["unit_tests"]);
    assert!(task_names(&grid.rows[0].cells[2].mode).is_empty());
    assert_eq!(task_names(&grid.rows[1].cells[0].mode), vec!["unit_tests"]);
}

#[test]
fn task_filter_ignored_while_collapsed() {
    let mut state = fixture_state();
    state.view.set_task_filter("unit");
    send_key(&mut state, KeyCode::Char('c'));
    assert_eq!(send_key(&mut state, KeyCode::Char('t')), Action::EditTaskFilter);
    assert_eq!(state.input_mode, InputMode::Normal);

    let model = state.project().unwrap();
    // lint is still listed as an active task despite the filter text
    assert_eq!(task_names(&model.grid().unwrap().rows[0].cells[0].mode), vec!["lint"]);
}

// ========== Paging ==========

#[test]
fn fixture_page_navigation() {
    let state = fixture_state();
    // v3 + two folded in v2 + v1
    assert_eq!(
        state.page_nav(),
        PageNav {
            next_skip: Some(4),
            prev_skip: None,
        }
    );
    let model = state.project().unwrap();
    let toolbar = &model.grid().unwrap().toolbar;
    assert_eq!(toolbar.next_url.as_deref(), Some("/waterfall/mci?skip=4"));
    assert_eq!(toolbar.prev_url, None);
}

#[test]
fn last_page_disables_next() {
    let mut page = parser::parse_page(PAGE_JSON).unwrap();
    page.current_skip = 8;
    page.previous_page_count = 4;
    let state = state_with_page(page);
    assert_eq!(state.next_page_skip(), None);
    assert_eq!(state.prev_page_skip(), Some(4));
}

#[test]
fn paging_keys_ignored_while_loading() {
    let mut state = fixture_state();
    state.begin_load(4);
    assert_eq!(send_key(&mut state, KeyCode::Char('n')), Action::None);
    assert_eq!(send_key(&mut state, KeyCode::Char('r')), Action::None);
}

// ========== Details overlay ==========

#[test]
fn rolled_up_details_list_every_entry() {
    let mut state = fixture_state();
    send_key(&mut state, KeyCode::Char('l'));
    send_key(&mut state, KeyCode::Char('d'));
    let overlay = state.overlay.as_ref().expect("overlay open");
    assert_eq!(overlay.title, "2 inactive versions");
    let revisions: Vec<&str> = overlay
        .lines
        .iter()
        .filter(|(_, v)| v.starts_with('2'))
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(revisions, vec!["2222222222", "2b2b2b2b2b"]);

    // Overlay swallows navigation until closed
    assert_eq!(send_key(&mut state, KeyCode::Char('l')), Action::None);
    send_key(&mut state, KeyCode::Esc);
    assert!(!state.has_overlay());
}

#[test]
fn collapsed_cell_details_link_build_and_active_tasks() {
    let mut state = fixture_state();
    send_key(&mut state, KeyCode::Char('c'));
    send_key(&mut state, KeyCode::Enter);
    let overlay = state.overlay.as_ref().expect("overlay open");
    assert_eq!(overlay.title, "Ubuntu 16.04 @ v3");
    assert_eq!(
        overlay.lines,
        vec![
            ("build".to_string(), "/build/b-ubuntu-v3".to_string()),
            ("summary".to_string(), "success 2".to_string()),
            ("failed".to_string(), "lint  /task/t2".to_string()),
        ]
    );
}

// ========== Persistence ==========

#[test]
fn collapsed_flag_survives_restart() {
    let dir = std::env::temp_dir().join(format!("wfw-it-{}", std::process::id()));
    let path = dir.join("state.json");
    let _ = std::fs::remove_dir_all(&dir);

    let mut view = ViewState::new(Box::new(FileStore::open(&path).unwrap()));
    assert!(!view.collapsed());
    view.toggle_collapsed();
    drop(view);

    let view = ViewState::new(Box::new(FileStore::open(&path).unwrap()));
    assert!(view.collapsed());
    // Filters and shortening are never persisted
    assert_eq!(view.build_variant_filter(), "");
    assert!(view.shorten_commit_message());

    let _ = std::fs::remove_dir_all(&dir);
}

// ========== Builders ==========

#[test]
fn built_page_without_rows_is_empty() {
    let state = state_with_page(page(Vec::new(), vec![version("v1", 1, false)], 1));
    assert_eq!(
        state.project(),
        Some(RenderModel::Empty {
            message: EMPTY_MESSAGE
        })
    );
}

#[test]
fn built_row_without_active_tasks() {
    let green = build(
        "b1",
        vec![task("t1", "compile", "success"), task("t2", "lint", "undispatched")],
        TaskStatusCount {
            succeeded: 1,
            undispatched: 1,
            ..TaskStatusCount::default()
        },
    );
    let mut state = state_with_page(page(
        vec![row("Linux", vec![("v1", green)])],
        vec![version("v1", 1, false)],
        1,
    ));
    state.toggle_collapsed();
    let model = state.project().unwrap();
    let cell = &model.grid().unwrap().rows[0].cells[0];
    assert_eq!(
        cell.mode.summary(),
        summary(&[(SummaryStatus::Success, 1), (SummaryStatus::Undispatched, 1)]).as_slice()
    );
    assert!(cell.mode.listed_tasks().is_empty());
}

// ========== Rendering ==========

fn render_to_string(state: &AppState, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| waterfall::tui::render::render(f, state))
        .unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[test]
fn render_grid_smoke() {
    let state = fixture_state();
    let screen = render_to_string(&state, 120, 30);
    assert!(screen.contains("mci"));
    assert!(screen.contains("Ubuntu 16.04"));
    assert!(screen.contains("33333"));
    assert!(screen.contains("inactive build"));
}

#[test]
fn render_message_toggle_changes_header() {
    let mut state = fixture_state();
    let shortened = render_to_string(&state, 200, 30);
    assert!(shortened.contains("SERVER-1234 fix the thing that was broken..."));
    assert!(shortened.contains("[more]"));
    assert!(!shortened.contains("replication path"));

    send_key(&mut state, KeyCode::Char('m'));
    let full = render_to_string(&state, 200, 30);
    assert!(full.contains("replication path"));
    assert!(full.contains("[less]"));
    assert_ne!(shortened, full);
}

#[test]
fn render_empty_page_message() {
    let state = state_with_page(page(Vec::new(), Vec::new(), 0));
    let screen = render_to_string(&state, 80, 12);
    assert!(screen.contains(EMPTY_MESSAGE));
}

#[test]
fn render_overlay_and_error_on_small_terminal() {
    let mut state = fixture_state();
    state.column = 1;
    state.open_column_details();
    state.set_error("page unreadable".to_string());
    // Must not panic even when the overlay is bigger than the screen
    let screen = render_to_string(&state, 30, 8);
    assert!(!screen.is_empty());
}
