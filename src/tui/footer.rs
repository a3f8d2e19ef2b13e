use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, InputMode};

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let footer = Paragraph::new(footer_line(state, area.width)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}

pub fn footer_line(state: &AppState, width: u16) -> Line<'_> {
    let (label, text) = match state.input_mode {
        InputMode::VariantFilter => ("variant filter", state.view.build_variant_filter()),
        InputMode::TaskFilter => ("task filter", state.view.task_filter()),
        InputMode::Normal => return hint_line(state, width),
    };
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Cyan)),
        Span::styled(text, Style::default().fg(Color::White)),
        Span::styled("█", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        Span::styled("  Enter/Esc done", Style::default().fg(Color::DarkGray)),
    ])
}

fn hint_line(state: &AppState, width: u16) -> Line<'static> {
    let narrow = width < crate::app::NARROW_WIDTH_THRESHOLD;

    let hints: &[(&str, &str)] = if state.has_overlay() {
        &[("d/q/Esc/Enter", "close")]
    } else if narrow {
        &[
            ("hjkl", "nav"),
            ("c", "collapse"),
            ("/", "variant"),
            ("n/p", "page"),
            ("q", "quit"),
        ]
    } else if state.view.collapsed() {
        &[
            ("hjkl", "navigate"),
            ("c", "expand"),
            ("m", "message"),
            ("/", "variant filter"),
            ("n/p", "page"),
            ("d", "version"),
            ("Enter", "build"),
            ("r", "reload"),
            ("q", "quit"),
        ]
    } else {
        &[
            ("hjkl", "navigate"),
            ("c", "collapse"),
            ("m", "message"),
            ("/", "variant filter"),
            ("t", "task filter"),
            ("n/p", "page"),
            ("d", "version"),
            ("Enter", "build"),
            ("r", "reload"),
            ("q", "quit"),
        ]
    };

    let mut spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {desc}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::view_state::ViewState;

    fn state() -> AppState {
        let view = ViewState::new(Box::new(MemoryStore::default()));
        AppState::new("mci".to_string(), "UTC".to_string(), view)
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn task_filter_hint_only_when_expanded() {
        let mut state = state();
        assert!(text(&footer_line(&state, 120)).contains("task filter"));
        state.view.set_collapsed(true);
        assert!(!text(&footer_line(&state, 120)).contains("task filter"));
    }

    #[test]
    fn edit_mode_shows_current_text() {
        let mut state = state();
        state.begin_filter_edit(InputMode::VariantFilter);
        state.push_filter_char('u');
        let line = text(&footer_line(&state, 120));
        assert!(line.starts_with("variant filter: u"));
    }

    #[test]
    fn narrow_hints() {
        let state = state();
        assert!(!text(&footer_line(&state, 40)).contains("reload"));
    }
}
