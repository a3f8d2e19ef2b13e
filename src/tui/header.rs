use crate::app::AppState;
use crate::tui::spinner;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let line = Line::from(header_spans(state));
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(header, area);
}

pub fn header_spans(state: &AppState) -> Vec<Span<'_>> {
    let mut spans = vec![
        Span::styled(
            format!(" wfw v{} ", crate::cli::VERSION),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            state.config.project.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    if state.view.collapsed() {
        spans.push(Span::styled(" [collapsed]", Style::default().fg(Color::Magenta)));
    }

    let variant_filter = state.view.build_variant_filter();
    if !variant_filter.is_empty() {
        spans.push(Span::styled(
            format!(" variant:{variant_filter}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    // Ignored while collapsed, so only shown when it applies
    if let Some(task_filter) = state.view.effective_task_filter() {
        if !task_filter.is_empty() {
            spans.push(Span::styled(
                format!(" task:{task_filter}"),
                Style::default().fg(Color::Yellow),
            ));
        }
    }

    let nav = state.page_nav();
    let arrow = |enabled: bool, glyph: &'static str| {
        let color = if enabled { Color::Cyan } else { Color::DarkGray };
        Span::styled(glyph, Style::default().fg(color))
    };
    spans.push(Span::raw(" "));
    spans.push(arrow(nav.prev_skip.is_some(), "◀"));
    spans.push(Span::styled(
        format!(" skip {} ", state.requested_skip),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(arrow(nav.next_skip.is_some(), "▶"));

    if state.is_loading {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            spinner::frame(state.spinner_frame).to_string(),
            Style::default().fg(Color::Yellow),
        ));
    }

    if state.error_message().is_some() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    spans
}
