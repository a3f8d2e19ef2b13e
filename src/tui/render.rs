use crate::app::AppState;
use crate::tui::{detail_overlay, footer, grid, header};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(1),    // grid
            Constraint::Length(2), // footer
        ])
        .split(f.area());

    header::render(f, chunks[0], state);
    grid::render(f, chunks[1], state);
    footer::render(f, chunks[2], state);

    if let Some(err) = state.error_message() {
        render_error(f, err);
    }

    // Drawn on top of everything
    if let Some(overlay) = &state.overlay {
        detail_overlay::render(f, overlay);
    }
}

fn render_error(f: &mut Frame, err: &str) {
    let area = f.area();
    if area.height <= 6 || area.width < 4 {
        return;
    }
    let err_area = Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(5),
        width: area.width.saturating_sub(2),
        height: 3,
    };
    let err_widget = Paragraph::new(err.to_owned())
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .title(" Error ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(err_widget, err_area);
}
