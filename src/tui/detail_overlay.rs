use crate::app::DetailOverlay;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

/// Centered box listing the selected column's versions, one labelled line
/// per field.
pub fn render(f: &mut Frame, overlay: &DetailOverlay) {
    let area = f.area();

    // +2 border +1 bottom hint
    let content_height = (overlay.lines.len().min(u16::MAX as usize - 3) as u16).saturating_add(3);
    let width = (area.width * 7 / 10).max(40).min(area.width);
    let height = content_height.max(5).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    f.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(format!(" {} ", overlay.title))
        .title_bottom(Line::from(" d/q/Esc/Enter close ").centered())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let inner_width = width.saturating_sub(2) as usize;
    let label_width = overlay
        .lines
        .iter()
        .map(|(l, _)| UnicodeWidthStr::width(l.as_str()))
        .max()
        .unwrap_or(0);
    let value_max = inner_width.saturating_sub(label_width + 2);

    let lines: Vec<Line> = overlay
        .lines
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(
                    format!("{label:>label_width$}  "),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(truncate_value(value, value_max), value_style(label)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), overlay_area);
}

fn value_style(label: &str) -> Style {
    match label {
        "link" | "build" => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        "author" => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::White),
    }
}

fn truncate_value(s: &str, max: usize) -> String {
    if UnicodeWidthStr::width(s) <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut result = String::new();
    let mut width = 0;
    for c in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + cw + 1 > max {
            break;
        }
        result.push(c);
        width += cw;
    }
    result.push('…');
    result
}
