use crate::aggregate::SummaryStatus;
use crate::app::AppState;
use crate::model::TaskStatus;
use crate::projector::{CellMode, Grid, GridRow, RenderModel, VersionHeader};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

pub const LABEL_WIDTH: usize = 22;
pub const COLUMN_WIDTH: usize = 18;
/// Lines taken by the version header band, separator included.
const HEADER_BAND_HEIGHT: usize = 5;
const TASK_BOX: &str = "■";

pub fn render(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(model) = state.project() else {
        let msg = if state.is_loading {
            "Loading waterfall..."
        } else {
            "No page loaded"
        };
        f.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    };

    let grid = match &model {
        RenderModel::Empty { message } => {
            f.render_widget(
                Paragraph::new(*message).style(Style::default().fg(Color::DarkGray)),
                area,
            );
            return;
        }
        RenderModel::Grid(grid) => grid,
    };

    let width = area.width as usize;
    let visible_columns = (width.saturating_sub(LABEL_WIDTH) / COLUMN_WIDTH).max(1);
    let first_column = window_start(state.column, visible_columns);
    let columns = first_column..(first_column + visible_columns).min(grid.headers.len());

    let mut lines = header_band(grid, columns.clone(), state.column);

    let visible_height = (area.height as usize).saturating_sub(HEADER_BAND_HEIGHT);
    let first_row = window_start(state.cursor, visible_height.max(1));
    for (i, row) in grid
        .rows
        .iter()
        .enumerate()
        .skip(first_row)
        .take(visible_height)
    {
        lines.push(row_line(grid, row, columns.clone(), i == state.cursor, state.column));
    }

    f.render_widget(Paragraph::new(lines), area);
}

/// First index of a window of `size` items that keeps `selected` in view.
pub fn window_start(selected: usize, size: usize) -> usize {
    if size == 0 || selected < size {
        0
    } else {
        selected + 1 - size
    }
}

fn header_band(grid: &Grid<'_>, columns: std::ops::Range<usize>, selected: usize) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut titles = vec![Span::raw(fit("", LABEL_WIDTH))];
    let mut authors = vec![Span::raw(fit("", LABEL_WIDTH))];
    let mut details = vec![Span::raw(fit("", LABEL_WIDTH))];

    for idx in columns {
        let Some(header) = grid.headers.get(idx) else {
            continue;
        };
        let mut title_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        if idx == selected {
            title_style = title_style.add_modifier(Modifier::REVERSED);
        }
        match header {
            VersionHeader::Active(h) => {
                titles.push(Span::styled(fit(&h.short_hash, COLUMN_WIDTH), title_style));
                authors.push(Span::styled(fit(h.author, COLUMN_WIDTH), Style::default().fg(Color::White)));
                details.push(Span::styled(fit(&h.time, COLUMN_WIDTH), dim));
            }
            VersionHeader::RolledUp(h) => {
                titles.push(Span::styled(fit(&h.label, COLUMN_WIDTH), title_style.fg(Color::DarkGray)));
                authors.push(Span::styled(fit("d for details", COLUMN_WIDTH), dim));
                details.push(Span::raw(fit("", COLUMN_WIDTH)));
            }
        }
    }

    let rule = "─".repeat(LABEL_WIDTH + COLUMN_WIDTH * titles.len().saturating_sub(1));
    vec![
        Line::from(titles),
        Line::from(authors),
        Line::from(details),
        message_line(grid.headers.get(selected)),
        Line::from(Span::styled(rule, dim)),
    ]
}

/// Commit message of the selected column, with its more/less marker.
fn message_line(header: Option<&VersionHeader<'_>>) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![Span::styled(fit("message", LABEL_WIDTH), dim)];
    match header {
        Some(VersionHeader::Active(h)) => {
            spans.push(Span::styled(h.message.text.clone(), Style::default().fg(Color::White)));
            if let Some(toggle) = h.message.toggle {
                spans.push(Span::styled(format!(" [{}]", toggle.label()), dim));
            }
        }
        Some(VersionHeader::RolledUp(_)) => spans.push(Span::styled("d for details", dim)),
        None => {}
    }
    Line::from(spans)
}

fn row_line(
    grid: &Grid<'_>,
    row: &GridRow<'_>,
    columns: std::ops::Range<usize>,
    is_selected: bool,
    selected_column: usize,
) -> Line<'static> {
    let mut label_style = Style::default().fg(Color::White);
    if is_selected {
        label_style = label_style.add_modifier(Modifier::REVERSED);
    }
    let mut spans = vec![Span::styled(
        fit(&row.variant.display_name, LABEL_WIDTH - 1) + " ",
        label_style,
    )];

    for idx in columns {
        let version_id = grid.headers.get(idx).map_or("", VersionHeader::column_key);
        let mut cell = match row.cells.iter().find(|c| c.version_id == version_id) {
            Some(c) => cell_spans(&c.mode, COLUMN_WIDTH - 1),
            None => cell_spans(&CellMode::Missing, COLUMN_WIDTH - 1),
        };
        if is_selected && idx == selected_column {
            for span in &mut cell {
                span.style = span.style.add_modifier(Modifier::UNDERLINED);
            }
        }
        spans.extend(cell);
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Spans for one cell, padded or cut to exactly `width` columns.
pub fn cell_spans(mode: &CellMode<'_>, width: usize) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    match mode {
        CellMode::Inactive => {
            spans.push(Span::styled("inactive build", Style::default().fg(Color::DarkGray)));
        }
        CellMode::Missing => {}
        CellMode::CollapsedSummary { summary, .. } | CellMode::CollapsedWithActive { summary, .. } => {
            for chip in summary {
                spans.push(Span::styled(
                    format!("{}", chip.count),
                    Style::default()
                        .fg(Color::Black)
                        .bg(summary_color(chip.status)),
                ));
                spans.push(Span::raw(" "));
            }
        }
        CellMode::Expanded { .. } => {}
    }
    for task in mode.listed_tasks() {
        spans.push(Span::styled(TASK_BOX, Style::default().fg(status_color(&task.status))));
    }
    fit_spans(spans, width)
}

fn fit_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Span<'static>> {
    let mut out: Vec<Span<'static>> = Vec::with_capacity(spans.len() + 1);
    let mut used = 0;
    for span in spans {
        let w = UnicodeWidthStr::width(span.content.as_ref());
        if used + w > width {
            while used >= width {
                let Some(last) = out.pop() else {
                    break;
                };
                used -= UnicodeWidthStr::width(last.content.as_ref());
            }
            if used < width {
                out.push(Span::styled("…", Style::default().fg(Color::DarkGray)));
                used += 1;
            }
            break;
        }
        used += w;
        out.push(span);
    }
    if used < width {
        out.push(Span::raw(" ".repeat(width - used)));
    }
    out
}

pub fn status_color(status: &TaskStatus) -> Color {
    match status {
        TaskStatus::Success => Color::Green,
        TaskStatus::Failed => Color::Red,
        TaskStatus::SystemFailed => Color::Magenta,
        TaskStatus::Started | TaskStatus::Dispatched => Color::Yellow,
        TaskStatus::Undispatched => Color::DarkGray,
        TaskStatus::Inactive => Color::Gray,
        TaskStatus::Other(_) => Color::White,
    }
}

pub fn summary_color(status: SummaryStatus) -> Color {
    match status {
        SummaryStatus::Success => Color::Green,
        SummaryStatus::Failed => Color::Red,
        SummaryStatus::SystemFailed => Color::Magenta,
        SummaryStatus::Dispatched => Color::Yellow,
        SummaryStatus::Undispatched => Color::DarkGray,
        SummaryStatus::Inactive => Color::Gray,
    }
}

/// Pads or truncates `s` to exactly `width` display columns.
fn fit(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w <= width {
        return format!("{s}{}", " ".repeat(width - w));
    }
    if width == 0 {
        return String::new();
    }
    let mut result = String::new();
    let mut used = 0;
    for c in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + cw + 1 > width {
            break;
        }
        result.push(c);
        used += cw;
    }
    result.push('…');
    used += 1;
    result.push_str(&" ".repeat(width.saturating_sub(used)));
    result
}
