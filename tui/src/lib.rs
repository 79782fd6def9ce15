//! TUI rendering for Rota using ratatui.

mod input;
mod theme;

pub use input::{handle_event, map_event};
pub use theme::{Glyphs, Palette, glyphs, palette, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use rota_engine::{
    FilterView, InputKind, ListView, Roster, TextView, UiOptions, ViewBody, Workflow,
};

/// Main draw function
pub fn draw(frame: &mut Frame, workflow: &Workflow, options: UiOptions) {
    let palette = palette(options);
    let glyphs = glyphs(options);
    let view = workflow.view();

    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(3),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let (mode_label, mode_style, border_style) = match workflow.input_kind() {
        InputKind::List => (
            " LIST ",
            styles::mode_list(&palette),
            Style::default().fg(palette.primary),
        ),
        InputKind::Text => (
            " INPUT ",
            styles::mode_insert(&palette),
            Style::default().fg(palette.green),
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::horizontal(1))
        .title_top(Line::from(vec![
            Span::styled(mode_label, mode_style),
            Span::styled(format!(" {} ", view.title), styles::title(&palette)),
        ]));
    let body_area = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    match &view.body {
        ViewBody::List(list) => draw_list(frame, list, body_area, &palette, &glyphs),
        ViewBody::Text(text) => draw_text_entry(frame, text, body_area, &palette, &glyphs),
    }

    draw_status_bar(frame, workflow, chunks[1], &palette, &glyphs);

    if let Some(message) = &view.error {
        draw_error(frame, message, &palette);
    }
}

fn draw_list(frame: &mut Frame, list: &ListView, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let area = match &list.filter {
        Some(filter) if area.height > 1 => {
            draw_filter(frame, filter, area, palette);
            Rect {
                y: area.y + 1,
                height: area.height - 1,
                ..area
            }
        }
        _ => area,
    };

    if list.rows.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            list.empty_message,
            Style::default().fg(palette.text_muted),
        )))
        .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    // Two lines per row: name, then its dates.
    let visible_rows = (area.height as usize / 2).max(1);
    let offset = (list.selected + 1).saturating_sub(visible_rows);
    let content_width = area.width as usize;

    let mut lines: Vec<Line> = Vec::new();
    for (i, row) in list.rows.iter().enumerate().skip(offset).take(visible_rows) {
        let selected = i == list.selected;
        let prefix = if selected { glyphs.selected } else { " " };
        let marker = if row.muted {
            format!(" {}", glyphs.hidden)
        } else {
            String::new()
        };
        let primary = format!("{prefix} {}{marker}", row.primary);
        let secondary = format!("    {}", row.secondary);

        let mut primary_style = if selected {
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD)
        } else if row.muted {
            Style::default().fg(palette.text_muted)
        } else {
            Style::default().fg(palette.text_secondary)
        };
        let mut secondary_style = Style::default().fg(palette.text_muted);
        let mut filler_style = Style::default();
        if selected {
            primary_style = primary_style.bg(palette.bg_highlight);
            secondary_style = secondary_style.bg(palette.bg_highlight);
            filler_style = filler_style.bg(palette.bg_highlight);
        }

        for (text, style) in [(primary, primary_style), (secondary, secondary_style)] {
            let filler = content_width.saturating_sub(text.width());
            let mut spans = vec![Span::styled(text, style)];
            if filler > 0 {
                spans.push(Span::styled(" ".repeat(filler), filler_style));
            }
            lines.push(Line::from(spans));
        }
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_filter(frame: &mut Frame, filter: &FilterView, area: Rect, palette: &Palette) {
    const LABEL: &str = "Filter: ";

    let label_style = if filter.editing {
        Style::default().fg(palette.primary)
    } else {
        Style::default().fg(palette.text_muted)
    };
    let line = Line::from(vec![
        Span::styled(LABEL, label_style),
        Span::styled(
            filter.text.clone(),
            Style::default().fg(palette.text_primary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), Rect { height: 1, ..area });

    if filter.editing {
        let byte_index = filter
            .text
            .grapheme_indices(true)
            .nth(filter.cursor)
            .map_or(filter.text.len(), |(i, _)| i);
        let offset = LABEL.width() + filter.text[..byte_index].width();
        let cursor_x = area
            .x
            .saturating_add(offset as u16)
            .min(area.right().saturating_sub(1));
        frame.set_cursor_position((cursor_x, area.y));
    }
}

fn draw_text_entry(
    frame: &mut Frame,
    text: &TextView,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let prefix = format!("{} ", glyphs.prompt);
    let prefix_width = prefix.width() as u16;
    let content_width = area.width.saturating_sub(prefix_width).max(1) as usize;

    let byte_index = text
        .text
        .grapheme_indices(true)
        .nth(text.cursor)
        .map_or(text.text.len(), |(i, _)| i);
    let cursor_display_pos = text.text[..byte_index].width();

    let (display_text, horizontal_scroll) = if cursor_display_pos >= content_width {
        let scroll_target = cursor_display_pos - content_width + 1;
        let mut byte_offset = 0;
        let mut skipped_width = 0;
        for (idx, grapheme) in text.text.grapheme_indices(true) {
            if skipped_width >= scroll_target {
                byte_offset = idx;
                break;
            }
            skipped_width += grapheme.width();
        }
        (text.text[byte_offset..].to_string(), skipped_width)
    } else {
        (text.text.clone(), 0)
    };

    let input_span = if text.text.is_empty() {
        Span::styled(text.placeholder, Style::default().fg(palette.text_muted))
    } else {
        Span::styled(display_text, Style::default().fg(palette.text_primary))
    };

    let lines = vec![
        Line::from(Span::styled(
            text.prompt.clone(),
            Style::default().fg(palette.text_secondary),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(prefix, Style::default().fg(palette.primary)),
            input_span,
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);

    if area.height >= 3 {
        let cursor_x = area
            .x
            .saturating_add(prefix_width)
            .saturating_add(cursor_display_pos.saturating_sub(horizontal_scroll) as u16);
        frame.set_cursor_position((cursor_x, area.y.saturating_add(2)));
    }
}

fn key_hints(workflow: &Workflow, palette: &Palette, glyphs: &Glyphs) -> Vec<Span<'static>> {
    let pairs: Vec<(&str, &str)> = if workflow.error().is_some() {
        vec![("any key", " dismiss  "), ("Ctrl+C", " quit")]
    } else {
        match (workflow.input_kind(), workflow.roster()) {
            (InputKind::List, Some(Roster::Eligible)) => vec![
                (glyphs.arrows, " move  "),
                ("Enter", " select  "),
                ("a", " add  "),
                ("h", " hide  "),
                ("H", " hidden  "),
                ("/", " filter  "),
                ("q", " quit"),
            ],
            (InputKind::List, Some(Roster::Hidden)) => vec![
                (glyphs.arrows, " move  "),
                ("h", " unhide  "),
                ("/", " filter  "),
                ("Esc", " back  "),
                ("q", " quit"),
            ],
            (InputKind::Text, Some(_)) => vec![
                ("Enter", " apply  "),
                ("Esc", " clear  "),
                ("Ctrl+C", " quit"),
            ],
            (InputKind::List, None) => vec![
                (glyphs.arrows, " move  "),
                ("Enter", " select  "),
                ("Esc", " back  "),
                ("q", " quit"),
            ],
            (InputKind::Text, _) => vec![
                ("Enter", " confirm  "),
                ("Esc", " cancel  "),
                ("Ctrl+C", " quit"),
            ],
        }
    };

    pairs
        .into_iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(key.to_string(), styles::key_highlight(palette)),
                Span::styled(label.to_string(), styles::key_hint(palette)),
            ]
        })
        .collect()
}

fn draw_status_bar(
    frame: &mut Frame,
    workflow: &Workflow,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mut spans = vec![
        Span::raw(" "),
        Span::styled("Rota", Style::default().fg(palette.primary)),
        Span::styled(
            format!(" {} ", glyphs.separator),
            Style::default().fg(palette.primary_dim),
        ),
    ];
    spans.extend(key_hints(workflow, palette, glyphs));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_error(frame: &mut Frame, message: &str, palette: &Palette) {
    let area = frame.area();
    let width = 60.min(area.width.saturating_sub(4)).max(20);
    let content_width = width.saturating_sub(4).max(1);

    let text = format!("Error: {message}");
    let text_rows = (text.width() as u16).div_ceil(content_width).max(1);
    let height = text_rows.saturating_add(6).min(area.height);

    let popup = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height,
    };

    let lines = vec![
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            styles::key_hint(palette),
        ))
        .alignment(Alignment::Center),
    ];

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.error))
        .style(Style::default().bg(palette.bg_panel))
        .padding(Padding::uniform(1))
        .title(Line::from(Span::styled(" Error ", styles::title(palette))));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}
