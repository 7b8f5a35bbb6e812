use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::render;

/// Rows `paragraph` occupies when wrapped to `width` columns.
///
/// Must be measured on the paragraph before a block is attached.
fn wrapped_rows(paragraph: &Paragraph<'_>, width: u16) -> u16 {
    u16::try_from(paragraph.line_count(width)).unwrap_or(u16::MAX)
}

/// The part of `text` that fits in `width` columns with the cursor (a char
/// index) in view, and the cursor's column inside that window.
fn input_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    let widths: Vec<usize> = text
        .chars()
        .map(|c| c.width().unwrap_or(0))
        .collect();
    let cursor = cursor.min(widths.len());
    let mut cursor_col: usize = widths[..cursor].iter().sum();

    // Drop chars off the left until the cursor cell fits
    let mut skip = 0;
    while cursor_col >= width && skip < cursor {
        cursor_col -= widths[skip];
        skip += 1;
    }

    let mut used = 0;
    let visible = text
        .chars()
        .zip(&widths)
        .skip(skip)
        .take_while(|(_, w)| {
            used += **w;
            used <= width
        })
        .map(|(c, _)| c)
        .collect();
    (visible, cursor_col)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = if app.session.is_busy() {
        Span::styled(" waiting for reply ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("")
    };

    let title = Line::from(vec![
        Span::styled(" 每日新聞快訊 ", Style::default().fg(Color::Cyan).bold()),
        status,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let border_color = if app.session.input_focused() {
        Color::DarkGray
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Chat ");

    let chat = Paragraph::new(Text::from(render::transcript_lines(&app.session)))
        .wrap(Wrap { trim: false });
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    app.update_chat_rows(wrapped_rows(&chat, inner_width), inner_height);

    let chat = chat.block(block).scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);

    if app.chat_rows > inner_height {
        let mut scrollbar_state = ScrollbarState::new(usize::from(app.chat_rows - inner_height))
            .position(usize::from(app.chat_scroll));
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let session = &app.session;
    let (border_color, title) = if !session.send_enabled() {
        (Color::DarkGray, " Waiting for reply... ")
    } else if session.input_focused() {
        (Color::Yellow, " Message (Enter to send) ")
    } else {
        (Color::DarkGray, " Message (i to type) ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = usize::from(area.width.saturating_sub(2));
    let (visible_text, cursor_col) =
        input_window(session.input.text(), session.input.cursor(), inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if session.input_focused() {
        let cursor_x = u16::try_from(cursor_col).unwrap_or(u16::MAX);
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, mode_style) = if app.session.input_focused() {
        (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" VIEW ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let hints = if app.session.input_focused() {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" view ", label_style),
            Span::styled(" Ctrl+C ", key_style),
            Span::styled(" quit ", label_style),
        ]
    } else {
        vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" g/G ", key_style),
            Span::styled(" top/bottom ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]
    };
    spans.extend(hints);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
