//! Markdown to styled terminal lines.
//!
//! GitHub-flavored input (tables, strikethrough, task lists). Soft line
//! breaks are kept as real line breaks, matching how chat replies are
//! written.

use pulldown_cmark::{Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const CODE_INDENT: &str = "  ";
const QUOTE_PREFIX: &str = "│ ";

pub fn to_lines(markdown: &str) -> Vec<Line<'static>> {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut writer = LineWriter::default();
    for event in Parser::new_ext(markdown, options) {
        writer.handle(event);
    }
    writer.finish()
}

fn heading_style(level: HeadingLevel) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => style.fg(Color::Cyan),
        _ => style.fg(Color::Yellow),
    }
}

fn code_style() -> Style {
    Style::default().fg(Color::LightYellow)
}

struct ListLevel {
    next_number: Option<u64>,
    marker_width: usize,
}

#[derive(Default)]
struct LineWriter {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    lists: Vec<ListLevel>,
    quote_depth: usize,
    in_code_block: bool,
    table_cell: usize,
    needs_blank: bool,
    // Targets to print after the link text, `None` for autolinks
    links: Vec<Option<String>>,
}

impl LineWriter {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    self.code_text(&text);
                } else {
                    // Multi-line text only shows up outside paragraphs
                    self.push_multiline(&text);
                }
            }
            Event::Code(code) => {
                let style = self.style().patch(code_style());
                self.push_span(Span::styled(code.into_string(), style));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.push_multiline(&html),
            Event::SoftBreak | Event::HardBreak => self.break_line(),
            Event::Rule => {
                self.begin_block();
                self.lines.push(Line::styled(
                    "─".repeat(24),
                    Style::default().fg(Color::DarkGray),
                ));
                self.needs_blank = true;
            }
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.lists.is_empty() {
                    self.begin_block();
                }
            }
            Tag::Heading { level, .. } => {
                self.begin_block();
                self.styles.push(heading_style(level));
            }
            Tag::BlockQuote(_) => {
                self.begin_block();
                self.quote_depth += 1;
                self.styles.push(
                    Style::default()
                        .fg(Color::Gray)
                        .add_modifier(Modifier::ITALIC),
                );
            }
            Tag::CodeBlock(_) => {
                self.begin_block();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.begin_block();
                } else {
                    self.flush_line();
                }
                self.lists.push(ListLevel {
                    next_number: start,
                    marker_width: 0,
                });
            }
            Tag::Item => {
                self.flush_line();
                self.start_item();
            }
            Tag::Table(_) | Tag::HtmlBlock => {
                self.begin_block();
            }
            Tag::TableHead => {
                self.table_cell = 0;
                self.styles.push(Style::default().add_modifier(Modifier::BOLD));
            }
            Tag::TableRow => {
                self.table_cell = 0;
            }
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.push_span(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
                }
                self.table_cell += 1;
            }
            Tag::Emphasis => self.styles.push(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.styles.push(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.styles.push(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                let target = match link_type {
                    LinkType::Autolink | LinkType::Email => None,
                    _ if dest_url.is_empty() => None,
                    _ => Some(dest_url.into_string()),
                };
                self.links.push(target);
                self.styles.push(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.lists.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.flush_line();
                self.needs_blank = true;
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.styles.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.needs_blank = true;
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.flush_line();
                self.needs_blank = true;
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::TableHead => {
                self.styles.pop();
                self.flush_line();
            }
            TagEnd::TableRow => self.flush_line(),
            TagEnd::Table | TagEnd::HtmlBlock => {
                self.flush_line();
                self.needs_blank = true;
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(Some(target)) = self.links.pop() {
                    self.push_span(Span::styled(
                        format!(" ({})", target),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        self.lines
    }

    fn style(&self) -> Style {
        self.styles
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    /// Separate the next block from the previous one with a blank line.
    fn begin_block(&mut self) {
        self.flush_line();
        if self.needs_blank && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.needs_blank = false;
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn break_line(&mut self) {
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn line_prefix(&mut self) {
        if self.quote_depth > 0 {
            self.current.push(Span::styled(
                QUOTE_PREFIX.repeat(self.quote_depth),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    fn start_item(&mut self) {
        self.line_prefix();
        let outer: usize = self
            .lists
            .iter()
            .rev()
            .skip(1)
            .map(|level| level.marker_width)
            .sum();
        let Some(level) = self.lists.last_mut() else {
            return;
        };
        let marker = match level.next_number.as_mut() {
            Some(n) => {
                let marker = format!("{}. ", n);
                *n += 1;
                marker
            }
            None => "• ".to_string(),
        };
        level.marker_width = marker.chars().count();
        if outer > 0 {
            self.current.push(Span::raw(" ".repeat(outer)));
        }
        self.current
            .push(Span::styled(marker, Style::default().fg(Color::Cyan)));
    }

    /// Indentation for wrapped-in-source lines of a list item or quote.
    fn continuation_prefix(&mut self) {
        self.line_prefix();
        let indent: usize = self.lists.iter().map(|level| level.marker_width).sum();
        if indent > 0 {
            self.current.push(Span::raw(" ".repeat(indent)));
        }
    }

    fn push_multiline(&mut self, text: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            self.push_text(part);
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let style = self.style();
        self.push_span(Span::styled(text.to_string(), style));
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current.is_empty() {
            self.continuation_prefix();
        }
        self.current.push(span);
    }

    fn code_text(&mut self, text: &str) {
        for line in text.lines() {
            self.line_prefix();
            self.current.push(Span::raw(CODE_INDENT));
            self.current
                .push(Span::styled(line.to_string(), code_style()));
            self.break_line();
        }
    }
}
