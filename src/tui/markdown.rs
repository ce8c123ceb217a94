use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};

/// Renders model-written markdown (headings, emphasis, lists, code) into
/// styled terminal text.
pub fn render_markdown(md: &str) -> Text<'static> {
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(md, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS) {
        renderer.handle(event);
    }
    renderer.finish()
}

struct Renderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    lists: Vec<Option<u64>>,
    pending_prefix: Option<String>,
    in_code_block: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![Style::default()],
            lists: Vec::new(),
            pending_prefix: None,
            in_code_block: false,
        }
    }
}

impl Renderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_text(&text, self.style()),
            Event::Code(code) => {
                let style = self.style().add_modifier(Modifier::REVERSED);
                self.push_span(Span::styled(code.to_string(), style));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html, self.style()),
            Event::SoftBreak if self.in_code_block => self.flush(),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(24),
                    Style::default().add_modifier(Modifier::DIM),
                )));
                self.blank();
            }
            Event::TaskListMarker(done) => {
                let marker = if done { "[x] " } else { "[ ] " };
                self.push_span(Span::styled(marker, self.style()));
            }
            Event::FootnoteReference(label) => {
                self.push_text(&format!("[^{label}]"), self.style());
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.push_text(&math, self.style().add_modifier(Modifier::ITALIC));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.styles.push(heading_style(level));
            }
            Tag::Strong => self.nest(|s| s.add_modifier(Modifier::BOLD)),
            Tag::Emphasis => self.nest(|s| s.add_modifier(Modifier::ITALIC)),
            Tag::Strikethrough => self.nest(|s| s.add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { .. } => self.nest(|s| s.add_modifier(Modifier::UNDERLINED)),
            Tag::BlockQuote(_) => self.nest(|s| s.add_modifier(Modifier::DIM)),
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
                self.styles.push(Style::default().add_modifier(Modifier::DIM));
            }
            Tag::List(start) => self.lists.push(start),
            Tag::Item => {
                self.flush();
                self.pending_prefix = Some(self.next_marker());
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading(_) => {
                self.flush();
                self.blank();
                self.unnest();
            }
            TagEnd::CodeBlock => {
                self.flush();
                self.blank();
                self.in_code_block = false;
                self.unnest();
            }
            TagEnd::Strong
            | TagEnd::Emphasis
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::BlockQuote(_) => self.unnest(),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => {
                self.flush();
                self.pending_prefix = None;
            }
            _ => {}
        }
    }

    fn next_marker(&mut self) -> String {
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        match self.lists.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{indent}{n}. ");
                *n += 1;
                marker
            }
            _ => format!("{indent}- "),
        }
    }

    fn push_text(&mut self, text: &str, style: Style) {
        if !self.in_code_block {
            self.push_span(Span::styled(text.to_string(), style));
            return;
        }
        for (idx, segment) in text.split('\n').enumerate() {
            if idx > 0 {
                self.flush();
            }
            if !segment.is_empty() {
                self.push_span(Span::styled(segment.to_string(), style));
            }
        }
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current.is_empty()
            && let Some(prefix) = self.pending_prefix.take()
        {
            self.current.push(Span::raw(prefix));
        }
        self.current.push(span);
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank(&mut self) {
        self.lines.push(Line::default());
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn nest(&mut self, f: impl FnOnce(Style) -> Style) {
        let style = f(self.style());
        self.styles.push(style);
    }

    fn unnest(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn finish(mut self) -> Text<'static> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        Text::from(self.lines)
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    if matches!(level, HeadingLevel::H1 | HeadingLevel::H2) {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}
