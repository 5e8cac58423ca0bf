//! Turns the HTML subset used in item `text` fields into styled terminal lines.
//!
//! Paragraph tags become line breaks, `<i>`/`<em>` become italic, `<a>` keeps only its
//! visible text in link style, and any line starting with `>` is styled as a quote.
//! Entities are decoded by the parser inside text nodes, so `&lt;T&gt;` stays a
//! literal `<T>` rather than turning into a tag.

use once_cell::sync::Lazy;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::utils::theme::Theme;

static PARAGRAPH_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?p(\s[^>]*)?>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Plain,
    Italic,
    Link,
}

type Run = (String, Emphasis);

/// Render raw item markup with the given theme.
pub fn render_markup(raw: &str, theme: &Theme) -> Text<'static> {
    if raw.is_empty() {
        return Text::default();
    }

    let source = PARAGRAPH_TAG.replace_all(raw, "\n");
    let fragment = Html::parse_fragment(&source);

    let mut runs = Vec::new();
    collect_runs(fragment.root_element(), Emphasis::Plain, &mut runs);

    let lines: Vec<Line<'static>> = split_lines(runs)
        .into_iter()
        .map(|line| style_line(line, theme))
        .collect();
    Text::from(lines)
}

/// The visible characters of `text`, one `\n` between lines.
pub fn plain_text(text: &Text<'_>) -> String {
    text.lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_runs(element: ElementRef<'_>, emphasis: Emphasis, runs: &mut Vec<Run>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let nested = match (emphasis, child_element.value().name()) {
                (Emphasis::Link, _) | (_, "a") => Emphasis::Link,
                (_, "i") | (_, "em") => Emphasis::Italic,
                (current, _) => current,
            };
            collect_runs(child_element, nested, runs);
        } else if let Node::Text(text) = child.value() {
            push_run(runs, text, emphasis);
        }
    }
}

fn push_run(runs: &mut Vec<Run>, content: &str, emphasis: Emphasis) {
    if content.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some((last, last_emphasis)) if *last_emphasis == emphasis => last.push_str(content),
        _ => runs.push((content.to_string(), emphasis)),
    }
}

/// Break runs at `\n`. A trailing newline does not open an extra empty line.
fn split_lines(runs: Vec<Run>) -> Vec<Vec<Run>> {
    let mut lines: Vec<Vec<Run>> = vec![Vec::new()];
    for (content, emphasis) in runs {
        let mut pieces = content.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            let ends_line = pieces.peek().is_some();
            let piece = if ends_line {
                piece.strip_suffix('\r').unwrap_or(piece)
            } else {
                piece
            };
            if let Some(current) = lines.last_mut()
                && !piece.is_empty()
            {
                current.push((piece.to_string(), emphasis));
            }
            if ends_line {
                lines.push(Vec::new());
            }
        }
    }

    if lines.len() > 1 && lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
}

fn style_line(runs: Vec<Run>, theme: &Theme) -> Line<'static> {
    let plain: String = runs.iter().map(|(content, _)| content.as_str()).collect();
    let is_quote = plain.trim().starts_with('>');

    let spans: Vec<Span<'static>> = runs
        .into_iter()
        .map(|(content, emphasis)| {
            let style = match emphasis {
                Emphasis::Plain => Style::default(),
                Emphasis::Italic => theme.italic,
                Emphasis::Link => theme.link,
            };
            let style = match is_quote {
                true => theme.quote.patch(style),
                false => style,
            };
            Span::styled(content, style)
        })
        .collect();
    Line::from(spans)
}
