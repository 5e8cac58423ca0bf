use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::internal::models::{Item, MenuEntry};
use crate::internal::navigation::{BodyLayout, NavigationState};
use crate::utils::datetime::format_age;
use crate::utils::markup::render_markup;
use crate::utils::theme::Theme;
use crate::utils::url::extract_domain;

/// Header and footer take one row each.
const BAR_ROWS: u16 = 2;

const TOP_LEVEL_HINT: &str = "q quit · ←/→ page · enter open · o browser · r refresh";
const TOPIC_HINT: &str =
    "q quit · enter replies · backspace back · pgup/pgdn scroll · o browser";

/// Everything needed to paint one frame, derived from the navigation state alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub header: Line<'static>,
    pub body: Text<'static>,
    pub footer: Line<'static>,
    /// First body row shown.
    pub offset: u16,
    /// Fed back to the reducer so cursor moves and scrolling know the row geometry.
    pub layout: BodyLayout,
}

/// Build the frame for `state`. `now` (unix seconds) drives the comment ages.
pub fn compose(state: &NavigationState, theme: &Theme, now: i64) -> Screen {
    let header = header_line(state, theme);
    if !state.ready {
        return Screen {
            header,
            body: Text::from("  Initializing…"),
            footer: Line::default(),
            offset: 0,
            layout: BodyLayout::default(),
        };
    }

    let width = state.width;
    let viewport = usize::from(state.height.saturating_sub(BAR_ROWS));

    let mut lines = match state.current_topic() {
        Some(topic) => topic_block(topic, theme),
        None => Vec::new(),
    };
    let mut rows = wrapped_rows(&lines, width);

    let choices: Vec<Vec<Line<'static>>> = match state.current_topic() {
        Some(topic) => topic
            .children
            .iter()
            .map(|comment| comment_choice(comment, theme, now))
            .collect(),
        None => state
            .page_entries()
            .iter()
            .map(|entry| story_choice(entry, theme))
            .collect(),
    };

    let mut choice_rows = Vec::with_capacity(choices.len());
    for (index, choice) in choices.into_iter().enumerate() {
        let choice = with_marker(choice, index == state.cursor, theme);
        let height = wrapped_rows(&choice, width);
        choice_rows.push(rows..rows + height);
        rows += height;
        lines.extend(choice);
    }

    let layout = BodyLayout {
        choices: choice_rows,
        rows,
        viewport,
    };
    let offset = state.scroll.min(layout.max_offset());
    let position = match state.is_top_level() {
        true => format!("Page {}", state.current_page),
        false => format!("{:>3}%", scroll_percent(offset, rows, viewport)),
    };

    Screen {
        header,
        body: Text::from(lines),
        footer: footer_line(state, theme, position),
        offset: u16::try_from(offset).unwrap_or(u16::MAX),
        layout,
    }
}

#[tracing::instrument(level = "trace", skip_all)]
pub fn draw(frame: &mut Frame, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(Paragraph::new(screen.header.clone()), chunks[0]);
    frame.render_widget(
        Paragraph::new(screen.body.clone())
            .wrap(Wrap { trim: false })
            .scroll((screen.offset, 0)),
        chunks[1],
    );
    frame.render_widget(Paragraph::new(screen.footer.clone()), chunks[2]);
}

fn header_line(state: &NavigationState, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled("Hacker News", theme.title)];
    for topic in &state.history {
        spans.push(Span::styled(" › ", theme.muted));
        spans.push(Span::raw(display_author(topic).to_string()));
    }
    Line::from(spans)
}

fn footer_line(state: &NavigationState, theme: &Theme, position: String) -> Line<'static> {
    let mut spans = Vec::new();
    if state.loading {
        spans.push(Span::styled("Loading… ", theme.cursor));
    }
    let hint = match state.is_top_level() {
        true => TOP_LEVEL_HINT,
        false => TOPIC_HINT,
    };
    spans.push(Span::styled(position, theme.title));
    spans.push(Span::styled(" ─── ", theme.border));
    spans.push(Span::styled(hint, theme.muted));
    Line::from(spans)
}

/// Title, text and link of the topic being read, followed by a blank line.
fn topic_block(topic: &Item, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if !topic.title_or_empty().is_empty() {
        lines.push(Line::styled(topic.title_or_empty().to_string(), theme.title));
    }
    lines.extend(render_markup(topic.raw_text(), theme).lines);
    if let Some(url) = topic.link() {
        lines.push(Line::from(vec![
            Span::raw("→ "),
            Span::styled(url.to_string(), theme.link),
        ]));
    }
    lines.push(Line::default());
    lines
}

fn story_choice(entry: &MenuEntry, theme: &Theme) -> Vec<Line<'static>> {
    let Some(story) = entry.item() else {
        return vec![Line::styled("…", theme.muted)];
    };

    let score = story.score.unwrap_or(0).to_string();
    let mut spans = vec![
        Span::styled(format!("{score:<4}"), theme.muted),
        Span::raw(" "),
        Span::raw(story.title_or_empty().to_string()),
    ];
    if let Some(domain) = story.link().and_then(extract_domain) {
        spans.push(Span::styled(format!(" ({domain})"), theme.muted));
    }
    vec![Line::from(spans)]
}

fn comment_choice(comment: &Item, theme: &Theme, now: i64) -> Vec<Line<'static>> {
    let mut meta = display_author(comment).to_string();
    if !comment.kids.is_empty() {
        meta.push_str(&format!(" ({} replies)", comment.kids.len()));
    }
    if let Some(time) = comment.time {
        meta.push_str(&format!(" · {}", format_age(time, now)));
    }

    let mut lines = vec![Line::styled(meta, theme.muted)];
    lines.extend(
        render_markup(comment.raw_text(), theme)
            .lines
            .into_iter()
            .map(|line| {
                let mut spans = vec![Span::raw("    ")];
                spans.extend(line.spans);
                Line::from(spans).style(line.style)
            }),
    );
    lines.push(Line::default());
    lines
}

fn display_author(item: &Item) -> &str {
    match item.author() {
        "" => "unknown",
        author => author,
    }
}

/// Prefix the first line of a choice with the cursor marker.
fn with_marker(
    mut choice: Vec<Line<'static>>,
    selected: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let marker = match selected {
        true => Span::styled("> ", theme.cursor),
        false => Span::raw("  "),
    };
    if let Some(first) = choice.first_mut() {
        first.spans.insert(0, marker);
    }
    choice
}

/// Terminal rows taken by `lines` once wrapped to `width`.
fn wrapped_rows(lines: &[Line<'static>], width: u16) -> usize {
    if width == 0 {
        return lines.len();
    }
    Paragraph::new(lines.to_vec())
        .wrap(Wrap { trim: false })
        .line_count(width)
}

fn scroll_percent(offset: usize, total: usize, viewport: usize) -> usize {
    match total.saturating_sub(viewport) {
        0 => 100,
        scrollable => (offset.min(scrollable) * 100) / scrollable,
    }
}
