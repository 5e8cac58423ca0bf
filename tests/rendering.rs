use hn_browser::internal::models::{Item, TopMenu};
use hn_browser::internal::navigation::{Event, NavigationState, update};
use hn_browser::internal::ui::view::{compose, draw};
use hn_browser::utils::markup::{plain_text, render_markup};
use hn_browser::utils::theme::Theme;
use ratatui::{Terminal, backend::TestBackend};

const NOW: i64 = 1_700_000_000;

fn rendered(raw: &str) -> String {
    plain_text(&render_markup(raw, &Theme::default()))
}

fn screen_text(state: &NavigationState, width: u16, height: u16) -> String {
    let screen = compose(state, &Theme::default(), NOW);
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| draw(f, &screen)).unwrap();

    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn story(id: u32, score: u32, title: &str, url: Option<&str>) -> Item {
    Item {
        id,
        score: Some(score),
        title: Some(title.to_string()),
        url: url.map(str::to_string),
        by: Some("pg".to_string()),
        ..Default::default()
    }
}

fn ready(width: u16, height: u16) -> NavigationState {
    update(
        NavigationState::new(Some(3)),
        Event::Resized { width, height },
    )
    .0
}

#[test]
fn test_paragraph_example() {
    assert_eq!(rendered("Hello<p>world</p>"), "Hello\nworld");
}

#[test]
fn test_link_example() {
    let text = render_markup(
        "See <a href=\"https://example.com\">here</a>",
        &Theme::default(),
    );
    assert_eq!(plain_text(&text), "See here");
    assert_eq!(text.lines[0].spans[1].style, Theme::default().link);
}

#[test]
fn test_real_comment_markup() {
    let raw = "I&#x27;d argue otherwise.<p>&gt; It&#x27;s <i>always</i> DNS<p>Not when \
               <a href=\"https:&#x2F;&#x2F;example.com&#x2F;x\" rel=\"nofollow\">https:&#x2F;&#x2F;example.com&#x2F;x</a> \
               says so.";
    insta::assert_snapshot!(rendered(raw), @r"
    I'd argue otherwise.
    > It's always DNS
    Not when https://example.com/x says so.
    ");
}

#[test]
fn test_top_level_screen() {
    let state = update(
        ready(48, 7),
        Event::TopMenuLoaded(TopMenu::from_items([
            story(1, 512, "Show HN: A terminal reader", Some("https://github.com/a/b")),
            story(2, 7, "Ask HN: Why?", None),
            story(3, 64, "Rust 2024", Some("https://www.rust-lang.org/x")),
            story(4, 1, "Next page", None),
        ])),
    )
    .0;

    insta::assert_snapshot!(screen_text(&state, 48, 7), @r"
    Hacker News
    > 512  Show HN: A terminal reader (github.com)
      7    Ask HN: Why?
      64   Rust 2024 (rust-lang.org)


    Page 1 ─── q quit · ←/→ page · enter open · o br
    ");
}

#[test]
fn test_topic_screen() {
    let mut topic = story(1, 512, "Show HN: A terminal reader", Some("https://x.dev"));
    topic.kids = vec![2, 3];
    topic.children = vec![
        Item {
            id: 2,
            by: Some("alice".to_string()),
            text: Some("Nice <i>work</i>".to_string()),
            time: Some(NOW - 7_200),
            kids: vec![9],
            ..Default::default()
        },
        Item {
            id: 3,
            by: Some("bob".to_string()),
            text: Some("Thanks".to_string()),
            time: Some(NOW - 120),
            ..Default::default()
        },
    ];
    let state = update(ready(48, 12), Event::TopicLoaded(topic)).0;

    insta::assert_snapshot!(screen_text(&state, 48, 12), @r"
    Hacker News › pg
    Show HN: A terminal reader
    → https://x.dev

    > alice (1 replies) · 2h ago
        Nice work

      bob · 2m ago
        Thanks


    100% ─── q quit · enter replies · backspace back
    ");
}
