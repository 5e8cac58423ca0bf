use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

/// Colour overrides read from `config.ron`. Values are anything [`parse_color`]
/// understands: names (`"red"`), ANSI indices (`"8"`) or hex (`"#aabbcc"`).
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    pub accent: Option<String>,
    pub muted: Option<String>,
    pub link: Option<String>,
    pub quote: Option<String>,
    pub border: Option<String>,
}

/// Styles used by the markup pipeline and the view. Passed explicitly; there are no
/// global style constants.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub title: Style,
    pub muted: Style,
    pub cursor: Style,
    pub italic: Style,
    pub link: Style,
    pub quote: Style,
    pub border: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        let pick = |value: &Option<String>, fallback: Color| {
            value.as_deref().map(parse_color).unwrap_or(fallback)
        };
        let accent = pick(&config.accent, Color::Magenta);
        let muted = pick(&config.muted, Color::DarkGray);
        let link = pick(&config.link, Color::Red);
        let quote = pick(&config.quote, Color::Green);
        let border = pick(&config.border, Color::Reset);

        Self {
            title: Style::default().add_modifier(Modifier::BOLD),
            muted: Style::default().fg(muted),
            cursor: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            italic: Style::default().add_modifier(Modifier::ITALIC),
            link: Style::default().fg(link).add_modifier(Modifier::ITALIC),
            quote: Style::default().fg(quote),
            border: Style::default().fg(border),
        }
    }
}

pub fn parse_color(value: &str) -> Color {
    if let Ok(c) = value.parse::<Color>() {
        return c;
    }

    let hex = value.trim_start_matches('#');
    match hex.len() {
        // 8-char hex carries alpha, which the terminal cannot use
        6 | 8 if hex.is_ascii() => {
            let channel =
                |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
            Color::Rgb(channel(0..2), channel(2..4), channel(4..6))
        }
        _ => {
            tracing::warn!(value, "unrecognised colour, using terminal default");
            Color::Reset
        }
    }
}
