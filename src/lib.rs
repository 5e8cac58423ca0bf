//! Terminal browser for the Hacker News front page and its comment threads.

pub mod api;
pub mod config;
pub mod internal;
pub mod tui;
pub mod utils;
