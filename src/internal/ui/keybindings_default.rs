use crate::internal::navigation::Action;
use crate::internal::ui::keybindings::{KeyBindingContext, KeyBindingMap};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Create default keybindings for the application
pub fn create_default_keybindings() -> KeyBindingMap {
    let mut map = KeyBindingMap::new();

    add_global_bindings(&mut map);
    add_top_level_bindings(&mut map);
    add_topic_bindings(&mut map);

    map
}

fn add_global_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::Global;

    // Quit
    map.add_binding(ctx, key('q'), Action::Quit);
    map.add_binding(ctx, ctrl('c'), Action::Quit);

    // Cursor
    map.add_binding(ctx, key('k'), Action::CursorUp);
    map.add_binding(ctx, key('j'), Action::CursorDown);
    map.add_binding(ctx, key_code(KeyCode::Up), Action::CursorUp);
    map.add_binding(ctx, key_code(KeyCode::Down), Action::CursorDown);

    // Pages
    map.add_binding(ctx, key('h'), Action::PagePrev);
    map.add_binding(ctx, key('l'), Action::PageNext);
    map.add_binding(ctx, key_code(KeyCode::Left), Action::PagePrev);
    map.add_binding(ctx, key_code(KeyCode::Right), Action::PageNext);

    // Selection
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::Select);
    map.add_binding(ctx, key(' '), Action::Select);
    map.add_binding(ctx, key_code(KeyCode::Backspace), Action::Back);

    map.add_binding(ctx, key('r'), Action::Refresh);
    map.add_binding(ctx, key('o'), Action::OpenBrowser);
}

fn add_top_level_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::TopLevel;

    map.add_binding(ctx, key_code(KeyCode::PageDown), Action::PageNext);
    map.add_binding(ctx, key_code(KeyCode::PageUp), Action::PagePrev);
}

fn add_topic_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::Topic;

    map.add_binding(ctx, key_code(KeyCode::Esc), Action::Back);

    // Free scrolling through long topics and replies
    map.add_binding(ctx, key_code(KeyCode::PageDown), Action::ScrollPageDown);
    map.add_binding(ctx, key_code(KeyCode::PageUp), Action::ScrollPageUp);
    map.add_binding(ctx, ctrl('e'), Action::ScrollDown);
    map.add_binding(ctx, ctrl('y'), Action::ScrollUp);
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty())
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}
