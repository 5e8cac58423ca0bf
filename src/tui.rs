use std::io;

use ratatui::DefaultTerminal;

/// Terminal in raw mode on the alternate screen.
pub type Tui = DefaultTerminal;

/// Enter raw mode and the alternate screen. Also installs a panic hook that restores
/// the terminal before the panic message is printed.
pub fn init() -> io::Result<Tui> {
    ratatui::try_init()
}

pub fn restore() -> io::Result<()> {
    ratatui::try_restore()
}
