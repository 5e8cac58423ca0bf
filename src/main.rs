use anyhow::Result;
use hn_browser::config::{AppConfig, ConfigNotice};
use hn_browser::internal::ui::app::App;
use hn_browser::tui;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first to get logging settings
    let (config, notices) = AppConfig::load();

    // Logs must not reach stdout/stderr while the TUI owns the terminal, so they go to a
    // daily rotating file. If the terminal cannot be initialised, log to the console.
    match tui::init() {
        Ok(mut terminal) => {
            let log_dir = config.logging.log_directory.as_deref().unwrap_or("logs");
            let file_appender = tracing_appender::rolling::daily(log_dir, "hn-browser.log");
            let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

            // RUST_LOG takes precedence over the configured levels
            let env_filter = match std::env::var("RUST_LOG") {
                Ok(_) => tracing_subscriber::EnvFilter::from_default_env(),
                Err(_) => tracing_subscriber::EnvFilter::new(config.logging.filter_directive()),
            };

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact()
                .init();
            notices.iter().for_each(ConfigNotice::log);

            let res = match App::new(config) {
                Ok(mut app) => app.run(&mut terminal).await,
                Err(e) => Err(e),
            };

            // Restore terminal state before exiting so the console is usable again.
            tui::restore()?;

            // The error is printed once more on stderr by the returned Result.
            if let Err(err) = &res {
                tracing::error!("exiting with error: {err:?}");
            }
            res
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .init();
            notices.iter().for_each(ConfigNotice::log);

            tracing::error!("Failed to initialize TUI: {e:?}");
            eprintln!("Failed to initialize TUI: {e:?}");
            Err(e.into())
        }
    }
}
