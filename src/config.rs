use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::HN_API_BASE_URL;
use crate::internal::navigation::Action;
use crate::utils::theme::ThemeConfig;

/// Environment variable selecting an alternate API host.
pub const HOST_ENV_VAR: &str = "HN_HOST";

const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for `topstories.json` and `item/{id}.json`.
    pub api_base_url: String,
    /// Deadline for each individual API request.
    pub request_timeout_secs: u64,
    /// Accepted comments fetched per topic.
    pub max_comments: usize,
    /// Fixed stories per page. Derived from the terminal height when unset.
    pub page_size: Option<usize>,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
    pub keybindings: Option<KeyBindingConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: HN_API_BASE_URL.to_string(),
            request_timeout_secs: 5,
            max_comments: 10,
            page_size: None,
            logging: LoggingConfig::default(),
            theme: ThemeConfig::default(),
            keybindings: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the rolling log file; `logs` when unset.
    pub log_directory: Option<String>,
    /// Per-target overrides, e.g. `{"hn_browser::api": "debug"}`.
    pub module_levels: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_directory: None,
            module_levels: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive string: the base level followed by module overrides.
    pub fn filter_directive(&self) -> String {
        let mut filter = self.level.clone();
        for (module, level) in &self.module_levels {
            filter.push_str(&format!(",{}={}", module, level));
        }
        filter
    }
}

/// Extra key bindings per context, keyed by strings such as `"x"`, `"Ctrl+R"` or `"PageDown"`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct KeyBindingConfig {
    pub global: HashMap<String, Action>,
    pub top_level: HashMap<String, Action>,
    pub topic: HashMap<String, Action>,
}

/// Something that happened while loading the configuration. Collected during
/// [`AppConfig::load`] and logged by the caller once a subscriber is installed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNotice {
    Loaded(PathBuf),
    ParseFailed { path: PathBuf, error: String },
    Defaults,
    HostOverride(String),
}

impl ConfigNotice {
    pub fn log(&self) {
        match self {
            Self::Loaded(path) => tracing::info!("Loaded config from {}", path.display()),
            Self::ParseFailed { path, error } => {
                tracing::error!("Failed to parse config at {}: {}", path.display(), error)
            }
            Self::Defaults => tracing::info!("No config file found, using defaults"),
            Self::HostOverride(host) => {
                tracing::info!(%host, "using API host from {}", HOST_ENV_VAR)
            }
        }
    }
}

impl AppConfig {
    /// Load `config.ron` from the working directory, next to the executable or the user
    /// config directory (first hit wins), then apply the `HN_HOST` override.
    pub fn load() -> (Self, Vec<ConfigNotice>) {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE)];

        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            candidates.push(dir.join(CONFIG_FILE));
        }

        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("hn-browser").join(CONFIG_FILE));
        }

        let (config, mut notices) = Self::load_from(&candidates);
        let host = std::env::var(HOST_ENV_VAR)
            .ok()
            .filter(|h| !h.trim().is_empty());
        if let Some(host) = &host {
            notices.push(ConfigNotice::HostOverride(host.clone()));
        }
        (config.with_host_override(host), notices)
    }

    fn load_from(candidates: &[PathBuf]) -> (Self, Vec<ConfigNotice>) {
        let mut notices = Vec::new();
        for path in candidates {
            if path.exists()
                && let Ok(content) = fs::read_to_string(path)
            {
                match Self::from_ron(&content) {
                    Ok(config) => {
                        notices.push(ConfigNotice::Loaded(path.clone()));
                        return (config, notices);
                    }
                    Err(e) => notices.push(ConfigNotice::ParseFailed {
                        path: path.clone(),
                        error: e.to_string(),
                    }),
                }
            }
        }
        notices.push(ConfigNotice::Defaults);
        (Self::default(), notices)
    }

    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    /// Replace the API base URL when `host` is set and non-blank.
    pub fn with_host_override(mut self, host: Option<String>) -> Self {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            self.api_base_url = host;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_api() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, HN_API_BASE_URL);
        assert_eq!(config.max_comments, 10);
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.page_size, None);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = AppConfig::from_ron(
            r#"(
    // smaller topics
    max_comments: 4,
    logging: (level: "debug"),
)"#,
        )
        .unwrap();
        assert_eq!(config.max_comments, 4);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.log_directory, None);
        assert_eq!(config.api_base_url, HN_API_BASE_URL);
    }

    #[test]
    fn keybindings_parse_from_ron() {
        let config = AppConfig::from_ron(
            r#"(
    keybindings: Some((
        global: {"x": Quit},
        topic: {"Left": Back},
    )),
)"#,
        )
        .unwrap();
        let bindings = config.keybindings.unwrap();
        assert_eq!(bindings.global.get("x"), Some(&Action::Quit));
        assert_eq!(bindings.topic.get("Left"), Some(&Action::Back));
        assert!(bindings.top_level.is_empty());
    }

    #[test]
    fn host_override_wins_when_set() {
        let config =
            AppConfig::default().with_host_override(Some("http://localhost:8080/v0/".into()));
        assert_eq!(config.api_base_url, "http://localhost:8080/v0/");

        let config = AppConfig::default().with_host_override(Some("  ".into()));
        assert_eq!(config.api_base_url, HN_API_BASE_URL);

        let config = AppConfig::default().with_host_override(None);
        assert_eq!(config.api_base_url, HN_API_BASE_URL);
    }

    #[test]
    fn load_reports_parse_failure_and_falls_through() {
        let dir = std::env::temp_dir().join(format!("hn-browser-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let broken = dir.join("broken.ron");
        let good = dir.join("good.ron");
        fs::write(&broken, "(max_comments: \"many\")").unwrap();
        fs::write(&good, "(max_comments: 3)").unwrap();

        let (config, notices) =
            AppConfig::load_from(&[dir.join("missing.ron"), broken.clone(), good.clone()]);
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.max_comments, 3);
        assert_eq!(notices.len(), 2);
        assert!(matches!(&notices[0], ConfigNotice::ParseFailed { path, .. } if *path == broken));
        assert_eq!(notices[1], ConfigNotice::Loaded(good));
    }

    #[test]
    fn load_without_files_uses_defaults() {
        let (config, notices) = AppConfig::load_from(&[PathBuf::from("no/such/config.ron")]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(notices, vec![ConfigNotice::Defaults]);
    }

    #[test]
    fn filter_directive_appends_module_levels() {
        let logging = LoggingConfig {
            level: "warn".to_string(),
            log_directory: None,
            module_levels: BTreeMap::from([
                ("hn_browser::api".to_string(), "debug".to_string()),
                ("reqwest".to_string(), "error".to_string()),
            ]),
        };
        assert_eq!(
            logging.filter_directive(),
            "warn,hn_browser::api=debug,reqwest=error"
        );
    }
}
