use reqwest::Url;

/// Host part of `url` without a leading `www.`, e.g. `"https://www.github.com/foo"`
/// gives `Some("github.com")`.
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    match host.is_empty() {
        true => None,
        false => Some(host.to_string()),
    }
}
