//! Browser user agent selection.
//!
//! Both channels present themselves as a desktop Chromium browser: the
//! public pages serve their full markup only to known browsers and the
//! internal API client identity is a web client.

use std::time::{SystemTime, UNIX_EPOCH};

/// Desktop Chrome user agent sent on both channels by default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configured value that selects a rotating user agent.
pub const ROTATE_KEYWORD: &str = "impersonate";

const CHROMIUM_ROTATION: [&str; 3] = [
    DEFAULT_USER_AGENT,
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

/// Pick a Chromium user agent, varying per process start.
pub fn rotating_user_agent() -> &'static str {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_micros() as usize)
        .unwrap_or_default();
    CHROMIUM_ROTATION[seed % CHROMIUM_ROTATION.len()]
}

/// Resolve the configured user agent.
///
/// Blank means the default, [`ROTATE_KEYWORD`] picks from the rotation, and
/// anything else is sent verbatim.
pub fn resolve_user_agent(configured: Option<&str>) -> String {
    let configured = configured.map(str::trim).unwrap_or_default();
    if configured.is_empty() {
        DEFAULT_USER_AGENT.to_string()
    } else if configured.eq_ignore_ascii_case(ROTATE_KEYWORD) {
        rotating_user_agent().to_string()
    } else {
        configured.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_default() {
        assert_eq!(resolve_user_agent(None), DEFAULT_USER_AGENT);
        assert_eq!(resolve_user_agent(Some("  ")), DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_rotation_stays_chromium() {
        let ua = resolve_user_agent(Some("Impersonate"));
        assert!(CHROMIUM_ROTATION.contains(&ua.as_str()));
        assert!(ua.contains("Chrome/"));
    }

    #[test]
    fn test_custom_is_verbatim() {
        assert_eq!(resolve_user_agent(Some("Probe/2.0 ")), "Probe/2.0");
    }
}
