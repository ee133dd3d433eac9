use serde::{Deserialize, Serialize};

/// Browser family, as far as viewport quirks are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Safari,
    Firefox,
    Edge,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Ios,
    Android,
    Other,
}

/// The `(browser, platform)` pair used to select scrollbar corrections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    pub browser: Browser,
    pub platform: Platform,
}

impl Environment {
    pub fn new(browser: Browser, platform: Platform) -> Self {
        Self { browser, platform }
    }

    /// Classify a host from `navigator.userAgent` and `navigator.platform`.
    pub fn from_user_agent(user_agent: &str, platform: &str) -> Self {
        Self {
            browser: detect_browser(user_agent),
            platform: detect_platform(user_agent, platform),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Browser::Other, Platform::Other)
    }
}

fn detect_browser(ua: &str) -> Browser {
    // Order matters: Edge and Opera UAs also carry "Chrome/", and every
    // Chromium UA carries "Safari/".
    if ["Edg/", "EdgA/", "EdgiOS/"].iter().any(|t| ua.contains(t)) {
        Browser::Edge
    } else if ua.contains("OPR/") {
        Browser::Other
    } else if ua.contains("Firefox/") || ua.contains("FxiOS/") {
        Browser::Firefox
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        Browser::Chrome
    } else if ua.contains("Safari/") {
        Browser::Safari
    } else {
        Browser::Other
    }
}

fn detect_platform(ua: &str, platform: &str) -> Platform {
    if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
        Platform::Ios
    } else if ua.contains("Android") {
        Platform::Android
    } else if platform.starts_with("Mac") || ua.contains("Macintosh") {
        Platform::MacOs
    } else if platform.starts_with("Win") || ua.contains("Windows") {
        Platform::Windows
    } else if platform.starts_with("Linux") || ua.contains("Linux") {
        Platform::Linux
    } else {
        Platform::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
    const SAFARI_IOS: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1";
    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/126.0.0.0 Mobile Safari/537.36";

    #[test]
    fn desktop_chrome_on_mac() {
        let env = Environment::from_user_agent(CHROME_MAC, "MacIntel");
        assert_eq!(env, Environment::new(Browser::Chrome, Platform::MacOs));
    }

    #[test]
    fn mobile_safari() {
        let env = Environment::from_user_agent(SAFARI_IOS, "iPhone");
        assert_eq!(env, Environment::new(Browser::Safari, Platform::Ios));
    }

    #[test]
    fn edge_is_not_chrome() {
        let env = Environment::from_user_agent(EDGE_WIN, "Win32");
        assert_eq!(env, Environment::new(Browser::Edge, Platform::Windows));
    }

    #[test]
    fn android_wins_over_linux() {
        let env = Environment::from_user_agent(CHROME_ANDROID, "Linux armv8l");
        assert_eq!(env, Environment::new(Browser::Chrome, Platform::Android));
    }

    #[test]
    fn unknown_agent() {
        assert_eq!(Environment::from_user_agent("", ""), Environment::default());
    }
}
