use std::fmt;

use serde::Serialize;

/// Browser family label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Browser {
    Opera,
    Edge,
    Chrome,
    Chromium,
    Firefox,
    Safari,
    #[serde(rename = "Internet Explorer")]
    InternetExplorer,
    #[default]
    Unknown,
}

impl Browser {
    /// Rule order matters: Opera and Edge user agents also mention Chrome,
    /// and Chrome user agents also mention Safari.
    pub fn detect(ua: &str) -> Self {
        let has = |needle: &str| ua.contains(needle);

        if has("OPR") || has("Opera") {
            Self::Opera
        } else if has("Edg") || has("Edge") {
            Self::Edge
        } else if has("Chrome") && !has("Chromium") {
            Self::Chrome
        } else if has("Chromium") {
            Self::Chromium
        } else if has("Firefox") {
            Self::Firefox
        } else if has("Safari") && !has("Chrome") {
            Self::Safari
        } else if has("MSIE") || has("Trident") {
            Self::InternetExplorer
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opera => "Opera",
            Self::Edge => "Edge",
            Self::Chrome => "Chrome",
            Self::Chromium => "Chromium",
            Self::Firefox => "Firefox",
            Self::Safari => "Safari",
            Self::InternetExplorer => "Internet Explorer",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OperatingSystem {
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Android,
    #[serde(rename = "iOS")]
    Ios,
    Linux,
    #[default]
    Unknown,
}

impl OperatingSystem {
    /// Android is checked before Linux since Android user agents mention both.
    pub fn detect(ua: &str) -> Self {
        let has = |needle: &str| ua.contains(needle);

        if has("Windows") {
            Self::Windows
        } else if has("Macintosh") {
            Self::MacOs
        } else if has("Android") {
            Self::Android
        } else if has("iPhone") || has("iPad") {
            Self::Ios
        } else if has("Linux") {
            Self::Linux
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::MacOs => "macOS",
            Self::Android => "Android",
            Self::Ios => "iOS",
            Self::Linux => "Linux",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser and OS labels for one user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    pub browser: Browser,
    pub os: OperatingSystem,
}

/// Classify a raw user-agent string.
pub fn classify(ua: &str) -> Classification {
    Classification {
        browser: Browser::detect(ua),
        os: OperatingSystem::detect(ua),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WINDOWS: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";
    const OPERA_MAC: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36 OPR/105.0.0.0";
    const SAFARI_IPHONE: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const CHROME_ANDROID: &str =
        "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const CHROMIUM_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chromium/119.0.0.0 Chrome/119.0.0.0 Safari/537.36";
    const IE11: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64; Trident/7.0; rv:11.0) like Gecko";

    #[test]
    fn chrome_on_windows() {
        let c = classify("Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/90.0");
        assert_eq!(c.browser, Browser::Chrome);
        assert_eq!(c.os, OperatingSystem::Windows);
        assert_eq!(classify(CHROME_WINDOWS).browser, Browser::Chrome);
    }

    #[test]
    fn chromium_based_browsers_are_told_apart() {
        assert_eq!(classify(EDGE_WINDOWS).browser, Browser::Edge);
        assert_eq!(classify(OPERA_MAC).browser, Browser::Opera);
        assert_eq!(classify(CHROMIUM_LINUX).browser, Browser::Chromium);
    }

    #[test]
    fn safari_only_without_chrome() {
        let c = classify(SAFARI_IPHONE);
        assert_eq!(c.browser, Browser::Safari);
        assert_eq!(c.os, OperatingSystem::Ios);
    }

    #[test]
    fn operating_systems() {
        assert_eq!(classify(OPERA_MAC).os, OperatingSystem::MacOs);
        assert_eq!(classify(FIREFOX_LINUX).os, OperatingSystem::Linux);
        assert_eq!(classify(CHROME_ANDROID).os, OperatingSystem::Android);
        assert_eq!(classify(FIREFOX_LINUX).browser, Browser::Firefox);
    }

    #[test]
    fn internet_explorer() {
        assert_eq!(classify(IE11).browser, Browser::InternetExplorer);
        assert_eq!(Browser::InternetExplorer.to_string(), "Internet Explorer");
    }

    #[test]
    fn unknown_by_default() {
        let c = classify("curl/8.4.0");
        assert_eq!(c, Classification::default());
        assert_eq!(c.browser.as_str(), "Unknown");
        assert_eq!(c.os.as_str(), "Unknown");
        assert_eq!(classify(""), Classification::default());
    }

    #[test]
    fn serializes_display_labels() {
        let json = serde_json::to_value(Classification {
            browser: Browser::InternetExplorer,
            os: OperatingSystem::MacOs,
        })
        .unwrap();
        assert_eq!(json["browser"], "Internet Explorer");
        assert_eq!(json["os"], "macOS");
    }
}
