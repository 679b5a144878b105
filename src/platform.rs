use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Mac,
    Windows,
    Unknown,
}

/// Checked in order, first hit wins. Needles are lowercase.
const SIGNATURES: &[(Platform, &[&str])] = &[
    (Platform::Android, &["android"]),
    (Platform::Ios, &["ipad", "iphone", "ipod"]),
    (Platform::Mac, &["macintosh", "macintel", "macppc", "mac68k"]),
    (Platform::Windows, &["win32", "win64", "windows", "wow64"]),
];

impl Platform {
    /// Classify a user agent string. Total: anything unmatched is
    /// [`Platform::Unknown`].
    pub fn detect(user_agent: &str) -> Platform {
        let ua = user_agent.to_lowercase();
        SIGNATURES
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| ua.contains(n)))
            .map(|(platform, _)| *platform)
            .unwrap_or(Platform::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Mac => "mac",
            Platform::Windows => "windows",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
