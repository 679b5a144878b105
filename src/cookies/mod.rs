mod file_jar;

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, SystemTime};

use percent_encoding::{
    percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC,
};
use serde::{Deserialize, Serialize};

use crate::{Result, COOKIE_MAX_AGE};

pub use file_jar::FileJar;

/// Characters left untouched by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// `None` when the escapes don't decode to UTF-8.
pub fn decode_value(value: &str) -> Option<String> {
    percent_decode_str(value)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Deserialize, Serialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// A cookie in wire form: `value` is stored exactly as it goes into the
/// header, callers encode and decode.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age: Duration,
    pub same_site: SameSite,
}

impl Cookie {
    /// Site-wide cookie kept for [`COOKIE_MAX_AGE`] seconds.
    pub fn persistent(name: &str, value: String) -> Self {
        Self {
            name: name.to_owned(),
            value,
            path: "/".to_owned(),
            max_age: Duration::from_secs(COOKIE_MAX_AGE),
            same_site: SameSite::Lax,
        }
    }

    pub fn to_header(&self) -> String {
        format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            self.value,
            self.path,
            self.max_age.as_secs(),
            self.same_site
        )
    }

    fn expires_at(&self, now: SystemTime) -> SystemTime {
        now.checked_add(self.max_age).unwrap_or_else(|| {
            SystemTime::UNIX_EPOCH + Duration::from_secs(u32::MAX.into())
        })
    }
}

/// Parse a `document.cookie` style string (`a=b; c=d`). The first
/// occurrence of a name wins, pairs without `=` are skipped.
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for pair in header.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        cookies
            .entry(name.to_owned())
            .or_insert_with(|| value.trim().to_owned());
    }
    cookies
}

/// Durable key-value store the page identity lives in.
pub trait CookieJar {
    /// Wire value of a live cookie.
    fn get(&self, name: &str) -> Option<String>;

    /// Store every cookie or none of them.
    fn set_all(&mut self, cookies: &[Cookie]) -> Result<()>;
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct StoredCookie {
    pub value: String,
    pub expires_at: SystemTime,
}

impl StoredCookie {
    pub fn from_cookie(cookie: &Cookie, now: SystemTime) -> Self {
        Self {
            value: cookie.value.clone(),
            expires_at: cookie.expires_at(now),
        }
    }

    pub fn is_live(&self, now: SystemTime) -> bool {
        self.expires_at > now
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryJar {
    cookies: HashMap<String, StoredCookie>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the jar from a `document.cookie` style string.
    pub fn from_header(header: &str) -> Self {
        let mut jar = Self::new();
        let now = SystemTime::now();
        for (name, value) in parse_cookie_header(header) {
            let cookie = Cookie::persistent(&name, value);
            jar.cookies
                .insert(name, StoredCookie::from_cookie(&cookie, now));
        }
        jar
    }

    /// Live cookies as `name=value` pairs, sorted by name.
    pub fn header(&self) -> String {
        let now = SystemTime::now();
        let mut pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|(_, stored)| stored.is_live(now))
            .map(|(name, stored)| format!("{}={}", name, stored.value))
            .collect();
        pairs.sort();
        pairs.join("; ")
    }

    pub fn is_empty(&self) -> bool {
        self.header().is_empty()
    }
}

impl CookieJar for MemoryJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|stored| stored.is_live(SystemTime::now()))
            .map(|stored| stored.value.clone())
    }

    fn set_all(&mut self, cookies: &[Cookie]) -> Result<()> {
        let now = SystemTime::now();
        for cookie in cookies {
            self.cookies.insert(
                cookie.name.clone(),
                StoredCookie::from_cookie(cookie, now),
            );
        }
        Ok(())
    }
}
