use std::fmt;

use crate::cookies::{decode_value, encode_value, Cookie, CookieJar};
use crate::{Result, NAME_COOKIE, USER_ID_COOKIE};

/// The `(id, name)` pair naming a user. Both halves are non-empty.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct Identity {
    id: String,
    name: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Option<Self> {
        let (id, name) = (id.into(), name.into());
        if id.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self { id, name })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parse a location pathname of the shape `/<digits>-<name>`.
    ///
    /// The name is everything after the first dash and may itself contain
    /// dashes, but no slashes. Anything else yields `None`.
    pub fn from_path(path: &str) -> Option<Self> {
        let rest = path.strip_prefix('/')?;
        let (id, name) = rest.split_once('-')?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if name.contains('/') {
            return None;
        }
        Self::new(id, name)
    }

    /// `/<id>-<name>`, the shareable form of this identity.
    pub fn canonical_path(&self) -> String {
        format!("/{}-{}", self.id, self.name)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.id, self.name)
    }
}

/// Reads the identity from the location or the cookie pair, and keeps the
/// cookie pair up to date.
pub struct IdentityStore<J> {
    jar: J,
}

impl<J: CookieJar> IdentityStore<J> {
    pub fn new(jar: J) -> Self {
        Self { jar }
    }

    pub fn jar(&self) -> &J {
        &self.jar
    }

    pub fn into_jar(self) -> J {
        self.jar
    }

    pub fn read_from_path(&self, path: &str) -> Option<Identity> {
        Identity::from_path(path)
    }

    pub fn read_from_persistence(&self) -> Option<Identity> {
        let id = self.jar.get(USER_ID_COOKIE)?;
        let name = decode_value(&self.jar.get(NAME_COOKIE)?)?;
        Identity::new(id, name)
    }

    /// The identity this load should resolve: the path one if the path
    /// carries it, the persisted one otherwise.
    pub fn candidate(&self, path: &str) -> Option<Identity> {
        self.read_from_path(path)
            .or_else(|| self.read_from_persistence())
    }

    /// Persist both cookies in a single jar write.
    pub fn write(&mut self, identity: &Identity) -> Result<()> {
        self.jar.set_all(&[
            Cookie::persistent(USER_ID_COOKIE, identity.id.clone()),
            Cookie::persistent(NAME_COOKIE, encode_value(&identity.name)),
        ])
    }
}
