use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{Cookie, CookieJar, StoredCookie};
use crate::{LandingError, Result};

const LOG_PREFIX: &str = "[file-jar]";

struct TmpFile {
    file: File,
    path: PathBuf,
}

impl TmpFile {
    fn create_in(dir: impl AsRef<Path>) -> Result<Self> {
        let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(10)
            .collect();
        let path = dir.as_ref().join(format!(".cookies.{suffix}.tmp"));
        let file = File::create(&path)?;
        Ok(Self { file, path })
    }

    fn persist(self, dest: &Path) -> Result<()> {
        self.file.sync_all()?;
        fs::rename(&self.path, dest)?;
        Ok(())
    }
}

impl Drop for TmpFile {
    fn drop(&mut self) {
        // already gone after a successful rename
        let _ = fs::remove_file(&self.path);
    }
}

/// Cookie jar persisted as JSON. Writes go through a temp file and a
/// rename, so readers see either the old or the new set in full.
pub struct FileJar {
    path: PathBuf,
}

impl FileJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, StoredCookie>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(HashMap::new())
            }
            Err(e) => return Err(e.into()),
        };
        let text = std::str::from_utf8(&bytes)?;
        Ok(serde_json::from_str(text)?)
    }
}

impl CookieJar for FileJar {
    fn get(&self, name: &str) -> Option<String> {
        let cookies = match self.load() {
            Ok(cookies) => cookies,
            Err(e) => {
                log::warn!(
                    "{} unreadable jar {}: {}",
                    LOG_PREFIX,
                    self.path.display(),
                    e
                );
                return None;
            }
        };
        cookies
            .get(name)
            .filter(|stored| stored.is_live(SystemTime::now()))
            .map(|stored| stored.value.clone())
    }

    fn set_all(&mut self, cookies: &[Cookie]) -> Result<()> {
        let now = SystemTime::now();
        // A corrupt jar is replaced rather than blocking every write.
        let mut stored = self.load().unwrap_or_default();
        stored.retain(|_, cookie| cookie.is_live(now));
        for cookie in cookies {
            stored.insert(
                cookie.name.clone(),
                StoredCookie::from_cookie(cookie, now),
            );
        }

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = TmpFile::create_in(&dir)?;
        let json = serde_json::to_vec_pretty(&stored)
            .map_err(|e| LandingError::Other(e.into()))?;
        tmp.file.write_all(&json)?;
        tmp.persist(&self.path)?;

        log::debug!(
            "{} {} cookies written to {}",
            LOG_PREFIX,
            cookies.len(),
            self.path.display()
        );
        Ok(())
    }
}
