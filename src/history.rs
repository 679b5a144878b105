/// The browser location bar and its session history.
pub trait History {
    fn pathname(&self) -> &str;

    /// Swap the current entry for `path` without adding one.
    fn replace(&mut self, path: &str);

    fn push(&mut self, path: &str);

    /// Number of entries in the session history.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
pub struct MemoryHistory {
    entries: Vec<String>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_owned()],
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn pathname(&self) -> &str {
        self.entries.last().map(String::as_str).unwrap_or("/")
    }

    fn replace(&mut self, path: &str) {
        match self.entries.last_mut() {
            Some(current) => *current = path.to_owned(),
            None => self.entries.push(path.to_owned()),
        }
    }

    fn push(&mut self, path: &str) {
        self.entries.push(path.to_owned());
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
