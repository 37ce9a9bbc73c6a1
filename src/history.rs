//! Navigation history stack.
//!
//! Behaves like a browser session history: `push` drops any forward entries,
//! `replace` overwrites the current entry in place, `back` moves the cursor.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    index: usize,
}

impl History {
    #[must_use]
    pub fn new(initial: &str) -> Self {
        Self { entries: vec![initial.to_owned()], index: 0 }
    }

    #[must_use]
    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn push(&mut self, path: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(path.to_owned());
        self.index = self.entries.len() - 1;
    }

    pub fn replace(&mut self, path: &str) {
        path.clone_into(&mut self.entries[self.index]);
    }

    /// Step back one entry. Returns `None` at the start of history.
    pub fn back(&mut self) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Step forward one entry. Returns `None` at the end of history.
    pub fn forward(&mut self) -> Option<&str> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
