impl DocumentSession {
    /// Adds `line` to the bookmark set, keeping it sorted and deduplicated.
    /// Out-of-range lines are ignored the same way `jump_to_line` ignores
    /// them. Returns whether the set changed.
    pub fn add_bookmark(&mut self, line: usize) -> bool {
        if line >= self.lines.len() {
            debug!(
                "session: ignoring bookmark at {} (total_lines={})",
                line,
                self.lines.len()
            );
            return false;
        }
        match self.bookmarks.binary_search(&line) {
            Ok(_) => false,
            Err(slot) => {
                self.bookmarks.insert(slot, line);
                true
            }
        }
    }

    /// Removes `line` from the bookmark set. Returns whether it was present.
    pub fn remove_bookmark(&mut self, line: usize) -> bool {
        match self.bookmarks.binary_search(&line) {
            Ok(slot) => {
                self.bookmarks.remove(slot);
                true
            }
            Err(_) => false,
        }
    }
}
