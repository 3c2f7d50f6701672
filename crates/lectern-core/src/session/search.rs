impl DocumentSession {
    /// Case-sensitive literal substring search over raw line content.
    /// Results carry trimmed content, in ascending line order.
    pub fn search(&self, term: &str) -> Vec<SearchResult> {
        let results: Vec<SearchResult> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(term))
            .map(|(index, line)| SearchResult {
                line: index,
                content: line.trim().to_owned(),
            })
            .collect();

        debug!(
            "session: search {:?} matched {} of {} lines",
            term,
            results.len(),
            self.lines.len()
        );
        results
    }
}
