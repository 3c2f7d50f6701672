impl DocumentSession {
    /// Moves the cursor up by `step`, saturating at the first line.
    pub fn scroll_up(&mut self, step: usize) -> usize {
        let last = self.lines.len().saturating_sub(1);
        self.current_line = self.current_line.saturating_sub(step).min(last);
        self.current_line
    }

    /// Moves the cursor down by `step`, saturating at the last line.
    pub fn scroll_down(&mut self, step: usize) -> usize {
        let last = self.lines.len().saturating_sub(1);
        self.current_line = self.current_line.saturating_add(step).min(last);
        self.current_line
    }

    /// Applies `line` only when it addresses an existing line; anything else
    /// is ignored without error. Stale chapter or search payloads may
    /// reference content that no longer exists.
    pub fn jump_to_line(&mut self, line: usize) -> usize {
        if line < self.lines.len() {
            self.current_line = line;
        } else {
            debug!(
                "session: ignoring jump to {} (total_lines={})",
                line,
                self.lines.len()
            );
        }
        self.current_line
    }

    /// Records the collaborator-reported position immediately and schedules
    /// a debounced save of it.
    pub fn report_progress(&mut self, line: usize, now_ms: u64) {
        self.current_line = line;
        self.progress_sync
            .schedule(line, self.lines.len(), now_ms);
    }
}
