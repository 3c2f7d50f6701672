impl DocumentSession {
    /// Pattern the next scan will use: the per-document override when set,
    /// else the global default.
    pub fn active_pattern<'a>(&'a self, default_pattern: &'a str) -> &'a str {
        self.chapter_pattern.as_deref().unwrap_or(default_pattern)
    }

    /// Replaces the per-document pattern override and rescans. The override
    /// is kept even when it fails to compile, matching what was persisted.
    pub fn set_chapter_pattern(
        &mut self,
        pattern: &str,
        default_pattern: &str,
    ) -> Result<usize, ChapterPatternError> {
        self.chapter_pattern = Some(pattern.to_owned());
        self.rescan_chapters(default_pattern)
    }

    /// Rebuilds the chapter index from scratch: every line is trimmed and
    /// tested against the active pattern, with no anchoring beyond what the
    /// pattern itself specifies. A pattern that fails to compile clears the
    /// index and reports the error; reading and search stay usable.
    pub fn rescan_chapters(
        &mut self,
        default_pattern: &str,
    ) -> Result<usize, ChapterPatternError> {
        let pattern = self.active_pattern(default_pattern).to_owned();
        self.chapters.clear();

        let regex = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(source) => {
                warn!("session: chapter pattern {pattern:?} rejected: {source}");
                return Err(ChapterPatternError { pattern, source });
            }
        };

        for (index, line) in self.lines.iter().enumerate() {
            let trimmed = line.trim();
            if regex.is_match(trimmed) {
                self.chapters.push(Chapter {
                    line: index,
                    name: trimmed.to_owned(),
                });
            }
        }

        debug!(
            "session: chapter scan with {:?} found {} headings",
            pattern,
            self.chapters.len()
        );
        Ok(self.chapters.len())
    }
}
