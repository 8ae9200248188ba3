/// Reader configuration. Read-only once parsing starts.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Options {
    /// Number of spaces one tab (or one level of block indentation) stands
    /// for. Controls which lines count as indented code and list
    /// continuations.
    pub tab_stop: usize,
    /// Column budget used when computing relative table widths.
    pub columns: usize,
    /// Strict original-Markdown mode: disables footnotes, math, strikeout,
    /// super/subscript, definition lists, extended ordered-list markers and
    /// the title block.
    pub strict: bool,
    /// Smart typography: curly quotes, dashes, ellipses, apostrophes.
    pub smart: bool,
    /// Recognize raw HTML (and, in non-strict mode, raw LaTeX) instead of
    /// treating tags as literal text.
    pub parse_raw: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: 4,
            columns: 80,
            strict: false,
            smart: false,
            parse_raw: true,
        }
    }
}

impl Options {
    /// Create an `OptionsBuilder` for fluent configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use vellum_markdown::Options;
    ///
    /// let options = Options::builder().smart().tab_stop(8).build();
    /// assert!(options.smart);
    /// assert_eq!(options.tab_stop, 8);
    /// ```
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Builder for [`Options`].
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OptionsBuilder {
    options: Options,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            options: Options::default(),
        }
    }
}

impl OptionsBuilder {
    #[must_use]
    pub fn tab_stop(mut self, tab_stop: usize) -> Self {
        self.options.tab_stop = tab_stop.max(1);
        self
    }

    #[must_use]
    pub fn columns(mut self, columns: usize) -> Self {
        self.options.columns = columns;
        self
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.options.strict = true;
        self
    }

    #[must_use]
    pub fn smart(mut self) -> Self {
        self.options.smart = true;
        self
    }

    #[must_use]
    pub fn parse_raw(mut self, parse_raw: bool) -> Self {
        self.options.parse_raw = parse_raw;
        self
    }

    #[must_use]
    pub fn build(self) -> Options {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let options = Options::default();
        assert_eq!(options.tab_stop, 4);
        assert_eq!(options.columns, 80);
        assert!(!options.strict);
        assert!(!options.smart);
        assert!(options.parse_raw);
    }

    #[test]
    fn builder_clamps_tab_stop_to_at_least_one() {
        let options = Options::builder().tab_stop(0).build();
        assert_eq!(options.tab_stop, 1);
    }
}
