pub mod html;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub(crate) show_line_numbers: bool,
    pub(crate) line_number_start: isize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            show_line_numbers: false,
            line_number_start: 1,
        }
    }
}

impl Options {
    /// Prefixes every line with its number, the first line being `start`
    pub fn line_numbers(mut self, start: isize) -> Self {
        self.show_line_numbers = true;
        self.line_number_start = start;
        self
    }
}
