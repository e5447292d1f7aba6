use std::collections::BTreeMap;
use std::fmt;

use crate::decorations::{Decoration, spans};
use crate::renderers::Options;

#[derive(Debug, PartialEq, Clone, Default)]
/// A renderer that will output HTML code with one `<span>` per decoration
pub struct HtmlRenderer {
    /// Prepended to the style names to build the CSS classes, eg `pr-` gives `pr-kwd`
    pub class_prefix: String,
    /// Any metadata we want to add as `<code>` data-* attribute
    pub other_metadata: BTreeMap<String, String>,
}

impl HtmlRenderer {
    pub fn new(class_prefix: impl Into<String>) -> Self {
        Self {
            class_prefix: class_prefix.into(),
            other_metadata: BTreeMap::new(),
        }
    }

    /// Renders the decorated source to an HTML string, one `<span class="arancio-l">` per
    /// line, escaping characters.
    ///
    /// Decoration positions are relative to the start of `source`, ie the source was scanned
    /// with a base offset of 0.
    pub fn render(
        &self,
        lang: &str,
        source: &str,
        decorations: &[Decoration],
        options: &Options,
    ) -> String {
        let mut lines_content = Vec::with_capacity(source.lines().count() + 1);
        let mut line_content = String::new();
        for (range, style) in spans(decorations, source.len()) {
            let Some(text) = source.get(range) else {
                continue;
            };
            // Spans can cover several lines, eg block comments
            let mut pieces = text.split('\n').peekable();
            while let Some(piece) = pieces.next() {
                if !piece.is_empty() {
                    line_content.push_str(&format!(
                        r#"<span class="{}{style}">{}</span>"#,
                        self.class_prefix,
                        HtmlEscaped(piece)
                    ));
                }
                if pieces.peek().is_some() {
                    lines_content.push(std::mem::take(&mut line_content));
                }
            }
        }
        // A trailing newline does not start a line of its own
        if !(source.ends_with('\n') && line_content.is_empty()) {
            lines_content.push(line_content);
        }

        let mut lines = String::with_capacity(source.len() * 2);
        for (idx, line_content) in lines_content.iter().enumerate() {
            let display_line_num = options.line_number_start + (idx as isize);
            let line_number_html = if options.show_line_numbers {
                format!(r#"<span class="arancio-ln">{display_line_num}</span>"#)
            } else {
                String::new()
            };
            lines.push_str(&format!(
                r#"<span class="arancio-l">{line_number_html}{line_content}</span>"#
            ));
        }

        // Build data attributes from other_metadata
        let mut data_attrs = format!(r#"data-lang="{}""#, HtmlEscaped(lang));
        for (key, value) in &self.other_metadata {
            // lowercase and replace non-alphanumeric chars with hyphens
            let slugified_key: String = key
                .to_lowercase()
                .chars()
                .map(|c| {
                    if c.is_alphanumeric() || c == '-' {
                        c
                    } else {
                        '-'
                    }
                })
                .collect();
            data_attrs.push_str(&format!(
                r#" data-{slugified_key}="{}""#,
                HtmlEscaped(value)
            ));
        }

        format!(r#"<pre class="arancio"><code {data_attrs}>{lines}</code></pre>"#)
    }
}

// From syntect
pub(crate) struct HtmlEscaped<'a>(pub &'a str);
impl fmt::Display for HtmlEscaped<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Because the internet is always right, turns out there's not that many
        // characters to escape: http://stackoverflow.com/questions/7381974
        let Self(s) = *self;
        let mut last = 0;
        for (i, ch) in s.bytes().enumerate() {
            let escaped = match ch {
                b'>' => "&gt;",
                b'<' => "&lt;",
                b'&' => "&amp;",
                b'\'' => "&#39;",
                b'"' => "&quot;",
                _ => continue,
            };
            fmt.write_str(&s[last..i])?;
            fmt.write_str(escaped)?;
            last = i + 1;
        }

        if last < s.len() {
            fmt.write_str(&s[last..])?;
        }
        Ok(())
    }
}
