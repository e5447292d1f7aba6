use std::fmt::{self, Debug, Formatter};
use std::ops::Range;

use onig::{Regex, RegexOptions, SearchOptions};

use crate::error::ArancioResult;
use crate::lexer::charset::{case_fold_charset, case_fold_letters};
use crate::lexer::pattern::{Pattern, compile_regex};

/// Lowest priority alternative, matching any single character so the scanner always advances
pub(crate) const CATCH_ALL: &str = r"[\s\S]";

/// A syntactic unit of a pattern source, as far as union compilation is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part<'a> {
    /// `[...]`
    Class(&'a str),
    /// Any escape sequence that is not made of digits
    Escape(&'a str),
    /// `\` followed by digits: a back-reference if the group exists at that point
    Numeric(&'a str, u32),
    /// A numeric escape that turned out not to be a back-reference
    CodePoint(u32),
    /// `(?:`, `(?=`, `(?!`, `(?<=`, `(?<!` or `(?>`
    NonCapturing(&'a str),
    /// `(`
    Group,
    /// `)`
    Close,
    /// `^`
    Caret,
    /// Anything else
    Literal(&'a str),
}

fn char_len_at(s: &str, pos: usize) -> usize {
    s[pos..].chars().next().map_or(1, char::len_utf8)
}

/// Byte length of the class starting at `start`, `None` if it is never closed
fn class_len(source: &str, start: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut i = start + 1;
    while i < source.len() {
        match bytes[i] {
            b'\\' if i + 1 < source.len() => i += 1 + char_len_at(source, i + 1),
            b']' => return Some(i + 1 - start),
            _ => i += char_len_at(source, i),
        }
    }
    None
}

/// The escape starting at `start` and its byte length
fn escape_part(source: &str, start: usize) -> (Part<'_>, usize) {
    let rest = &source.as_bytes()[start + 1..];
    let hex_digits = |max: usize| {
        rest.iter()
            .skip(1)
            .take(max)
            .take_while(|b| b.is_ascii_hexdigit())
            .count()
    };

    let len = match rest.first() {
        None => return (Part::Literal(&source[start..]), 1),
        Some(b'u') if hex_digits(4) == 4 => 6,
        Some(b'x') if hex_digits(2) == 2 => 4,
        Some(b) if b.is_ascii_digit() => {
            let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
            let text = &source[start..start + 1 + digits];
            let value = text[1..]
                .bytes()
                .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(u32::from(d - b'0')));
            return (Part::Numeric(text, value), text.len());
        }
        Some(_) => 1 + char_len_at(source, start + 1),
    };
    (Part::Escape(&source[start..start + len]), len)
}

/// Splits a pattern source into classes, escapes, group delimiters, anchors and literal runs
fn split_parts(source: &str) -> Vec<Part<'_>> {
    let bytes = source.as_bytes();
    let mut parts = Vec::new();
    let mut i = 0;

    while i < source.len() {
        let (part, len) = match bytes[i] {
            b'[' => match class_len(source, i) {
                Some(len) => (Part::Class(&source[i..i + len]), len),
                None => (Part::Literal(&source[i..i + 1]), 1),
            },
            b'\\' => escape_part(source, i),
            b'(' => {
                let rest = &source[i + 1..];
                let opener_len = ["?:", "?=", "?!", "?>", "?<=", "?<!"]
                    .iter()
                    .filter(|opener| rest.starts_with(*opener))
                    .map(|opener| opener.len() + 1)
                    .max();
                match opener_len {
                    Some(len) => (Part::NonCapturing(&source[i..i + len]), len),
                    None => (Part::Group, 1),
                }
            }
            b')' => (Part::Close, 1),
            b'^' => (Part::Caret, 1),
            _ => {
                let len = source[i..]
                    .find(['[', '\\', '(', ')', '^'])
                    .unwrap_or(source.len() - i);
                (Part::Literal(&source[i..i + len]), len)
            }
        };
        parts.push(part);
        i += len;
    }

    parts
}

/// Whether the source contains ASCII letters once escape sequences are removed
fn has_unescaped_letters(source: &str) -> bool {
    let bytes = source.as_bytes();
    let count_hex = |from: usize, max: usize| {
        bytes[from.min(bytes.len())..]
            .iter()
            .take(max)
            .take_while(|b| b.is_ascii_hexdigit())
            .count()
    };
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => match bytes.get(i + 1) {
                Some(b'u' | b'U') if count_hex(i + 2, 4) == 4 => i += 6,
                Some(b'x' | b'X') if count_hex(i + 2, 2) == 2 => i += 4,
                Some(b'u' | b'U' | b'x' | b'X') | None => i += 1,
                Some(_) => i += 1 + char_len_at(source, i + 1),
            },
            b if b.is_ascii_alphabetic() => return true,
            _ => i += 1,
        }
    }

    false
}

/// How letters of the patterns have to be treated in the union
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CaseMode {
    /// The whole union can be compiled case-insensitively
    ignore_case: bool,
    /// Case-insensitive patterns have to spell out both cases of their letters
    fold_case: bool,
}

impl CaseMode {
    fn detect(patterns: &[&Pattern]) -> Self {
        let mut mode = CaseMode {
            ignore_case: false,
            fold_case: false,
        };
        for pattern in patterns {
            if pattern.ignore_case() {
                mode.ignore_case = true;
            } else if has_unescaped_letters(pattern.source()) {
                mode.fold_case = true;
                mode.ignore_case = false;
                break;
            }
        }
        mode
    }
}

/// Rewrites a single pattern so it can be one alternative of the union:
/// groups that are not back-referenced stop capturing, the remaining ones are renumbered
/// after the ones of previous patterns, leading anchors are dropped and letters are
/// case folded if needed.
fn rewrite_pattern(pattern: &Pattern, fold_case: bool, captured_groups: &mut u32) -> String {
    let mut parts = split_parts(pattern.source());

    // Find which groups are back-referenced: those need to keep capturing
    let mut back_referenced = vec![false];
    let mut group_index = 0;
    for part in parts.iter_mut() {
        match *part {
            Part::Group => {
                group_index += 1;
                back_referenced.push(false);
            }
            Part::Numeric(_, value) if value > 0 => {
                if value as usize <= group_index {
                    back_referenced[value as usize] = true;
                } else {
                    // An octal escape, make sure it does not become a back-reference to
                    // a group of an earlier pattern
                    *part = Part::CodePoint(value);
                }
            }
            _ => {}
        }
    }

    let renumbered: Vec<Option<u32>> = back_referenced
        .iter()
        .map(|&referenced| {
            referenced.then(|| {
                *captured_groups += 1;
                *captured_groups
            })
        })
        .collect();

    let mut out = String::with_capacity(pattern.source().len() + 8);
    let mut group_index = 0;
    for (i, part) in parts.iter().enumerate() {
        match *part {
            Part::Group => {
                group_index += 1;
                if renumbered[group_index].is_some() {
                    out.push('(');
                } else {
                    out.push_str("(?:");
                }
            }
            Part::Numeric(text, value) => match renumbered.get(value as usize) {
                Some(Some(new_index)) if value > 0 && value as usize <= group_index => {
                    out.push('\\');
                    out.push_str(&new_index.to_string());
                }
                _ => out.push_str(text),
            },
            Part::CodePoint(value) => {
                if value <= 0xff {
                    out.push_str(&format!("\\x{value:02x}"));
                } else {
                    out.push_str(&format!("\\u{:04x}", value.min(0xffff)));
                }
            }
            // The union decides where matching starts so a single leading anchor is
            // meaningless. `^^` really means anchored at the start of the text.
            Part::Caret => {
                if parts.get(i + 1) == Some(&Part::Caret) {
                    out.push('^');
                }
            }
            Part::Class(class) if fold_case => out.push_str(&case_fold_charset(class)),
            Part::Literal(text) if fold_case => out.push_str(&case_fold_letters(text)),
            Part::Class(text)
            | Part::Literal(text)
            | Part::Escape(text)
            | Part::NonCapturing(text) => out.push_str(text),
            Part::Close => out.push(')'),
        }
    }

    out
}

/// A single regex matching the union of a list of prefix patterns, in priority order, plus
/// a catch-all alternative.
pub struct CombinedMatcher {
    source: String,
    alternatives: usize,
    regex: Regex,
}

impl CombinedMatcher {
    /// Compiles the patterns into one matcher. Earlier patterns win over later ones when
    /// more than one matches at a given position.
    pub fn new<'p>(patterns: impl IntoIterator<Item = &'p Pattern>) -> ArancioResult<Self> {
        let catch_all = Pattern::new(CATCH_ALL);
        let mut patterns: Vec<&Pattern> = patterns.into_iter().collect();
        patterns.push(&catch_all);

        for pattern in &patterns {
            pattern.check_flags()?;
        }

        let mode = CaseMode::detect(&patterns);
        let mut captured_groups = 0;
        let mut alternatives = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            let fold_case = pattern.ignore_case() && mode.fold_case;
            let rewritten = rewrite_pattern(pattern, fold_case, &mut captured_groups);
            alternatives.push(format!("(?:{rewritten})"));
        }
        let source = alternatives.join("|");

        #[cfg(feature = "debug")]
        log::debug!(
            "[CombinedMatcher::new] {} alternatives, {:?}: {source}",
            alternatives.len(),
            mode
        );

        let mut options = RegexOptions::REGEX_OPTION_FIND_NOT_EMPTY;
        if mode.ignore_case {
            options |= RegexOptions::REGEX_OPTION_IGNORECASE;
        }
        let regex = compile_regex(&source, options)?;

        Ok(Self {
            source,
            alternatives: alternatives.len(),
            regex,
        })
    }

    /// The regex source of the union
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Splits the whole text into consecutive tokens.
    /// Every character of the text belongs to exactly one token.
    pub fn tokens<'m, 't>(&'m self, text: &'t str) -> Tokens<'m, 't> {
        Tokens {
            matcher: self,
            text,
            pos: 0,
        }
    }
}

impl Debug for CombinedMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CombinedMatcher({} alternatives)", self.alternatives)
    }
}

/// Iterator over the byte ranges of the tokens of a text
#[derive(Debug)]
pub struct Tokens<'m, 't> {
    matcher: &'m CombinedMatcher,
    text: &'t str,
    pos: usize,
}

impl Iterator for Tokens<'_, '_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.text.len() {
            return None;
        }
        // We pass the whole text so lookbehinds and `^^` see the real surroundings
        let matched = self.matcher.regex.match_with_options(
            self.text,
            self.pos,
            SearchOptions::SEARCH_OPTION_NONE,
            None,
        );
        let len = match matched {
            Some(len) if len > 0 => len,
            // The catch-all makes that unreachable but we must never stop advancing
            _ => char_len_at(self.text, self.pos),
        };
        let start = self.pos;
        self.pos += len;
        Some(start..self.pos)
    }
}
