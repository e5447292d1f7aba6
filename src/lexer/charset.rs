//! Case folding of character classes.
//!
//! When a case-insensitive pattern has to live in a case-sensitive union, its classes are
//! rewritten so that every ASCII letter range also contains the letters of the other case.
//! Non-ASCII letters are left alone.

use std::fmt::Write;

const UPPER_A: u32 = 'A' as u32;
const UPPER_Z: u32 = 'Z' as u32;
const LOWER_A: u32 = 'a' as u32;
const LOWER_Z: u32 = 'z' as u32;
const CASE_BIT: u32 = 0x20;

/// Returns the code point a single class member stands for: a literal character or an
/// escape sequence such as `\n`, `\x41`, `A` or `\101`.
pub(crate) fn decode_escape(member: &str) -> u32 {
    let mut chars = member.chars();
    let Some(first) = chars.next() else {
        return 0;
    };
    if first != '\\' {
        return first as u32;
    }
    let Some(second) = chars.next() else {
        return first as u32;
    };
    match second {
        'b' => 0x08,
        't' => 0x09,
        'n' => 0x0a,
        'v' => 0x0b,
        'f' => 0x0c,
        'r' => 0x0d,
        '0'..='7' => parse_leading_digits(&member[1..], 8),
        'u' | 'x' => parse_leading_digits(&member[2..], 16),
        other => other as u32,
    }
}

/// Parses as many leading digits of the given radix as possible, 0 if there are none
fn parse_leading_digits(digits: &str, radix: u32) -> u32 {
    digits
        .chars()
        .map_while(|c| c.to_digit(radix))
        .fold(0u32, |acc, d| acc.saturating_mul(radix).saturating_add(d))
}

/// Writes a code point so that it can be used inside a character class.
/// `[` would open a nested class and `&&` an intersection in Oniguruma.
pub(crate) fn encode_escape(code_point: u32) -> String {
    if code_point < 0x20 {
        return format!("\\x{code_point:02x}");
    }
    match char::from_u32(code_point) {
        Some(c @ ('\\' | '-' | '[' | ']' | '^' | '&')) => format!("\\{c}"),
        Some(c) => c.to_string(),
        None => format!("\\u{code_point:04x}"),
    }
}

/// Splits the inside of a class into members: escapes, `-` and single characters
fn split_members(body: &str) -> Vec<&str> {
    let mut members = Vec::new();
    let bytes = body.as_bytes();
    let mut i = 0;

    while i < body.len() {
        let len = if bytes[i] == b'\\' {
            escape_len(&body[i..])
        } else {
            body[i..].chars().next().map_or(1, char::len_utf8)
        };
        members.push(&body[i..i + len]);
        i += len;
    }

    members
}

/// Byte length of the escape sequence at the start of `s`, which starts with `\`
fn escape_len(s: &str) -> usize {
    let rest = &s[1..];
    let count_while = |max: usize, pred: fn(&u8) -> bool| {
        rest.as_bytes()[1..].iter().take(max).take_while(|b| pred(*b)).count()
    };
    match rest.as_bytes().first() {
        None => 1,
        Some(b'u') if count_while(4, u8::is_ascii_hexdigit) == 4 => 6,
        Some(b'x') if count_while(2, u8::is_ascii_hexdigit) == 2 => 4,
        Some(b'0'..=b'3') => 2 + count_while(2, |b| (b'0'..=b'7').contains(b)),
        Some(b'4'..=b'7') => 2 + count_while(1, |b| (b'0'..=b'7').contains(b)),
        Some(_) => 1 + rest.chars().next().map_or(0, char::len_utf8),
    }
}

fn is_named_class(member: &str) -> bool {
    matches!(
        member,
        "\\b" | "\\B" | "\\d" | "\\D" | "\\s" | "\\S" | "\\w" | "\\W"
    )
}

/// Merges overlapping or touching ranges
fn consolidate(mut ranges: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    // [[1, 10], [3, 4], [8, 12], [14, 14], [16, 16], [17, 17]]
    // -> [[1, 12], [14, 14], [16, 17]]
    ranges.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    let mut consolidated: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match consolidated.last_mut() {
            Some(last) if range.0 <= last.1.saturating_add(1) => {
                last.1 = last.1.max(range.1);
            }
            _ => consolidated.push(range),
        }
    }
    consolidated
}

/// Rewrites a character class such as `[a-f0-9]` into one matching both cases
/// of its ASCII letters, eg `[0-9A-Fa-f]`.
pub(crate) fn case_fold_charset(charset: &str) -> String {
    let body = charset
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(charset);
    let members = split_members(body);
    let inverse = members.first() == Some(&"^");

    let mut out = String::with_capacity(charset.len() * 2);
    out.push('[');
    if inverse {
        out.push('^');
    }

    let mut ranges = Vec::new();
    let n = members.len();
    let mut i = usize::from(inverse);
    while i < n {
        let member = members[i];
        if is_named_class(member) {
            out.push_str(member);
            i += 1;
            continue;
        }

        let start = decode_escape(member);
        let end = if i + 2 < n && members[i + 1] == "-" {
            let end = decode_escape(members[i + 2]);
            i += 2;
            end
        } else {
            start
        };
        i += 1;
        ranges.push((start, end));

        // Only latin letters are handled, which is enough for identifiers in source code
        if !(end < UPPER_A || start > LOWER_Z) {
            if !(end < UPPER_A || start > UPPER_Z) {
                ranges.push((start.max(UPPER_A) | CASE_BIT, end.min(UPPER_Z) | CASE_BIT));
            }
            if !(end < LOWER_A || start > LOWER_Z) {
                ranges.push((start.max(LOWER_A) & !CASE_BIT, end.min(LOWER_Z) & !CASE_BIT));
            }
        }
    }

    for (start, end) in consolidate(ranges) {
        out.push_str(&encode_escape(start));
        if end > start {
            out.push('-');
            out.push_str(&encode_escape(end));
        }
    }
    out.push(']');
    out
}

/// Replaces each ASCII letter of a literal run by a class matching both cases
pub(crate) fn case_fold_letters(run: &str) -> String {
    let mut out = String::with_capacity(run.len() * 4);
    for c in run.chars() {
        if c.is_ascii_alphabetic() {
            let _ = write!(out, "[{}{}]", c.to_ascii_uppercase(), c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
