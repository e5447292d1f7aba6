use serde::{Deserialize, Serialize};

use crate::languages::keywords::split_keywords;
use crate::lexer::{Pattern, Rule, RuleSet};
use crate::style::StyleTag;

/// Something that can come before a regex literal, as opposed to a division.
/// `^^` makes the start of the text count as well.
pub const REGEX_PRECEDER_PATTERN: &str = r"(?:^^\.?|[+-]|[!=]=?=?|\#|%=?|&&?=?|\(|\*=?|[+\-]=|->|\/=?|::?|<<?=?|>>?>?=?|,|;|\?|@|\[|~|\{|\^\^?=?|\|\|?=?|break|case|continue|delete|do|else|finally|instanceof|return|throw|try|typeof)\s*";

/// Type names of the C standard libraries
pub const C_TYPES: &str = r"^(DIR|FILE|array|vector|(de|priority_)?queue|(forward_)?list|stack|(const_)?(reverse_)?iterator|(unordered_)?(multi)?(set|map)|bitset|u?(int|float)\d*)\b";

/// Characters a whitespace token can start with
const WHITESPACE: &str = " \r\n\t\u{a0}";

/// Which string literals a language has
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringDelimiters {
    /// `'...'` and `"..."`, ending at the end of the line
    #[default]
    SingleLine,
    /// `'...'`, `"..."` and `` `...` `` spanning lines
    MultiLine,
    /// Python style: `'''...'''` and `"""..."""` as well as multi-line `'...'` and `"..."`
    TripleQuoted,
}

/// Whether `#` starts a comment
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashComments {
    #[default]
    None,
    /// Until the end of the line.
    /// When combined with C style comments, C preprocessor directives are recognised instead.
    Line,
    /// Until the end of the line, and `### ... ###` blocks
    Block,
}

/// Whether the language has `/.../` regex literals
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegexLiterals {
    #[default]
    None,
    SingleLine,
    MultiLine,
}

/// A declarative description of a C-like language, turned into rules by
/// [`LanguageOptions::to_rule_set`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageOptions {
    pub(crate) string_delimiters: StringDelimiters,
    /// C# `@"..."` strings
    pub(crate) verbatim_strings: bool,
    pub(crate) hash_comments: HashComments,
    /// `// ...` and `/* ... */`
    pub(crate) c_style_comments: bool,
    pub(crate) regex_literals: RegexLiterals,
    pub(crate) keyword_list: Vec<String>,
    pub(crate) type_pattern: Option<Pattern>,
}

impl LanguageOptions {
    pub fn string_delimiters(mut self, value: StringDelimiters) -> Self {
        self.string_delimiters = value;
        self
    }

    pub fn verbatim_strings(mut self, value: bool) -> Self {
        self.verbatim_strings = value;
        self
    }

    pub fn hash_comments(mut self, value: HashComments) -> Self {
        self.hash_comments = value;
        self
    }

    pub fn c_style_comments(mut self, value: bool) -> Self {
        self.c_style_comments = value;
        self
    }

    pub fn regex_literals(mut self, value: RegexLiterals) -> Self {
        self.regex_literals = value;
        self
    }

    /// Sets the keywords from comma or whitespace separated groups, eg `["if,else", "for"]`
    pub fn keywords(mut self, groups: &[&str]) -> Self {
        self.keyword_list = split_keywords(groups);
        self
    }

    /// Tokens matching that pattern are types, on top of the ones looking like type names
    pub fn types(mut self, pattern: Pattern) -> Self {
        self.type_pattern = Some(pattern);
        self
    }

    fn string_rule(&self) -> Rule {
        let (pattern, shortcut) = match self.string_delimiters {
            StringDelimiters::TripleQuoted => (
                r#"^(?:'''(?:[^'\\]|\\[\s\S]|'{1,2}(?=[^']))*(?:'''|$)|"""(?:[^"\\]|\\[\s\S]|"{1,2}(?=[^"]))*(?:"""|$)|'(?:[^\\']|\\[\s\S])*(?:'|$)|"(?:[^\\"]|\\[\s\S])*(?:"|$))"#,
                "'\"",
            ),
            StringDelimiters::MultiLine => (
                r#"^(?:'(?:[^\\']|\\[\s\S])*(?:'|$)|"(?:[^\\"]|\\[\s\S])*(?:"|$)|`(?:[^\\`]|\\[\s\S])*(?:`|$))"#,
                "'\"`",
            ),
            StringDelimiters::SingleLine => (
                r#"^(?:'(?:[^\\'\r\n]|\\.)*(?:'|$)|"(?:[^\\"\r\n]|\\.)*(?:"|$))"#,
                "\"'",
            ),
        };
        Rule::new(StyleTag::String, Pattern::new(pattern)).with_shortcut(shortcut)
    }

    fn regex_literal_rule(&self) -> Option<Rule> {
        // Multi-line regex literals exclude nothing and can contain any char after a `\`
        let (excluded, any) = match self.regex_literals {
            RegexLiterals::None => return None,
            RegexLiterals::SingleLine => (r"\n\r", "."),
            RegexLiterals::MultiLine => ("", r"[\S\s]"),
        };
        // A slash not followed by `*` or `/`, raw chars, escapes or non-nesting classes,
        // and a closing slash
        let literal = format!(
            r"/(?=[^/*{excluded}])(?:[^/\x5B\x5C{excluded}]|\x5C{any}|\x5B(?:[^\x5C\x5D{excluded}]|\x5C{any})*(?:\x5D|$))+/"
        );
        Some(Rule::embedded(
            "regex",
            Pattern::new(format!("^{REGEX_PRECEDER_PATTERN}({literal})")),
        ))
    }

    fn keyword_rule(&self) -> Option<Rule> {
        if self.keyword_list.is_empty() {
            return None;
        }
        let alternatives: Vec<String> = self
            .keyword_list
            .iter()
            .map(|keyword| escape_keyword(keyword))
            .collect();
        Some(Rule::new(
            StyleTag::Keyword,
            Pattern::new(format!(r"^(?:{})\b", alternatives.join("|"))),
        ))
    }

    /// Builds the rules of a language with those features
    pub fn to_rule_set(&self) -> RuleSet {
        let mut shortcuts = vec![self.string_rule()];
        let mut fallbacks = Vec::new();

        if self.verbatim_strings {
            fallbacks.push(Rule::new(
                StyleTag::String,
                Pattern::new(r#"^@"(?:[^"]|"")*(?:"|$)"#),
            ));
        }

        match (self.hash_comments, self.c_style_comments) {
            (HashComments::None, _) => {}
            (HashComments::Block, true) => shortcuts.push(
                Rule::new(
                    StyleTag::Comment,
                    Pattern::new(r"^#(?:##(?:[^#]|#(?!##))*(?:###|$)|.*)"),
                )
                .with_shortcut("#"),
            ),
            (HashComments::Line, true) => {
                // Preprocessor directives stop before a comment that might not be closed
                shortcuts.push(
                    Rule::new(
                        StyleTag::Comment,
                        Pattern::new(
                            r"^#(?:(?:define|e(?:l|nd)if|else|error|ifn?def|include|line|pragma|undef|warning)\b|[^\r\n]*)",
                        ),
                    )
                    .with_shortcut("#"),
                );
                // #include <stdio.h>
                fallbacks.push(Rule::new(
                    StyleTag::String,
                    Pattern::new(
                        r"^<(?:(?:(?:\.\.\/)*|\/?)(?:[\w-]+(?:\/[\w-]+)+)?[\w-]+\.h(?:h|pp|\+\+)?|[a-z]\w*)>",
                    ),
                ));
            }
            (_, false) => shortcuts.push(
                Rule::new(StyleTag::Comment, Pattern::new(r"^#[^\r\n]*")).with_shortcut("#"),
            ),
        }

        if self.c_style_comments {
            fallbacks.push(Rule::new(StyleTag::Comment, Pattern::new(r"^\/\/[^\r\n]*")));
            fallbacks.push(Rule::new(
                StyleTag::Comment,
                Pattern::new(r"^\/\*[\s\S]*?(?:\*\/|$)"),
            ));
        }

        fallbacks.extend(self.regex_literal_rule());
        if let Some(types) = &self.type_pattern {
            fallbacks.push(Rule::new(StyleTag::Type, types.clone()));
        }
        fallbacks.extend(self.keyword_rule());

        shortcuts.push(Rule::new(StyleTag::Plain, Pattern::new(r"^\s+")).with_shortcut(WHITESPACE));

        let mut punctuation = String::from(r#"^.[^\s\w.$@'"`/\\]*"#);
        if self.regex_literals != RegexLiterals::None {
            punctuation.push_str("(?!s*/)");
        }

        fallbacks.extend([
            Rule::new(StyleTag::Literal, Pattern::ignoring_case(r"^@[a-z_$][a-z_$@0-9]*")),
            Rule::new(
                StyleTag::Type,
                Pattern::new(r"^(?:[@_]?[A-Z]+[a-z][A-Za-z_$@0-9]*|\w+_t\b)"),
            ),
            Rule::new(StyleTag::Plain, Pattern::ignoring_case(r"^[a-z_$][a-z_$@0-9]*")),
            Rule::new(
                StyleTag::Literal,
                // hex, octal or decimal numbers, maybe in scientific notation, and an
                // optional suffix like UL
                Pattern::ignoring_case(
                    r"^(?:0x[a-f0-9]+|(?:\d(?:_\d+)*\d*(?:\.\d*)?|\.\d\+)(?:e[+\-]?\d+)?)[a-z]*",
                ),
            )
            .with_shortcut("0123456789"),
            // Escaped quotes in shell do not start strings
            Rule::new(StyleTag::Plain, Pattern::new(r"^\\[\s\S]?")),
            Rule::new(StyleTag::Punctuation, Pattern::new(punctuation)),
        ]);

        RuleSet::new(shortcuts, fallbacks)
    }
}

/// Keywords are identifiers but nothing prevents a language from declaring `c++`
fn escape_keyword(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if c.is_ascii_punctuation() && c != '_' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::style::Style;

    #[test]
    fn can_deserialize_options() {
        let json = r#"{
            "stringDelimiters": "triple-quoted",
            "hashComments": "line",
            "keywordList": ["def", "class"],
            "typePattern": {"source": "^[A-Z]\\w*"}
        }"#;
        let options: LanguageOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.string_delimiters, StringDelimiters::TripleQuoted);
        assert_eq!(options.hash_comments, HashComments::Line);
        assert!(!options.c_style_comments);
        assert_eq!(options.regex_literals, RegexLiterals::None);
        assert_eq!(options.keyword_list, vec!["def", "class"]);
        assert_eq!(options.type_pattern, Some(Pattern::new(r"^[A-Z]\w*")));
    }

    #[test]
    fn keywords_become_a_single_rule() {
        let rules = LanguageOptions::default()
            .keywords(&["if,else", "c++"])
            .to_rule_set();
        let keyword_rule = rules
            .fallbacks
            .iter()
            .find(|rule| rule.style == Style::Terminal(StyleTag::Keyword))
            .unwrap();
        assert_eq!(keyword_rule.pattern.source(), r"^(?:if|else|c\+\+)\b");
    }

    #[test]
    fn regex_literals_are_embedded() {
        let rules = LanguageOptions::default()
            .regex_literals(RegexLiterals::SingleLine)
            .to_rule_set();
        assert!(rules.fallbacks.iter().any(|rule| rule.style == Style::Embedded("regex".to_owned())));
        let punctuation = rules.fallbacks.last().unwrap();
        assert!(punctuation.pattern.source().ends_with("(?!s*/)"));
    }

    #[test]
    fn every_combination_compiles() {
        for strings in [
            StringDelimiters::SingleLine,
            StringDelimiters::MultiLine,
            StringDelimiters::TripleQuoted,
        ] {
            for hash in [HashComments::None, HashComments::Line, HashComments::Block] {
                for regex in [RegexLiterals::None, RegexLiterals::SingleLine, RegexLiterals::MultiLine] {
                    for c_style in [false, true] {
                        let options = LanguageOptions::default()
                            .string_delimiters(strings)
                            .hash_comments(hash)
                            .regex_literals(regex)
                            .c_style_comments(c_style)
                            .verbatim_strings(c_style)
                            .types(Pattern::new(C_TYPES))
                            .keywords(&["if,else"]);
                        assert!(Lexer::new(options.to_rule_set()).is_ok(), "{options:?}");
                    }
                }
            }
        }
    }
}
