use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use onig::{Regex, Region, SearchOptions};

use crate::error::ArancioResult;
use crate::style::{Style, StyleTag};

mod charset;
mod pattern;
mod rule;
mod union;

pub use pattern::Pattern;
pub use rule::{Rule, RuleSet};
pub use union::{CombinedMatcher, Tokens};

/// What a lexer decided a token is
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Classification<'l> {
    Terminal(StyleTag),
    /// The `group` range of the token is written in `language`
    Embedded {
        language: &'l str,
        group: Range<usize>,
    },
}

/// A compiled [`RuleSet`]: everything needed to scan text.
pub struct Lexer {
    rules: RuleSet,
    matcher: CombinedMatcher,
    /// One regex per rule, shortcuts first
    regexes: Vec<Regex>,
    /// first char of a token -> index of the rule classifying it
    shortcuts: HashMap<char, usize>,
}

impl Lexer {
    /// Compiles the rules. Fails if any pattern uses a forbidden flag or does not compile.
    pub fn new(rules: RuleSet) -> ArancioResult<Self> {
        rules.validate()?;
        let matcher = CombinedMatcher::new(rules.rules().map(|rule| &rule.pattern))?;
        let regexes = rules
            .rules()
            .map(|rule| rule.pattern.compile())
            .collect::<ArancioResult<Vec<_>>>()?;

        let mut shortcuts = HashMap::new();
        for (idx, rule) in rules.rules().enumerate() {
            for c in rule.shortcut.iter().flat_map(|chars| chars.chars()) {
                // Later rules take over the chars of earlier ones
                shortcuts.insert(c, idx);
            }
        }

        Ok(Self {
            rules,
            matcher,
            regexes,
            shortcuts,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn matcher(&self) -> &CombinedMatcher {
        &self.matcher
    }

    fn rule(&self, idx: usize) -> &Rule {
        let shortcuts = self.rules.shortcuts.len();
        if idx < shortcuts {
            &self.rules.shortcuts[idx]
        } else {
            &self.rules.fallbacks[idx - shortcuts]
        }
    }

    /// Runs the pattern of the given rule on the token alone
    fn search(&self, idx: usize, token: &str) -> Option<Region> {
        let mut region = Region::new();
        self.regexes[idx]
            .search_with_options(
                token,
                0,
                token.len(),
                SearchOptions::SEARCH_OPTION_NONE,
                Some(&mut region),
            )
            .map(|_| region)
    }

    /// Picks the style of a token: the shortcut rule of its first char if there is one,
    /// otherwise the first fallback rule matching it, otherwise plain.
    pub(crate) fn classify(&self, token: &str) -> Classification<'_> {
        let shortcut = token.chars().next().and_then(|c| self.shortcuts.get(&c));
        let (idx, region) = match shortcut {
            Some(&idx) => (idx, self.search(idx, token)),
            None => {
                let first_fallback = self.rules.shortcuts.len();
                let found = (first_fallback..self.regexes.len())
                    .find_map(|idx| self.search(idx, token).map(|region| (idx, region)));
                match found {
                    Some((idx, region)) => (idx, Some(region)),
                    None => return Classification::Terminal(StyleTag::Plain),
                }
            }
        };

        match &self.rule(idx).style {
            Style::Terminal(tag) => Classification::Terminal(*tag),
            Style::Embedded(language) => match region.as_ref().and_then(|r| r.pos(1)) {
                Some((start, end)) if end > start => Classification::Embedded {
                    language,
                    group: start..end,
                },
                // Nothing to hand over to the embedded language
                _ => Classification::Terminal(StyleTag::Source),
            },
        }
    }
}

impl fmt::Debug for Lexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("rules", &self.rules)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer() -> Lexer {
        let rules = RuleSet::new(
            vec![
                Rule::new(StyleTag::Plain, Pattern::new(r"^\s+")).with_shortcut(" \t\n"),
                Rule::new(StyleTag::String, Pattern::new(r#"^"[^"]*"?"#)).with_shortcut("\""),
            ],
            vec![
                Rule::new(StyleTag::Keyword, Pattern::new(r"^(?:if|else)\b")),
                Rule::embedded("css", Pattern::new(r"^<style>([\s\S]*?)<\/style>")),
                Rule::new(StyleTag::Literal, Pattern::new(r"^\d+")),
                Rule::new(StyleTag::Plain, Pattern::new(r"^[a-z]+")),
            ],
        );
        Lexer::new(rules).unwrap()
    }

    #[test]
    fn classifies_with_shortcuts_first() {
        let lexer = lexer();
        assert_eq!(lexer.classify("  "), Classification::Terminal(StyleTag::Plain));
        assert_eq!(lexer.classify(r#""if""#), Classification::Terminal(StyleTag::String));
        assert_eq!(lexer.classify("if"), Classification::Terminal(StyleTag::Keyword));
        assert_eq!(lexer.classify("42"), Classification::Terminal(StyleTag::Literal));
        assert_eq!(lexer.classify("+"), Classification::Terminal(StyleTag::Plain));
    }

    #[test]
    fn later_shortcuts_win() {
        let rules = RuleSet::new(
            vec![
                Rule::new(StyleTag::Plain, Pattern::new(r"^\s+")).with_shortcut(" #"),
                Rule::new(StyleTag::Comment, Pattern::new(r"^#.*")).with_shortcut("#"),
            ],
            vec![],
        );
        let lexer = Lexer::new(rules).unwrap();
        assert_eq!(lexer.classify("# hi"), Classification::Terminal(StyleTag::Comment));
    }

    #[test]
    fn reports_embedded_group() {
        let lexer = lexer();
        assert_eq!(
            lexer.classify("<style>a{}</style>"),
            Classification::Embedded {
                language: "css",
                group: 7..10
            }
        );
        assert_eq!(
            lexer.classify("<style></style>"),
            Classification::Terminal(StyleTag::Source)
        );
    }

    #[test]
    fn rejects_bad_patterns() {
        let rules = RuleSet::new(vec![], vec![Rule::new(StyleTag::Plain, Pattern::new("^(a"))]);
        assert!(Lexer::new(rules).is_err());
    }

    /// Tries every rule on its own, in priority order, at the start of `rest`
    fn first_matching_style(lexer: &Lexer, rest: &str) -> Style {
        lexer
            .rules
            .rules()
            .zip(&lexer.regexes)
            .find(|(_, regex)| {
                regex
                    .match_with_options(rest, 0, SearchOptions::SEARCH_OPTION_NONE, None)
                    .is_some_and(|len| len > 0)
            })
            .map_or(Style::Terminal(StyleTag::Plain), |(rule, _)| rule.style.clone())
    }

    fn style_of(classification: Classification<'_>) -> Style {
        match classification {
            Classification::Terminal(tag) => Style::Terminal(tag),
            Classification::Embedded { language, .. } => Style::Embedded(language.to_owned()),
        }
    }

    #[test]
    fn union_agrees_with_rules_tried_one_by_one() {
        let registry = crate::Registry::builtin().unwrap();
        let corpus = [
            ("default-code", "if (x) { return 42; } // done"),
            ("default-code", "#include <stdio.h>\nint main() { printf(\"hi\"); }"),
            ("default-code", "while (a < 10) a += 1.5e3; /* block */ x = 'c';"),
            ("default-code", "class Foo extends Bar { let s = `tpl`; }"),
            ("html", "<p class=\"a\">Hello &amp; bye</p>"),
            ("html", "<!DOCTYPE html>\n<!-- note --><br/>"),
            ("html", "<script>var a = 1;</script><style>p { }</style>"),
            ("in.tag", "<a href=\"x\" title='y' id=z>"),
        ];

        for (lang, text) in corpus {
            let lexer = registry.lexer(lang).unwrap();
            for range in lexer.matcher().tokens(text) {
                let token = &text[range.clone()];
                let expected = first_matching_style(lexer, &text[range.start..]);
                assert_eq!(
                    style_of(lexer.classify(token)),
                    expected,
                    "{lang}: {token:?} in {text:?}"
                );

                let shortcut = token.chars().next().and_then(|c| lexer.shortcuts.get(&c));
                if let Some(&idx) = shortcut {
                    assert_eq!(lexer.rule(idx).style, expected, "{lang}: {token:?} in {text:?}");
                }
            }
        }
    }
}
