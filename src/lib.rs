mod decorations;
#[cfg(feature = "dump")]
mod dump;
mod error;
mod languages;
mod lexer;
mod registry;
mod renderers;
mod style;
mod tokenizer;

pub use decorations::{Decoration, simplify, spans};
pub use error::Error;
pub use languages::{
    C_TYPES, DEFAULT_CODE, DEFAULT_MARKUP, HashComments, LanguageDefinition, LanguageOptions,
    REGEX_PRECEDER_PATTERN, RegexLiterals, StringDelimiters,
};
pub use lexer::{CombinedMatcher, Lexer, Pattern, Rule, RuleSet, Tokens};
pub use registry::Registry;
pub use renderers::{Options, html::HtmlRenderer};
pub use style::{EMBEDDED_PREFIX, Style, StyleTag};
pub use tokenizer::MAX_EMBEDDING_DEPTH;

/// A default stylesheet for the HTML renderer without class prefix
pub const ARANCIO_CSS: &str = r#".arancio-l {
  display: block;
}
.arancio-ln {
  display: inline-block;
  user-select: none;
  white-space: pre;
  margin-right: 0.4em;
  min-width: 3ch;
  text-align: right;
  opacity: 0.8;
}
.arancio .str, .arancio .atv { color: #080; }
.arancio .kwd, .arancio .tag { color: #008; }
.arancio .com { color: #800; }
.arancio .typ, .arancio .atn, .arancio .dec { color: #606; }
.arancio .lit { color: #066; }
.arancio .pun { color: #660; }
.arancio .pln { color: #000; }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(lang: &str, source: &str) -> Vec<(String, StyleTag)> {
        let registry = Registry::builtin().unwrap();
        let decorations = registry.scan(lang, source, 0).unwrap();
        spans(&decorations, source.len())
            .map(|(range, style)| (source[range].to_owned(), style))
            .collect()
    }

    fn spans_of(expected: &[(&str, StyleTag)]) -> Vec<(String, StyleTag)> {
        expected
            .iter()
            .map(|(text, style)| ((*text).to_owned(), *style))
            .collect()
    }

    #[test]
    fn registry_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }

    #[test]
    fn can_scan_c() {
        assert_eq!(
            scan("c", "int x = 42; // answer"),
            spans_of(&[
                ("int", StyleTag::Type),
                (" x ", StyleTag::Plain),
                ("=", StyleTag::Punctuation),
                (" ", StyleTag::Plain),
                ("42", StyleTag::Literal),
                (";", StyleTag::Punctuation),
                (" ", StyleTag::Plain),
                ("// answer", StyleTag::Comment),
            ])
        );
    }

    #[test]
    fn can_scan_python_strings_and_comments() {
        assert_eq!(
            scan("py", "def f():\n    return '''a\nb''' # done"),
            spans_of(&[
                ("def", StyleTag::Keyword),
                (" f", StyleTag::Plain),
                ("():", StyleTag::Punctuation),
                ("\n    ", StyleTag::Plain),
                ("return", StyleTag::Keyword),
                (" ", StyleTag::Plain),
                ("'''a\nb'''", StyleTag::String),
                (" ", StyleTag::Plain),
                ("# done", StyleTag::Comment),
            ])
        );
    }

    #[test]
    fn can_scan_markup_with_embedded_script() {
        assert_eq!(
            scan("html", "<script>var a;</script>"),
            spans_of(&[
                ("<script>", StyleTag::Tag),
                ("var", StyleTag::Keyword),
                (" a", StyleTag::Plain),
                (";", StyleTag::Punctuation),
                ("</script>", StyleTag::Tag),
            ])
        );
    }

    #[test]
    fn can_scan_tag_attributes() {
        assert_eq!(
            scan("html", r#"<a href="x">y</a>"#),
            spans_of(&[
                ("<a", StyleTag::Tag),
                (" ", StyleTag::Plain),
                ("href", StyleTag::AttribName),
                ("=", StyleTag::Punctuation),
                (r#""x""#, StyleTag::AttribValue),
                (">", StyleTag::Tag),
                ("y", StyleTag::Plain),
                ("</a>", StyleTag::Tag),
            ])
        );
    }

    #[test]
    fn unknown_languages_are_guessed() {
        assert_eq!(scan("nope", "<b>x</b>"), scan("html", "<b>x</b>"));
        assert_eq!(scan("nope", "if (a)"), scan(DEFAULT_CODE, "if (a)"));
    }

    const SAMPLES: &[(&str, &str)] = &[
        ("c", "#include <stdio.h>\nint main() { printf(\"%d\\n\", 0x1F); /* done */ }"),
        ("js", "var re = /a[/]b/g; x = y / 2; // why\n`multi\nline`"),
        ("py", "class A:\n    '''doc\n    ''' # c\n    x = @deco"),
        ("coffee", "### block\ncomment ###\nsquare = (x) -> x * x"),
        ("html", "<!DOCTYPE html><p style='color: red' onclick=go()>h&eacute;llo</p><?php echo 1 ?>"),
        ("nope", "   <div>plain guess</div>"),
        ("json", "{\"a\": [true, null, 1.5e3]}"),
        ("sh", r#"echo \"not a string # really\""#),
        ("c", ""),
    ];

    #[test]
    fn decorations_cover_the_source_in_order() {
        let registry = Registry::builtin().unwrap();
        for &(lang, source) in SAMPLES {
            let decorations = registry.scan(lang, source, 7).unwrap();
            if source.is_empty() {
                assert!(decorations.is_empty());
                continue;
            }
            assert_eq!(decorations[0].position, 7, "{lang}: {source:?}");
            for pair in decorations.windows(2) {
                assert!(pair[0].position < pair[1].position, "{lang}: {source:?}");
                assert_ne!(pair[0].style, pair[1].style, "{lang}: {source:?}");
            }
            assert!(decorations.last().unwrap().position < 7 + source.len());
        }
    }

    #[test]
    fn simplifying_scanned_decorations_changes_nothing() {
        let registry = Registry::builtin().unwrap();
        for &(lang, source) in SAMPLES {
            let decorations = registry.scan(lang, source, 0).unwrap();
            let mut again = decorations.clone();
            simplify(&mut again, source.len());
            assert_eq!(again, decorations, "{lang}: {source:?}");
        }
    }

    #[test]
    fn union_tokens_partition_the_text() {
        let registry = Registry::builtin().unwrap();
        for &(lang, source) in SAMPLES {
            let Some(lexer) = registry.lexer(lang) else {
                continue;
            };
            let mut position = 0;
            for range in lexer.matcher().tokens(source) {
                assert_eq!(range.start, position, "{lang}: {source:?}");
                assert!(range.end > range.start);
                position = range.end;
            }
            assert_eq!(position, source.len());
        }
    }

    #[test]
    fn regex_literals_are_told_apart_from_divisions() {
        assert_eq!(
            scan("js", "x = /a+/;"),
            spans_of(&[
                ("x ", StyleTag::Plain),
                ("=", StyleTag::Punctuation),
                (" ", StyleTag::Plain),
                ("/a+/", StyleTag::String),
                (";", StyleTag::Punctuation),
            ])
        );
        assert_eq!(
            scan("js", "x = 4 / 2"),
            spans_of(&[
                ("x ", StyleTag::Plain),
                ("=", StyleTag::Punctuation),
                (" ", StyleTag::Plain),
                ("4", StyleTag::Literal),
                (" ", StyleTag::Plain),
                ("/", StyleTag::Punctuation),
                (" ", StyleTag::Plain),
                ("2", StyleTag::Literal),
            ])
        );
    }

    fn markup_registry() -> Registry {
        let mut registry = Registry::default();
        registry
            .register_language(
                &["markup"],
                RuleSet::new(
                    vec![],
                    vec![
                        Rule::embedded("code", Pattern::new(r"^<script>([\s\S]*?)<\/script>")),
                        Rule::new(StyleTag::Tag, Pattern::new(r"^<\/?\w+>")),
                    ],
                ),
            )
            .unwrap();
        registry
            .register_language(
                &["code"],
                RuleSet::new(
                    vec![Rule::new(StyleTag::String, Pattern::new(r#"^(?:'[^']*'?|"[^"]*"?)"#))
                        .with_shortcut("'\"")],
                    vec![
                        Rule::new(StyleTag::Comment, Pattern::new(r"^\/\/[^\r\n]*")),
                        Rule::new(StyleTag::Keyword, Pattern::new(r"^\w+")),
                    ],
                ),
            )
            .unwrap();
        registry
            .register_language(
                &["prose"],
                RuleSet::new(
                    vec![Rule::new(StyleTag::String, Pattern::new(r#"^(?:'[^']*'?|"[^"]*"?)"#))
                        .with_shortcut("'\"")],
                    vec![
                        Rule::new(StyleTag::Comment, Pattern::new(r"^\/\/[^\r\n]*")),
                        Rule::new(StyleTag::Plain, Pattern::new(r"^\w+")),
                    ],
                ),
            )
            .unwrap();
        registry.freeze();
        registry
    }

    #[test]
    fn unmatched_chars_are_plain() {
        let registry = markup_registry();
        assert_eq!(
            registry.scan("code", "a // b", 0).unwrap(),
            vec![
                Decoration::new(0, StyleTag::Keyword),
                Decoration::new(1, StyleTag::Plain),
                Decoration::new(2, StyleTag::Comment),
            ]
        );
    }

    #[test]
    fn plain_words_then_comment() {
        let registry = markup_registry();
        assert_eq!(
            registry.scan("prose", "a // b", 0).unwrap(),
            vec![
                Decoration::new(0, StyleTag::Plain),
                Decoration::new(2, StyleTag::Comment),
            ]
        );
    }

    #[test]
    fn embedded_body_is_scanned_with_its_language() {
        let registry = markup_registry();
        assert_eq!(
            registry.scan("markup", "<script>x</script>", 0).unwrap(),
            vec![
                Decoration::new(0, StyleTag::Tag),
                Decoration::new(8, StyleTag::Keyword),
                Decoration::new(9, StyleTag::Tag),
            ]
        );
    }

    #[test]
    fn empty_embedded_body_is_source() {
        let registry = markup_registry();
        assert_eq!(
            registry.scan("markup", "<script></script>", 0).unwrap(),
            vec![Decoration::new(0, StyleTag::Source)]
        );
    }

    #[test]
    fn whitespace_only_is_one_plain_span() {
        let registry = Registry::builtin().unwrap();
        for lang in ["js", "html", "py", "nope"] {
            assert_eq!(
                registry.scan(lang, "  \n\t ", 0).unwrap(),
                vec![Decoration::new(0, StyleTag::Plain)],
                "{lang}"
            );
        }
    }
}
