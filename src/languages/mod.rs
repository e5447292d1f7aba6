use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Registry;
use crate::error::{ArancioResult, Error};
use crate::lexer::{Pattern, Rule, RuleSet};
use crate::style::StyleTag;

mod keywords;
mod options;

use keywords::{
    ALL_KEYWORDS, COFFEE_KEYWORDS, CPP_KEYWORDS, CSHARP_KEYWORDS, JAVA_KEYWORDS,
    JSCRIPT_KEYWORDS, JSON_KEYWORDS, PERL_KEYWORDS, PYTHON_KEYWORDS, RUBY_KEYWORDS, SH_KEYWORDS,
};

pub use options::{
    C_TYPES, HashComments, LanguageOptions, REGEX_PRECEDER_PATTERN, RegexLiterals,
    StringDelimiters,
};

/// Used for embedded code that does not look like markup, and for unknown languages
pub const DEFAULT_CODE: &str = "default-code";
/// Used for embedded code starting with `<`
pub const DEFAULT_MARKUP: &str = "default-markup";

/// A language as written in a JSON file: its names and either options or rules.
///
/// ```json
/// {"names": ["sql"], "options": {"keywordList": ["select", "from"]}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDefinition {
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<LanguageOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleSet>,
}

impl LanguageDefinition {
    pub fn load_from_file(path: impl AsRef<Path>) -> ArancioResult<Self> {
        let file = File::open(path)?;
        let definition = serde_json::from_reader(&file)?;
        Ok(definition)
    }

    /// The rules of that language. Exactly one of `options` and `rules` must be set.
    pub fn rule_set(&self) -> ArancioResult<RuleSet> {
        match (&self.options, &self.rules) {
            (Some(options), None) => Ok(options.to_rule_set()),
            (None, Some(rules)) => Ok(rules.clone()),
            (Some(_), Some(_)) => Err(Error::InvalidLanguageDefinition(format!(
                "{:?} has both options and rules",
                self.names
            ))),
            (None, None) => Err(Error::InvalidLanguageDefinition(format!(
                "{:?} has neither options nor rules",
                self.names
            ))),
        }
    }
}

fn markup_rules() -> RuleSet {
    RuleSet::new(
        vec![],
        vec![
            Rule::new(StyleTag::Plain, Pattern::new("^[^<?]+")),
            Rule::new(StyleTag::Declaration, Pattern::new(r"^<!\w[^>]*(?:>|$)")),
            Rule::new(StyleTag::Comment, Pattern::new(r"^<!--[\s\S]*?(?:-->|$)")),
            // Unescaped content in an unknown language
            Rule::embedded("", Pattern::new(r"^<\?([\s\S]+?)(?:\?>|$)")),
            Rule::embedded("", Pattern::new(r"^<%([\s\S]+?)(?:%>|$)")),
            Rule::new(StyleTag::Punctuation, Pattern::new(r"^(?:<[%?]|[%?]>)")),
            Rule::embedded(
                "",
                Pattern::ignoring_case(r"^<xmp\b[^>]*>([\s\S]+?)<\/xmp\b[^>]*>"),
            ),
            Rule::embedded(
                "js",
                Pattern::ignoring_case(r"^<script\b[^>]*>([\s\S]*?)(<\/script\b[^>]*>)"),
            ),
            Rule::embedded(
                "css",
                Pattern::ignoring_case(r"^<style\b[^>]*>([\s\S]*?)(<\/style\b[^>]*>)"),
            ),
            Rule::embedded("in.tag", Pattern::ignoring_case(r"^(<\/?[a-z][^<>]*>)")),
        ],
    )
}

/// The inside of a tag: name, attributes and their values
fn tag_rules() -> RuleSet {
    RuleSet::new(
        vec![
            Rule::new(StyleTag::Plain, Pattern::new(r"^[\s]+")).with_shortcut(" \t\r\n"),
            Rule::new(StyleTag::AttribValue, Pattern::new(r#"^(?:"[^"]*"?|'[^']*'?)"#))
                .with_shortcut("\"'"),
        ],
        vec![
            Rule::new(
                StyleTag::Tag,
                Pattern::ignoring_case(r"^^<\/?[a-z](?:[\w.:-]*\w)?|\/?>$"),
            ),
            Rule::new(
                StyleTag::AttribName,
                Pattern::ignoring_case(r"^(?!style[\s=]|on)[a-z](?:[\w:-]*\w)?"),
            ),
            Rule::embedded(
                "uq.val",
                Pattern::new(r#"^=\s*([^>'"\s]*(?:[^>'"\s\/]|\/(?=\s)))"#),
            ),
            Rule::new(StyleTag::Punctuation, Pattern::new(r"^[=<>\/]+")),
            Rule::embedded("js", Pattern::ignoring_case(r#"^on\w+\s*=\s*"([^"]+)""#)),
            Rule::embedded("js", Pattern::ignoring_case(r"^on\w+\s*=\s*'([^']+)'")),
            Rule::embedded("js", Pattern::ignoring_case(r#"^on\w+\s*=\s*([^"'>\s]+)"#)),
            Rule::embedded("css", Pattern::ignoring_case(r#"^style\s*=\s*"([^"]+)""#)),
            Rule::embedded("css", Pattern::ignoring_case(r"^style\s*=\s*'([^']+)'")),
            Rule::embedded("css", Pattern::ignoring_case(r#"^style\s*=\s*([^"'>\s]+)"#)),
        ],
    )
}

/// A single rule styling everything
fn whole_text_rules(style: StyleTag) -> RuleSet {
    RuleSet::new(vec![], vec![Rule::new(style, Pattern::new(r"^[\s\S]+"))])
}

/// Registers every builtin language in the registry
pub(crate) fn register_builtins(registry: &mut Registry) -> ArancioResult<()> {
    registry.register_options(
        &[DEFAULT_CODE],
        &LanguageOptions::default()
            .keywords(ALL_KEYWORDS)
            .hash_comments(HashComments::Line)
            .c_style_comments(true)
            .string_delimiters(StringDelimiters::MultiLine)
            .regex_literals(RegexLiterals::SingleLine),
    )?;
    registry.register_language(
        &[DEFAULT_MARKUP, "htm", "html", "mxml", "xhtml", "xml", "xsl"],
        markup_rules(),
    )?;
    registry.register_language(&["in.tag"], tag_rules())?;
    registry.register_language(&["uq.val"], whole_text_rules(StyleTag::AttribValue))?;
    registry.register_options(
        &["c", "cc", "cpp", "cxx", "cyc", "m"],
        &LanguageOptions::default()
            .keywords(CPP_KEYWORDS)
            .hash_comments(HashComments::Line)
            .c_style_comments(true)
            .types(Pattern::new(C_TYPES)),
    )?;
    registry.register_options(&["json"], &LanguageOptions::default().keywords(JSON_KEYWORDS))?;
    registry.register_options(
        &["cs"],
        &LanguageOptions::default()
            .keywords(CSHARP_KEYWORDS)
            .hash_comments(HashComments::Line)
            .c_style_comments(true)
            .verbatim_strings(true)
            .types(Pattern::new(C_TYPES)),
    )?;
    registry.register_options(
        &["java"],
        &LanguageOptions::default()
            .keywords(JAVA_KEYWORDS)
            .c_style_comments(true),
    )?;
    registry.register_options(
        &["bash", "bsh", "csh", "sh"],
        &LanguageOptions::default()
            .keywords(SH_KEYWORDS)
            .hash_comments(HashComments::Line)
            .string_delimiters(StringDelimiters::MultiLine),
    )?;
    registry.register_options(
        &["cv", "py", "python"],
        &LanguageOptions::default()
            .keywords(PYTHON_KEYWORDS)
            .hash_comments(HashComments::Line)
            .string_delimiters(StringDelimiters::TripleQuoted),
    )?;
    registry.register_options(
        &["perl", "pl", "pm"],
        &LanguageOptions::default()
            .keywords(PERL_KEYWORDS)
            .hash_comments(HashComments::Line)
            .string_delimiters(StringDelimiters::MultiLine)
            .regex_literals(RegexLiterals::MultiLine),
    )?;
    registry.register_options(
        &["rb", "ruby"],
        &LanguageOptions::default()
            .keywords(RUBY_KEYWORDS)
            .hash_comments(HashComments::Line)
            .string_delimiters(StringDelimiters::MultiLine)
            .regex_literals(RegexLiterals::SingleLine),
    )?;
    registry.register_options(
        &["javascript", "js", "ts", "typescript"],
        &LanguageOptions::default()
            .keywords(JSCRIPT_KEYWORDS)
            .c_style_comments(true)
            .regex_literals(RegexLiterals::SingleLine),
    )?;
    registry.register_options(
        &["coffee"],
        &LanguageOptions::default()
            .keywords(COFFEE_KEYWORDS)
            .hash_comments(HashComments::Block)
            .c_style_comments(true)
            .string_delimiters(StringDelimiters::TripleQuoted)
            .regex_literals(RegexLiterals::SingleLine),
    )?;
    registry.register_language(&["regex"], whole_text_rules(StyleTag::String))?;

    Ok(())
}
