//! The binary representation of a registry.
//!
//! bitcode is not self-describing so it gets plain structs, without the untagged
//! or skipped fields the JSON definitions rely on.

use serde::{Deserialize, Serialize};

use crate::languages::LanguageDefinition;
use crate::lexer::{Pattern, Rule, RuleSet};
use crate::style::Style;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DumpedPattern {
    source: String,
    ignore_case: bool,
}

impl From<&Pattern> for DumpedPattern {
    fn from(pattern: &Pattern) -> Self {
        Self {
            source: pattern.source().to_owned(),
            ignore_case: pattern.ignore_case(),
        }
    }
}

impl From<DumpedPattern> for Pattern {
    fn from(dumped: DumpedPattern) -> Self {
        if dumped.ignore_case {
            Pattern::ignoring_case(dumped.source)
        } else {
            Pattern::new(dumped.source)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DumpedRule {
    style: Style,
    pattern: DumpedPattern,
    context: Option<DumpedPattern>,
    shortcut: Option<String>,
}

impl From<&Rule> for DumpedRule {
    fn from(rule: &Rule) -> Self {
        Self {
            style: rule.style.clone(),
            pattern: (&rule.pattern).into(),
            context: rule.context.as_ref().map(DumpedPattern::from),
            shortcut: rule.shortcut.clone(),
        }
    }
}

impl From<DumpedRule> for Rule {
    fn from(dumped: DumpedRule) -> Self {
        Rule {
            style: dumped.style,
            pattern: dumped.pattern.into(),
            context: dumped.context.map(Pattern::from),
            shortcut: dumped.shortcut,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DumpedLanguage {
    names: Vec<String>,
    shortcuts: Vec<DumpedRule>,
    fallbacks: Vec<DumpedRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) struct Dump {
    languages: Vec<DumpedLanguage>,
}

impl Dump {
    /// Definitions without rules have nothing to dump and are skipped
    pub(crate) fn from_definitions(definitions: &[LanguageDefinition]) -> Self {
        let languages = definitions
            .iter()
            .filter_map(|definition| {
                let rules = definition.rules.as_ref()?;
                Some(DumpedLanguage {
                    names: definition.names.clone(),
                    shortcuts: rules.shortcuts.iter().map(DumpedRule::from).collect(),
                    fallbacks: rules.fallbacks.iter().map(DumpedRule::from).collect(),
                })
            })
            .collect();
        Self { languages }
    }

    pub(crate) fn into_definitions(self) -> Vec<LanguageDefinition> {
        self.languages
            .into_iter()
            .map(|language| LanguageDefinition {
                names: language.names,
                options: None,
                rules: Some(RuleSet::new(
                    language.shortcuts.into_iter().map(Rule::from).collect(),
                    language.fallbacks.into_iter().map(Rule::from).collect(),
                )),
            })
            .collect()
    }
}
