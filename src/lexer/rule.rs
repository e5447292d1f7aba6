use serde::{Deserialize, Serialize};

use crate::error::ArancioResult;
use crate::lexer::pattern::Pattern;
use crate::style::Style;

/// Associates a style with the tokens matched by a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub style: Style,
    pub pattern: Pattern,
    /// Only validated, the scanner never looks at it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Pattern>,
    /// A token starting with one of these characters is classified by this rule directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
}

impl Rule {
    pub fn new(style: impl Into<Style>, pattern: Pattern) -> Self {
        Self {
            style: style.into(),
            pattern,
            context: None,
            shortcut: None,
        }
    }

    /// A rule whose first capture group is written in the given language.
    /// An empty language name means the scanner guesses between markup and code.
    pub fn embedded(language: impl Into<String>, pattern: Pattern) -> Self {
        Self::new(Style::Embedded(language.into()), pattern)
    }

    pub fn with_shortcut(mut self, chars: impl Into<String>) -> Self {
        self.shortcut = Some(chars.into());
        self
    }

    pub fn with_context(mut self, context: Pattern) -> Self {
        self.context = Some(context);
        self
    }

    pub(crate) fn validate(&self) -> ArancioResult<()> {
        self.pattern.check_flags()?;
        if let Some(context) = &self.context {
            context.check_flags()?;
        }
        Ok(())
    }
}

/// The rules describing a language.
///
/// Every rule takes part in splitting the source into tokens, shortcuts first.
/// A token is then classified by the shortcut registered for its first character if any,
/// otherwise by the first fallback rule matching it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub shortcuts: Vec<Rule>,
    pub fallbacks: Vec<Rule>,
}

impl RuleSet {
    pub fn new(shortcuts: Vec<Rule>, fallbacks: Vec<Rule>) -> Self {
        Self {
            shortcuts,
            fallbacks,
        }
    }

    /// All rules, in the priority order used by the combined matcher
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.shortcuts.iter().chain(self.fallbacks.iter())
    }

    pub(crate) fn validate(&self) -> ArancioResult<()> {
        self.rules().try_for_each(Rule::validate)
    }
}
