use std::fmt;

use onig::{Regex, RegexOptions, Syntax};
use serde::{Deserialize, Serialize};

use crate::error::{ArancioResult, Error};

/// Compiles a pattern with the syntax every arancio pattern is written in.
///
/// Java syntax is the closest Oniguruma gets to JavaScript regexes (`\uXXXX`, `\xXX`,
/// lookaheads) and single-line mode makes `^`/`$` match at the ends of the text only.
pub(crate) fn compile_regex(source: &str, options: RegexOptions) -> ArancioResult<Regex> {
    Regex::with_options(
        source,
        options | RegexOptions::REGEX_OPTION_SINGLELINE,
        Syntax::java(),
    )
    .map_err(|e| Error::InvalidPattern {
        pattern: source.to_owned(),
        message: e.to_string(),
    })
}

/// A regex written for a rule, along with the flags it was declared with.
///
/// Patterns must match prefixes of the text they are given, so they usually start with `^`.
/// `global` and `multiline` exist only so that a language declaring them can be rejected:
/// the scanner does the global scanning itself.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawPattern", rename_all = "camelCase")]
pub struct Pattern {
    source: String,
    #[serde(skip_serializing_if = "is_false")]
    ignore_case: bool,
    #[serde(skip_serializing_if = "is_false")]
    global: bool,
    #[serde(skip_serializing_if = "is_false")]
    multiline: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Patterns can be written either as a bare string or as an object with flags
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPattern {
    Source(String),
    #[serde(rename_all = "camelCase")]
    WithFlags {
        source: String,
        #[serde(default)]
        ignore_case: bool,
        #[serde(default)]
        global: bool,
        #[serde(default)]
        multiline: bool,
    },
}

impl From<RawPattern> for Pattern {
    fn from(raw: RawPattern) -> Self {
        match raw {
            RawPattern::Source(source) => Pattern::new(source),
            RawPattern::WithFlags {
                source,
                ignore_case,
                global,
                multiline,
            } => Pattern {
                source,
                ignore_case,
                global,
                multiline,
            },
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/{}/", self.source)?;
        for (set, flag) in [(self.global, 'g'), (self.ignore_case, 'i'), (self.multiline, 'm')] {
            if set {
                write!(f, "{flag}")?;
            }
        }
        Ok(())
    }
}

impl Pattern {
    /// A case-sensitive pattern
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ignore_case: false,
            global: false,
            multiline: false,
        }
    }

    /// A case-insensitive pattern
    pub fn ignoring_case(source: impl Into<String>) -> Self {
        Self {
            ignore_case: true,
            ..Self::new(source)
        }
    }

    /// A pattern with JavaScript style flags, eg `"i"`.
    /// Only `i`, `g` and `m` are known.
    pub fn with_flags(source: impl Into<String>, flags: &str) -> ArancioResult<Self> {
        let mut pattern = Self::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => pattern.ignore_case = true,
                'g' => pattern.global = true,
                'm' => pattern.multiline = true,
                _ => {
                    return Err(Error::InvalidPattern {
                        pattern: pattern.source,
                        message: format!("unknown flag '{flag}'"),
                    });
                }
            }
        }
        Ok(pattern)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Errors if the pattern declares a flag reserved to the scanner
    pub(crate) fn check_flags(&self) -> ArancioResult<()> {
        let forbidden = if self.global {
            Some('g')
        } else if self.multiline {
            Some('m')
        } else {
            None
        };
        match forbidden {
            Some(flag) => Err(Error::ForbiddenPatternFlag {
                pattern: self.source.clone(),
                flag,
            }),
            None => Ok(()),
        }
    }

    /// Compiles this pattern on its own, as used to classify a token
    pub(crate) fn compile(&self) -> ArancioResult<Regex> {
        self.check_flags()?;
        let options = if self.ignore_case {
            RegexOptions::REGEX_OPTION_IGNORECASE
        } else {
            RegexOptions::REGEX_OPTION_NONE
        };
        compile_regex(&self.source, options)
    }
}
