use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Prefix of a style naming an embedded language, eg `lang-js`
pub const EMBEDDED_PREFIX: &str = "lang-";

/// A terminal classification for a span of source code.
///
/// The string form is the short name used by renderers, eg `kwd` for keywords.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum StyleTag {
    /// A string literal
    #[serde(rename = "str")]
    String,
    /// A keyword
    #[serde(rename = "kwd")]
    Keyword,
    /// A comment
    #[serde(rename = "com")]
    Comment,
    /// A type name
    #[serde(rename = "typ")]
    Type,
    /// A literal value, eg `1`, `null`, `true`
    #[serde(rename = "lit")]
    Literal,
    /// Punctuation
    #[serde(rename = "pun")]
    Punctuation,
    /// Plain text, the default when nothing else matches
    #[serde(rename = "pln")]
    Plain,
    /// An SGML tag
    #[serde(rename = "tag")]
    Tag,
    /// A markup declaration such as a DOCTYPE
    #[serde(rename = "dec")]
    Declaration,
    /// Embedded source that could not be handed to another language
    #[serde(rename = "src")]
    Source,
    /// An SGML attribute name
    #[serde(rename = "atn")]
    AttribName,
    /// An SGML attribute value
    #[serde(rename = "atv")]
    AttribValue,
    /// A section of markup that is not code, eg line numbers embedded in a listing
    #[serde(rename = "nocode")]
    NoCode,
}

impl StyleTag {
    pub const ALL: [StyleTag; 13] = [
        StyleTag::String,
        StyleTag::Keyword,
        StyleTag::Comment,
        StyleTag::Type,
        StyleTag::Literal,
        StyleTag::Punctuation,
        StyleTag::Plain,
        StyleTag::Tag,
        StyleTag::Declaration,
        StyleTag::Source,
        StyleTag::AttribName,
        StyleTag::AttribValue,
        StyleTag::NoCode,
    ];

    /// The short name of that tag
    pub const fn as_str(self) -> &'static str {
        match self {
            StyleTag::String => "str",
            StyleTag::Keyword => "kwd",
            StyleTag::Comment => "com",
            StyleTag::Type => "typ",
            StyleTag::Literal => "lit",
            StyleTag::Punctuation => "pun",
            StyleTag::Plain => "pln",
            StyleTag::Tag => "tag",
            StyleTag::Declaration => "dec",
            StyleTag::Source => "src",
            StyleTag::AttribName => "atn",
            StyleTag::AttribValue => "atv",
            StyleTag::NoCode => "nocode",
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| Error::InvalidStyle(s.to_owned()))
    }
}

/// What a rule assigns to the tokens it matches.
///
/// Rules written with a `lang-<name>` style are resolved to [`Style::Embedded`] once, when
/// the rule is built, so the scanner never has to look at prefixes.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Style {
    /// A plain classification
    Terminal(StyleTag),
    /// The text captured by the first group of the rule is written in that language.
    /// An empty name lets the scanner guess between markup and code.
    Embedded(String),
}

impl Style {
    pub fn is_embedded(&self) -> bool {
        matches!(self, Style::Embedded(_))
    }
}

impl From<StyleTag> for Style {
    fn from(tag: StyleTag) -> Self {
        Style::Terminal(tag)
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(language) = s.strip_prefix(EMBEDDED_PREFIX) {
            Ok(Style::Embedded(language.to_owned()))
        } else {
            s.parse().map(Style::Terminal)
        }
    }
}

impl TryFrom<String> for Style {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Style> for String {
    fn from(style: Style) -> Self {
        style.to_string()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Style::Terminal(tag) => f.write_str(tag.as_str()),
            Style::Embedded(language) => write!(f, "{EMBEDDED_PREFIX}{language}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_styles() {
        assert_eq!("kwd".parse::<Style>().unwrap(), Style::Terminal(StyleTag::Keyword));
        assert_eq!(
            "lang-js".parse::<Style>().unwrap(),
            Style::Embedded("js".to_owned())
        );
        assert_eq!(
            "lang-in.tag".parse::<Style>().unwrap(),
            Style::Embedded("in.tag".to_owned())
        );
        assert_eq!("lang-".parse::<Style>().unwrap(), Style::Embedded(String::new()));
        assert!("keyword".parse::<Style>().is_err());
    }

    #[test]
    fn style_tags_round_trip_through_their_names() {
        for tag in StyleTag::ALL {
            assert_eq!(tag.as_str().parse::<StyleTag>().unwrap(), tag);
        }
        let json = serde_json::to_string(&StyleTag::AttribValue).unwrap();
        assert_eq!(json, r#""atv""#);
    }

    #[test]
    fn styles_serialize_as_strings() {
        let style: Style = serde_json::from_str(r#""lang-css""#).unwrap();
        assert!(style.is_embedded());
        assert_eq!(serde_json::to_string(&style).unwrap(), r#""lang-css""#);
        assert!(serde_json::from_str::<Style>(r#""bold""#).is_err());
    }
}
