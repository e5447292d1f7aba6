use std::fmt;
use std::io;

pub(crate) type ArancioResult<T> = Result<T, Error>;

/// Errors that can occur during arancio usage
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred when reading a language definition
    /// or a dump file if the `dump` feature is enabled
    Io(io::Error),

    /// JSON parsing failed when loading a language definition.
    Json(serde_json::Error),

    /// Bitcode encoding or decoding of a dump failed.
    #[cfg(feature = "dump")]
    Bitcode(bitcode::Error),

    /// A rule pattern declared a flag that only the scanner itself may use.
    /// The combined matcher scans globally on its own so `global` and `multiline`
    /// are rejected when a language is registered.
    #[allow(missing_docs)]
    ForbiddenPatternFlag { pattern: String, flag: char },

    /// A rule pattern, or the union built from all the patterns of a language,
    /// could not be compiled.
    #[allow(missing_docs)]
    InvalidPattern { pattern: String, message: String },

    /// A style string was neither a known style tag nor a `lang-` embedded language.
    InvalidStyle(String),

    /// A language definition file did not describe exactly one set of rules.
    InvalidLanguageDefinition(String),

    /// Languages can only be registered before the registry is frozen.
    RegistryFrozen,

    /// Scanning requires a frozen registry.
    RegistryNotFrozen,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "JSON parsing error: {}", err),
            #[cfg(feature = "dump")]
            Error::Bitcode(err) => write!(f, "bitcode error: {}", err),
            Error::ForbiddenPatternFlag { pattern, flag } => {
                write!(f, "pattern '{}' cannot use the '{}' flag", pattern, flag)
            }
            Error::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern '{}': {}", pattern, message)
            }
            Error::InvalidStyle(style) => write!(f, "invalid style '{}'", style),
            Error::InvalidLanguageDefinition(reason) => {
                write!(f, "invalid language definition: {}", reason)
            }
            Error::RegistryFrozen => write!(f, "cannot register a language in a frozen registry"),
            Error::RegistryNotFrozen => write!(f, "the registry must be frozen before scanning"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            #[cfg(feature = "dump")]
            Error::Bitcode(err) => Some(err),
            Error::ForbiddenPatternFlag { .. }
            | Error::InvalidPattern { .. }
            | Error::InvalidStyle(_)
            | Error::InvalidLanguageDefinition(_)
            | Error::RegistryFrozen
            | Error::RegistryNotFrozen => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

#[cfg(feature = "dump")]
impl From<bitcode::Error> for Error {
    fn from(err: bitcode::Error) -> Self {
        Error::Bitcode(err)
    }
}
