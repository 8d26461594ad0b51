//! Run-aborting error taxonomy.
//!
//! Every class aborts the whole run before anything lands in the output
//! directory; none are retried. Each class maps to its own process exit
//! status so callers can tell them apart without parsing messages.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An option combination is invalid. Detected before anything is parsed.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The document is structurally invalid. Carries every message the
    /// parser produced, never just the first.
    #[error("contract failed to parse:\n{}", messages.join("\n"))]
    ContractParse { messages: Vec<String> },

    /// The document is valid but uses a construct this pipeline does not
    /// model (composition keywords, null type, wildcard status codes, ...).
    #[error("unsupported construct at {location}: {construct}")]
    NotSupported { location: String, construct: String },

    /// Two distinct schema identities folded to the same type name and no
    /// disambiguation candidate was left.
    #[error("naming collision: `{name}` synthesized for both {first} and {second}")]
    NamingCollision {
        name: String,
        first: String,
        second: String,
    },

    /// The all-in-one contract writer failed on an otherwise valid document.
    #[error("contract serialization failed: {0}")]
    Serialization(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Distinct, stable exit status per taxonomy class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Io(_) => 1,
            Error::Configuration(_) => 2,
            Error::ContractParse { .. } => 3,
            Error::NotSupported { .. } => 4,
            Error::NamingCollision { .. } => 5,
            Error::Serialization(_) => 6,
        }
    }

    pub fn not_supported(location: impl Into<String>, construct: impl Into<String>) -> Self {
        Error::NotSupported {
            location: location.into(),
            construct: construct.into(),
        }
    }
}
