//! Error types for entitle operations.

use thiserror::Error;

/// Errors that can occur while deriving titles and identifiers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("no heading (h2-h6) found in document")]
    NoHeadingFound,

    #[error("no <title> element to update")]
    NoTitleElement,

    #[error("malformed Roman numeral: {0:?}")]
    MalformedRomanNumeral(String),

    #[error("unrecognized heading structure")]
    UnrecognizedHeadingStructure,

    #[error("invalid package document: {0}")]
    InvalidOpf(String),
}

pub type Result<T> = std::result::Result<T, Error>;
