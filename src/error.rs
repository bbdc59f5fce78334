//! Error types for mathprose operations.

use thiserror::Error;

/// Errors that can occur while turning MathML into a description.
#[derive(Error, Debug)]
pub enum Error {
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid MathML: {0}")]
    InvalidMathml(String),
}

pub type Result<T> = std::result::Result<T, Error>;
