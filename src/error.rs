//! Error types for the danfe library.

use std::io;
use thiserror::Error;

/// Result type alias for danfe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting fields or rendering a DANFE.
///
/// Only two conditions are fatal: the input cannot be parsed at all
/// ([`Error::Parse`]), or the finished page cannot be serialized
/// ([`Error::Render`]). Everything else (missing sections, absent optional
/// fields, an access key the barcode encoder rejects) degrades to blank
/// output inside a successful render.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not well-formed XML, or no `infNFe` section exists.
    /// No document is produced.
    #[error("could not process the document for rendering: {0}")]
    Parse(String),

    /// The finished layout could not be serialized to PDF bytes.
    #[error("rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
