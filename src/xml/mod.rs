//! XML access and NF-e field extraction.

pub mod accessor;
mod extractor;

pub use extractor::{extract_fields, extract_from_document};
