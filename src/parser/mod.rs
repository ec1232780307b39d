//! Thor file parsing functionality

mod document_parser;
mod experiment_parser;
mod frame_parser;

// Re-export the parsing functions
pub use document_parser::{parse_document, write_document};
pub use experiment_parser::decode_metadata;
pub use frame_parser::parse_pixels;
