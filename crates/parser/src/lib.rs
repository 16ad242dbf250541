//! Go tokenizer, parser and printer.
//!
//! - Lexer uses Logos and implements Go semicolon insertion.
//! - Parser is a recursive-descent parser producing an arena tree (`ast`).
//! - Printer writes a tree back as gofmt-style source.

pub mod align;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
mod parser_support;
pub mod printer;
pub mod walk;

// Re-exports for convenience
pub use error::{Diag, LineIndex, ParseFailure, Position};
pub use lexer::Lexer;
pub use parser::{parse_file, ParsedFile};
pub use printer::print_file;
