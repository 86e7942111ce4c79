//! Query document loading and source positions.
//!
//! Lexing and parsing of the query language is delegated to the
//! [`graphql_parser`] crate; this module only translates its syntax tree into
//! the [`ast`](crate::ast) the executor walks.

mod document;
mod utils;

use derive_more::with_trait::{Display, Error};

pub use self::{
    document::parse_document_source,
    utils::{SourcePosition, Spanning},
};

/// Error while loading a query document.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// The source is not a syntactically valid GraphQL document.
    #[display("{_0}")]
    Syntax(#[error(not(source))] String),

    /// The document defines two fragments with the same name.
    #[display("There can be only one fragment named \"{_0}\"")]
    DuplicateFragment(#[error(not(source))] String),
}
