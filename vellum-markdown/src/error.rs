use serde::Deserialize;

/// Reader errors.
///
/// The Markdown reader degrades to literal text rather than failing, so
/// these only surface when the grammar machinery itself reaches a state it
/// cannot represent (which well-formed UTF-8 input does not trigger).
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Deserialize)]
pub enum Error {
    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("PEG parsing error: {0}")]
    #[serde(skip_deserializing)]
    ParseGrammar(#[from] peg::error::ParseError<peg::str::LineCol>),
}
