//! Extraction errors.

use thiserror::Error;

/// Why a document could not be normalized.
///
/// Only whole-document problems are errors; once a document carries a
/// recognized top-level section, missing sections are treated as empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Report document must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error(
        "Report document has none of the sections `factors`, `measures`, `productFactors` or `edges`"
    )]
    UnrecognizedShape,
}
