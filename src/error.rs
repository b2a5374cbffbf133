use thiserror::Error;

/// A per-drug failure raised by an extractor.
///
/// `parent` is the drug's key (or a placeholder when the key-source child is missing or
/// keys are disabled) so a failed run always points at a record and a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A scalar value could not be converted to its declared type.
    #[error("{parent}: field `{field}` has malformed value {raw:?}: {reason}")]
    Format {
        parent: String,
        field: String,
        raw: String,
        reason: String,
    },

    /// A resolved node does not have the shape the extractor expects.
    #[error("{parent}: node `{path}` {detail}")]
    Structure {
        parent: String,
        path: String,
        detail: String,
    },
}

/// Errors that stop a whole run.
#[derive(Debug, Error)]
pub enum MeltError {
    #[error("failed to parse XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A per-drug failure under the abort policy. `index` is the drug's position in
    /// document order.
    #[error("drug #{index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: ExtractError,
    },

    #[error("extraction cancelled after {completed} drugs")]
    Cancelled { completed: usize },

    #[error("invalid plan: {0}")]
    Plan(String),
}

/// Non-fatal conditions. The affected row is still emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    /// A fixed-width positional extractor saw more positions than configured.
    #[error("{parent}: `{path}` has {found} levels, kept the first {kept}")]
    Truncation {
        parent: String,
        path: String,
        found: usize,
        kept: usize,
    },

    /// A malformed value was replaced by null under the null format policy.
    #[error("{parent}: field `{field}` nulled, malformed value {raw:?}")]
    NulledField {
        parent: String,
        field: String,
        raw: String,
    },
}

/// A per-drug failure kept aside under the collect policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("drug #{index} in `{table}`: {source}")]
pub struct RecordError {
    pub index: usize,
    pub table: String,
    #[source]
    pub source: ExtractError,
}
