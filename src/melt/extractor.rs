use crate::error::{ExtractError, Warning};
use crate::melt::types::{DrugKey, MeltConfig, Record};
use crate::node::Node;

/// Rows produced by one extractor for one drug.
///
/// `fragments[i]` holds the rows for the extractor's `i`-th output table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub fragments: Vec<Vec<Record>>,
    pub warnings: Vec<Warning>,
}

impl Extraction {
    /// A single-table extraction.
    pub fn single(records: Vec<Record>) -> Self {
        Extraction {
            fragments: vec![records],
            warnings: Vec::new(),
        }
    }

    /// The rows of the first output table.
    pub fn rows(&self) -> &[Record] {
        self.fragments.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A projection from one drug node to rows of one or more tables.
///
/// Implementations are pure functions of `(drug, config)`; the aggregator relies on
/// that to fan drugs out across threads.
pub trait Extractor: Sync {
    /// Names of the output tables, in the order of [`Extraction::fragments`].
    fn tables(&self) -> Vec<String>;

    fn extract<N: Node>(&self, drug: N, config: &MeltConfig) -> Result<Extraction, ExtractError>;
}

/// Read a drug's key from its key-source child. First match in document order.
pub fn resolve_key<N: Node>(drug: &N, tag: &str, config: &MeltConfig) -> Option<DrugKey> {
    drug.child(tag).map(|n| DrugKey(node_text(&n, config)))
}

/// Label used in error and warning messages for a drug.
pub fn parent_label<N: Node>(drug: &N, config: &MeltConfig) -> String {
    config
        .key_field
        .as_deref()
        .and_then(|tag| resolve_key(drug, tag, config))
        .map(|key| key.0)
        .unwrap_or_else(|| String::from("<unidentified drug>"))
}

/// Text of a node after the configured cleanup.
pub fn node_text<N: Node>(node: &N, config: &MeltConfig) -> String {
    config.text_mode.apply(node.text())
}

/// Text of a child, `None` when the child is absent.
pub fn child_text<N: Node>(node: &N, tag: &str, config: &MeltConfig) -> Option<String> {
    node.child(tag).map(|c| node_text(&c, config))
}

/// Text at a `/`-separated path below `node`, `None` when any step is absent.
pub fn path_text<N: Node>(node: &N, path: &str, config: &MeltConfig) -> Option<String> {
    node.descend(path).map(|c| node_text(&c, config))
}

/// Column name for an XML tag.
pub fn column_name(tag: &str) -> String {
    tag.replace('-', "_")
}
