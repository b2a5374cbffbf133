//! Homogeneous sub-table extraction ("one for all")
//!
//! Given a drug, a collection tag and optionally a nested sub-collection tag, every
//! element child of the resolved collection becomes one row. Fields are derived from
//! the item itself, so the same code serves groups, synonyms, products, patents and
//! every other "repeated children under a named parent" structure.
//!
//! A collection that does not resolve is the common case across a heterogeneous
//! corpus and yields zero rows.

use crate::error::ExtractError;
use crate::melt::extractor::{column_name, node_text, parent_label, resolve_key, Extraction, Extractor};
use crate::melt::types::{MeltConfig, Record, PARENT_KEY};
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// Field holding the content of a pure-text item.
pub const TEXT_FIELD: &str = "text";

/// Where a sub-table's `parent_key` comes from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// The configured `key_field`. Behaves like `Disabled` when that is unset.
    #[default]
    Default,
    /// A specific child tag of the drug.
    Tag(String),
    /// No `parent_key` column at all.
    Disabled,
}

impl KeySource {
    fn tag<'c>(&'c self, config: &'c MeltConfig) -> Option<&'c str> {
        match self {
            KeySource::Default => config.key_field.as_deref(),
            KeySource::Tag(tag) => Some(tag.as_str()),
            KeySource::Disabled => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTableSpec {
    /// Output table name
    pub name: String,

    /// Tag of the collection node under the drug
    pub collection: String,

    /// Tag of a nested collection under `collection`, if the items live one level deeper
    #[serde(default)]
    pub sub_collection: Option<String>,

    #[serde(default)]
    pub key: KeySource,

    /// Child tags of an item that are not turned into fields
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl SubTableSpec {
    pub fn new(name: &str, collection: &str) -> Self {
        SubTableSpec {
            name: name.to_string(),
            collection: collection.to_string(),
            sub_collection: None,
            key: KeySource::Default,
            exclude: Vec::new(),
        }
    }

    pub fn nested(name: &str, collection: &str, sub_collection: &str) -> Self {
        SubTableSpec {
            sub_collection: Some(sub_collection.to_string()),
            ..SubTableSpec::new(name, collection)
        }
    }

    pub fn with_key(mut self, key: KeySource) -> Self {
        self.key = key;
        self
    }

    pub fn excluding(mut self, tags: &[&str]) -> Self {
        self.exclude = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Extract one record per item under `parent`.
    ///
    /// The key, when enabled, is read from `parent` itself, never from an item.
    pub fn extract_records<N: Node>(
        &self,
        parent: &N,
        config: &MeltConfig,
    ) -> Result<Vec<Record>, ExtractError> {
        let Some((collection, path)) = self.resolve(parent) else {
            return Ok(Vec::new());
        };

        check_items_container(parent, &collection, &path, config)?;

        let key_tag = self.key.tag(config);
        let key = key_tag.and_then(|tag| resolve_key(parent, tag, config));

        let mut records = Vec::new();
        for (idx, item) in collection.children().iter().enumerate() {
            let mut record = self.flatten_item(parent, item, &path, idx, config)?;
            if key_tag.is_some() {
                record = record.with_parent(key.clone());
            }
            records.push(record);
        }

        Ok(records)
    }

    /// Resolve `parent → collection [→ sub_collection]`, with the path walked so far.
    fn resolve<N: Node>(&self, parent: &N) -> Option<(N, String)> {
        let mut node = parent.child(&self.collection)?;
        let mut path = format!("{}/{}", parent.name(), self.collection);
        if let Some(sub) = &self.sub_collection {
            node = node.child(sub)?;
            path.push('/');
            path.push_str(sub);
        }
        Some((node, path))
    }

    fn flatten_item<N: Node>(
        &self,
        parent: &N,
        item: &N,
        collection_path: &str,
        idx: usize,
        config: &MeltConfig,
    ) -> Result<Record, ExtractError> {
        let children = item.children();
        let mut record = Record::new();

        if children.is_empty() {
            record.set(TEXT_FIELD, Some(node_text(item, config)));
        } else {
            if item.has_own_text() {
                return Err(ExtractError::Structure {
                    parent: parent_label(parent, config),
                    path: format!("{}/{}[{}]", collection_path, item.name(), idx + 1),
                    detail: String::from("mixes text with child elements"),
                });
            }
            for child in &children {
                if self.exclude.iter().any(|t| t == child.name()) {
                    continue;
                }
                record.set_if_absent(field_column(child.name()), Some(node_text(child, config)));
            }
        }

        flatten_attributes(item, &mut record);
        Ok(record)
    }
}

impl Extractor for SubTableSpec {
    fn tables(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn extract<N: Node>(&self, drug: N, config: &MeltConfig) -> Result<Extraction, ExtractError> {
        self.extract_records(&drug, config).map(Extraction::single)
    }
}

/// Reject collection nodes that cannot be read as a list of repeated items.
fn check_items_container<N: Node>(
    parent: &N,
    collection: &N,
    path: &str,
    config: &MeltConfig,
) -> Result<(), ExtractError> {
    if !collection.has_own_text() {
        return Ok(());
    }
    let detail = if collection.children().is_empty() {
        "holds text instead of repeated items"
    } else {
        "mixes text with repeated items"
    };
    Err(ExtractError::Structure {
        parent: parent_label(parent, config),
        path: path.to_string(),
        detail: detail.to_string(),
    })
}

/// Item attributes never shadow a field derived from a child element.
fn flatten_attributes<N: Node>(item: &N, record: &mut Record) {
    for (name, value) in item.attributes() {
        record.set_if_absent(field_column(name), Some(value.to_string()));
    }
}

/// Column for an item child or attribute. `parent_key` is reserved for the link column.
fn field_column(tag: &str) -> String {
    let column = column_name(tag);
    if column == PARENT_KEY {
        format!("item_{column}")
    } else {
        column
    }
}
