//! Reaction chains
//!
//! A reaction is not a homogeneous item: it has a fixed set of positional parts
//! (sequence, left element, right element) read by path, plus a nested enzyme
//! collection that is flattened with the generic engine into a shared, unkeyed pool.

use crate::error::ExtractError;
use crate::melt::extractor::{path_text, resolve_key, Extraction, Extractor};
use crate::melt::subtable::{KeySource, SubTableSpec};
use crate::melt::types::{MeltConfig, Record};
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// Fixed reaction columns and the paths they are read from, relative to a reaction.
const REACTION_FIELDS: &[(&str, &str)] = &[
    ("sequence", "sequence"),
    ("left_drugbank_id", "left-element/drugbank-id"),
    ("left_name", "left-element/name"),
    ("right_drugbank_id", "right-element/drugbank-id"),
    ("right_name", "right-element/name"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionSpec {
    /// Output table for reaction rows
    pub name: String,

    /// Output table for the enzyme pool
    pub enzymes_name: String,

    pub collection: String,

    pub item: String,

    /// Enzyme collection tag inside each reaction
    pub enzymes: String,
}

impl Default for ReactionSpec {
    fn default() -> Self {
        ReactionSpec {
            name: String::from("reactions"),
            enzymes_name: String::from("reaction_enzymes"),
            collection: String::from("reactions"),
            item: String::from("reaction"),
            enzymes: String::from("enzymes"),
        }
    }
}

impl ReactionSpec {
    /// Extract `(enzyme rows, reaction rows)` for one drug.
    pub fn extract_records<N: Node>(
        &self,
        drug: &N,
        config: &MeltConfig,
    ) -> Result<(Vec<Record>, Vec<Record>), ExtractError> {
        let Some(collection) = drug.child(&self.collection) else {
            return Ok((Vec::new(), Vec::new()));
        };

        let key = config
            .key_field
            .as_deref()
            .map(|tag| resolve_key(drug, tag, config));

        let enzyme_spec =
            SubTableSpec::new(&self.enzymes_name, &self.enzymes).with_key(KeySource::Disabled);

        let mut enzymes = Vec::new();
        let mut reactions = Vec::new();
        for reaction in collection.children_by_tag(&self.item) {
            enzymes.extend(enzyme_spec.extract_records(&reaction, config)?);

            let mut record = Record::new();
            for (column, path) in REACTION_FIELDS {
                record.set(*column, path_text(&reaction, path, config));
            }
            if let Some(key) = &key {
                record = record.with_parent(key.clone());
            }
            reactions.push(record);
        }

        Ok((enzymes, reactions))
    }
}

impl Extractor for ReactionSpec {
    fn tables(&self) -> Vec<String> {
        vec![self.name.clone(), self.enzymes_name.clone()]
    }

    fn extract<N: Node>(&self, drug: N, config: &MeltConfig) -> Result<Extraction, ExtractError> {
        let (enzymes, reactions) = self.extract_records(&drug, config)?;
        Ok(Extraction {
            fragments: vec![reactions, enzymes],
            warnings: Vec::new(),
        })
    }
}
