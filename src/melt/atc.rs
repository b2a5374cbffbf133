//! ATC classification codes
//!
//! Each code carries an ordered chain of `level` children, most specific first. The
//! chain is encoded as fixed positional column pairs so the table stays flat.

use crate::error::{ExtractError, Warning};
use crate::melt::extractor::{node_text, parent_label, resolve_key, Extraction, Extractor};
use crate::melt::types::{MeltConfig, Record};
use crate::node::Node;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtcSpec {
    pub name: String,
    pub collection: String,
    pub item: String,
    pub level: String,
    /// Attribute holding the code on both the item and its levels
    pub code_attribute: String,
}

impl Default for AtcSpec {
    fn default() -> Self {
        AtcSpec {
            name: String::from("atc_codes"),
            collection: String::from("atc-codes"),
            item: String::from("atc-code"),
            level: String::from("level"),
            code_attribute: String::from("code"),
        }
    }
}

impl AtcSpec {
    pub fn extract_records<N: Node>(
        &self,
        drug: &N,
        config: &MeltConfig,
    ) -> Result<(Vec<Record>, Vec<Warning>), ExtractError> {
        let Some(collection) = drug.child(&self.collection) else {
            return Ok((Vec::new(), Vec::new()));
        };

        let key = config
            .key_field
            .as_deref()
            .map(|tag| resolve_key(drug, tag, config));
        let width = config.atc_levels;

        let mut records = Vec::new();
        let mut warnings = Vec::new();
        for (idx, item) in collection.children_by_tag(&self.item).iter().enumerate() {
            let mut record = Record::new();
            record.set(
                "atc_code",
                item.attribute(&self.code_attribute).map(str::to_string),
            );

            let levels = item.children_by_tag(&self.level);
            for position in 0..width {
                let level = levels.get(position);
                record.set(
                    format!("level_{}", position + 1),
                    level.map(|l| node_text(l, config)),
                );
                record.set(
                    format!("code_{}", position + 1),
                    level
                        .and_then(|l| l.attribute(&self.code_attribute))
                        .map(str::to_string),
                );
            }

            if levels.len() > width {
                let warning = Warning::Truncation {
                    parent: parent_label(drug, config),
                    path: format!(
                        "{}/{}/{}[{}]",
                        drug.name(),
                        self.collection,
                        self.item,
                        idx + 1
                    ),
                    found: levels.len(),
                    kept: width,
                };
                warn!("{}", warning);
                warnings.push(warning);
            }

            if let Some(key) = &key {
                record = record.with_parent(key.clone());
            }
            records.push(record);
        }

        Ok((records, warnings))
    }
}

impl Extractor for AtcSpec {
    fn tables(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn extract<N: Node>(&self, drug: N, config: &MeltConfig) -> Result<Extraction, ExtractError> {
        let (records, warnings) = self.extract_records(&drug, config)?;
        Ok(Extraction {
            fragments: vec![records],
            warnings,
        })
    }
}
