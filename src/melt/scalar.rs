//! Scalar record extraction: one row per drug
//!
//! A drug's own attributes, its (possibly repeated) identifier split into positional
//! slots, and the text of every configured single-valued child.

use crate::error::{ExtractError, Warning};
use crate::melt::extractor::{child_text, column_name, node_text, parent_label, Extraction, Extractor};
use crate::melt::types::{Cell, FormatPolicy, MeltConfig, Record};
use crate::node::Node;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How an attribute's raw value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    #[default]
    Text,
    /// ISO calendar date, re-emitted as `YYYY-MM-DD`
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    pub column: String,
    #[serde(default)]
    pub kind: AttributeKind,
}

impl AttributeSpec {
    pub fn new(name: &str, kind: AttributeKind) -> Self {
        AttributeSpec {
            name: name.to_string(),
            column: column_name(name),
            kind,
        }
    }
}

/// A single-valued child copied into one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub column: String,
    pub tag: String,
}

impl FieldSpec {
    pub fn new(tag: &str) -> Self {
        FieldSpec {
            column: column_name(tag),
            tag: tag.to_string(),
        }
    }
}

/// Projection of one drug onto one flat record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarSpec {
    pub name: String,

    /// Repeated identifier child split into positional slots
    pub id_tag: String,

    pub attributes: Vec<AttributeSpec>,

    pub fields: Vec<FieldSpec>,
}

const DRUGBANK_FIELDS: &[&str] = &[
    "name",
    "description",
    "cas-number",
    "unii",
    "average-mass",
    "monoisotopic-mass",
    "state",
    "synthesis-reference",
    "indication",
    "pharmacodynamics",
    "mechanism-of-action",
    "toxicity",
    "metabolism",
    "absorption",
    "half-life",
    "protein-binding",
    "route-of-elimination",
    "volume-of-distribution",
    "clearance",
    "fda-label",
    "msds",
];

impl ScalarSpec {
    /// The main `drugs` table of a DrugBank export.
    pub fn drugbank() -> Self {
        ScalarSpec {
            name: String::from("drugs"),
            id_tag: String::from("drugbank-id"),
            attributes: vec![
                AttributeSpec::new("type", AttributeKind::Text),
                AttributeSpec::new("created", AttributeKind::Date),
                AttributeSpec::new("updated", AttributeKind::Date),
            ],
            fields: DRUGBANK_FIELDS.iter().map(|tag| FieldSpec::new(tag)).collect(),
        }
    }

    /// Extract the record for one drug, along with any nulled-field warnings.
    pub fn extract_record<N: Node>(
        &self,
        drug: &N,
        config: &MeltConfig,
    ) -> Result<(Record, Vec<Warning>), ExtractError> {
        let mut record = Record::new();
        let mut warnings = Vec::new();

        let ids = drug.children_by_tag(&self.id_tag);
        for (slot, id) in id_slots(&ids, config).into_iter().enumerate() {
            record.set(slot_name(slot), id.map(|n| node_text(&n, config)));
        }

        for attr in &self.attributes {
            let value = match drug.attribute(&attr.name) {
                None => None,
                Some(raw) => match attr.kind {
                    AttributeKind::Text => Some(raw.to_string()),
                    AttributeKind::Date => {
                        self.parse_date(drug, attr, raw, config, &mut warnings)?
                    }
                },
            };
            record.set(attr.column.clone(), value);
        }

        for field in &self.fields {
            record.set(field.column.clone(), child_text(drug, &field.tag, config));
        }

        Ok((record, warnings))
    }

    fn parse_date<N: Node>(
        &self,
        drug: &N,
        attr: &AttributeSpec,
        raw: &str,
        config: &MeltConfig,
        warnings: &mut Vec<Warning>,
    ) -> Result<Cell, ExtractError> {
        match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
            Ok(date) => Ok(Some(date.format(DATE_FORMAT).to_string())),
            Err(e) => match config.format_policy {
                FormatPolicy::Propagate => Err(ExtractError::Format {
                    parent: parent_label(drug, config),
                    field: attr.name.clone(),
                    raw: raw.to_string(),
                    reason: e.to_string(),
                }),
                FormatPolicy::Null => {
                    let warning = Warning::NulledField {
                        parent: parent_label(drug, config),
                        field: attr.name.clone(),
                        raw: raw.to_string(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    Ok(None)
                }
            },
        }
    }
}

impl Extractor for ScalarSpec {
    fn tables(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    fn extract<N: Node>(&self, drug: N, config: &MeltConfig) -> Result<Extraction, ExtractError> {
        let (record, warnings) = self.extract_record(&drug, config)?;
        Ok(Extraction {
            fragments: vec![vec![record]],
            warnings,
        })
    }
}

/// Fill `config.id_slots` positions from the matches, in document order.
fn id_slots<N: Node>(matches: &[N], config: &MeltConfig) -> Vec<Option<N>> {
    let mut slots = vec![None; config.id_slots];
    for (slot, node) in slots.iter_mut().zip(matches) {
        *slot = Some(*node);
    }
    slots
}

/// Column name of the `index`-th identifier slot.
pub fn slot_name(index: usize) -> String {
    match index {
        0 => String::from("primary_key"),
        1 => String::from("secondary_key"),
        2 => String::from("third_key"),
        n => format!("key_{}", n + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::extractor::resolve_key;
    use crate::node::XmlDocument;

    const DRUG_XML: &str = r#"<drugbank>
  <drug type="biotech" created="2005-06-13" updated="2020-06-18">
    <drugbank-id>BIOD00024</drugbank-id>
    <drugbank-id primary="true">DB00001</drugbank-id>
    <drugbank-id>BTD00024</drugbank-id>
    <name>Lepirudin</name>
    <cas-number>138068-37-8</cas-number>
    <state>liquid</state>
  </drug>
  <drug type="small molecule" created="2005-06-13">
    <drugbank-id primary="true">DB00014</drugbank-id>
    <name>Goserelin</name>
  </drug>
</drugbank>"#;

    #[test]
    fn test_id_slots_are_positional() {
        let doc = XmlDocument::parse(DRUG_XML).unwrap();
        let config = MeltConfig::default();
        let (record, warnings) = ScalarSpec::drugbank()
            .extract_record(&doc.drugs()[0], &config)
            .unwrap();

        assert!(warnings.is_empty());
        assert_eq!(record.get("primary_key"), Some("BIOD00024"));
        assert_eq!(record.get("secondary_key"), Some("DB00001"));
        assert_eq!(record.get("third_key"), Some("BTD00024"));
        assert_eq!(record.get("type"), Some("biotech"));
        assert_eq!(record.get("created"), Some("2005-06-13"));
        assert_eq!(record.get("cas_number"), Some("138068-37-8"));
    }

    #[test]
    fn test_missing_values_are_null_not_errors() {
        let doc = XmlDocument::parse(DRUG_XML).unwrap();
        let config = MeltConfig::default();
        let (record, _) = ScalarSpec::drugbank()
            .extract_record(&doc.drugs()[1], &config)
            .unwrap();

        assert_eq!(record.get("primary_key"), Some("DB00014"));
        assert!(record.has_field("secondary_key"));
        assert_eq!(record.get("secondary_key"), None);
        assert_eq!(record.get("third_key"), None);
        assert_eq!(record.get("updated"), None);
        assert_eq!(record.get("description"), None);
    }

    #[test]
    fn test_field_set_is_fixed() {
        let doc = XmlDocument::parse(DRUG_XML).unwrap();
        let config = MeltConfig::default();
        let spec = ScalarSpec::drugbank();
        let names: Vec<Vec<String>> = doc
            .drugs()
            .iter()
            .map(|d| {
                let (record, _) = spec.extract_record(d, &config).unwrap();
                record.field_names().map(str::to_string).collect()
            })
            .collect();

        assert_eq!(names[0], names[1]);
        assert_eq!(&names[0][..6], &["primary_key", "secondary_key", "third_key", "type", "created", "updated"]);
        assert_eq!(names[0].len(), 6 + DRUGBANK_FIELDS.len());
    }

    #[test]
    fn test_primary_key_matches_drug_key() {
        let doc = XmlDocument::parse(DRUG_XML).unwrap();
        let config = MeltConfig::default();
        for drug in doc.drugs() {
            let (record, _) = ScalarSpec::drugbank().extract_record(&drug, &config).unwrap();
            let key = resolve_key(&drug, "drugbank-id", &config).unwrap();
            assert_eq!(record.get("primary_key"), Some(key.as_str()));
        }
    }

    #[test]
    fn test_malformed_date_propagates() {
        let xml = r#"<drugbank><drug created="13/06/2005">
            <drugbank-id>DB00001</drugbank-id></drug></drugbank>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let err = ScalarSpec::drugbank()
            .extract_record(&doc.drugs()[0], &MeltConfig::default())
            .unwrap_err();

        match err {
            ExtractError::Format { parent, field, raw, .. } => {
                assert_eq!(parent, "DB00001");
                assert_eq!(field, "created");
                assert_eq!(raw, "13/06/2005");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_date_nulled_by_policy() {
        let xml = r#"<drugbank><drug created="soon" updated="2020-06-18">
            <drugbank-id>DB00001</drugbank-id></drug></drugbank>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let config = MeltConfig {
            format_policy: FormatPolicy::Null,
            ..MeltConfig::default()
        };
        let (record, warnings) = ScalarSpec::drugbank()
            .extract_record(&doc.drugs()[0], &config)
            .unwrap();

        assert_eq!(record.get("created"), None);
        assert!(record.has_field("created"));
        assert_eq!(record.get("updated"), Some("2020-06-18"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_extra_id_slots() {
        let doc = XmlDocument::parse(DRUG_XML).unwrap();
        let config = MeltConfig {
            id_slots: 4,
            ..MeltConfig::default()
        };
        let (record, _) = ScalarSpec::drugbank()
            .extract_record(&doc.drugs()[0], &config)
            .unwrap();
        assert!(record.has_field("key_4"));
        assert_eq!(record.get("key_4"), None);
    }
}
