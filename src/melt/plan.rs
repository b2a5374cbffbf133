//! Extraction plans
//!
//! A plan is an ordered list of table specs. The default plan covers a DrugBank
//! export; custom plans can be loaded from JSON to point the same engine at other
//! "repeated children under a named parent" layouts.

use crate::error::{ExtractError, MeltError};
use crate::melt::aggregate::{Aggregate, CancelToken, TableAggregator};
use crate::melt::atc::AtcSpec;
use crate::melt::extractor::{Extraction, Extractor};
use crate::melt::reactions::ReactionSpec;
use crate::melt::scalar::ScalarSpec;
use crate::melt::subtable::SubTableSpec;
use crate::melt::types::MeltConfig;
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// One extractor in a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableSpec {
    Scalar(ScalarSpec),
    Subtable(SubTableSpec),
    Reactions(ReactionSpec),
    Atc(AtcSpec),
}

impl Extractor for TableSpec {
    fn tables(&self) -> Vec<String> {
        match self {
            TableSpec::Scalar(spec) => spec.tables(),
            TableSpec::Subtable(spec) => spec.tables(),
            TableSpec::Reactions(spec) => spec.tables(),
            TableSpec::Atc(spec) => spec.tables(),
        }
    }

    fn extract<N: Node>(&self, drug: N, config: &MeltConfig) -> Result<Extraction, ExtractError> {
        match self {
            TableSpec::Scalar(spec) => spec.extract(drug, config),
            TableSpec::Subtable(spec) => spec.extract(drug, config),
            TableSpec::Reactions(spec) => spec.extract(drug, config),
            TableSpec::Atc(spec) => spec.extract(drug, config),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltPlan {
    pub tables: Vec<TableSpec>,
}

impl Default for MeltPlan {
    fn default() -> Self {
        MeltPlan::drugbank()
    }
}

impl MeltPlan {
    /// Every table of a DrugBank export.
    pub fn drugbank() -> Self {
        let sub = |name: &str, collection: &str| TableSpec::Subtable(SubTableSpec::new(name, collection));
        let refs = |name: &str, sub_collection: &str| {
            TableSpec::Subtable(SubTableSpec::nested(name, "general-references", sub_collection))
        };
        let interactors = |name: &str, collection: &str| {
            TableSpec::Subtable(
                SubTableSpec::new(name, collection).excluding(&["polypeptide", "actions", "references"]),
            )
        };

        MeltPlan {
            tables: vec![
                TableSpec::Scalar(ScalarSpec::drugbank()),
                sub("groups", "groups"),
                refs("articles", "articles"),
                refs("textbooks", "textbooks"),
                refs("links", "links"),
                sub("synonyms", "synonyms"),
                sub("products", "products"),
                sub("international_brands", "international-brands"),
                sub("mixtures", "mixtures"),
                sub("packagers", "packagers"),
                sub("manufacturers", "manufacturers"),
                sub("prices", "prices"),
                sub("categories", "categories"),
                sub("affected_organisms", "affected-organisms"),
                sub("dosages", "dosages"),
                TableSpec::Atc(AtcSpec::default()),
                sub("ahfs_codes", "ahfs-codes"),
                sub("pdb_entries", "pdb-entries"),
                sub("patents", "patents"),
                sub("food_interactions", "food-interactions"),
                sub("drug_interactions", "drug-interactions"),
                sub("sequences", "sequences"),
                sub("calculated_properties", "calculated-properties"),
                sub("experimental_properties", "experimental-properties"),
                sub("external_identifiers", "external-identifiers"),
                sub("external_links", "external-links"),
                TableSpec::Subtable(
                    SubTableSpec::new("pathways", "pathways").excluding(&["drugs", "enzymes"]),
                ),
                TableSpec::Reactions(ReactionSpec::default()),
                sub("snp_effects", "snp-effects"),
                sub("snp_adverse_reactions", "snp-adverse-drug-reactions"),
                interactors("targets", "targets"),
                interactors("enzymes", "enzymes"),
                interactors("carriers", "carriers"),
                interactors("transporters", "transporters"),
            ],
        }
    }

    /// Every output table name, in plan order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().flat_map(|spec| spec.tables()).collect()
    }

    /// Keep only the specs producing at least one of `names`.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, MeltError> {
        let known = self.table_names();
        for name in names {
            let name = name.as_ref();
            if !known.iter().any(|k| k == name) {
                return Err(MeltError::Plan(format!("unknown table `{}`", name)));
            }
        }

        let tables = self
            .tables
            .iter()
            .filter(|spec| {
                spec.tables()
                    .iter()
                    .any(|t| names.iter().any(|n| n.as_ref() == t.as_str()))
            })
            .cloned()
            .collect();
        Ok(MeltPlan { tables })
    }

    /// Reject plans with two outputs under the same table name.
    pub fn validate(&self) -> Result<(), MeltError> {
        let mut seen = HashSet::new();
        for name in self.table_names() {
            if !seen.insert(name.clone()) {
                return Err(MeltError::Plan(format!("duplicate table `{}`", name)));
            }
        }
        Ok(())
    }

    /// Run every spec over `drugs`. Tables come out in plan order.
    pub fn run<N: Node>(
        &self,
        drugs: &[N],
        config: &MeltConfig,
        cancel: Option<CancelToken>,
    ) -> Result<Aggregate, MeltError> {
        self.validate()?;

        let mut aggregator = TableAggregator::new(config);
        if let Some(token) = cancel {
            aggregator = aggregator.with_cancel(token);
        }

        let mut output = Aggregate::default();
        for spec in &self.tables {
            debug!("extracting {}", spec.tables().join(", "));
            let part = aggregator.aggregate(drugs, spec)?;
            output.tables.extend(part.tables);
            output.warnings.extend(part.warnings);
            output.errors.extend(part.errors);
        }

        info!(
            "extracted {} tables from {} drugs ({} warnings, {} errors)",
            output.tables.len(),
            drugs.len(),
            output.warnings.len(),
            output.errors.len()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::subtable::KeySource;
    use crate::node::XmlDocument;
    use crate::test_fixtures::DRUGBANK_XML;

    #[test]
    fn test_drugbank_plan_names_are_unique() {
        let plan = MeltPlan::drugbank();
        assert!(plan.validate().is_ok());
        let names = plan.table_names();
        assert_eq!(names[0], "drugs");
        assert!(names.contains(&"atc_codes".to_string()));
        assert!(names.contains(&"reaction_enzymes".to_string()));
    }

    #[test]
    fn test_run_full_plan() {
        let doc = XmlDocument::parse(DRUGBANK_XML).unwrap();
        let plan = MeltPlan::drugbank();
        let out = plan.run(&doc.drugs(), &MeltConfig::default(), None).unwrap();

        let names: Vec<&str> = out.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, plan.table_names());

        assert_eq!(out.table("drugs").unwrap().len(), 3);
        assert_eq!(out.table("groups").unwrap().len(), 4);
        assert_eq!(out.table("synonyms").unwrap().len(), 1);
        assert_eq!(out.table("articles").unwrap().len(), 2);
        assert!(out.table("links").unwrap().is_empty());
        assert_eq!(out.table("atc_codes").unwrap().len(), 2);
        assert_eq!(out.table("reactions").unwrap().len(), 1);
        assert!(out.warnings.is_empty());
        assert!(out.errors.is_empty());
    }

    #[test]
    fn test_targets_skip_nested_detail() {
        let doc = XmlDocument::parse(DRUGBANK_XML).unwrap();
        let plan = MeltPlan::drugbank().select(&["targets"]).unwrap();
        let out = plan.run(&doc.drugs(), &MeltConfig::default(), None).unwrap();
        let targets = out.table("targets").unwrap();
        assert_eq!(
            targets.columns,
            vec!["id", "name", "organism", "known_action", "position", "parent_key"]
        );
        assert_eq!(targets.get(0, "name"), Some("Prothrombin"));
        assert_eq!(targets.get(0, "position"), Some("1"));
    }

    #[test]
    fn test_select_subset() {
        let plan = MeltPlan::drugbank().select(&["groups", "reaction_enzymes"]).unwrap();
        assert_eq!(plan.table_names(), vec!["groups", "reactions", "reaction_enzymes"]);

        let err = MeltPlan::drugbank().select(&["nope"]).unwrap_err();
        assert!(matches!(err, MeltError::Plan(_)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let plan = MeltPlan {
            tables: vec![
                TableSpec::Subtable(SubTableSpec::new("groups", "groups")),
                TableSpec::Subtable(SubTableSpec::new("groups", "synonyms")),
            ],
        };
        let doc = XmlDocument::parse(DRUGBANK_XML).unwrap();
        let err = plan.run(&doc.drugs(), &MeltConfig::default(), None).unwrap_err();
        assert!(matches!(err, MeltError::Plan(_)));
    }

    #[test]
    fn test_plan_from_json() {
        let plan: MeltPlan = serde_json::from_str(
            r#"{"tables": [
                {"kind": "subtable", "name": "brands", "collection": "international-brands", "key": {"tag": "name"}},
                {"kind": "atc", "name": "codes"},
                {"kind": "reactions"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(plan.table_names(), vec!["brands", "codes", "reactions", "reaction_enzymes"]);
        match &plan.tables[0] {
            TableSpec::Subtable(spec) => assert_eq!(spec.key, KeySource::Tag("name".into())),
            other => panic!("expected subtable, got {other:?}"),
        }
        match &plan.tables[1] {
            TableSpec::Atc(spec) => assert_eq!(spec.collection, "atc-codes"),
            other => panic!("expected atc, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_json_round_trip_of_default() {
        let plan = MeltPlan::drugbank();
        let json = serde_json::to_string(&plan).unwrap();
        let back: MeltPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, back);
    }
}
