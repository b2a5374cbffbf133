//! # drugmelt - DrugBank XML to relational tables
//!
//! Projects the deeply nested drug records of a DrugBank export onto flat tables
//! linked by a `parent_key` foreign key.
//!
//! ## Modules
//!
//! - **node**: the `Node` navigation trait and its `roxmltree` adapter
//! - **melt**: extractors, the table aggregator, plans and writers
//! - **error**: error and warning types
//!
//! ## Quick Start
//!
//! ```rust
//! use drugmelt::{melt_document, MeltConfig, MeltPlan};
//!
//! # fn main() -> anyhow::Result<()> {
//! let xml = r#"<drugbank>
//!   <drug type="biotech" created="2005-06-13" updated="2020-06-18">
//!     <drugbank-id primary="true">DB00001</drugbank-id>
//!     <name>Lepirudin</name>
//!     <groups><group>approved</group></groups>
//!   </drug>
//! </drugbank>"#;
//!
//! let output = melt_document(xml, &MeltPlan::drugbank(), &MeltConfig::default())?;
//!
//! let groups = output.table("groups").unwrap();
//! assert_eq!(groups.get(0, "text"), Some("approved"));
//! assert_eq!(groups.get(0, "parent_key"), Some("DB00001"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod melt;
pub mod node;

#[cfg(test)]
mod test_fixtures;

// Re-export commonly used types for convenience
pub use error::{ExtractError, MeltError, RecordError, Warning};
pub use melt::{Aggregate, MeltConfig, MeltPlan, Table, TableAggregator};
pub use node::{Node, XmlDocument, XmlNode};

/// Main entry point: parse a document and run a plan over its `<drug>` records
pub fn melt_document(xml: &str, plan: &MeltPlan, config: &MeltConfig) -> Result<Aggregate, MeltError> {
    let doc = XmlDocument::parse(xml)?;
    let drugs = doc.drugs();
    tracing::info!("parsed {} drug records", drugs.len());
    plan.run(&drugs, config, None)
}
