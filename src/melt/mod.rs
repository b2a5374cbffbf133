//! Tree-to-table projection
//!
//! This module turns parsed drug records into flat, relational tables: one scalar
//! row per drug, keyed sub-tables for repeated child collections, and dedicated
//! extractors for the structures that do not fit the generic rule.
//!
//! ## Parallelism
//!
//! Every extractor is a pure function of `(drug, config)`. Set
//! `MeltConfig::parallel` to fan drugs out across rayon's pool; row order is the
//! same either way.

pub mod types;
pub mod extractor;
pub mod scalar;
pub mod subtable;
pub mod reactions;
pub mod atc;
pub mod aggregate;
pub mod plan;
pub mod writer;

pub use types::{Cell, DrugKey, ErrorPolicy, FormatPolicy, Linkage, MeltConfig, Record, Table, TextMode, PARENT_KEY};
pub use extractor::{Extraction, Extractor};
pub use scalar::{AttributeKind, AttributeSpec, FieldSpec, ScalarSpec};
pub use subtable::{KeySource, SubTableSpec};
pub use reactions::ReactionSpec;
pub use atc::AtcSpec;
pub use aggregate::{Aggregate, CancelToken, TableAggregator};
pub use plan::{MeltPlan, TableSpec};
pub use writer::{SingleWriter, TableWriter};
