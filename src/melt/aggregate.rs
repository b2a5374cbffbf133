//! Table aggregation across every drug in a document
//!
//! Applies one extractor to each drug in document order and folds the per-drug rows
//! into corpus-wide tables. Drugs may be fanned out over rayon's pool; the indexed
//! collect keeps results in document order, so the fold is identical either way.

use crate::error::{ExtractError, MeltError, RecordError, Warning};
use crate::melt::extractor::{Extraction, Extractor};
use crate::melt::types::{ErrorPolicy, MeltConfig, Record, Table};
use crate::node::Node;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Cooperative cancellation, checked between drugs
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tables produced by one extractor over a whole document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub tables: Vec<Table>,
    pub warnings: Vec<Warning>,
    /// Per-drug failures, only populated under [`ErrorPolicy::Collect`]
    pub errors: Vec<RecordError>,
}

impl Aggregate {
    /// Table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

// `None` marks a drug skipped because the run was cancelled.
type Outcome = Option<Result<Extraction, ExtractError>>;

pub struct TableAggregator<'c> {
    config: &'c MeltConfig,
    cancel: Option<CancelToken>,
}

impl<'c> TableAggregator<'c> {
    pub fn new(config: &'c MeltConfig) -> Self {
        TableAggregator {
            config,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run `extractor` over `drugs` and concatenate the rows of each output table.
    ///
    /// A drug that yields no rows for a table simply does not appear in it.
    pub fn aggregate<N: Node, E: Extractor>(
        &self,
        drugs: &[N],
        extractor: &E,
    ) -> Result<Aggregate, MeltError> {
        let names = extractor.tables();

        let outcomes: Vec<Outcome> = if self.config.parallel {
            drugs
                .par_iter()
                .map(|drug| self.extract_one(*drug, extractor))
                .collect()
        } else {
            self.extract_sequential(drugs, extractor)
        };

        let mut buckets: Vec<Vec<Record>> = vec![Vec::new(); names.len()];
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                None => return Err(MeltError::Cancelled { completed: index }),
                Some(Ok(extraction)) => {
                    for (bucket, rows) in buckets.iter_mut().zip(extraction.fragments) {
                        bucket.extend(rows);
                    }
                    warnings.extend(extraction.warnings);
                }
                Some(Err(source)) => match self.config.error_policy {
                    ErrorPolicy::Abort => return Err(MeltError::Record { index, source }),
                    ErrorPolicy::Collect => errors.push(RecordError {
                        index,
                        table: names.join(", "),
                        source,
                    }),
                },
            }
        }

        let tables: Vec<Table> = names
            .into_iter()
            .zip(buckets)
            .map(|(name, records)| Table::from_records(name, records))
            .collect();

        for table in &tables {
            debug!(
                "table {}: {} rows, {} columns",
                table.name,
                table.len(),
                table.columns.len()
            );
        }

        Ok(Aggregate {
            tables,
            warnings,
            errors,
        })
    }

    /// Stops at the first cancelled drug, and at the first failure under abort.
    fn extract_sequential<N: Node, E: Extractor>(&self, drugs: &[N], extractor: &E) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(drugs.len());
        for drug in drugs {
            let outcome = self.extract_one(*drug, extractor);
            let stop = match &outcome {
                None => true,
                Some(Err(_)) => self.config.error_policy == ErrorPolicy::Abort,
                Some(Ok(_)) => false,
            };
            outcomes.push(outcome);
            if stop {
                break;
            }
        }
        outcomes
    }

    fn extract_one<N: Node, E: Extractor>(&self, drug: N, extractor: &E) -> Outcome {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return None;
        }
        Some(extractor.extract(drug, self.config))
    }
}
