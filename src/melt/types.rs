use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Name of the foreign-key column on keyed sub-tables.
pub const PARENT_KEY: &str = "parent_key";

/// One table cell. `None` marks a field whose source node was absent.
pub type Cell = Option<String>;

/// Identifier of a drug record, taken from its key-source child
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrugKey(pub String);

impl DrugKey {
    pub fn new(id: impl Into<String>) -> Self {
        DrugKey(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether a record carries a `parent_key` column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linkage {
    /// No foreign key; the table has no `parent_key` column.
    Unkeyed,
    /// Foreign key to the producing drug. `None` when its key-source child was absent.
    Keyed(Option<DrugKey>),
}

/// One extracted row: ordered fields plus the link back to its drug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Cell)>,
    pub linkage: Linkage,
}

impl Default for Record {
    fn default() -> Self {
        Record::new()
    }
}

impl Record {
    pub fn new() -> Self {
        Record {
            fields: Vec::new(),
            linkage: Linkage::Unkeyed,
        }
    }

    pub fn with_parent(mut self, key: Option<DrugKey>) -> Self {
        self.linkage = Linkage::Keyed(key);
        self
    }

    /// Set a field. An existing field keeps its position and takes the new value.
    pub fn set(&mut self, name: impl Into<String>, value: Cell) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Set a field only if it is not there yet.
    pub fn set_if_absent(&mut self, name: impl Into<String>, value: Cell) {
        let name = name.into();
        if !self.has_field(&name) {
            self.fields.push((name, value));
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Value of a field; `None` both for a missing field and a null one.
    pub fn get(&self, name: &str) -> Option<&str> {
        if name == PARENT_KEY {
            return self.parent_key().map(DrugKey::as_str);
        }
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn parent_key(&self) -> Option<&DrugKey> {
        match &self.linkage {
            Linkage::Keyed(key) => key.as_ref(),
            Linkage::Unkeyed => None,
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A homogeneous relation: every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from records whose field sets may differ.
    ///
    /// The first pass computes the union schema (first-seen order, `parent_key` last if
    /// any record is keyed); the second materializes every row against it.
    pub fn from_records(name: impl Into<String>, records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut keyed = false;
        for record in &records {
            for field in record.field_names() {
                if !columns.iter().any(|c| c == field) {
                    columns.push(field.to_string());
                }
            }
            keyed |= matches!(record.linkage, Linkage::Keyed(_));
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let Record { mut fields, linkage } = record;
                let mut row: Vec<Cell> = columns
                    .iter()
                    .map(|column| {
                        fields
                            .iter_mut()
                            .find(|(n, _)| n == column)
                            .and_then(|(_, v)| v.take())
                    })
                    .collect();
                if keyed {
                    let key = match linkage {
                        Linkage::Keyed(key) => key.map(|k| k.0),
                        Linkage::Unkeyed => None,
                    };
                    row.push(key);
                }
                row
            })
            .collect();

        if keyed {
            columns.push(PARENT_KEY.to_string());
        }

        Table {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell at `row` in `column`; `None` for a null cell or an unknown column.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Every value of one column, in row order.
    pub fn column(&self, column: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }
}

/// How node text is cleaned before it lands in a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    /// Keep text exactly as in the document.
    Raw,
    /// Strip leading and trailing whitespace.
    #[default]
    Trim,
    /// Trim and fold every internal whitespace run into one space.
    Collapse,
}

impl TextMode {
    pub fn apply(self, raw: String) -> String {
        match self {
            TextMode::Raw => raw,
            TextMode::Trim => {
                let trimmed = raw.trim();
                if trimmed.len() == raw.len() {
                    raw
                } else {
                    trimmed.to_string()
                }
            }
            TextMode::Collapse => WHITESPACE_RUN.replace_all(raw.trim(), " ").into_owned(),
        }
    }
}

/// What to do with a value that fails type conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatPolicy {
    /// Fail the drug with a format error.
    #[default]
    Propagate,
    /// Null the cell and record a warning.
    Null,
}

/// What the aggregator does when one drug fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort the run, reporting the failing drug.
    #[default]
    Abort,
    /// Drop the failing drug's rows and keep its error alongside the tables.
    Collect,
}

/// Configuration passed to every extractor invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeltConfig {
    /// Child tag whose text identifies a drug. `None` disables parent keys everywhere
    /// a table uses the default key source.
    pub key_field: Option<String>,

    /// Text cleanup applied to every extracted value
    pub text_mode: TextMode,

    /// Number of positional identifier slots on the drug table
    pub id_slots: usize,

    /// Number of level/code column pairs on the ATC table
    pub atc_levels: usize,

    pub format_policy: FormatPolicy,

    pub error_policy: ErrorPolicy,

    /// Fan per-drug extraction out over the rayon thread pool
    pub parallel: bool,
}

impl Default for MeltConfig {
    fn default() -> Self {
        MeltConfig {
            key_field: Some(String::from("drugbank-id")),
            text_mode: TextMode::Trim,
            id_slots: 3,
            atc_levels: 4,
            format_policy: FormatPolicy::Propagate,
            error_policy: ErrorPolicy::Abort,
            parallel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, Option<&str>)]) -> Record {
        let mut r = Record::new();
        for (name, value) in fields {
            r.set(*name, value.map(str::to_string));
        }
        r
    }

    #[test]
    fn test_union_of_heterogeneous_records() {
        let records = vec![
            record(&[("a", Some("1"))]).with_parent(Some(DrugKey::new("DB1"))),
            record(&[("a", Some("2")), ("b", Some("x"))]).with_parent(Some(DrugKey::new("DB2"))),
            record(&[("c", None)]).with_parent(None),
        ];

        let table = Table::from_records("t", records);

        assert_eq!(table.columns, vec!["a", "b", "c", "parent_key"]);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.rows[0],
            vec![Some("1".to_string()), None, None, Some("DB1".to_string())]
        );
        assert_eq!(table.get(1, "b"), Some("x"));
        assert_eq!(table.get(2, "parent_key"), None);
        assert_eq!(table.column("a").unwrap(), vec![Some("1"), Some("2"), None]);
    }

    #[test]
    fn test_unkeyed_table_has_no_parent_key_column() {
        let table = Table::from_records("t", vec![record(&[("name", Some("x"))])]);
        assert_eq!(table.columns, vec!["name"]);
        assert!(table.column_index(PARENT_KEY).is_none());
    }

    #[test]
    fn test_empty_table() {
        let table = Table::from_records("t", Vec::new());
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_record_set_keeps_position() {
        let mut r = record(&[("a", Some("1")), ("b", Some("2"))]);
        r.set("a", Some("3".into()));
        r.set_if_absent("b", Some("ignored".into()));
        assert_eq!(r.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(r.get("a"), Some("3"));
        assert_eq!(r.get("b"), Some("2"));
    }

    #[test]
    fn test_text_modes() {
        let raw = "  Direct   thrombin\n inhibitors ".to_string();
        assert_eq!(TextMode::Raw.apply(raw.clone()), raw);
        assert_eq!(TextMode::Trim.apply(raw.clone()), "Direct   thrombin\n inhibitors");
        assert_eq!(TextMode::Collapse.apply(raw), "Direct thrombin inhibitors");
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: MeltConfig =
            serde_json::from_str(r#"{"key_field": "name", "error_policy": "collect"}"#).unwrap();
        assert_eq!(config.key_field.as_deref(), Some("name"));
        assert_eq!(config.error_policy, ErrorPolicy::Collect);
        assert_eq!(config.atc_levels, 4);
        assert_eq!(config.id_slots, 3);
    }
}
