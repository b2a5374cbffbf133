use crate::melt::types::{Cell, Table};
use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One table row serialized as a JSON object with keys in column order.
struct RowView<'t> {
    table: Option<&'t str>,
    columns: &'t [String],
    cells: &'t [Cell],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.table.is_some());
        let mut map = serializer.serialize_map(Some(self.columns.len() + extra))?;
        if let Some(table) = self.table {
            map.serialize_entry("_table", table)?;
        }
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

fn write_rows<W: Write>(writer: &mut W, table: &Table, tagged: bool) -> Result<()> {
    for cells in &table.rows {
        let row = RowView {
            table: tagged.then_some(table.name.as_str()),
            columns: &table.columns,
            cells,
        };
        serde_json::to_writer(&mut *writer, &row).context("Failed to serialize row")?;
        writeln!(writer).context("Failed to write row")?;
    }
    Ok(())
}

/// Writes each table to its own JSON Lines file, `<dir>/<table>.jsonl`
pub struct TableWriter {
    output_dir: PathBuf,
}

impl TableWriter {
    /// Create a writer for `output_dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        std::fs::create_dir_all(&output_dir).context("Failed to create output directory")?;
        Ok(TableWriter {
            output_dir: output_dir.as_ref().to_path_buf(),
        })
    }

    /// Write one table, replacing any earlier file of the same name.
    ///
    /// Empty tables still produce an (empty) file so every planned table has one.
    pub fn write_table(&self, table: &Table) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.jsonl", table.name));
        let file = File::create(&path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        write_rows(&mut writer, table, false)?;
        writer.flush().context("Failed to flush writer")?;
        Ok(path)
    }

    pub fn write_tables(&self, tables: &[Table]) -> Result<Vec<PathBuf>> {
        tables.iter().map(|t| self.write_table(t)).collect()
    }
}

/// Writes every row of every table to one stream, tagged with a `_table` key
pub struct SingleWriter<W: Write> {
    writer: W,
}

impl<W: Write> SingleWriter<W> {
    pub fn new(writer: W) -> Self {
        SingleWriter { writer }
    }

    pub fn write_tables(&mut self, tables: &[Table]) -> Result<()> {
        for table in tables {
            write_rows(&mut self.writer, table, true)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}
