//! Tabular output of decoded channels.
//!
//! Columns are aligned by sample index and headed by their channel label.
//! Channels with fewer samples are padded with empty cells.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Result;
use crate::reader::ChannelRead;

/// Which representation of the samples to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleMode {
    #[default]
    Physical,
    Digital,
}

/// One decoded channel
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Digital(Vec<i16>),
    Physical(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Digital(v) => v.len(),
            Column::Physical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text of the cell at `row`, `None` past the end of the column
    pub fn cell(&self, row: usize) -> Option<String> {
        match self {
            Column::Digital(v) => v.get(row).map(|d| d.to_string()),
            Column::Physical(v) => v.get(row).map(|p| p.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTable {
    headers: Vec<String>,
    columns: Vec<Column>,
}

impl SampleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the successful reads, in request order.
    ///
    /// Failed reads are skipped and returned alongside the table so the
    /// caller can report them.
    pub fn from_reads(reads: Vec<ChannelRead>) -> (Self, Vec<ChannelRead>) {
        let mut table = SampleTable::new();
        let mut failed = Vec::new();
        for read in reads {
            match read.column {
                Ok(column) => table.push(read.label, column),
                Err(e) => failed.push(ChannelRead {
                    label: read.label,
                    column: Err(e),
                }),
            }
        }
        (table, failed)
    }

    pub fn push(&mut self, label: impl Into<String>, column: Column) {
        self.headers.push(label.into());
        self.columns.push(column);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Length of the longest column
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Column::len).max().unwrap_or(0)
    }

    /// Row `index` with empty strings where a column has run out
    pub fn row(&self, index: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.cell(index).unwrap_or_default())
            .collect()
    }

    /// Writes the header row followed by every data row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.headers)?;
        for index in 0..self.row_count() {
            out.write_record(self.row(index))?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.write_csv(File::create(path)?)?;
        info!(
            "wrote {} channels x {} rows to {}",
            self.columns.len(),
            self.row_count(),
            path.display()
        );
        Ok(())
    }
}

/// Output path next to the input: same name, `csv` extension
pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    input.as_ref().with_extension("csv")
}
