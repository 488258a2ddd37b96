//! Tab-separated data tables with header rows/columns and an NA symbol.

use crate::data::{CleanSolution, MissingData, PresenceMatrix};
use crate::error::{CleanError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// A tab-separated table split into header cells and data cells.
///
/// The first `header_rows` lines and the first `header_cols` fields of every
/// line are carried through verbatim; the remaining cells are data whose
/// missingness is decided by comparing the trimmed token to the NA symbol.
#[derive(Debug, Clone)]
pub struct DataTable {
    na_symbol: String,
    header_rows: Vec<Vec<String>>,
    row_labels: Vec<Vec<String>>,
    cells: Vec<Vec<String>>,
    n_cols: usize,
}

impl DataTable {
    /// Build a table from already split lines.
    pub fn from_records(
        records: Vec<Vec<String>>,
        na_symbol: &str,
        header_rows: usize,
        header_cols: usize,
    ) -> Result<Self> {
        if records.len() <= header_rows {
            return Err(CleanError::EmptyData(format!(
                "Table has {} lines but {} header rows",
                records.len(),
                header_rows
            )));
        }

        // Width is set by the first line, ignoring empty trailing fields
        let width = records[0].len()
            - records[0]
                .iter()
                .rev()
                .take_while(|t| t.trim().is_empty())
                .count();
        if width <= header_cols {
            return Err(CleanError::EmptyData(format!(
                "Table has {} columns but {} header columns",
                width, header_cols
            )));
        }
        let n_cols = width - header_cols;

        let mut lines = records.into_iter().map(|mut fields| {
            // Tolerate trailing tabs
            while fields.len() > width && fields.last().map_or(false, |f| f.trim().is_empty()) {
                fields.pop();
            }
            fields
        });

        let mut headers = Vec::with_capacity(header_rows);
        for _ in 0..header_rows {
            if let Some(fields) = lines.next() {
                headers.push(fields.into_iter().map(|t| trim_token(&t)).collect());
            }
        }

        let mut row_labels = Vec::new();
        let mut cells = Vec::new();
        for fields in lines {
            if fields.iter().all(|t| t.trim().is_empty()) {
                continue;
            }
            if fields.len() != width {
                return Err(CleanError::DimensionMismatch {
                    expected: width,
                    actual: fields.len(),
                });
            }
            let mut tokens = fields.into_iter().map(|t| trim_token(&t));
            row_labels.push(tokens.by_ref().take(header_cols).collect());
            cells.push(tokens.collect());
        }

        if cells.is_empty() {
            return Err(CleanError::EmptyData("No data rows in table".to_string()));
        }

        Ok(Self {
            na_symbol: na_symbol.to_string(),
            header_rows: headers,
            row_labels,
            cells,
            n_cols,
        })
    }

    /// Load a table from a TSV file.
    pub fn from_tsv<P: AsRef<Path>>(
        path: P,
        na_symbol: &str,
        header_rows: usize,
        header_cols: usize,
    ) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_path(path)?;

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            records.push(record.iter().map(String::from).collect());
        }

        Self::from_records(records, na_symbol, header_rows, header_cols)
    }

    /// The symbol marking a missing cell.
    pub fn na_symbol(&self) -> &str {
        &self.na_symbol
    }

    /// Number of header rows.
    pub fn n_header_rows(&self) -> usize {
        self.header_rows.len()
    }

    /// Number of header columns.
    pub fn n_header_cols(&self) -> usize {
        self.row_labels.first().map(|l| l.len()).unwrap_or(0)
    }

    /// Raw token of a data cell.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.cells[row][col]
    }

    /// Header cells of a data row.
    pub fn row_labels(&self, row: usize) -> &[String] {
        &self.row_labels[row]
    }

    /// Build the presence matrix of the data cells.
    pub fn presence(&self) -> Result<PresenceMatrix> {
        let present = self
            .cells
            .iter()
            .flat_map(|row| row.iter().map(|t| *t != self.na_symbol))
            .collect();
        PresenceMatrix::new(self.cells.len(), self.n_cols, present)
    }

    /// Write the rows and columns kept by `solution` to a TSV file.
    ///
    /// Header rows are always written, restricted to the kept data columns;
    /// header columns are always written for every kept row.
    pub fn write_tsv<P: AsRef<Path>>(&self, path: P, solution: &CleanSolution) -> Result<()> {
        solution.check_dimensions(self.n_rows(), self.n_cols())?;
        let cols_to_keep = solution.cols_to_keep();
        let header_cols = self.n_header_cols();

        let mut writer = tsv_writer(path)?;
        for header in &self.header_rows {
            let record: Vec<&str> = header
                .iter()
                .enumerate()
                .filter(|(j, _)| {
                    *j < header_cols
                        || cols_to_keep.get(*j - header_cols).copied().unwrap_or(false)
                })
                .map(|(_, t)| t.as_str())
                .collect();
            writer.write_record(&record)?;
        }

        for row in solution.kept_rows() {
            let record: Vec<&str> = self.row_labels[row]
                .iter()
                .map(String::as_str)
                .chain(
                    self.cells[row]
                        .iter()
                        .zip(cols_to_keep)
                        .filter(|(_, &keep)| keep)
                        .map(|(t, _)| t.as_str()),
                )
                .collect();
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the table with every data cell replaced by `1` (present) or `0`
    /// (missing). Header rows and columns are written unchanged.
    pub fn write_binary_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = tsv_writer(path)?;
        for header in &self.header_rows {
            writer.write_record(header)?;
        }
        for (labels, cells) in self.row_labels.iter().zip(&self.cells) {
            let record: Vec<&str> = labels
                .iter()
                .map(String::as_str)
                .chain(
                    cells
                        .iter()
                        .map(|t| if *t == self.na_symbol { "0" } else { "1" }),
                )
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the whole table transposed, headers included.
    pub fn write_transposed_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let full: Vec<Vec<&str>> = self
            .header_rows
            .iter()
            .map(|h| h.iter().map(String::as_str).collect())
            .chain(self.row_labels.iter().zip(&self.cells).map(|(labels, cells)| {
                labels
                    .iter()
                    .chain(cells.iter())
                    .map(String::as_str)
                    .collect()
            }))
            .collect();

        let width = self.n_header_cols() + self.n_cols;
        let mut writer = tsv_writer(path)?;
        for j in 0..width {
            let record: Vec<&str> = full
                .iter()
                .map(|line| line.get(j).copied().unwrap_or(""))
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl MissingData for DataTable {
    fn n_rows(&self) -> usize {
        self.cells.len()
    }

    fn n_cols(&self) -> usize {
        self.n_cols
    }

    fn is_missing(&self, row: usize, col: usize) -> bool {
        self.cells[row][col] == self.na_symbol
    }
}

fn trim_token(token: &str) -> String {
    token.trim_matches(' ').to_string()
}

fn tsv_writer<P: AsRef<Path>>(path: P) -> Result<csv::Writer<std::fs::File>> {
    Ok(WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)?)
}
