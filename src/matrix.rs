use crate::error::{CnvError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io;
use std::path::Path;

/// Cell contents treated as missing on read, on top of empty cells
const MISSING_MARKERS: [&str; 4] = ["NA", "NaN", "nan", "null"];

/// A numeric table whose rows are identified by a labeled index.
///
/// The on-disk format has no notion of an index, so the label lives in the
/// first column of the file and is split off into `index` in memory.
#[derive(Debug, Clone)]
pub struct Matrix {
    index: Series,
    values: DataFrame,
}

impl Matrix {
    /// Builds a matrix from a row label and the value columns it labels.
    ///
    /// # Errors
    /// * Returns `CnvError::Polars` with a shape mismatch if the label and
    ///   the values differ in length
    pub fn new(index: Series, values: DataFrame) -> Result<Self> {
        if index.len() != values.height() {
            return Err(PolarsError::ShapeMismatch(
                format!(
                    "row label '{}' has {} entries but the matrix has {} rows",
                    index.name(),
                    index.len(),
                    values.height()
                )
                .into(),
            )
            .into());
        }
        Ok(Matrix { index, values })
    }

    /// Promotes the first column of `frame` to the row label.
    ///
    /// The column's name becomes the label's name; the remaining columns are
    /// kept, in order, as the matrix values.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        let mut columns = frame.get_columns().to_vec();
        if columns.is_empty() {
            return Err(PolarsError::NoData("table has no row label column".into()).into());
        }
        let index = columns.remove(0).as_materialized_series().clone();
        let values = DataFrame::new(columns)?;
        Matrix::new(index, values)
    }

    /// Re-inserts the row label as the leading column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.values.width() + 1);
        columns.push(Column::from(self.index.clone()));
        columns.extend(self.values.get_columns().iter().cloned());
        Ok(DataFrame::new(columns)?)
    }

    pub fn index_name(&self) -> &str {
        self.index.name().as_str()
    }

    pub fn index(&self) -> &Series {
        &self.index
    }

    pub fn values(&self) -> &DataFrame {
        &self.values
    }

    /// (rows, value columns); the row label is not counted as a column
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.index_name() == other.index_name()
            && self.index.equals(&other.index)
            && self.values.equals(&other.values)
    }
}

/// Tab unless the file is named `*.csv`
fn separator_for(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

/// Reads a labeled matrix from a delimited table.
///
/// # Arguments
/// * `path` - Table whose first column holds the row labels
///
/// # Returns
/// * `Result<Matrix>` - The matrix, with the first column promoted to the row label
///
/// # Errors
/// * Returns `CnvError::Io` if the file does not exist
/// * Returns `CnvError::Parse` if the table cannot be parsed
/// * Returns `CnvError::MissingValues` if any cell is empty or `NA`/`NaN`
pub fn read_matrix(path: impl AsRef<Path>) -> Result<Matrix> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CnvError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    let null_values = NullValues::AllColumns(MISSING_MARKERS.iter().map(|m| (*m).into()).collect());
    let frame = LazyCsvReader::new(path)
        .with_separator(separator_for(path))
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_null_values(Some(null_values))
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| CnvError::parse(path, e))?;

    let columns: Vec<String> = frame
        .get_columns()
        .iter()
        .filter(|column| column.null_count() > 0)
        .map(|column| column.name().to_string())
        .collect();
    if !columns.is_empty() {
        return Err(CnvError::MissingValues {
            path: path.to_path_buf(),
            columns,
        });
    }

    Matrix::from_frame(frame)
}

/// Writes a labeled matrix, row label first, and checks the file landed.
///
/// Some filesystems accept the write and drop the file anyway, so the file is
/// reopened right after writing.
///
/// # Errors
/// * Returns `CnvError::Io` if the file cannot be created or written
/// * Returns `CnvError::OutputMissing` if the file cannot be reopened afterwards
pub fn write_matrix(matrix: &Matrix, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut frame = matrix.to_frame()?;

    {
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(separator_for(path))
            .finish(&mut frame)?;
    }

    File::open(path).map_err(|_| CnvError::OutputMissing {
        path: path.to_path_buf(),
    })?;

    Ok(())
}
