use crate::error::{CnvError, Result};
use crate::manifest::Manifest;
use crate::types::{Caller, SampleSet, Threshold};
use log::{debug, info, warn};
use polars::lazy::dsl::*;
use polars::prelude::*;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_CNVS: usize = 2500;
pub const DEFAULT_CNV_SIZE: f64 = 3000.0;
pub const DEFAULT_FREEC_PVALUE: f64 = 0.01;
pub const DEFAULT_OUTDIR: &str = "../../scratch";

/// A merged CNV call table from one caller, every cell kept as text.
#[derive(Debug, Clone)]
pub struct SampleTable {
    caller: Caller,
    path: PathBuf,
    frame: DataFrame,
}

impl SampleTable {
    /// Reads a tab-separated merged table for `caller`.
    ///
    /// Schema inference is disabled so that calls are written back out exactly
    /// as they were read.
    ///
    /// # Errors
    /// * Returns `CnvError::Io` if the file does not exist
    /// * Returns `CnvError::Parse` if the table cannot be parsed
    /// * Returns `CnvError::MissingColumn` if the caller's ID column is absent
    pub fn read(caller: Caller, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CnvError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} table {} not found", caller, path.display()),
            )));
        }

        let frame = LazyCsvReader::new(path)
            .with_separator(b'\t')
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| CnvError::parse(path, e))?;

        if frame.column(caller.id_column()).is_err() {
            return Err(CnvError::missing_column(caller.id_column(), path));
        }

        Ok(SampleTable {
            caller,
            path: path.to_path_buf(),
            frame,
        })
    }

    pub fn caller(&self) -> Caller {
        self.caller
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of calls in the table
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Distinct sample IDs in the table. Rows without an ID are skipped.
    pub fn samples(&self) -> Result<SampleSet> {
        let ids = self.frame.column(self.caller.id_column())?.str()?;
        let mut samples = SampleSet::new();
        let mut unlabeled = 0;
        for id in ids.into_iter() {
            match id {
                Some(id) if !id.is_empty() => {
                    samples.insert(id.to_string());
                }
                _ => unlabeled += 1,
            }
        }

        if unlabeled > 0 {
            warn!(
                "{} rows without a sample ID in {}, skipping them",
                unlabeled,
                self.path.display()
            );
        }
        Ok(samples)
    }

    /// All calls made for `sample`, in table order.
    ///
    /// The filtered text columns are copied into fresh buffers; the CSV writer
    /// panics on string views sliced out of the middle of the original table.
    pub fn calls_for(&self, sample: &str) -> Result<DataFrame> {
        let filtered = self
            .frame
            .clone()
            .lazy()
            .filter(col(self.caller.id_column()).eq(lit(sample)))
            .collect()?;

        let mut columns = Vec::with_capacity(filtered.width());
        for column in filtered.get_columns() {
            let values: Vec<Option<&str>> = column.str()?.into_iter().collect();
            columns.push(Column::new(column.name().clone(), values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// What ended up in a per-sample file.
///
/// `OverCap` and `Absent` both leave an empty file behind; only this value
/// tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    Written(usize),
    OverCap(usize),
    Absent,
}

/// Per-run counts of the files written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitSummary {
    pub samples: usize,
    pub written: usize,
    pub over_cap: usize,
    pub absent: usize,
}

impl SplitSummary {
    pub fn files(&self) -> usize {
        self.written + self.over_cap + self.absent
    }

    fn record(&mut self, outcome: SampleOutcome) {
        match outcome {
            SampleOutcome::Written(_) => self.written += 1,
            SampleOutcome::OverCap(_) => self.over_cap += 1,
            SampleOutcome::Absent => self.absent += 1,
        }
    }
}

/// Inputs and thresholds for one split run
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    pub manta: PathBuf,
    pub cnvkit: PathBuf,
    pub freec: PathBuf,
    pub manifest: PathBuf,
    pub outdir: PathBuf,
    pub scripts: PathBuf,
    pub max_cnvs: usize,
    pub cnv_size: Threshold<f64>,
    pub freec_pvalue: Threshold<f64>,
}

impl SplitConfig {
    pub fn new(
        manta: impl Into<PathBuf>,
        cnvkit: impl Into<PathBuf>,
        freec: impl Into<PathBuf>,
        manifest: impl Into<PathBuf>,
    ) -> Self {
        SplitConfig {
            manta: manta.into(),
            cnvkit: cnvkit.into(),
            freec: freec.into(),
            manifest: manifest.into(),
            outdir: PathBuf::from(DEFAULT_OUTDIR),
            scripts: PathBuf::from("."),
            max_cnvs: DEFAULT_MAX_CNVS,
            cnv_size: Threshold::from(DEFAULT_CNV_SIZE),
            freec_pvalue: Threshold::from(DEFAULT_FREEC_PVALUE),
        }
    }

    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = outdir.into();
        self
    }

    pub fn with_scripts(mut self, scripts: impl Into<PathBuf>) -> Self {
        self.scripts = scripts.into();
        self
    }

    pub fn with_max_cnvs(mut self, max_cnvs: usize) -> Self {
        self.max_cnvs = max_cnvs;
        self
    }

    pub fn with_cnv_size(mut self, cnv_size: impl Into<Threshold<f64>>) -> Self {
        self.cnv_size = cnv_size.into();
        self
    }

    pub fn with_freec_pvalue(mut self, freec_pvalue: impl Into<Threshold<f64>>) -> Self {
        self.freec_pvalue = freec_pvalue.into();
        self
    }

    pub fn table_path(&self, caller: Caller) -> &Path {
        match caller {
            Caller::Manta => &self.manta,
            Caller::Cnvkit => &self.cnvkit,
            Caller::Freec => &self.freec,
        }
    }

    /// Directory receiving `caller`'s per-sample files
    pub fn caller_dir(&self, caller: Caller) -> PathBuf {
        self.outdir.join(caller.dir_name())
    }

    pub fn validate(&self) -> Result<()> {
        let size = *self.cnv_size.value();
        if !size.is_finite() || size < 0.0 {
            return Err(CnvError::invalid_parameter(
                "cnv_size",
                &self.cnv_size,
                "must be a non-negative number of base pairs",
            ));
        }
        if !(0.0..=1.0).contains(self.freec_pvalue.value()) {
            return Err(CnvError::invalid_parameter(
                "freec_pvalue",
                &self.freec_pvalue,
                "must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// Sorted union of the sample IDs found in `tables`
pub fn sample_set(tables: &[SampleTable]) -> Result<SampleSet> {
    let mut samples = SampleSet::new();
    for table in tables {
        samples.extend(table.samples()?);
    }
    Ok(samples)
}

/// Writes `sample`'s calls from `table` to `<dir>/<sample><ext>`.
///
/// Samples with more than `max_cnvs` calls are considered too noisy and get an
/// empty file, as do samples the caller has no calls for. Existing files are
/// overwritten.
pub fn write_sample_calls(
    table: &SampleTable,
    sample: &str,
    dir: &Path,
    max_cnvs: usize,
) -> Result<SampleOutcome> {
    let path = dir.join(format!("{}{}", sample, table.caller().extension()));
    let mut calls = table.calls_for(sample)?;
    let mut file = File::create(&path)?;

    let outcome = match calls.height() {
        0 => SampleOutcome::Absent,
        n if n > max_cnvs => SampleOutcome::OverCap(n),
        n => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b'\t')
                .finish(&mut calls)?;
            SampleOutcome::Written(n)
        }
    };

    Ok(outcome)
}

/// Splits the three merged tables into per-sample files and writes the manifest.
///
/// All tables are loaded before anything is written, so a bad input leaves the
/// output directories untouched.
///
/// # Errors
/// * Returns `CnvError::InvalidParameter` for an out-of-range threshold
/// * Returns `CnvError::Io`, `CnvError::Parse` or `CnvError::MissingColumn` for a bad input table
/// * Returns `CnvError::Io` if an output file cannot be written
pub fn run(config: &SplitConfig) -> Result<SplitSummary> {
    config.validate()?;

    let mut tables = Vec::with_capacity(Caller::ALL.len());
    for caller in Caller::ALL {
        let table = SampleTable::read(caller, config.table_path(caller))?;
        info!(
            "Loaded {} {} calls from {}",
            table.height(),
            caller,
            table.path().display()
        );
        tables.push(table);
    }

    let samples = sample_set(&tables)?;
    info!("{} samples across {} callers", samples.len(), tables.len());

    let mut dirs = Vec::with_capacity(tables.len());
    for table in &tables {
        let dir = config.caller_dir(table.caller());
        fs::create_dir_all(&dir)?;
        dirs.push(dir);
    }

    let mut summary = SplitSummary {
        samples: samples.len(),
        ..Default::default()
    };
    for sample in &samples {
        for (table, dir) in tables.iter().zip(&dirs) {
            let outcome = write_sample_calls(table, sample, dir, config.max_cnvs)?;
            match outcome {
                SampleOutcome::Written(n) => debug!("{}: {} {} calls", sample, n, table.caller()),
                SampleOutcome::OverCap(n) => warn!(
                    "{} has {} {} calls (max {}), writing an empty file",
                    sample,
                    n,
                    table.caller(),
                    config.max_cnvs
                ),
                SampleOutcome::Absent => debug!("{}: no {} calls", sample, table.caller()),
            }
            summary.record(outcome);
        }
    }

    // symlinks are resolved when the directory exists
    let scripts = match fs::canonicalize(&config.scripts) {
        Ok(scripts) => scripts,
        Err(_) => std::path::absolute(&config.scripts)?,
    };
    let manifest = Manifest::new(
        samples,
        scripts,
        config.cnv_size.text(),
        config.freec_pvalue.text(),
    );
    manifest.write(&config.manifest)?;
    info!(
        "Wrote {} files for {} samples, manifest at {}",
        summary.files(),
        summary.samples,
        config.manifest.display()
    );

    Ok(summary)
}
