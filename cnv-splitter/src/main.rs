use clap::Parser;
use cnv_prep_rs::error::CnvError;
use cnv_prep_rs::split::{self, SplitConfig, DEFAULT_OUTDIR};
use cnv_prep_rs::types::Threshold;
use log::{info, Level};
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum SplitterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Cnv(#[from] CnvError),

    #[error("Could not initialise logging: {0}")]
    Logger(#[from] log::SetLoggerError),
}

#[derive(Parser)]
#[command(
    name = "cnv-splitter",
    about = "Splits merged CNV call tables into one file per sample and writes a workflow config",
    long_about = "Reads the merged Manta, CNVkit and FREEC call tables, collects every biospecimen ID \
                  found in any of them, and writes one file per sample and caller. Samples with more \
                  calls than --maxcnvs get an empty file, as do samples a caller has no calls for. \
                  Finally writes a config file listing the samples and the size and p-value cutoffs \
                  used by the downstream consensus workflow.",
    version,
    after_help = "Example usage:\n    \
                  cnv-splitter --manta manta.tsv --cnvkit cnvkit.tsv --freec freec.tsv --snake config.yaml\n    \
                  cnv-splitter --manta m.tsv --cnvkit c.tsv --freec f.tsv --snake config.yaml --maxcnvs 1000 --outdir scratch",
    color = clap::ColorChoice::Always
)]
#[derive(Debug)]
struct Args {
    /// Path to the merged Manta table (tab separated)
    #[arg(long, value_name = "PATH")]
    manta: PathBuf,

    /// Path to the merged CNVkit table (tab separated)
    #[arg(long, value_name = "PATH")]
    cnvkit: PathBuf,

    /// Path to the merged FREEC table (tab separated)
    #[arg(long, value_name = "PATH")]
    freec: PathBuf,

    /// Path of the workflow config file to write
    #[arg(long, value_name = "PATH")]
    snake: PathBuf,

    /// Samples with more calls than this get an empty file
    #[arg(long, default_value_t = split::DEFAULT_MAX_CNVS)]
    maxcnvs: usize,

    /// CNV size cutoff in base pairs, passed on to the config as written
    #[arg(long, default_value_t = Threshold::from(split::DEFAULT_CNV_SIZE))]
    cnvsize: Threshold<f64>,

    /// FREEC p-value cutoff, passed on to the config as written
    #[arg(long, default_value_t = Threshold::from(split::DEFAULT_FREEC_PVALUE))]
    freecp: Threshold<f64>,

    /// Root directory for the per-caller sample directories
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTDIR)]
    outdir: PathBuf,

    /// Scripts directory recorded in the config
    /// Defaults to the directory holding this executable
    #[arg(long, value_name = "PATH")]
    scripts: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl Args {
    fn into_config(self) -> Result<SplitConfig, SplitterError> {
        let scripts = match self.scripts {
            Some(scripts) => scripts,
            None => {
                let exe = std::env::current_exe()?;
                exe.parent().map(PathBuf::from).unwrap_or_default()
            }
        };

        Ok(SplitConfig::new(self.manta, self.cnvkit, self.freec, self.snake)
            .with_outdir(self.outdir)
            .with_scripts(scripts)
            .with_max_cnvs(self.maxcnvs)
            .with_cnv_size(self.cnvsize)
            .with_freec_pvalue(self.freecp))
    }
}

fn main() -> Result<(), SplitterError> {
    let start_time = std::time::Instant::now();

    let args = Args::parse();
    let level = if args.quiet { Level::Warn } else { Level::Info };
    simple_logger::init_with_level(level)?;

    let config = args.into_config()?;
    let summary = split::run(&config)?;

    info!(
        "{} samples: {} files with calls, {} over the cap, {} without calls",
        summary.samples, summary.written, summary.over_cap, summary.absent
    );
    info!("Elapsed time: {:?}", start_time.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 9] = [
        "cnv-splitter",
        "--manta",
        "manta.tsv",
        "--cnvkit",
        "cnvkit.tsv",
        "--freec",
        "freec.tsv",
        "--snake",
        "config.yaml",
    ];

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(REQUIRED).unwrap();
        assert_eq!(args.maxcnvs, 2500);
        assert_eq!(args.cnvsize.text(), "3000");
        assert_eq!(*args.cnvsize.value(), 3000.0);
        assert_eq!(args.freecp.text(), "0.01");
        assert_eq!(*args.freecp.value(), 0.01);
        assert_eq!(args.outdir, PathBuf::from("../../scratch"));
        assert!(args.scripts.is_none());
        assert!(!args.quiet);
    }

    #[test]
    fn test_thresholds_reach_config() {
        let mut argv = REQUIRED.to_vec();
        argv.extend([
            "--maxcnvs", "10", "--cnvsize", "5000", "--freecp", "0.05", "--scripts", "/opt/scripts",
        ]);
        let config = Args::try_parse_from(argv).unwrap().into_config().unwrap();

        assert_eq!(config.manta, PathBuf::from("manta.tsv"));
        assert_eq!(config.manifest, PathBuf::from("config.yaml"));
        assert_eq!(config.max_cnvs, 10);
        assert_eq!(*config.cnv_size.value(), 5000.0);
        assert_eq!(*config.freec_pvalue.value(), 0.05);
        assert_eq!(config.scripts, PathBuf::from("/opt/scripts"));
    }

    #[test]
    fn test_thresholds_keep_literal_text() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--cnvsize", "5000.0", "--freecp", "1e-2"]);
        let config = Args::try_parse_from(argv).unwrap().into_config().unwrap();

        assert_eq!(config.cnv_size.text(), "5000.0");
        assert_eq!(config.freec_pvalue.text(), "1e-2");
        assert_eq!(*config.freec_pvalue.value(), 0.01);
    }

    #[test]
    fn test_non_numeric_threshold() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--freecp", "small"]);
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_missing_required_flag() {
        let argv = REQUIRED[..REQUIRED.len() - 2].to_vec();
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_scripts_default_to_executable_dir() {
        let config = Args::try_parse_from(REQUIRED).unwrap().into_config().unwrap();
        let exe = std::env::current_exe().unwrap();
        assert_eq!(Some(config.scripts.as_path()), exe.parent());
    }
}
