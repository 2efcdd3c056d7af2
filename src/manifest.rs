//! Workflow config listing the split samples and the thresholds that
//! downstream rules filter on.

use crate::error::Result;
use crate::types::{Caller, SampleSet};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    samples: SampleSet,
    scripts: PathBuf,
    size_cutoff: String,
    freec_pval: String,
}

impl Manifest {
    /// `size_cutoff` and `freec_pval` are written exactly as given.
    pub fn new(
        samples: SampleSet,
        scripts: PathBuf,
        size_cutoff: impl Into<String>,
        freec_pval: impl Into<String>,
    ) -> Self {
        Manifest {
            samples,
            scripts,
            size_cutoff: size_cutoff.into(),
            freec_pval: freec_pval.into(),
        }
    }

    /// Writes the manifest to `path`, replacing any previous one.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        write!(writer, "{}", self)?;
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "samples:")?;
        for sample in &self.samples {
            writeln!(f, "  {}:", sample)?;
        }

        for caller in Caller::ALL {
            writeln!(f, "{}_ext: {}", caller.name(), caller.extension())?;
        }
        writeln!(f, "scripts: {}", self.scripts.display())?;
        writeln!(f, "size_cutoff: {}", self.size_cutoff)?;
        writeln!(f, "freec_pval: {}", self.freec_pval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_manifest() {
        let samples: SampleSet = ["BS_B", "BS_A"].iter().map(|s| s.to_string()).collect();
        let manifest = Manifest::new(samples, PathBuf::from("/opt/cnv/scripts"), "5000", "5e-2");

        let expected = "samples:\n  BS_A:\n  BS_B:\nmanta_ext: .manta\ncnvkit_ext: .cnvkit\n\
                        freec_ext: .freec\nscripts: /opt/cnv/scripts\nsize_cutoff: 5000\nfreec_pval: 5e-2\n";
        assert_eq!(manifest.to_string(), expected);
    }

    #[test]
    fn test_render_manifest_without_samples() {
        let manifest = Manifest::new(SampleSet::new(), PathBuf::from("/scripts"), "3000", "0.01");
        let rendered = manifest.to_string();

        assert!(rendered.starts_with("samples:\nmanta_ext: .manta\n"));
        assert!(rendered.ends_with("size_cutoff: 3000\nfreec_pval: 0.01\n"));
    }
}
