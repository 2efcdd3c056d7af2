use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Distinct sample identifiers across all callers, iterated in sorted order
pub type SampleSet = BTreeSet<String>;

/// The three CNV calling methods whose merged tables get split per sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caller {
    Manta,
    Cnvkit,
    Freec,
}

impl Caller {
    pub const ALL: [Caller; 3] = [Caller::Manta, Caller::Cnvkit, Caller::Freec];

    /// Name of the column holding the biospecimen ID in this caller's merged table
    pub fn id_column(&self) -> &'static str {
        match self {
            Caller::Manta => "Kids.First.Biospecimen.ID.Tumor",
            Caller::Cnvkit => "ID",
            Caller::Freec => "Kids_First_Biospecimen_ID",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Caller::Manta => ".manta",
            Caller::Cnvkit => ".cnvkit",
            Caller::Freec => ".freec",
        }
    }

    /// Per-caller directory under the output root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Caller::Manta => "manta_manta",
            Caller::Cnvkit => "cnvkit_cnvkit",
            Caller::Freec => "freec_freec",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Caller::Manta => "manta",
            Caller::Cnvkit => "cnvkit",
            Caller::Freec => "freec",
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A numeric command line threshold that remembers how it was written.
///
/// Downstream workflow rules read the value from the config as text, so the
/// literal is passed on unchanged (`1e-2` stays `1e-2`).
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold<T> {
    value: T,
    text: String,
}

impl<T> Threshold<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl<T: fmt::Display> From<T> for Threshold<T> {
    fn from(value: T) -> Self {
        let text = value.to_string();
        Threshold { value, text }
    }
}

impl<T: FromStr> FromStr for Threshold<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        Ok(Threshold {
            value: text.parse()?,
            text: text.to_string(),
        })
    }
}

impl<T> fmt::Display for Threshold<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
