//! Labeled matrix I/O and per-sample CNV table splitting for comparative RNA-Seq / CNV pipelines

pub mod error;
pub mod manifest;
pub mod matrix;
pub mod split;
pub mod types;
