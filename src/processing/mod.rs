//! Batch processing steps of the spectrometer workflow.
//!
//! The steps are usually applied in this order:
//!   1. [`subtract`]: remove the dark / background signal from raw sample spectra.
//!   2. [`average`]: combine replicate runs into one mean spectrum per sample.
//!   3. [`normalize`]: shift spectra so that a non-absorbing baseline window is zero.
//!   4. [`absorbance`]: convert intensities into absorbances relative to a reference.
//!
//! Every step reads whole folders and reports a [`BatchSummary`](crate::batch::BatchSummary) per group.
//! Single files which cannot be processed are skipped with a warning.
pub mod absorbance;
pub mod average;
pub mod normalize;
pub mod subtract;
