//! Cross-state analysis over the record store.
//!
//! This module computes year-over-year growth of one metric between two
//! snapshot years, the Pearson correlation between two metrics within a
//! year, and per-year rankings of states.

pub mod correlation;
pub mod growth;
pub mod types;
pub mod utility;
