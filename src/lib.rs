//! Core pipeline for filtering PhOxi-seq pileup tables: per-row filters,
//! position-level VAF aggregation, matched-position resolution, and
//! cross-condition comparison.

pub mod aggregate;
pub mod compare;
pub mod filters;
pub mod matched;
pub mod output;
pub mod tsv_reader;
pub mod types;
